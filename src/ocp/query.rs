//! Query extraction from the text before the cursor.

use std::sync::OnceLock;

use regex::Regex;

use super::{OcpError, OcpResult};
use crate::config::Settings;
use crate::plugin::view::{Region, View};

/// What to ask `ocp-index` about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Module the buffer defines, inferred from its file name.
    pub module: Option<String>,
    /// Identifier or dotted path before the cursor.
    pub query: String,
    /// `FILE:ROW,COL` of the cursor.
    pub context: Option<String>,
    /// Buffer settings.
    pub settings: Settings,
}

/// Token before the cursor: a capitalized dotted path or a bare identifier.
fn token_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"[,\s]*([A-Z][\w_.#']*|[\w_#']+)$").expect("Invalid token regex")
    })
}

fn module_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(\w+)\.ml.*$").expect("Invalid module regex"))
}

/// Builds a query for the token ending at `location`.
///
/// # Errors
///
/// [`OcpError::NoQuery`] when nothing identifier-like precedes the cursor
/// on its line.
pub fn extract_query<V: View + ?Sized>(view: &V, location: usize) -> OcpResult<Query> {
    let line = view.substr(Region::new(view.line(location).begin(), location));
    let token = token_regex()
        .captures(&line)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
        .ok_or(OcpError::NoQuery)?;

    let mut module = None;
    let mut context = None;

    if let Some(file_name) = view.file_name() {
        let file_name = file_name.to_string_lossy();
        module = module_from_file_name(&file_name);

        let (row, col) = view.rowcol(location);
        context = Some(format!("{}:{},{}", file_name, row, col));
    }

    Ok(Query {
        module,
        query: token,
        context,
        settings: view.settings(),
    })
}

/// Derives the OCaml module name for a source path.
///
/// `src/foo_bar.ml` gives `Foo_bar`. Paths without a `.ml*` file give `None`.
#[must_use]
pub fn module_from_file_name(file_name: &str) -> Option<String> {
    let name = module_regex().captures(file_name)?.get(1)?.as_str();
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
