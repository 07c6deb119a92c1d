//! Turns `ocp-index complete` output into completion entries.
//!
//! Each output line is `QUALIFIED DISPLAY KIND TYPE...` (format
//! `%q %p %k %t`). Long types wrap onto indented continuation lines.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::item::{CompletionItem, CompletionKind, CompletionList};
use crate::ocp::{IndexTool, Invocation, OcpError, Subcommand, extract_query};
use crate::plugin::view::View;

/// Output format requested from `ocp-index complete`.
pub const COMPLETE_FORMAT: &str = "%q %p %k %t";

/// Annotation shown for nested module signatures.
const MODULE_SIG_PLACEHOLDER: &str = "module sig .. end";

const SOURCE_TOOL: &str = "ocp-index";
const SOURCE_BUILTIN: &str = "builtin";
const SOURCE_LOCAL: &str = "local";
const SOURCE_ERROR: &str = "error";

/// `--show` / `--hide` category lists for a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Categories to show.
    pub show: &'static str,
    /// Categories to hide.
    pub hide: &'static str,
}

impl CategoryFilter {
    /// Interface files: types, modules, signatures, constructors.
    pub const INTERFACE: Self = Self {
        show: "t,m,s,k",
        hide: "v,e,c",
    };

    /// Implementation files: values, exceptions, constructors, modules.
    pub const IMPLEMENTATION: Self = Self {
        show: "v,e,c,m,k",
        hide: "t,s,k",
    };

    /// Picks the filter for a buffer's file name.
    #[must_use]
    pub fn for_file(file_name: Option<&Path>) -> Self {
        let is_interface = file_name
            .map(|name| name.to_string_lossy().ends_with(".mli"))
            .unwrap_or(false);

        if is_interface {
            Self::INTERFACE
        } else {
            Self::IMPLEMENTATION
        }
    }

    /// Returns the flags passed to `ocp-index complete`.
    #[must_use]
    pub fn args(&self) -> [&'static str; 6] {
        [
            "--format",
            COMPLETE_FORMAT,
            "--show",
            self.show,
            "--hide",
            self.hide,
        ]
    }
}

/// A newline followed by indentation continues the previous entry.
fn continuation_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\n\s+").expect("Invalid continuation regex"))
}

/// Parses `ocp-index complete` output.
///
/// Lines with fewer than two spaces are skipped. When `prefix` occurs
/// inside the qualified name past its start, the insertion text begins at
/// that occurrence so qualifiers the user did not type are dropped.
#[must_use]
pub fn parse_output(output: &str, prefix: &str) -> Vec<CompletionItem> {
    let joined = continuation_regex().replace_all(output, " ");

    joined
        .split('\n')
        .filter(|line| line.matches(' ').count() > 1)
        .filter_map(|line| {
            let mut fields = line.splitn(3, ' ');
            let qualified = fields.next()?;
            let display = fields.next()?;
            let mut rest = fields.next()?;

            let kind = CompletionKind::from_ocp_kind(rest.split_whitespace().next().unwrap_or(""));

            if rest.starts_with("module sig") {
                rest = MODULE_SIG_PLACEHOLDER;
            }

            let insert = match qualified.find(prefix) {
                Some(offset) if offset > 0 => &qualified[offset..],
                _ => qualified,
            };

            Some(CompletionItem::new(
                format!("{}\t{}", display, rest.trim()),
                insert,
                kind,
                SOURCE_TOOL,
            ))
        })
        .collect()
}

/// Literal entries `ocp-index` never offers.
#[must_use]
pub fn builtin_completions(prefix: &str) -> Vec<CompletionItem> {
    match prefix {
        "_" => vec![CompletionItem::new(
            "_\t wildcard",
            "_",
            CompletionKind::Keyword,
            SOURCE_BUILTIN,
        )],
        "in" => vec![CompletionItem::new(
            "in\tkeyword",
            "in",
            CompletionKind::Keyword,
            SOURCE_BUILTIN,
        )],
        _ => Vec::new(),
    }
}

/// Entries for names bound in the buffer itself.
#[must_use]
pub fn local_completions(names: &[String]) -> Vec<CompletionItem> {
    names
        .iter()
        .map(|name| {
            CompletionItem::new(
                format!("{name}\tlet"),
                name.as_str(),
                CompletionKind::Variable,
                SOURCE_LOCAL,
            )
        })
        .collect()
}

/// A failed lookup shown as a single entry.
#[must_use]
pub fn error_completion(err: &OcpError) -> CompletionItem {
    let text = err.to_string();
    CompletionItem::new(text.clone(), text, CompletionKind::Text, SOURCE_ERROR)
}

/// Computes the completion list at `location`.
///
/// Returns `None` when no identifier precedes the cursor. Tool failures
/// do not abort: the error text becomes the entry, preceded only by the
/// `_` wildcard when that is the prefix. The `in` keyword and locals are
/// added only when the tool answered.
pub fn query_completions<V, T>(
    view: &V,
    prefix: &str,
    location: usize,
    tool: &T,
    includes: &[PathBuf],
    locals: Option<&[String]>,
) -> Option<CompletionList>
where
    V: View + ?Sized,
    T: IndexTool + ?Sized,
{
    let query = match extract_query(view, location) {
        Ok(query) => query,
        Err(err) => {
            debug!("No completion at {}: {}", location, err);
            return None;
        }
    };
    let filter = CategoryFilter::for_file(view.file_name());

    let invocation = Invocation::new(Subcommand::Complete, query.query)
        .with_includes(includes.iter().cloned())
        .with_module(query.module)
        .with_context(query.context)
        .with_extra_args(filter.args())
        .with_settings(&query.settings);

    let items = match tool.run(&invocation) {
        Ok(output) => {
            let variants = parse_output(&output, prefix);
            debug!("{} completion(s) from ocp-index", variants.len());

            let mut items = builtin_completions(prefix);
            items.extend(variants);
            if let Some(names) = locals {
                items.extend(local_completions(names));
            }
            items
        }
        Err(err) => {
            // Only the wildcard outlives a failed lookup.
            let mut items = if prefix == "_" {
                builtin_completions(prefix)
            } else {
                Vec::new()
            };
            items.push(error_completion(&err));
            items
        }
    };

    Some(CompletionList::inhibiting(items))
}
