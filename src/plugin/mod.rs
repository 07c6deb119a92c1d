//! Editor plugin session.
//!
//! [`OcpPlugin`] is the object a host editor keeps for the lifetime of the
//! plugin. It owns the local-name cache and the `ocp-index` runner, and
//! exposes one method per host event:
//!
//! | Host event            | Method                     |
//! |-----------------------|----------------------------|
//! | buffer loaded         | [`OcpPlugin::on_load`]     |
//! | buffer saved          | [`OcpPlugin::on_post_save`] |
//! | buffer closed         | [`OcpPlugin::on_close`]    |
//! | selection moved       | [`OcpPlugin::on_selection_modified`] |
//! | completion requested  | [`OcpPlugin::on_query_completions`] |
//! | show-type key binding | [`OcpPlugin::show_type`]   |

pub mod view;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::completion::{CompletionList, LocalCache, query_completions, scan_locals};
use crate::ocp::{IndexTool, Invocation, OcpIndex, Subcommand, extract_query};
use self::view::{Region, View, is_ocaml_scope};

/// Status line key for type information.
pub const STATUS_KEY: &str = "OCaml Autocompletion";

/// Plugin state shared across all views.
#[derive(Debug, Default)]
pub struct OcpPlugin<T = OcpIndex> {
    /// Runner for `ocp-index`.
    tool: T,
    /// Local names by buffer.
    locals: LocalCache,
    /// Include directories used when a view's window has no folders.
    fallback_folders: Vec<PathBuf>,
}

impl<T: IndexTool> OcpPlugin<T> {
    /// Creates a plugin session around an `ocp-index` runner.
    #[must_use]
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            locals: LocalCache::new(),
            fallback_folders: Vec::new(),
        }
    }

    /// Sets include directories for views without window folders.
    #[must_use]
    pub fn with_fallback_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.fallback_folders = folders;
        self
    }

    /// Returns the `ocp-index` runner.
    #[must_use]
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Returns the local-name cache.
    #[must_use]
    pub fn locals(&self) -> &LocalCache {
        &self.locals
    }

    /// Buffer opened: scan it for local names.
    pub fn on_load<V: View + ?Sized>(&mut self, view: &V) {
        self.extract_locals(view);
    }

    /// Buffer written to disk: rescan it.
    pub fn on_post_save<V: View + ?Sized>(&mut self, view: &V) {
        self.extract_locals(view);
    }

    /// Buffer closed: forget its local names.
    pub fn on_close<V: View + ?Sized>(&mut self, view: &V) {
        if self.locals.remove(view.buffer_id()).is_some() {
            debug!("Dropped locals for buffer {:?}", view.buffer_id());
        }
    }

    /// Cursor moved: the shown type no longer applies.
    pub fn on_selection_modified<V: View + ?Sized>(&self, view: &mut V) {
        view.erase_status(STATUS_KEY);
    }

    /// Completion hook.
    ///
    /// Returns `None`, leaving the host to its defaults, when there is not
    /// exactly one cursor, the cursor is outside OCaml code, or nothing
    /// identifier-like precedes it.
    pub fn on_query_completions<V: View + ?Sized>(
        &self,
        view: &V,
        prefix: &str,
        locations: &[usize],
    ) -> Option<CompletionList> {
        let &[location] = locations else {
            return None;
        };

        if !is_ocaml_scope(&view.scope_name(location)) {
            return None;
        }

        query_completions(
            view,
            prefix,
            location,
            &self.tool,
            &self.includes(view),
            self.locals.get(view.buffer_id()),
        )
    }

    /// Show-type command: puts the type under the cursor in the status line.
    ///
    /// Returns the message shown, if any.
    pub fn show_type<V: View + ?Sized>(&self, view: &mut V) -> Option<String> {
        let region = view.selections().first().copied()?;

        if !is_ocaml_scope(&view.scope_name(region.begin())) {
            return None;
        }

        let message = self.query_type(&*view, region)?;
        view.set_status(STATUS_KEY, &message);
        Some(message)
    }

    /// Looks up the type of the identifier at `region`.
    ///
    /// The lookup point is the end of the identifier, including any
    /// trailing `_`, `#` or `'` pieces. Failures read as an unknown type.
    pub fn query_type<V: View + ?Sized>(&self, view: &V, region: Region) -> Option<String> {
        let mut end = view.word_end(region.end());

        while matches!(view.char_at(end), Some('_' | '#' | '\'')) {
            end += 1;
            if view.char_at(end) != Some(' ') {
                end = view.word_end(end);
            }
        }

        let query = extract_query(view, end).ok()?;

        let invocation = Invocation::new(Subcommand::Type, query.query.clone())
            .with_includes(self.includes(view))
            .with_module(query.module)
            .with_context(query.context)
            .with_settings(&query.settings);

        let message = match self.tool.run(&invocation) {
            Ok(output) if !output.is_empty() => format!("Type: {output}"),
            Ok(_) => format!("Unknown type: '{}'", query.query),
            Err(err) => {
                debug!("Type lookup for {} failed: {}", query.query, err);
                format!("Unknown type: '{}'", query.query)
            }
        };

        Some(message)
    }

    /// Rescans a buffer for local names if it holds OCaml code.
    pub fn extract_locals<V: View + ?Sized>(&mut self, view: &V) {
        let Some(region) = view.selections().first().copied() else {
            return;
        };

        if !is_ocaml_scope(&view.scope_name(region.begin())) {
            return;
        }

        let names = scan_locals(&view.text());
        info!(
            "Found {} local name(s) in buffer {:?}",
            names.len(),
            view.buffer_id()
        );
        self.locals.insert(view.buffer_id(), names);
    }

    /// Include directories for a view.
    fn includes<V: View + ?Sized>(&self, view: &V) -> Vec<PathBuf> {
        let folders = view.folders();
        if folders.is_empty() {
            self.fallback_folders.clone()
        } else {
            folders
        }
    }
}
