//! Host editor view interface.
//!
//! The host editor implements [`View`] for each open buffer. All offsets
//! are character offsets into the buffer text.

use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Opaque per-buffer identifier assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// A span of text between two offsets. `a` may be past `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Anchor offset.
    pub a: usize,
    /// Caret offset.
    pub b: usize,
}

impl Region {
    /// Creates a region.
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Creates an empty region at `point`.
    #[must_use]
    pub const fn point(point: usize) -> Self {
        Self { a: point, b: point }
    }

    /// Returns the smaller offset.
    #[must_use]
    pub fn begin(&self) -> usize {
        self.a.min(self.b)
    }

    /// Returns the larger offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.a.max(self.b)
    }

    /// Returns whether the region is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.a == self.b
    }
}

/// A text buffer as seen through the host editor.
pub trait View {
    /// Returns the buffer identifier.
    fn buffer_id(&self) -> BufferId;

    /// Returns the path of the file backing the buffer, if any.
    fn file_name(&self) -> Option<&Path>;

    /// Returns the space-separated syntax scopes at `point`.
    fn scope_name(&self, point: usize) -> String;

    /// Returns the region of the line containing `point`, without the newline.
    fn line(&self, point: usize) -> Region;

    /// Returns the text in `region`.
    fn substr(&self, region: Region) -> String;

    /// Returns the character at `point`, or `None` past the end.
    fn char_at(&self, point: usize) -> Option<char>;

    /// Returns the end offset of the word touching `point`.
    fn word_end(&self, point: usize) -> usize;

    /// Returns the 0-based (row, column) of `point`.
    fn rowcol(&self, point: usize) -> (usize, usize);

    /// Returns the whole buffer text.
    fn text(&self) -> String;

    /// Returns the current selections. Each cursor is one region.
    fn selections(&self) -> Vec<Region>;

    /// Returns the project folders open in the view's window.
    fn folders(&self) -> Vec<PathBuf>;

    /// Returns the buffer settings.
    fn settings(&self) -> Settings;

    /// Shows `text` in the status line under `key`.
    fn set_status(&mut self, key: &str, text: &str);

    /// Clears the status text under `key`.
    fn erase_status(&mut self, key: &str);
}

/// Scopes the integration reacts to.
pub const OCAML_SCOPES: [&str; 3] = ["source.ocaml", "source.ocamllex", "source.ocamlyacc"];

/// Returns whether a scope name string contains an OCaml-family scope.
#[must_use]
pub fn is_ocaml_scope(scope_name: &str) -> bool {
    scope_name
        .split(' ')
        .any(|scope| OCAML_SCOPES.contains(&scope))
}
