//! In-memory documents.
//!
//! [`Document`] is a rope-backed buffer with a path, cursors, settings and
//! a status line. It implements [`View`] so the plugin can run without a
//! host editor, which is how the command line front end and the tests use it.

pub mod buffer;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use self::buffer::{Buffer, Position};
use crate::config::Settings;
use crate::plugin::view::{BufferId, Region, View};

/// Next buffer id handed out by [`Document`].
static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Scope used for files that are not OCaml sources.
const PLAIN_TEXT_SCOPE: &str = "text.plain";

/// Document error type.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Position out of bounds.
    #[error("Position out of bounds: line {line}, column {col}")]
    OutOfBounds { line: usize, col: usize },

    /// I/O error.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Returns the base syntax scope for a file path.
#[must_use]
pub fn scope_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ml" | "mli") => "source.ocaml",
        Some("mll") => "source.ocamllex",
        Some("mly") => "source.ocamlyacc",
        _ => PLAIN_TEXT_SCOPE,
    }
}

/// A buffer open in the editor.
#[derive(Debug)]
pub struct Document {
    /// Buffer identifier.
    id: BufferId,
    /// Text buffer.
    buffer: Buffer,
    /// File path.
    path: Option<PathBuf>,
    /// Base syntax scope.
    scope: String,
    /// Cursors.
    selections: Vec<Region>,
    /// Project folders of the enclosing window.
    folders: Vec<PathBuf>,
    /// Buffer settings.
    settings: Settings,
    /// Status line entries by key.
    status: HashMap<String, String>,
}

impl Document {
    /// Creates an unnamed document holding `text`.
    ///
    /// The cursor starts at the end of the text.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        let buffer = Buffer::from(text);
        let end = buffer.len_chars();

        Self {
            id: BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)),
            buffer,
            path: None,
            scope: PLAIN_TEXT_SCOPE.to_string(),
            selections: vec![Region::point(end)],
            folders: Vec::new(),
            settings: Settings::default(),
            status: HashMap::new(),
        }
    }

    /// Opens a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Io`] if the file cannot be read as UTF-8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_str(&text).with_path(path))
    }

    /// Sets the file path. The scope follows the extension.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.scope = scope_for_path(&path).to_string();
        self.path = Some(path);
        self
    }

    /// Sets the window folders.
    #[must_use]
    pub fn with_folders(mut self, folders: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.folders = folders.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the buffer settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Places a single cursor at `offset`.
    #[must_use]
    pub fn with_cursor(mut self, offset: usize) -> Self {
        self.set_cursor(offset);
        self
    }

    /// Replaces the cursors.
    #[must_use]
    pub fn with_selections(mut self, selections: Vec<Region>) -> Self {
        self.selections = selections;
        self
    }

    /// Places a single cursor at `offset`, clamped to the text.
    pub fn set_cursor(&mut self, offset: usize) {
        let offset = offset.min(self.buffer.len_chars());
        self.selections = vec![Region::point(offset)];
    }

    /// Returns the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Returns the status text under `key`.
    #[must_use]
    pub fn status(&self, key: &str) -> Option<&str> {
        self.status.get(key).map(String::as_str)
    }

    /// Converts a 0-based line and column to an offset.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::OutOfBounds`] past the last line or past the
    /// end of the line.
    pub fn offset_of(&self, line: usize, col: usize) -> Result<usize, DocumentError> {
        if line >= self.buffer.len_lines() || col > self.buffer.line_len_chars(line) {
            return Err(DocumentError::OutOfBounds { line, col });
        }
        Ok(self.buffer.position_to_index(Position::new(line, col)))
    }

    /// Returns the word immediately before `offset`.
    #[must_use]
    pub fn word_before(&self, offset: usize) -> String {
        let start = self.buffer.word_start(offset);
        self.buffer.slice(start, offset)
    }
}

impl View for Document {
    fn buffer_id(&self) -> BufferId {
        self.id
    }

    fn file_name(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn scope_name(&self, _point: usize) -> String {
        format!("{} ", self.scope)
    }

    fn line(&self, point: usize) -> Region {
        let pos = self.buffer.index_to_position(point);
        let start = self.buffer.line_start_index(pos.line);
        Region::new(start, start + self.buffer.line_len_chars(pos.line))
    }

    fn substr(&self, region: Region) -> String {
        self.buffer.slice(region.begin(), region.end())
    }

    fn char_at(&self, point: usize) -> Option<char> {
        self.buffer.char_at(point)
    }

    fn word_end(&self, point: usize) -> usize {
        self.buffer.word_end(point)
    }

    fn rowcol(&self, point: usize) -> (usize, usize) {
        let pos = self.buffer.index_to_position(point);
        (pos.line, pos.col)
    }

    fn text(&self) -> String {
        self.buffer.text()
    }

    fn selections(&self) -> Vec<Region> {
        self.selections.clone()
    }

    fn folders(&self) -> Vec<PathBuf> {
        self.folders.clone()
    }

    fn settings(&self) -> Settings {
        self.settings.clone()
    }

    fn set_status(&mut self, key: &str, text: &str) {
        self.status.insert(key.to_string(), text.to_string());
    }

    fn erase_status(&mut self, key: &str) {
        self.status.remove(key);
    }
}
