//! Rope-backed text storage.
//!
//! Everything is addressed in characters. Out-of-range lookups clamp or
//! return `None` rather than panic.

use ropey::Rope;

/// Zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Line index.
    pub line: usize,
    /// Character offset within the line.
    pub col: usize,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Characters that make up a word when moving over identifiers.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Immutable document text.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

impl From<&str> for Buffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl Buffer {
    /// Number of lines; an empty buffer has one.
    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Number of characters, line breaks included.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns true if the buffer holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// The whole text as a `String`.
    #[must_use]
    pub fn text(&self) -> String {
        String::from(&self.rope)
    }

    /// Length of a line without its line break.
    #[must_use]
    pub fn line_len_chars(&self, line: usize) -> usize {
        let Some(slice) = self.rope.get_line(line) else {
            return 0;
        };

        let trailing = slice
            .chars_at(slice.len_chars())
            .reversed()
            .take_while(|&c| c == '\n' || c == '\r')
            .count();
        slice.len_chars() - trailing
    }

    /// First character of `line`, or the end of the text past the last line.
    #[must_use]
    pub fn line_start_index(&self, line: usize) -> usize {
        self.rope
            .try_line_to_char(line)
            .unwrap_or_else(|_| self.len_chars())
    }

    /// Character offset of `pos`. The column is clamped to the line.
    #[must_use]
    pub fn position_to_index(&self, pos: Position) -> usize {
        match self.rope.try_line_to_char(pos.line) {
            Ok(start) => start + pos.col.min(self.line_len_chars(pos.line)),
            Err(_) => self.len_chars(),
        }
    }

    /// Line and column of a character offset, clamped to the text.
    #[must_use]
    pub fn index_to_position(&self, idx: usize) -> Position {
        let idx = idx.min(self.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    /// Character at `idx`, or `None` past the end.
    #[must_use]
    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.rope.get_char(idx)
    }

    /// Text in `start..end`, clamped to the buffer.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len_chars());
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// First non-word character at or after `idx`.
    ///
    /// An index already on punctuation comes back unchanged.
    #[must_use]
    pub fn word_end(&self, idx: usize) -> usize {
        let idx = idx.min(self.len_chars());
        idx + self
            .rope
            .chars_at(idx)
            .take_while(|&c| is_word_char(c))
            .count()
    }

    /// Start of the word that ends at `idx`.
    #[must_use]
    pub fn word_start(&self, idx: usize) -> usize {
        let idx = idx.min(self.len_chars());
        idx - self
            .rope
            .chars_at(idx)
            .reversed()
            .take_while(|&c| is_word_char(c))
            .count()
    }
}
