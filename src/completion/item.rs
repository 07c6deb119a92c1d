//! Completion item types.
//!
//! Defines the entries handed back to the host editor and the flags that
//! tell it to keep its own word completion out of the way.

use std::ops::BitOr;

use serde::Serialize;

/// Kind of completion entry, taken from the `%k` column of `ocp-index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    #[default]
    Text,
    Value,
    Type,
    Module,
    Constructor,
    Exception,
    Field,
    Method,
    Class,
    Keyword,
    Variable,
}

impl CompletionKind {
    /// Maps an `ocp-index` kind name.
    ///
    /// Two-word kinds such as `module type` are matched on their first word.
    #[must_use]
    pub fn from_ocp_kind(kind: &str) -> Self {
        match kind {
            "value" => Self::Value,
            "type" => Self::Type,
            "module" => Self::Module,
            "constructor" | "variant" => Self::Constructor,
            "exception" => Self::Exception,
            "field" => Self::Field,
            "method" => Self::Method,
            "class" => Self::Class,
            "keyword" => Self::Keyword,
            _ => Self::Text,
        }
    }

    /// Returns a short display string for the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Value => "val",
            Self::Type => "type",
            Self::Module => "mod",
            Self::Constructor => "ctor",
            Self::Exception => "exn",
            Self::Field => "field",
            Self::Method => "method",
            Self::Class => "class",
            Self::Keyword => "kw",
            Self::Variable => "var",
        }
    }
}

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    /// Display label: the name, a tab, then an annotation.
    pub label: String,

    /// The text to insert when accepting this completion.
    pub insert_text: String,

    /// Kind of completion item.
    pub kind: CompletionKind,

    /// Where the item came from (`ocp-index`, `builtin`, `local`, `error`).
    pub source: &'static str,
}

impl CompletionItem {
    /// Creates a new completion item.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        insert_text: impl Into<String>,
        kind: CompletionKind,
        source: &'static str,
    ) -> Self {
        Self {
            label: label.into(),
            insert_text: insert_text.into(),
            kind,
            source,
        }
    }

    /// Returns the label up to the annotation.
    #[must_use]
    pub fn name(&self) -> &str {
        self.label.split('\t').next().unwrap_or(&self.label)
    }

    /// Returns the annotation after the tab, if any.
    #[must_use]
    pub fn annotation(&self) -> Option<&str> {
        self.label.split_once('\t').map(|(_, annotation)| annotation)
    }

    /// Returns the `(label, insertion)` pair the host displays.
    #[must_use]
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.label, &self.insert_text)
    }
}

/// Bitmask of host completion behaviors to suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompletionFlags(u32);

impl CompletionFlags {
    /// Suppress nothing.
    pub const NONE: Self = Self(0);
    /// Keep the host's buffer-word completions out of the list.
    pub const INHIBIT_WORD_COMPLETIONS: Self = Self(8);
    /// Keep the host's `.sublime-completions` style entries out of the list.
    pub const INHIBIT_EXPLICIT_COMPLETIONS: Self = Self(16);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether all bits of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CompletionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Ordered completion entries plus host flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CompletionList {
    /// Entries, highest priority first.
    pub items: Vec<CompletionItem>,
    /// Flags for the host.
    pub flags: CompletionFlags,
}

impl CompletionList {
    /// Creates a list that inhibits the host's own completions.
    #[must_use]
    pub fn inhibiting(items: Vec<CompletionItem>) -> Self {
        Self {
            items,
            flags: CompletionFlags::INHIBIT_WORD_COMPLETIONS
                | CompletionFlags::INHIBIT_EXPLICIT_COMPLETIONS,
        }
    }

    /// Returns the `(label, insertion)` pairs in order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.items.iter().map(CompletionItem::as_pair).collect()
    }

    /// Returns whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
