//! Locally bound names per open buffer.
//!
//! A best-effort regex scan for `let` bindings and `fun` parameters. The
//! names only pad out the list after the structured `ocp-index` results,
//! so false positives and misses are both tolerated.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::plugin::view::BufferId;

/// `let [rec] names =`
fn let_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"let(\s+rec)?\s+(([?~]?[\w']+\s*)+)=").expect("Invalid let regex")
    })
}

/// `fun names ->`
fn fun_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"fun\s+(([?~]?[\w']+\s*)+)->").expect("Invalid fun regex")
    })
}

/// Collects the names bound by `let` and `fun` in `text`.
///
/// Labels keep their name without the `~` or `?` marker. The result is
/// sorted and free of duplicates.
#[must_use]
pub fn scan_locals(text: &str) -> Vec<String> {
    let lets = let_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(2));
    let funs = fun_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1));

    let mut names = BTreeSet::new();
    for definition in lets.chain(funs) {
        for name in definition.as_str().split_whitespace() {
            let name = name.strip_prefix(['?', '~']).unwrap_or(name);
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }

    names.into_iter().collect()
}

/// Local names keyed by buffer.
#[derive(Debug, Default)]
pub struct LocalCache {
    /// Names by buffer.
    entries: HashMap<BufferId, Vec<String>>,
}

impl LocalCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the names stored for a buffer.
    pub fn insert(&mut self, buffer: BufferId, names: Vec<String>) {
        self.entries.insert(buffer, names);
    }

    /// Returns the names stored for a buffer.
    #[must_use]
    pub fn get(&self, buffer: BufferId) -> Option<&[String]> {
        self.entries.get(&buffer).map(Vec::as_slice)
    }

    /// Drops a buffer's entry, returning its names.
    pub fn remove(&mut self, buffer: BufferId) -> Option<Vec<String>> {
        self.entries.remove(&buffer)
    }

    /// Returns whether a buffer has an entry.
    #[must_use]
    pub fn contains(&self, buffer: BufferId) -> bool {
        self.entries.contains_key(&buffer)
    }

    /// Returns the number of buffers tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no buffer is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
