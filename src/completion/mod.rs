//! Completion for OCaml buffers.
//!
//! Combines three sources, in list order:
//! - literal entries for `_` and `in`
//! - `ocp-index complete` results
//! - names bound locally in the buffer
//!
//! ## Usage
//!
//! ```no_run
//! use ocp_complete::completion::query_completions;
//! use ocp_complete::editor::Document;
//! use ocp_complete::ocp::OcpIndex;
//!
//! let doc = Document::from_str("let l = List.ma").with_path("main.ml");
//! let tool = OcpIndex::new();
//! if let Some(list) = query_completions(&doc, "ma", doc.len_chars(), &tool, &[], None) {
//!     for (label, insert) in list.pairs() {
//!         println!("{label} -> {insert}");
//!     }
//! }
//! ```

pub mod formatter;
pub mod item;
pub mod locals;

pub use formatter::{CategoryFilter, COMPLETE_FORMAT, parse_output, query_completions};
pub use item::{CompletionFlags, CompletionItem, CompletionKind, CompletionList};
pub use locals::{LocalCache, scan_locals};
