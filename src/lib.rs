//! ocp-complete
//!
//! OCaml completion and type lookup for text editors, backed by the
//! external `ocp-index` tool.
//!
//! # Architecture
//!
//! - **Ocp Module**: locates and runs `ocp-index`, extracts the query token
//! - **Completion Module**: parses tool output, local-name cache
//! - **Plugin Module**: host editor interface and event handling
//! - **Editor Module**: rope-backed document implementing the host interface
//!
//! # Usage
//!
//! ```no_run
//! use ocp_complete::editor::Document;
//! use ocp_complete::ocp::OcpIndex;
//! use ocp_complete::plugin::OcpPlugin;
//!
//! let mut plugin = OcpPlugin::new(OcpIndex::new());
//! let doc = Document::from_str("let l = List.le").with_path("main.ml");
//! plugin.on_load(&doc);
//! let completions = plugin.on_query_completions(&doc, "le", &[doc.len_chars()]);
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

pub mod completion;
pub mod config;
pub mod editor;
pub mod logging;
pub mod ocp;
pub mod plugin;

// Re-export main types
pub use completion::{CompletionItem, CompletionList};
pub use config::{Config, Settings};
pub use editor::Document;
pub use ocp::{OcpError, OcpIndex};
pub use plugin::OcpPlugin;
