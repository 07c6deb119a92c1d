//! Bridge to the external `ocp-index` tool.
//!
//! - `invoker`: locates the binary, assembles the command line, runs it
//! - `query`: pulls the identifier before the cursor out of a view
//!
//! The tool does all symbol resolution; this module only shells out and
//! hands back its text.

pub mod invoker;
pub mod query;

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use invoker::{IndexTool, Invocation, OcpIndex};
pub use query::{Query, extract_query, module_from_file_name};

/// Name of the external binary.
pub const OCP_INDEX_BIN: &str = "ocp-index";

/// Errors from talking to `ocp-index`.
#[derive(Debug, Error)]
pub enum OcpError {
    /// Neither the search path nor the opam bin directory had the binary.
    #[error("ocp-index not found on PATH or in the opam bin directory")]
    ToolNotFound,

    /// The tool wrote diagnostics to stderr.
    #[error("{0}")]
    ToolReported(String),

    /// No identifier precedes the cursor.
    #[error("no query at cursor")]
    NoQuery,

    /// The process could not be started.
    #[error("failed to run {}: {source}", binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for `ocp-index` operations.
pub type OcpResult<T> = Result<T, OcpError>;

/// `ocp-index` subcommands used by the editor integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    /// Look up the type of an identifier.
    Type,
    /// List completion candidates for a prefix.
    Complete,
}

impl Subcommand {
    /// Returns the subcommand as passed on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
