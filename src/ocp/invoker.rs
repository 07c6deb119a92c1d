//! Runs `ocp-index` as a child process.
//!
//! Each call resolves the binary, builds the argument list, runs the tool
//! to completion and returns its trimmed stdout. Anything on stderr turns
//! the whole call into a failure.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::{OCP_INDEX_BIN, OcpError, OcpResult, Subcommand};
use crate::config::Settings;

/// A single `ocp-index` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Subcommand to run.
    pub command: Subcommand,
    /// Include directories, passed as `-I`. The first one is also the cwd.
    pub includes: Vec<PathBuf>,
    /// Module the query is made from, passed as `-F`.
    pub module: Option<String>,
    /// The identifier or prefix being looked up.
    pub query: String,
    /// `FILE:LINE,COL` of the cursor, passed as `--context=`.
    pub context: Option<String>,
    /// Extra flags inserted just before the query.
    pub extra_args: Vec<String>,
    /// Build directory override, passed as `--build=`.
    pub build_dir: Option<PathBuf>,
}

impl Invocation {
    /// Creates an invocation with no includes, context or flags.
    #[must_use]
    pub fn new(command: Subcommand, query: impl Into<String>) -> Self {
        Self {
            command,
            includes: Vec::new(),
            module: None,
            query: query.into(),
            context: None,
            extra_args: Vec::new(),
            build_dir: None,
        }
    }

    /// Sets the include directories.
    #[must_use]
    pub fn with_includes(mut self, includes: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the module name.
    #[must_use]
    pub fn with_module(mut self, module: Option<String>) -> Self {
        self.module = module;
        self
    }

    /// Sets the context string.
    #[must_use]
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Sets the extra flags.
    #[must_use]
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Applies buffer settings.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.build_dir = settings.build_dir.clone();
        self
    }

    /// Returns the arguments that follow the binary on the command line.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![self.command.as_str().into()];

        if let Some(ref context) = self.context {
            args.push(format!("--context={context}").into());
        }

        for include in &self.includes {
            args.push("-I".into());
            args.push(include.clone().into_os_string());
        }

        if let Some(ref build_dir) = self.build_dir {
            let mut arg = OsString::from("--build=");
            arg.push(build_dir);
            args.push(arg);
        }

        if let Some(ref module) = self.module {
            args.push("-F".into());
            args.push(module.into());
        }

        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(self.query.clone().into());
        args
    }

    /// Returns the directory the tool runs in.
    ///
    /// The first include directory is usually the project root.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.includes.first().map(PathBuf::as_path)
    }
}

/// Something that can answer `ocp-index` invocations.
///
/// Implemented by [`OcpIndex`] for the real binary; tests substitute
/// canned responses.
pub trait IndexTool {
    /// Runs the invocation and returns the tool's trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns [`OcpError::ToolReported`] when the tool writes to stderr.
    /// The real binary also fails with [`OcpError::ToolNotFound`] or
    /// [`OcpError::Spawn`].
    fn run(&self, invocation: &Invocation) -> OcpResult<String>;
}

/// How the binary is found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BinaryLocation {
    /// Search `PATH`, then ask opam for its bin directory.
    #[default]
    Search,
    /// Always use this path.
    Fixed(PathBuf),
}

/// The `ocp-index` executable.
#[derive(Debug, Clone, Default)]
pub struct OcpIndex {
    location: BinaryLocation,
}

impl OcpIndex {
    /// Creates a runner that looks the binary up on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner pinned to a specific binary.
    #[must_use]
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            location: BinaryLocation::Fixed(path.into()),
        }
    }

    /// Returns how the binary is located.
    #[must_use]
    pub fn location(&self) -> &BinaryLocation {
        &self.location
    }

    /// Resolves the binary path.
    ///
    /// Not cached: a fresh `opam switch` is picked up on the next call.
    ///
    /// # Errors
    ///
    /// Returns [`OcpError::ToolNotFound`] when neither `PATH` nor the opam
    /// bin directory holds the binary.
    pub fn resolve_binary(&self) -> OcpResult<PathBuf> {
        match self.location {
            BinaryLocation::Fixed(ref path) => Ok(path.clone()),
            BinaryLocation::Search => {
                if let Ok(path) = which::which(OCP_INDEX_BIN) {
                    return Ok(path);
                }

                let path = opam_bin_dir()
                    .map(|dir| dir.join(OCP_INDEX_BIN))
                    .ok_or(OcpError::ToolNotFound)?;

                if path.is_file() {
                    Ok(path)
                } else {
                    debug!("No ocp-index at {}", path.display());
                    Err(OcpError::ToolNotFound)
                }
            }
        }
    }
}

impl IndexTool for OcpIndex {
    fn run(&self, invocation: &Invocation) -> OcpResult<String> {
        let binary = self.resolve_binary()?;
        let args = invocation.args();

        debug!("'{}'", command_line(&binary, &args));

        let mut cmd = Command::new(&binary);
        cmd.args(&args);
        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let output = cmd.output().map_err(|source| OcpError::Spawn {
            binary: binary.clone(),
            source,
        })?;

        let error = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if error.is_empty() {
            debug!("{}", stdout);
            Ok(stdout)
        } else {
            warn!("ocp-index {} failed: {}", invocation.command, error);
            Err(OcpError::ToolReported(error))
        }
    }
}

/// Asks opam for its configured bin directory.
fn opam_bin_dir() -> Option<PathBuf> {
    let output = Command::new("opam")
        .args(["config", "var", "bin"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    let dir = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    if dir.is_empty() {
        None
    } else {
        Some(PathBuf::from(dir))
    }
}

/// Renders a command line for the log.
fn command_line(binary: &Path, args: &[OsString]) -> String {
    std::iter::once(binary.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
