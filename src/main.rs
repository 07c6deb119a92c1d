//! ocpc - OCaml completion from the command line.
//!
//! Loads one file the way an editor would and runs a single plugin
//! command against it.
//!
//! Usage:
//!   ocpc complete FILE OFFSET [--prefix P] [--json]
//!   ocpc type FILE OFFSET
//!   ocpc locals FILE
//!
//! Options:
//!   --version, -v    Show version
//!   --config PATH    Use PATH instead of ~/.ocp-complete.toml
//!
//! OFFSET is a character offset or a 1-based LINE:COL pair.

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

use ocp_complete::completion::scan_locals;
use ocp_complete::config::Config;
use ocp_complete::editor::Document;
use ocp_complete::logging;
use ocp_complete::plugin::OcpPlugin;
use ocp_complete::plugin::view::View;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "usage: ocpc complete FILE OFFSET [--prefix P] [--json]
       ocpc type FILE OFFSET
       ocpc locals FILE";

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    /// Positional arguments.
    positional: Vec<String>,
    /// `--config`
    config: Option<PathBuf>,
    /// `--prefix`
    prefix: Option<String>,
    /// `--json`
    json: bool,
}

impl Args {
    fn parse(raw: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut args = Self::default();
        let mut raw = raw.into_iter();

        while let Some(arg) = raw.next() {
            match arg.as_str() {
                "--json" => args.json = true,
                "--config" => {
                    let path = raw.next().ok_or("--config needs a path")?;
                    args.config = Some(PathBuf::from(path));
                }
                "--prefix" => {
                    args.prefix = Some(raw.next().ok_or("--prefix needs a value")?);
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                _ => args.positional.push(arg),
            }
        }

        Ok(args)
    }
}

fn main() {
    let raw: Vec<String> = env::args().skip(1).collect();

    // Handle --version flag
    if raw.iter().any(|a| a == "--version" || a == "-v") {
        println!("ocpc v{}", VERSION);
        return;
    }

    if let Err(e) = run(raw) {
        eprintln!("ocpc: {}", e);
        process::exit(1);
    }
}

fn run(raw: Vec<String>) -> Result<(), Box<dyn Error>> {
    let args = Args::parse(raw)?;

    let config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Err(e) = logging::init(&config.log) {
        eprintln!("ocpc: logging disabled: {}", e);
    }

    let (command, file) = match args.positional.as_slice() {
        [command, file, ..] => (command.as_str(), Path::new(file)),
        _ => return Err(USAGE.into()),
    };

    let mut doc = Document::open(file)?.with_settings(config.settings.clone());

    let folders = if config.folders.is_empty() {
        file.parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .into_iter()
            .collect()
    } else {
        config.folders.clone()
    };

    let mut plugin = OcpPlugin::new(config.index_tool()).with_fallback_folders(folders);
    plugin.on_load(&doc);

    match command {
        "complete" => {
            let offset = offset_arg(&doc, args.positional.get(2))?;
            let prefix = args.prefix.unwrap_or_else(|| doc.word_before(offset));

            let Some(list) = plugin.on_query_completions(&doc, &prefix, &[offset]) else {
                return Ok(());
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for (label, insert) in list.pairs() {
                    println!("{label}\t{insert}");
                }
            }
        }
        "type" => {
            let offset = offset_arg(&doc, args.positional.get(2))?;
            doc.set_cursor(offset);
            if let Some(message) = plugin.show_type(&mut doc) {
                println!("{message}");
            }
        }
        "locals" => {
            for name in scan_locals(&doc.text()) {
                println!("{name}");
            }
        }
        other => return Err(format!("unknown command {other}\n{USAGE}").into()),
    }

    plugin.on_close(&doc);
    Ok(())
}

/// Resolves an OFFSET argument against the document.
fn offset_arg(doc: &Document, arg: Option<&String>) -> Result<usize, Box<dyn Error>> {
    let arg = arg.ok_or(USAGE)?;

    if let Some((line, col)) = arg.split_once(':') {
        let line: usize = line.parse()?;
        let col: usize = col.parse()?;
        let (Some(line), Some(col)) = (line.checked_sub(1), col.checked_sub(1)) else {
            return Err(format!("LINE:COL is 1-based, got {arg}").into());
        };
        return Ok(doc.offset_of(line, col)?);
    }

    let offset: usize = arg.parse()?;
    if offset > doc.len_chars() {
        return Err(format!("offset {offset} past end of file ({} chars)", doc.len_chars()).into());
    }
    Ok(offset)
}
