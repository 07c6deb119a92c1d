//! Integration tests for the plugin event handlers.
//!
//! These tests drive [`OcpPlugin`] the way a host editor would: buffers are
//! loaded, saved and closed, and completion or type requests arrive with
//! the cursor positions the host reports.

use std::cell::RefCell;

use pretty_assertions::assert_eq;

use ocp_complete::config::Settings;
use ocp_complete::editor::Document;
use ocp_complete::ocp::invoker::{IndexTool, Invocation};
use ocp_complete::ocp::{OcpError, OcpResult, Subcommand};
use ocp_complete::plugin::view::{Region, View};
use ocp_complete::plugin::{OcpPlugin, STATUS_KEY};

/// Replies with queued answers, then with the last one.
struct QueuedTool {
    replies: RefCell<Vec<Result<String, String>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl QueuedTool {
    fn new(replies: &[Result<&str, &str>]) -> Self {
        Self {
            replies: RefCell::new(
                replies
                    .iter()
                    .rev()
                    .map(|r| (*r).map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl IndexTool for QueuedTool {
    fn run(&self, invocation: &Invocation) -> OcpResult<String> {
        self.calls.borrow_mut().push(invocation.clone());
        let mut replies = self.replies.borrow_mut();
        let reply = if replies.len() > 1 {
            replies.pop()
        } else {
            replies.last().cloned()
        };
        reply
            .unwrap_or_else(|| Ok(String::new()))
            .map_err(OcpError::ToolReported)
    }
}

fn plugin(replies: &[Result<&str, &str>]) -> OcpPlugin<QueuedTool> {
    OcpPlugin::new(QueuedTool::new(replies))
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_load_scans_ocaml_buffers() {
    let mut plugin = plugin(&[Ok("")]);
    let doc = Document::from_str("let total = 0\nlet add x = total + x").with_path("a.ml");

    plugin.on_load(&doc);

    assert_eq!(
        plugin.locals().get(doc.buffer_id()),
        Some(&["add".to_string(), "total".to_string(), "x".to_string()][..])
    );
}

#[test]
fn test_load_ignores_other_buffers() {
    let mut plugin = plugin(&[Ok("")]);
    let doc = Document::from_str("let x = 1").with_path("notes.md");

    plugin.on_load(&doc);

    assert!(!plugin.locals().contains(doc.buffer_id()));
}

#[test]
fn test_lexer_and_parser_sources_count_as_ocaml() {
    let mut plugin = plugin(&[Ok("")]);
    let lexer = Document::from_str("{ let depth = ref 0 }").with_path("lexer.mll");
    let parser = Document::from_str("%{ let mk = fun loc -> loc %}").with_path("parser.mly");

    plugin.on_load(&lexer);
    plugin.on_load(&parser);

    assert_eq!(plugin.locals().get(lexer.buffer_id()), Some(&["depth".to_string()][..]));
    assert_eq!(
        plugin.locals().get(parser.buffer_id()),
        Some(&["loc".to_string(), "mk".to_string()][..])
    );
}

#[test]
fn test_save_replaces_names() {
    let mut plugin = plugin(&[Ok("")]);
    let before = Document::from_str("let old_name = 1").with_path("a.ml");
    plugin.on_load(&before);

    // Same buffer id after an edit: rebuild from the new text with the old id.
    let id = before.buffer_id();
    let after = EditedView {
        inner: Document::from_str("let new_name = 1").with_path("a.ml"),
        id,
    };
    plugin.on_post_save(&after);

    assert_eq!(plugin.locals().get(id), Some(&["new_name".to_string()][..]));
    assert_eq!(plugin.locals().len(), 1);
}

#[test]
fn test_close_forgets_names() {
    let mut plugin = plugin(&[Ok("Stdlib.abs abs value int -> int")]);
    let doc = Document::from_str("let acc = 0\nlet y = a").with_path("a.ml");

    plugin.on_load(&doc);
    plugin.on_close(&doc);
    assert!(plugin.locals().is_empty());

    let list = plugin
        .on_query_completions(&doc, "a", &[doc.len_chars()])
        .expect("list");
    assert_eq!(list.pairs(), vec![("abs\tvalue int -> int", "abs")]);
}

#[test]
fn test_close_of_unknown_buffer_is_harmless() {
    let mut plugin = plugin(&[Ok("")]);
    let doc = Document::from_str("").with_path("a.ml");

    plugin.on_close(&doc);
    assert!(plugin.locals().is_empty());
}

// ============================================================================
// Completion Hook Tests
// ============================================================================

#[test]
fn test_completion_includes_buffer_locals() {
    let mut plugin = plugin(&[Ok("Stdlib.abs abs value int -> int")]);
    let doc = Document::from_str("let acc = 0\nlet y = a").with_path("a.ml");
    plugin.on_load(&doc);

    let list = plugin
        .on_query_completions(&doc, "a", &[doc.len_chars()])
        .expect("list");

    assert_eq!(
        list.pairs(),
        vec![
            ("abs\tvalue int -> int", "abs"),
            ("acc\tlet", "acc"),
            ("y\tlet", "y"),
        ]
    );
}

#[test]
fn test_multiple_cursors_defer_to_host() {
    let plugin = plugin(&[Ok("Stdlib.abs abs value int -> int")]);
    let doc = Document::from_str("a\na").with_path("a.ml");

    assert!(plugin.on_query_completions(&doc, "a", &[1, 3]).is_none());
    assert!(plugin.on_query_completions(&doc, "a", &[]).is_none());
    assert_eq!(plugin.tool().call_count(), 0);
}

#[test]
fn test_non_ocaml_scope_defers_to_host() {
    let plugin = plugin(&[Ok("Stdlib.abs abs value int -> int")]);
    let doc = Document::from_str("abs").with_path("script.py");

    assert!(plugin.on_query_completions(&doc, "abs", &[3]).is_none());
    assert_eq!(plugin.tool().call_count(), 0);
}

#[test]
fn test_completion_uses_window_folders() {
    let plugin = plugin(&[Ok("")]);
    let doc = Document::from_str("List.m")
        .with_path("/work/proj/src/a.ml")
        .with_folders(["/work/proj", "/work/vendor"]);

    plugin.on_query_completions(&doc, "m", &[6]);

    let calls = plugin.tool().calls.borrow();
    assert_eq!(calls[0].command, Subcommand::Complete);
    assert_eq!(calls[0].includes.len(), 2);
    assert_eq!(
        calls[0].working_dir().map(|p| p.to_string_lossy().into_owned()),
        Some("/work/proj".to_string())
    );
}

#[test]
fn test_buffer_build_dir_reaches_command_line() {
    let plugin = plugin(&[Ok("")]);
    let doc = Document::from_str("List.m")
        .with_path("/work/proj/src/main.ml")
        .with_folders(["/work/proj"])
        .with_settings(Settings::default().with_build_dir("_build/default"));

    plugin.on_query_completions(&doc, "m", &[6]);

    let args: Vec<String> = plugin.tool().calls.borrow()[0]
        .args()
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    assert_eq!(
        args[..7],
        [
            "complete",
            "--context=/work/proj/src/main.ml:0,6",
            "-I",
            "/work/proj",
            "--build=_build/default",
            "-F",
            "Main",
        ]
    );
}

// ============================================================================
// Type Lookup Tests
// ============================================================================

#[test]
fn test_show_type_sets_and_selection_clears_status() {
    let plugin = plugin(&[Ok("'a list -> int")]);
    let mut doc = Document::from_str("let n = List.length xs")
        .with_path("a.ml")
        .with_cursor(14);

    let message = plugin.show_type(&mut doc);
    assert_eq!(message.as_deref(), Some("Type: 'a list -> int"));
    assert_eq!(doc.status(STATUS_KEY), Some("Type: 'a list -> int"));
    assert_eq!(plugin.tool().calls.borrow()[0].query, "List.length");

    plugin.on_selection_modified(&mut doc);
    assert_eq!(doc.status(STATUS_KEY), None);
}

#[test]
fn test_show_type_reports_unknown_on_tool_error() {
    let plugin = plugin(&[Err("Error: not found")]);
    let mut doc = Document::from_str("mystery").with_path("a.ml").with_cursor(2);

    assert_eq!(
        plugin.show_type(&mut doc).as_deref(),
        Some("Unknown type: 'mystery'")
    );
}

#[test]
fn test_show_type_uses_first_selection() {
    let plugin = plugin(&[Ok("int")]);
    let mut doc = Document::from_str("let a = b + c")
        .with_path("a.ml")
        .with_selections(vec![Region::point(8), Region::point(12)]);

    plugin.show_type(&mut doc);
    assert_eq!(plugin.tool().calls.borrow()[0].query, "b");
}

// ============================================================================
// Helpers
// ============================================================================

/// A document presented under a fixed buffer id, as after an in-place edit.
struct EditedView {
    inner: Document,
    id: ocp_complete::plugin::view::BufferId,
}

impl View for EditedView {
    fn buffer_id(&self) -> ocp_complete::plugin::view::BufferId {
        self.id
    }

    fn file_name(&self) -> Option<&std::path::Path> {
        self.inner.file_name()
    }

    fn scope_name(&self, point: usize) -> String {
        self.inner.scope_name(point)
    }

    fn line(&self, point: usize) -> Region {
        self.inner.line(point)
    }

    fn substr(&self, region: Region) -> String {
        self.inner.substr(region)
    }

    fn char_at(&self, point: usize) -> Option<char> {
        self.inner.char_at(point)
    }

    fn word_end(&self, point: usize) -> usize {
        self.inner.word_end(point)
    }

    fn rowcol(&self, point: usize) -> (usize, usize) {
        self.inner.rowcol(point)
    }

    fn text(&self) -> String {
        self.inner.text()
    }

    fn selections(&self) -> Vec<Region> {
        self.inner.selections()
    }

    fn folders(&self) -> Vec<std::path::PathBuf> {
        self.inner.folders()
    }

    fn settings(&self) -> ocp_complete::config::Settings {
        self.inner.settings()
    }

    fn set_status(&mut self, key: &str, text: &str) {
        self.inner.set_status(key, text);
    }

    fn erase_status(&mut self, key: &str) {
        self.inner.erase_status(key);
    }
}
