//! Logging and debugging facilities for Trellis.
//!
//! Trellis is instrumented with the `tracing` crate. Nothing is printed
//! unless the application installs a subscriber. Because a TUI owns the
//! terminal, log to a file or another writer rather than stdout:
//!
//! ```ignore
//! let file = std::fs::File::create("trellis.log")?;
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis=debug,trellis_core::event_loop=trace")
//!     .with_writer(std::sync::Mutex::new(file))
//!     .init();
//! ```
//!
//! [`TreeFormatter`] renders an [`ObjectTree`] for debugging.

use std::fmt::Write as FmtWrite;

use crate::object::{ObjectError, ObjectResult, ObjectTree, WidgetId};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "trellis_core";
    /// Dispatch loop target.
    pub const EVENT_LOOP: &str = "trellis_core::event_loop";
    /// Event queue target.
    pub const EVENT_QUEUE: &str = "trellis_core::event_queue";
    /// Animation ticker target.
    pub const ANIMATION: &str = "trellis_core::animation";
    /// Signal/slot target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Widget tree target.
    pub const OBJECT: &str = "trellis_core::object";
    /// Layout engine and space allocator target.
    pub const LAYOUT: &str = "trellis::layout";
    /// Focus manager target.
    pub const FOCUS: &str = "trellis::focus";
    /// Event routing target.
    pub const DISPATCH: &str = "trellis::dispatch";
    /// Terminal backend target.
    pub const TERMINAL: &str = "trellis::terminal";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to append widget ids.
    pub show_ids: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Options for output without ids.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            ..Default::default()
        }
    }
}

/// Renders an [`ObjectTree`] subtree, one node per line.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    options: TreeFormatOptions,
}

impl TreeFormatter {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`, labelling each node with `label`.
    pub fn format_subtree<T, F>(&self, tree: &ObjectTree<T>, root: WidgetId, label: F) -> ObjectResult<String>
    where
        F: Fn(WidgetId, &T) -> String,
    {
        let mut output = String::new();
        let mut rails = Vec::new();
        self.format_into(tree, root, &label, &mut rails, true, &mut output)?;
        Ok(output)
    }

    fn format_into<T, F>(
        &self,
        tree: &ObjectTree<T>,
        id: WidgetId,
        label: &F,
        rails: &mut Vec<bool>,
        is_last: bool,
        output: &mut String,
    ) -> ObjectResult<()>
    where
        F: Fn(WidgetId, &T) -> String,
    {
        let depth = rails.len();
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let value = tree.get(id).ok_or(ObjectError::InvalidWidgetId)?;

        let (rail, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
        };
        if depth > 0 {
            for &open in &rails[1..] {
                output.push_str(if open { rail } else { "    " });
            }
            output.push_str(if is_last { corner } else { tee });
        }
        output.push_str(&label(id, value));
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        output.push('\n');

        let children = tree.children(id)?;
        rails.push(!is_last);
        for (index, &child) in children.iter().enumerate() {
            self.format_into(tree, child, label, rails, index + 1 == children.len(), output)?;
        }
        rails.pop();
        Ok(())
    }
}
