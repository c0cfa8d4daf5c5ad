//! Prelude module for Trellis.
//!
//! ```
//! use trellis::prelude::*;
//! ```

// ============================================================================
// System
// ============================================================================

pub use crate::{System, SystemConfig, SystemHandle};

// ============================================================================
// Events and Input
// ============================================================================

pub use crate::{Event, EventKind, FocusReason, InputEvent, KeyCode, KeyInput, KeyboardModifiers};

// ============================================================================
// Widgets and Layout
// ============================================================================

pub use crate::layout::{LayoutEngine, allocate};
pub use crate::widget::{
    EventContext, FocusManager, Orientation, PolicyKind, Rect, SizePolicy, WidgetBehavior, WidgetNode,
};
pub use crate::{ObjectTree, WidgetId};

// ============================================================================
// Terminals
// ============================================================================

pub use crate::terminal::{CrosstermTerminal, HeadlessTerminal, Terminal, TerminalInput};
