//! Trellis - a terminal widget toolkit.
//!
//! This is the main crate. It re-exports [`trellis_core`] and adds the parts
//! that know about widgets and terminals: size policies, the space
//! allocator, the layout engine, event dispatch, focus, the terminal
//! backends and the [`System`] that ties them into a dispatch loop.
//!
//! # Example
//!
//! ```no_run
//! use trellis::prelude::*;
//!
//! fn main() -> trellis::Result<()> {
//!     let mut system = System::new(CrosstermTerminal::new());
//!     let root = system.add_widget(WidgetNode::container("root", Orientation::Horizontal));
//!     system.add_child(root, WidgetNode::new("sidebar").with_horizontal(SizePolicy::fixed(20)))?;
//!     system.add_child(root, WidgetNode::new("body").with_horizontal(SizePolicy::expanding(0)))?;
//!     system.set_head(Some(root))?;
//!     let code = system.run()?;
//!     std::process::exit(code);
//! }
//! ```

pub use trellis_core::*;

pub mod config;
mod handle;
pub mod layout;
pub mod prelude;
mod system;
pub mod terminal;
pub mod widget;

pub use config::{ConfigError, SystemConfig};
pub use handle::SystemHandle;
pub use system::System;
pub use terminal::{CrosstermTerminal, HeadlessTerminal, Terminal, TerminalInput};
pub use widget::{Orientation, Rect, SizePolicy, WidgetBehavior, WidgetNode};
