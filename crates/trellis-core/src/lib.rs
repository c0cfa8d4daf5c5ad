//! Core systems for Trellis.
//!
//! This crate provides the foundational pieces of the Trellis terminal widget
//! toolkit, independent of any terminal backend:
//!
//! - **Widget arena**: [`ObjectTree`] with parent-owned children and
//!   generational [`WidgetId`] handles
//! - **Events**: the [`Event`] tagged union addressed to a widget
//! - **Event queue/engine**: a thread-safe FIFO with atomic drain
//! - **Animation**: a background ticker that posts Timer events
//! - **Signals**: synchronous signal/slot notifications
//!
//! # Event Pipeline Example
//!
//! ```
//! use trellis_core::{Event, EventEngine, EventKind, ObjectTree};
//!
//! let mut tree = ObjectTree::new();
//! let root = tree.insert("root");
//!
//! let engine = EventEngine::new();
//! engine.post(Event::resize(root, 80, 24));
//! engine.post(Event::paint(root));
//!
//! for event in engine.drain() {
//!     if tree.contains(event.target()) {
//!         println!("{} -> {:?}", event.kind().name(), event.target());
//!     }
//! }
//! ```

mod animation;
mod error;
mod event;
mod event_queue;
pub mod input;
pub mod logging;
pub mod object;
pub mod signal;

pub use animation::AnimationEngine;
pub use error::{AnimationError, Result, TrellisError};
pub use event::{ControlRequest, Event, EventKind, FocusReason};
pub use event_queue::{EventEngine, EventPoster, EventQueue};
pub use input::{InputEvent, KeyCode, KeyInput, KeyboardModifiers};
pub use logging::{TreeFormatOptions, TreeFormatter, TreeStyle};
pub use object::{ObjectError, ObjectResult, ObjectTree, WidgetId};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
