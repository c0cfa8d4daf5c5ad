//! Widget nodes and everything that acts on one widget at a time.
//!
//! - [`SizePolicy`]: how a widget wants to be sized along one axis
//! - [`WidgetNode`]: the per-widget data stored in the tree, with an
//!   optional [`WidgetBehavior`] that receives events
//! - [`EventDispatcher`]: delivers an [`Event`](trellis_core::Event) to its
//!   target, bubbling unhandled input to ancestors
//! - [`FocusManager`]: single-focus ownership and Tab ordering
//!
//! # Writing a behaviour
//!
//! ```
//! use trellis::prelude::*;
//!
//! struct Counter {
//!     presses: u32,
//! }
//!
//! impl WidgetBehavior for Counter {
//!     fn event(&mut self, cx: &mut EventContext<'_>, event: &Event) -> bool {
//!         match event.kind() {
//!             EventKind::Input(InputEvent::Key(key)) if key.code == KeyCode::Enter => {
//!                 self.presses += 1;
//!                 if self.presses == 3 {
//!                     cx.exit(0);
//!                 }
//!                 true
//!             }
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let node = WidgetNode::new("counter")
//!     .with_focusable(true)
//!     .with_behavior(Counter { presses: 0 });
//! assert!(node.has_behavior());
//! ```

mod context;
mod dispatcher;
pub(crate) mod focus;
mod node;
mod size_policy;

pub use context::EventContext;
pub use dispatcher::{DispatchResult, EventDispatcher};
pub use focus::FocusManager;
pub use node::{Orientation, Rect, WidgetBehavior, WidgetNode};
pub use size_policy::{PolicyKind, SizePolicy, SizePolicySpec, UNBOUNDED};
