//! Events routed through the Trellis dispatch loop.

use std::time::Duration;

use crate::input::InputEvent;
use crate::object::WidgetId;

/// Why focus moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusReason {
    /// Tab key navigation.
    Tab,
    /// Shift+Tab navigation.
    Backtab,
    /// The widget marked as initial focus when the system started.
    Initial,
    /// The focused widget (or an ancestor) was disabled.
    Disabled,
    /// Programmatic focus change.
    #[default]
    Other,
}

/// Work for the dispatch thread, posted by system handles.
///
/// Carried in [`EventKind::Control`] so every cross-thread request travels
/// through the event queue. The dispatch loop applies these itself; they
/// never reach widget behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Recompute the target container's layout.
    Layout,
    /// Move focus to the target.
    Focus,
    /// Deliver Timer events to the target roughly every `period`.
    StartAnimation {
        /// Requested tick period.
        period: Duration,
    },
    /// Stop Timer events for the target.
    StopAnimation,
}

/// The payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The target's available area changed.
    Resize {
        /// New width in cells.
        width: u16,
        /// New height in cells.
        height: u16,
    },

    /// The target gained focus.
    FocusIn {
        /// Why focus moved.
        reason: FocusReason,
    },

    /// The target lost focus.
    FocusOut {
        /// Why focus moved.
        reason: FocusReason,
    },

    /// The target should repaint using its current geometry.
    Paint,

    /// User input for the target.
    Input(InputEvent),

    /// An animation tick for the target.
    Timer {
        /// Monotonic tick counter of the animation engine.
        tick: u64,
    },

    /// User-defined custom event.
    Custom {
        /// User-defined event kind identifier.
        kind: u32,
        /// Optional payload as raw bytes.
        payload: Option<Box<[u8]>>,
    },

    /// A request for the dispatch loop itself.
    Control(ControlRequest),
}

impl EventKind {
    /// Short name of the variant, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::FocusIn { .. } => "focus_in",
            Self::FocusOut { .. } => "focus_out",
            Self::Paint => "paint",
            Self::Input(_) => "input",
            Self::Timer { .. } => "timer",
            Self::Custom { .. } => "custom",
            Self::Control(_) => "control",
        }
    }
}

/// An event addressed to a widget.
///
/// The target is a weak reference: the widget may be destroyed before the
/// event is dispatched, in which case dispatch is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    target: WidgetId,
    kind: EventKind,
}

impl Event {
    /// Create an event for `target`.
    pub fn new(target: WidgetId, kind: EventKind) -> Self {
        Self { target, kind }
    }

    /// Create a resize event.
    pub fn resize(target: WidgetId, width: u16, height: u16) -> Self {
        Self::new(target, EventKind::Resize { width, height })
    }

    /// Create a paint event.
    pub fn paint(target: WidgetId) -> Self {
        Self::new(target, EventKind::Paint)
    }

    /// Create an animation tick.
    pub fn timer(target: WidgetId, tick: u64) -> Self {
        Self::new(target, EventKind::Timer { tick })
    }

    /// Create an input event.
    pub fn input(target: WidgetId, input: InputEvent) -> Self {
        Self::new(target, EventKind::Input(input))
    }

    /// Create a custom event without payload.
    pub fn custom(target: WidgetId, kind: u32) -> Self {
        Self::new(target, EventKind::Custom { kind, payload: None })
    }

    /// Create a custom event with a byte payload.
    pub fn custom_with_payload(target: WidgetId, kind: u32, payload: impl Into<Box<[u8]>>) -> Self {
        Self::new(
            target,
            EventKind::Custom {
                kind,
                payload: Some(payload.into()),
            },
        )
    }

    /// Create a request for the dispatch loop concerning `target`.
    pub fn control(target: WidgetId, request: ControlRequest) -> Self {
        Self::new(target, EventKind::Control(request))
    }

    /// Whether this event is a [`ControlRequest`].
    #[inline]
    pub fn is_control(&self) -> bool {
        matches!(self.kind, EventKind::Control(_))
    }

    /// The widget this event is addressed to.
    #[inline]
    pub fn target(&self) -> WidgetId {
        self.target
    }

    /// The event payload.
    #[inline]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}
