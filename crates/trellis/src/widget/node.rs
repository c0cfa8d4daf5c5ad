//! Widget tree nodes and the behaviour hook.

use trellis_core::{Event, EventKind, WidgetId};

use super::context::EventContext;
use super::size_policy::SizePolicy;

/// An axis-aligned rectangle in absolute terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left column.
    pub x: u16,
    /// Top row.
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// A zero-sized rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Whether the rectangle covers no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Length along `orientation`.
    #[inline]
    pub fn length(&self, orientation: Orientation) -> u16 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Origin along `orientation`.
    #[inline]
    pub fn origin(&self, orientation: Orientation) -> u16 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }
}

/// Direction in which a container places its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children side by side, left to right.
    Horizontal,
    /// Children stacked, top to bottom.
    Vertical,
}

impl Orientation {
    /// The perpendicular axis.
    #[inline]
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Application hook attached to a widget.
///
/// Every event delivered to the widget reaches [`event`](Self::event). The
/// default implementation forwards Paint to [`paint`](Self::paint) and Timer
/// to [`on_timer`](Self::on_timer), and ignores everything else. Return
/// `true` when the event was handled; unhandled Tab and Shift+Tab presses
/// move focus.
pub trait WidgetBehavior {
    /// Handle an event addressed to this widget.
    fn event(&mut self, cx: &mut EventContext<'_>, event: &Event) -> bool {
        match event.kind() {
            EventKind::Paint => {
                self.paint(cx);
                true
            }
            EventKind::Timer { tick } => {
                self.on_timer(cx, *tick);
                true
            }
            _ => false,
        }
    }

    /// Animation tick.
    fn on_timer(&mut self, _cx: &mut EventContext<'_>, _tick: u64) {}

    /// Repaint using `cx.geometry()`.
    fn paint(&mut self, _cx: &mut EventContext<'_>) {}
}

/// A node of the widget tree.
///
/// Nodes live in an [`ObjectTree`](trellis_core::ObjectTree); the tree owns
/// the parent/child structure and this type holds everything else. Mutating
/// policies or the enabled flag through [`System`](crate::System) also marks
/// the affected layout dirty; the setters here do not.
pub struct WidgetNode {
    name: String,
    geometry: Rect,
    horizontal: SizePolicy,
    vertical: SizePolicy,
    enabled: bool,
    focusable: bool,
    focused: bool,
    focused_descendant: Option<WidgetId>,
    layout: Option<Orientation>,
    behavior: Option<Box<dyn WidgetBehavior>>,
}

impl WidgetNode {
    /// Create an enabled leaf node with default policies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: Rect::ZERO,
            horizontal: SizePolicy::default(),
            vertical: SizePolicy::default(),
            enabled: true,
            focusable: false,
            focused: false,
            focused_descendant: None,
            layout: None,
            behavior: None,
        }
    }

    /// Create a container that lays out its children along `orientation`.
    pub fn container(name: impl Into<String>, orientation: Orientation) -> Self {
        Self::new(name).with_layout(orientation)
    }

    /// Builder: horizontal policy.
    pub fn with_horizontal(mut self, policy: SizePolicy) -> Self {
        self.horizontal = policy;
        self
    }

    /// Builder: vertical policy.
    pub fn with_vertical(mut self, policy: SizePolicy) -> Self {
        self.vertical = policy;
        self
    }

    /// Builder: layout orientation, making the node a container.
    pub fn with_layout(mut self, orientation: Orientation) -> Self {
        self.layout = Some(orientation);
        self
    }

    /// Builder: whether the node takes part in focus.
    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    /// Builder: initial enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: attach a behaviour.
    pub fn with_behavior(mut self, behavior: impl WidgetBehavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current geometry in absolute cells.
    #[inline]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Write the geometry. Returns `true` if it changed.
    pub fn set_geometry(&mut self, geometry: Rect) -> bool {
        let changed = self.geometry != geometry;
        self.geometry = geometry;
        changed
    }

    /// Horizontal size policy.
    #[inline]
    pub fn horizontal_policy(&self) -> SizePolicy {
        self.horizontal
    }

    /// Vertical size policy.
    #[inline]
    pub fn vertical_policy(&self) -> SizePolicy {
        self.vertical
    }

    /// Size policy along `orientation`.
    #[inline]
    pub fn policy(&self, orientation: Orientation) -> SizePolicy {
        match orientation {
            Orientation::Horizontal => self.horizontal,
            Orientation::Vertical => self.vertical,
        }
    }

    /// Replace the horizontal policy.
    pub fn set_horizontal_policy(&mut self, policy: SizePolicy) {
        self.horizontal = policy;
    }

    /// Replace the vertical policy.
    pub fn set_vertical_policy(&mut self, policy: SizePolicy) {
        self.vertical = policy;
    }

    /// Whether the node takes part in layout and event delivery.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the node accepts focus.
    #[inline]
    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    /// Allow or forbid focus.
    pub fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }

    /// Whether the node currently holds focus.
    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// The focused widget inside this subtree, if any.
    #[inline]
    pub fn focused_descendant(&self) -> Option<WidgetId> {
        self.focused_descendant
    }

    pub(crate) fn set_focused_descendant(&mut self, id: Option<WidgetId>) {
        self.focused_descendant = id;
    }

    /// Layout orientation, `Some` for containers.
    #[inline]
    pub fn layout(&self) -> Option<Orientation> {
        self.layout
    }

    /// Change or remove the layout orientation.
    pub fn set_layout(&mut self, layout: Option<Orientation>) {
        self.layout = layout;
    }

    /// Whether the node lays out children.
    #[inline]
    pub fn is_container(&self) -> bool {
        self.layout.is_some()
    }

    /// Whether a behaviour is attached.
    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Replace the behaviour.
    pub fn set_behavior(&mut self, behavior: Option<Box<dyn WidgetBehavior>>) {
        self.behavior = behavior;
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn WidgetBehavior>> {
        self.behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, behavior: Box<dyn WidgetBehavior>) {
        // A handler may have installed a replacement; keep it.
        if self.behavior.is_none() {
            self.behavior = Some(behavior);
        }
    }
}

impl std::fmt::Debug for WidgetNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetNode")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("enabled", &self.enabled)
            .field("focused", &self.focused)
            .field("layout", &self.layout)
            .field("behavior", &self.behavior.is_some())
            .finish()
    }
}
