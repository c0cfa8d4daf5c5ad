//! Context passed to widget behaviours during dispatch.

use std::time::Duration;

use trellis_core::{Event, WidgetId};

use super::node::Rect;
use crate::handle::SystemHandle;

/// What a [`WidgetBehavior`](super::WidgetBehavior) can see and do while
/// handling an event.
///
/// The geometry is a snapshot taken just before the handler runs, so a Paint
/// handler always sees the rect written by the latest layout pass.
pub struct EventContext<'a> {
    widget: WidgetId,
    geometry: Rect,
    focused: bool,
    handle: &'a SystemHandle,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(widget: WidgetId, geometry: Rect, focused: bool, handle: &'a SystemHandle) -> Self {
        Self {
            widget,
            geometry,
            focused,
            handle,
        }
    }

    /// The widget receiving the event.
    #[inline]
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// The widget's geometry in absolute cells.
    #[inline]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Whether the widget holds focus.
    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The system handle, for posting from other threads.
    pub fn handle(&self) -> &SystemHandle {
        self.handle
    }

    /// Post an event for the next cycle.
    pub fn post(&self, event: Event) {
        self.handle.post(event);
    }

    /// Recompute this widget's layout at the end of the cycle.
    pub fn request_layout(&self) {
        self.handle.request_layout(self.widget);
    }

    /// Take focus at the end of the cycle.
    pub fn request_focus(&self) {
        self.handle.request_focus(self.widget);
    }

    /// Receive Timer events roughly every `period`.
    pub fn start_animation(&self, period: Duration) {
        self.handle.start_animation(self.widget, period);
    }

    /// Stop receiving Timer events.
    pub fn stop_animation(&self) {
        self.handle.stop_animation(self.widget);
    }

    /// End the dispatch loop with `code`.
    pub fn exit(&self, code: i32) {
        self.handle.exit(code);
    }

    /// End the dispatch loop with code 0.
    pub fn quit(&self) {
        self.handle.quit();
    }
}
