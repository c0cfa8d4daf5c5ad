//! Thread-safe handle to a running [`System`](crate::System).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use trellis_core::{ControlRequest, Event, EventPoster, Signal, WidgetId};

struct Shared {
    exit_requested: AtomicBool,
    exit_code: AtomicI32,
    exit_signal: Signal<i32>,
}

/// Cloneable, `Send` handle for posting events and ending the loop.
///
/// Requests made through a handle (layout, focus, animation) travel through
/// the event queue as [`ControlRequest`]s. The dispatch thread applies them
/// right after the event being handled, or in the next cycle when they come
/// from another thread.
#[derive(Clone)]
pub struct SystemHandle {
    shared: Arc<Shared>,
    poster: EventPoster,
}

impl SystemHandle {
    /// Create a handle posting through `poster`.
    pub fn new(poster: EventPoster) -> Self {
        Self {
            shared: Arc::new(Shared {
                exit_requested: AtomicBool::new(false),
                exit_code: AtomicI32::new(0),
                exit_signal: Signal::new(),
            }),
            poster,
        }
    }

    /// Post an event for the next dispatch cycle.
    pub fn post(&self, event: Event) {
        self.poster.post(event);
    }

    /// Ask the loop to end with `code` and emit the exit signal.
    ///
    /// The loop notices the request between cycles. Repeated calls overwrite
    /// the code.
    pub fn exit(&self, code: i32) {
        self.shared.exit_code.store(code, Ordering::SeqCst);
        self.shared.exit_requested.store(true, Ordering::SeqCst);
        tracing::info!(target: "trellis_core::event_loop", code, "exit requested");
        self.shared.exit_signal.emit(code);
        self.poster.wake();
    }

    /// Shorthand for `exit(0)`.
    pub fn quit(&self) {
        self.exit(0);
    }

    /// Whether exit has been requested.
    pub fn exit_requested(&self) -> bool {
        self.shared.exit_requested.load(Ordering::SeqCst)
    }

    /// The most recently requested exit code.
    pub fn exit_code(&self) -> i32 {
        self.shared.exit_code.load(Ordering::SeqCst)
    }

    /// Emitted with the exit code whenever exit is requested.
    pub fn exit_signal(&self) -> &Signal<i32> {
        &self.shared.exit_signal
    }

    /// Recompute the layout of container `id`.
    pub fn request_layout(&self, id: WidgetId) {
        self.poster.post(Event::control(id, ControlRequest::Layout));
    }

    /// Move focus to `id`.
    pub fn request_focus(&self, id: WidgetId) {
        self.poster.post(Event::control(id, ControlRequest::Focus));
    }

    /// Deliver Timer events to `id` roughly every `period`.
    pub fn start_animation(&self, id: WidgetId, period: Duration) {
        self.poster
            .post(Event::control(id, ControlRequest::StartAnimation { period }));
    }

    /// Stop Timer events for `id`.
    pub fn stop_animation(&self, id: WidgetId) {
        self.poster.post(Event::control(id, ControlRequest::StopAnimation));
    }

    pub(crate) fn reset_exit(&self) {
        self.shared.exit_requested.store(false, Ordering::SeqCst);
        self.shared.exit_code.store(0, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for SystemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemHandle")
            .field("exit_requested", &self.exit_requested())
            .field("exit_code", &self.exit_code())
            .finish()
    }
}

static_assertions::assert_impl_all!(SystemHandle: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use trellis_core::{EventEngine, EventKind, ObjectTree};

    #[test]
    fn test_exit_sets_flag_code_and_signal() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let seen = Arc::new(AtomicI32::new(i32::MIN));

        let seen_clone = Arc::clone(&seen);
        handle
            .exit_signal()
            .connect(move |&code| seen_clone.store(code, Ordering::SeqCst));

        assert!(!handle.exit_requested());
        handle.exit(7);
        assert!(handle.exit_requested());
        assert_eq!(handle.exit_code(), 7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_quit_is_exit_zero() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = Arc::clone(&calls);
        handle.exit_signal().connect(move |&code| {
            assert_eq!(code, 0);
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        handle.quit();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.exit_code(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let clone = handle.clone();

        std::thread::spawn(move || clone.exit(3)).join().unwrap();
        assert!(handle.exit_requested());
        assert_eq!(handle.exit_code(), 3);
    }

    #[test]
    fn test_requests_travel_through_the_queue() {
        let mut tree = ObjectTree::new();
        let id = tree.insert(());
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());

        handle.request_layout(id);
        handle.request_focus(id);
        let queued: Vec<EventKind> = engine.drain().iter().map(|event| event.kind().clone()).collect();
        assert_eq!(
            queued,
            vec![
                EventKind::Control(ControlRequest::Layout),
                EventKind::Control(ControlRequest::Focus)
            ]
        );
        assert!(engine.drain_control().is_empty());
    }

    #[test]
    fn test_post_reaches_queue() {
        let mut tree = ObjectTree::new();
        let id = tree.insert(());
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());

        handle.post(Event::paint(id));
        assert_eq!(engine.drain().len(), 1);
    }
}
