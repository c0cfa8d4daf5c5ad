//! The event queue and the engine that owns it.
//!
//! [`EventQueue`] is the only structure in Trellis mutated from more than one
//! thread, and its mutex is the only lock on the dispatch path. Producers
//! (the animation ticker, input readers, widget code, system handles) append
//! from anywhere; the dispatch loop is the single consumer and takes the
//! whole buffer at once with [`EventQueue::drain`]. Events posted while a
//! drained batch is being dispatched land in the now-empty queue and are
//! handled in the next cycle, so queued events never dispatch re-entrantly.
//!
//! # Example
//!
//! ```
//! use trellis_core::{Event, EventEngine, ObjectTree};
//!
//! let mut tree = ObjectTree::new();
//! let widget = tree.insert(());
//!
//! let engine = EventEngine::new();
//! let poster = engine.poster();
//! std::thread::spawn(move || poster.post(Event::paint(widget)))
//!     .join()
//!     .unwrap();
//!
//! let batch = engine.drain();
//! assert_eq!(batch.len(), 1);
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::event::Event;

/// A thread-safe FIFO buffer of pending events.
///
/// Appends never fail and never block beyond acquiring the lock; the queue
/// is unbounded.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<Vec<Event>>,
    activity: Condvar,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and wake a waiting consumer.
    pub fn append(&self, event: Event) {
        let mut events = self.events.lock();
        tracing::trace!(
            target: "trellis_core::event_queue",
            target_widget = ?event.target(),
            kind = event.kind().name(),
            pending = events.len() + 1,
            "event appended"
        );
        events.push(event);
        drop(events);
        self.activity.notify_one();
    }

    /// Atomically take every pending event, leaving the queue empty.
    ///
    /// The returned events are in the order they were appended.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Atomically remove the pending events matching `pred`.
    ///
    /// Both the removed and the remaining events keep their relative order.
    pub fn take_matching(&self, pred: impl FnMut(&Event) -> bool) -> Vec<Event> {
        let mut events = self.events.lock();
        let (taken, kept): (Vec<Event>, Vec<Event>) = std::mem::take(&mut *events).into_iter().partition(pred);
        *events = kept;
        taken
    }

    /// Block until the queue is non-empty or `timeout` elapses.
    ///
    /// Returns `true` if events are pending.
    pub fn wait_for_activity(&self, timeout: Duration) -> bool {
        let mut events = self.events.lock();
        if events.is_empty() {
            let _ = self.activity.wait_for(&mut events, timeout);
        }
        !events.is_empty()
    }

    /// Wake a consumer blocked in [`wait_for_activity`](Self::wait_for_activity)
    /// without appending anything.
    pub fn wake(&self) {
        self.activity.notify_all();
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

/// A cloneable, `Send` handle for posting events from any thread.
#[derive(Debug, Clone)]
pub struct EventPoster {
    queue: Arc<EventQueue>,
}

impl EventPoster {
    /// Append an event to the queue.
    #[inline]
    pub fn post(&self, event: Event) {
        self.queue.append(event);
    }

    /// Wake the consumer without posting an event.
    #[inline]
    pub fn wake(&self) {
        self.queue.wake();
    }
}

/// Owns the event queue and exposes the post/drain pair used by the
/// dispatch loop.
#[derive(Debug, Default)]
pub struct EventEngine {
    queue: Arc<EventQueue>,
}

impl EventEngine {
    /// Create an engine with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    #[inline]
    pub fn post(&self, event: Event) {
        self.queue.append(event);
    }

    /// Take the current batch of events for dispatch.
    pub fn drain(&self) -> Vec<Event> {
        let batch = self.queue.drain();
        if !batch.is_empty() {
            tracing::trace!(target: "trellis_core::event_loop", count = batch.len(), "drained event batch");
        }
        batch
    }

    /// Take pending [`ControlRequest`](crate::ControlRequest)s ahead of the
    /// rest of the queue, leaving other events in place.
    pub fn drain_control(&self) -> Vec<Event> {
        self.queue.take_matching(Event::is_control)
    }

    /// A handle other threads can post through.
    pub fn poster(&self) -> EventPoster {
        EventPoster {
            queue: Arc::clone(&self.queue),
        }
    }

    /// The underlying queue.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }
}

static_assertions::assert_impl_all!(EventQueue: Send, Sync);
static_assertions::assert_impl_all!(EventPoster: Send, Sync, Clone);
