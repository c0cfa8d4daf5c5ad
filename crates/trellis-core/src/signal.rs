//! Synchronous notifications.
//!
//! A [`Signal`] fans a value out to every connected closure on the emitting
//! thread. The dispatch loop uses one to announce the exit code when the
//! loop ends.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use trellis_core::Signal;
//!
//! let exited = Signal::<i32>::new();
//! let last = Arc::new(AtomicI32::new(-1));
//!
//! let sink = Arc::clone(&last);
//! let id = exited.connect(move |&code| sink.store(code, Ordering::SeqCst));
//!
//! exited.emit(3);
//! assert_eq!(last.load(Ordering::SeqCst), 3);
//! assert!(exited.disconnect(id));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle for one connected closure.
    pub struct ConnectionId;
}

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A broadcast point for values of type `T`.
///
/// Listeners may connect or disconnect on the same signal while it is being
/// emitted; the change takes effect at the next emission.
pub struct Signal<T> {
    listeners: Mutex<SlotMap<ConnectionId, Listener<T>>>,
    muted: AtomicBool,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(SlotMap::with_key()),
            muted: AtomicBool::new(false),
        }
    }

    pub fn connect(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> ConnectionId {
        self.listeners.lock().insert(Arc::new(listener))
    }

    /// Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.listeners.lock().remove(id).is_some()
    }

    pub fn disconnect_all(&self) {
        self.listeners.lock().clear();
    }

    pub fn connection_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// While muted, [`emit`](Self::emit) reaches no one.
    pub fn set_blocked(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Call every listener with `value`.
    #[tracing::instrument(skip_all, target = "trellis_core::signal", level = "trace")]
    pub fn emit(&self, value: T) {
        if self.is_blocked() {
            tracing::trace!(target: "trellis_core::signal", "emit suppressed");
            return;
        }
        // Snapshot first: listeners run unlocked.
        let listeners: Vec<Listener<T>> = self.listeners.lock().values().cloned().collect();
        tracing::trace!(target: "trellis_core::signal", listeners = listeners.len(), "emit");
        for listener in &listeners {
            listener(&value);
        }
    }

    /// Connect a listener that lives as long as the returned guard.
    pub fn connect_scoped(
        self: &Arc<Self>,
        listener: impl Fn(&T) + Send + Sync + 'static,
    ) -> ConnectionGuard<T> {
        ConnectionGuard {
            id: self.connect(listener),
            signal: Arc::downgrade(self),
        }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.lock().len())
            .field("muted", &self.muted.load(Ordering::SeqCst))
            .finish()
    }
}

/// Disconnects its listener on drop. Does not keep the signal alive.
#[must_use = "the listener is disconnected as soon as the guard drops"]
pub struct ConnectionGuard<T: 'static> {
    signal: Weak<Signal<T>>,
    id: ConnectionId,
}

impl<T: 'static> ConnectionGuard<T> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<T: 'static> Drop for ConnectionGuard<T> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    fn recorder(signal: &Signal<i32>) -> (ConnectionId, Arc<Mutex<Vec<i32>>>) {
        let codes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&codes);
        let id = signal.connect(move |&code| sink.lock().push(code));
        (id, codes)
    }

    #[test]
    fn test_emit_reaches_listener_each_time() {
        let signal = Signal::new();
        let (_, codes) = recorder(&signal);
        signal.emit(0);
        signal.emit(7);
        assert_eq!(*codes.lock(), [0, 7]);
    }

    #[test]
    fn test_disconnected_listener_is_silent() {
        let signal = Signal::new();
        let (id, codes) = recorder(&signal);
        signal.emit(1);
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(2);
        assert_eq!(*codes.lock(), [1]);
    }

    #[test]
    fn test_muted_signal_drops_values() {
        let signal = Signal::new();
        let (_, codes) = recorder(&signal);
        signal.set_blocked(true);
        signal.emit(1);
        signal.set_blocked(false);
        signal.emit(2);
        assert_eq!(*codes.lock(), [2]);
    }

    #[test]
    fn test_every_listener_runs_until_disconnect_all() {
        let signal = Signal::new();
        let (_, first) = recorder(&signal);
        let (_, second) = recorder(&signal);
        signal.emit(4);
        signal.disconnect_all();
        signal.emit(5);
        assert_eq!(signal.connection_count(), 0);
        assert_eq!((first.lock().clone(), second.lock().clone()), (vec![4], vec![4]));
    }

    #[test]
    fn test_scoped_connection() {
        let signal = Arc::new(Signal::<i32>::new());
        let last = Arc::new(AtomicI32::new(0));
        {
            let sink = Arc::clone(&last);
            let _guard = signal.connect_scoped(move |&code| sink.store(code, Ordering::SeqCst));
            signal.emit(1);
        }
        signal.emit(2);
        assert_eq!(last.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 0);

        let orphan = signal.connect_scoped(|_| {});
        drop(signal);
        drop(orphan);
    }

    #[test]
    fn test_listener_can_disconnect_itself_mid_emit() {
        let signal = Arc::new(Signal::<i32>::new());
        let own_id = Arc::new(Mutex::new(None));

        let (weak, slot) = (Arc::downgrade(&signal), Arc::clone(&own_id));
        let id = signal.connect(move |_| {
            if let (Some(signal), Some(id)) = (weak.upgrade(), *slot.lock()) {
                signal.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(0);
        assert_eq!(signal.connection_count(), 0);
    }
}
