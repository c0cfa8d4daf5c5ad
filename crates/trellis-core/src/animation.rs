//! Background animation ticker.
//!
//! The [`AnimationEngine`] owns one background thread that wakes on a fixed
//! base interval and posts [`EventKind::Timer`](crate::EventKind::Timer)
//! events for every registered widget whose period has elapsed. The ticker
//! never touches widget state: its only output is events appended to the
//! queue, which the dispatch loop handles like any other event.
//!
//! Registrations are owned by the engine and mirrored to the running thread
//! over a command channel, so widgets may be registered before or after the
//! ticker starts.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use trellis_core::{AnimationEngine, EventEngine, ObjectTree};
//!
//! let mut tree = ObjectTree::new();
//! let spinner = tree.insert(());
//!
//! let events = EventEngine::new();
//! let mut animation = AnimationEngine::new(events.poster(), Duration::from_millis(16));
//! animation.register(spinner, Duration::from_millis(100));
//! animation.start().unwrap();
//!
//! std::thread::sleep(Duration::from_millis(250));
//! animation.stop();
//! assert!(!events.drain().is_empty());
//! ```

use std::collections::HashMap;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::AnimationError;
use crate::event::Event;
use crate::event_queue::EventPoster;
use crate::object::WidgetId;

/// Commands sent to the ticker thread.
enum Command {
    Register { id: WidgetId, every: u64 },
    Unregister(WidgetId),
    Shutdown,
}

struct Ticker {
    commands: Sender<Command>,
    handle: JoinHandle<()>,
}

/// Periodic Timer event producer.
pub struct AnimationEngine {
    interval: Duration,
    poster: EventPoster,
    /// Widget -> number of base ticks between Timer events.
    registrations: HashMap<WidgetId, u64>,
    ticker: Option<Ticker>,
}

impl AnimationEngine {
    /// Create a stopped engine that ticks every `interval` once started.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(poster: EventPoster, interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            poster,
            registrations: HashMap::new(),
            ticker: None,
        }
    }

    /// The base tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register `id` to receive a Timer event roughly every `period`.
    ///
    /// Periods are rounded to a whole number of base ticks, at least one.
    /// Registering an already registered widget replaces its period.
    pub fn register(&mut self, id: WidgetId, period: Duration) {
        let every = ticks_for(period, self.interval);
        self.registrations.insert(id, every);
        tracing::debug!(target: "trellis_core::animation", ?id, every, "animation registered");
        self.send(Command::Register { id, every });
    }

    /// Stop delivering Timer events to `id`.
    ///
    /// Returns `true` if the widget was registered.
    pub fn unregister(&mut self, id: WidgetId) -> bool {
        let existed = self.registrations.remove(&id).is_some();
        if existed {
            tracing::debug!(target: "trellis_core::animation", ?id, "animation unregistered");
            self.send(Command::Unregister(id));
        }
        existed
    }

    /// Whether `id` is registered.
    pub fn is_registered(&self, id: WidgetId) -> bool {
        self.registrations.contains_key(&id)
    }

    /// Number of registered widgets.
    pub fn registered_count(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the ticker thread is running.
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Spawn the ticker thread.
    pub fn start(&mut self) -> Result<(), AnimationError> {
        if self.ticker.is_some() {
            return Err(AnimationError::AlreadyRunning);
        }

        let (commands, receiver) = unbounded();
        let poster = self.poster.clone();
        let interval = self.interval;
        let schedule: Vec<(WidgetId, u64)> = self
            .registrations
            .iter()
            .map(|(&id, &every)| (id, every))
            .collect();

        let handle = thread::Builder::new()
            .name("trellis-animation".into())
            .spawn(move || ticker_loop(receiver, poster, interval, schedule))
            .map_err(AnimationError::Spawn)?;

        tracing::debug!(target: "trellis_core::animation", ?interval, "animation ticker started");
        self.ticker = Some(Ticker { commands, handle });
        Ok(())
    }

    /// Stop the ticker thread and wait for it to exit.
    ///
    /// Registrations are kept, so a later `start` resumes them.
    pub fn stop(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };
        let _ = ticker.commands.send(Command::Shutdown);
        if ticker.handle.join().is_err() {
            tracing::warn!(target: "trellis_core::animation", "animation ticker panicked");
        }
        tracing::debug!(target: "trellis_core::animation", "animation ticker stopped");
    }

    fn send(&self, command: Command) {
        if let Some(ticker) = &self.ticker {
            let _ = ticker.commands.send(command);
        }
    }
}

impl Drop for AnimationEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AnimationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationEngine")
            .field("interval", &self.interval)
            .field("registered", &self.registrations.len())
            .field("running", &self.ticker.is_some())
            .finish()
    }
}

fn ticks_for(period: Duration, interval: Duration) -> u64 {
    let interval_nanos = interval.as_nanos().max(1);
    let ticks = (period.as_nanos() + interval_nanos / 2) / interval_nanos;
    u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
}

fn ticker_loop(
    receiver: Receiver<Command>,
    poster: EventPoster,
    interval: Duration,
    mut schedule: Vec<(WidgetId, u64)>,
) {
    let mut tick: u64 = 0;
    let mut deadline = Instant::now() + interval;

    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(timeout) {
            Ok(Command::Register { id, every }) => {
                match schedule.iter_mut().find(|(existing, _)| *existing == id) {
                    Some(entry) => entry.1 = every,
                    None => schedule.push((id, every)),
                }
            }
            Ok(Command::Unregister(id)) => schedule.retain(|(existing, _)| *existing != id),
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // Due ticks fire even while commands keep arriving.
        let now = Instant::now();
        if now < deadline {
            continue;
        }
        tick += 1;
        for &(id, every) in &schedule {
            if tick % every == 0 {
                poster.post(Event::timer(id, tick));
            }
        }
        deadline += interval;
        // Missed ticks are dropped, not replayed.
        if deadline < now {
            deadline = now + interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::event_queue::EventEngine;
    use crate::object::ObjectTree;

    #[test]
    fn test_ticks_for_rounds_to_whole_ticks() {
        let base = Duration::from_millis(10);
        assert_eq!(ticks_for(Duration::from_millis(0), base), 1);
        assert_eq!(ticks_for(Duration::from_millis(10), base), 1);
        assert_eq!(ticks_for(Duration::from_millis(24), base), 2);
        assert_eq!(ticks_for(Duration::from_millis(26), base), 3);
    }

    #[test]
    fn test_registration_bookkeeping() {
        let mut tree = ObjectTree::new();
        let id = tree.insert(());
        let events = EventEngine::new();
        let mut engine = AnimationEngine::new(events.poster(), Duration::from_millis(5));

        engine.register(id, Duration::from_millis(5));
        assert!(engine.is_registered(id));
        assert_eq!(engine.registered_count(), 1);
        assert!(engine.unregister(id));
        assert!(!engine.unregister(id));
    }

    #[test]
    fn test_ticker_posts_timer_events() {
        let mut tree = ObjectTree::new();
        let id = tree.insert(());
        let events = EventEngine::new();
        let mut engine = AnimationEngine::new(events.poster(), Duration::from_millis(2));
        engine.register(id, Duration::from_millis(2));

        engine.start().unwrap();
        assert!(events.queue().wait_for_activity(Duration::from_secs(5)));
        engine.stop();

        let batch = events.drain();
        assert!(!batch.is_empty());
        assert!(batch.iter().all(|event| event.target() == id));
        assert!(matches!(batch[0].kind(), EventKind::Timer { .. }));
    }

    #[test]
    fn test_ticks_fire_while_commands_keep_arriving() {
        let mut tree = ObjectTree::new();
        let (animated, other) = (tree.insert(()), tree.insert(()));
        let events = EventEngine::new();

        // Every receive finds a command waiting; none times out.
        let (commands, receiver) = unbounded();
        for _ in 0..1000 {
            commands.send(Command::Unregister(other)).unwrap();
        }
        commands.send(Command::Shutdown).unwrap();
        ticker_loop(receiver, events.poster(), Duration::from_nanos(1), vec![(animated, 1)]);

        let batch = events.drain();
        assert!(!batch.is_empty());
        assert!(batch.iter().all(|event| event.target() == animated));
    }

    #[test]
    fn test_start_twice_fails() {
        let events = EventEngine::new();
        let mut engine = AnimationEngine::new(events.poster(), Duration::from_millis(50));
        engine.start().unwrap();
        assert!(matches!(engine.start(), Err(AnimationError::AlreadyRunning)));
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_unregistered_widget_stops_ticking() {
        let mut tree = ObjectTree::new();
        let id = tree.insert(());
        let events = EventEngine::new();
        let mut engine = AnimationEngine::new(events.poster(), Duration::from_millis(2));
        engine.start().unwrap();

        engine.register(id, Duration::from_millis(2));
        assert!(events.queue().wait_for_activity(Duration::from_secs(5)));
        engine.unregister(id);
        // Let any tick that raced the unregister command land first.
        std::thread::sleep(Duration::from_millis(20));
        events.drain();

        std::thread::sleep(Duration::from_millis(20));
        engine.stop();
        assert!(events.drain().is_empty());
    }
}
