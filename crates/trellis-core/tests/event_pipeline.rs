//! Integration tests for the producer/consumer event pipeline.
//!
//! These exercise the queue the way the dispatch loop does: an animation
//! ticker and other producer threads append while a single consumer drains.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use trellis_core::{AnimationEngine, Event, EventEngine, EventKind, ObjectTree};

/// Route logs to the test harness; filter with `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_consumer_sees_every_event_in_producer_order() {
    let mut tree = ObjectTree::new();
    let widget = tree.insert(());
    let engine = EventEngine::new();
    let poster = engine.poster();

    let producer = thread::spawn(move || {
        for tick in 0..500u64 {
            poster.post(Event::timer(widget, tick));
        }
    });

    let mut seen = Vec::new();
    while seen.len() < 500 {
        engine.queue().wait_for_activity(Duration::from_millis(50));
        for event in engine.drain() {
            if let EventKind::Timer { tick } = event.kind() {
                seen.push(*tick);
            }
        }
    }
    producer.join().unwrap();

    let expected: Vec<u64> = (0..500).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_drain_while_ticker_appends() {
    init_tracing();
    let mut tree = ObjectTree::new();
    let fast = tree.insert("fast");
    let slow = tree.insert("slow");

    let engine = EventEngine::new();
    let mut animation = AnimationEngine::new(engine.poster(), Duration::from_millis(1));
    animation.register(fast, Duration::from_millis(1));
    animation.register(slow, Duration::from_millis(4));
    animation.start().unwrap();

    let mut fast_ticks = 0usize;
    let mut slow_ticks = 0usize;
    for _ in 0..40 {
        engine.queue().wait_for_activity(Duration::from_millis(10));
        for event in engine.drain() {
            if event.target() == fast {
                fast_ticks += 1;
            } else if event.target() == slow {
                slow_ticks += 1;
            }
        }
    }
    animation.stop();

    assert!(fast_ticks > 0);
    assert!(fast_ticks >= slow_ticks);
}

#[test]
fn test_events_for_removed_widgets_are_detectable() {
    let mut tree = ObjectTree::new();
    let root = tree.insert("root");
    let child = tree.insert_child(root, "child").unwrap();

    let engine = EventEngine::new();
    engine.post(Event::paint(child));
    tree.remove(child).unwrap();

    let live: Vec<_> = engine
        .drain()
        .into_iter()
        .filter(|event| tree.contains(event.target()))
        .collect();
    assert!(live.is_empty());
}

#[test]
fn test_stop_flag_is_cooperative() {
    let engine = Arc::new(EventEngine::new());
    let stop = Arc::new(AtomicBool::new(false));

    let consumer = {
        let engine = Arc::clone(&engine);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut cycles = 0u32;
            while !stop.load(Ordering::SeqCst) {
                engine.queue().wait_for_activity(Duration::from_millis(5));
                engine.drain();
                cycles += 1;
            }
            cycles
        })
    };

    thread::sleep(Duration::from_millis(30));
    stop.store(true, Ordering::SeqCst);
    assert!(consumer.join().unwrap() > 0);
}
