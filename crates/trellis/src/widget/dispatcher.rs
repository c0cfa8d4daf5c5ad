//! Event delivery to widget behaviours.
//!
//! Events name their target by [`WidgetId`], which may be stale by the time
//! the event is dispatched. Both entry points resolve the id first and
//! report [`DispatchResult::WidgetNotFound`] for dead targets instead of
//! failing.
//!
//! The behaviour is taken out of its node while it runs and put back
//! afterwards. Handlers therefore never alias the tree; everything they want
//! to change goes through the [`EventContext`] and is applied by the
//! dispatch loop afterwards.

use trellis_core::{Event, EventKind, ObjectTree, WidgetId};

use super::context::EventContext;
use super::focus::is_effectively_enabled;
use super::node::WidgetNode;
use crate::handle::SystemHandle;

/// Outcome of delivering one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A behaviour handled the event.
    Accepted,
    /// The event reached a widget but nobody handled it.
    Ignored,
    /// The target is disabled, so the event was dropped.
    Disabled,
    /// The target no longer exists.
    WidgetNotFound,
}

impl DispatchResult {
    /// Whether a behaviour handled the event.
    pub fn was_handled(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Stateless event router over an `ObjectTree<WidgetNode>`.
pub struct EventDispatcher;

impl EventDispatcher {
    /// Deliver a queued event.
    ///
    /// Dead targets are dropped, and so are targets that are disabled or sit
    /// under a disabled ancestor. Unhandled input bubbles to the parent, one
    /// level at a time, until a behaviour handles it or the root is passed.
    /// Control requests are for the dispatch loop and never reach a
    /// behaviour.
    #[tracing::instrument(skip_all, target = "trellis::dispatch", level = "trace", fields(kind = event.kind().name()))]
    pub fn send_event(tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, event: &Event) -> DispatchResult {
        let mut target = event.target();
        if !tree.contains(target) {
            tracing::trace!(target: "trellis::dispatch", ?target, "dropping event for dead widget");
            return DispatchResult::WidgetNotFound;
        }
        if !is_effectively_enabled(tree, target) {
            tracing::trace!(target: "trellis::dispatch", ?target, "dropping event for disabled subtree");
            return DispatchResult::Disabled;
        }
        if event.is_control() {
            return DispatchResult::Ignored;
        }

        loop {
            let result = Self::deliver(tree, handle, target, event);
            if result.was_handled() || !matches!(event.kind(), EventKind::Input(_)) {
                return result;
            }
            match tree.parent(target) {
                Ok(Some(parent)) if is_effectively_enabled(tree, parent) => target = parent,
                _ => return result,
            }
        }
    }

    /// Deliver an event to `target` without the enabled check and without
    /// bubbling.
    ///
    /// Used for focus notifications, which must reach a widget even while it
    /// is being disabled.
    pub fn send_event_direct(
        tree: &mut ObjectTree<WidgetNode>,
        handle: &SystemHandle,
        target: WidgetId,
        event: &Event,
    ) -> DispatchResult {
        if !tree.contains(target) {
            return DispatchResult::WidgetNotFound;
        }
        Self::deliver(tree, handle, target, event)
    }

    fn deliver(tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, target: WidgetId, event: &Event) -> DispatchResult {
        let Some(node) = tree.get_mut(target) else {
            return DispatchResult::WidgetNotFound;
        };
        let geometry = node.geometry();
        let focused = node.is_focused();
        let Some(mut behavior) = node.take_behavior() else {
            return DispatchResult::Ignored;
        };

        let mut cx = EventContext::new(target, geometry, focused, handle);
        let handled = behavior.event(&mut cx, event);

        if let Some(node) = tree.get_mut(target) {
            node.restore_behavior(behavior);
        }

        if handled {
            DispatchResult::Accepted
        } else {
            DispatchResult::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use trellis_core::{ControlRequest, EventEngine, InputEvent, KeyCode, KeyInput};

    use super::*;
    use crate::widget::WidgetBehavior;

    /// Records event names and handles only what it is told to.
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        label: &'static str,
        handles_input: bool,
    }

    impl WidgetBehavior for Recorder {
        fn event(&mut self, _cx: &mut EventContext<'_>, event: &Event) -> bool {
            self.log.lock().push(format!("{}:{}", self.label, event.kind().name()));
            matches!(event.kind(), EventKind::Input(_)) && self.handles_input
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str, handles_input: bool) -> Recorder {
        Recorder {
            log: Arc::clone(log),
            label,
            handles_input,
        }
    }

    fn key() -> InputEvent {
        InputEvent::Key(KeyInput::new(KeyCode::Char('x')))
    }

    #[test]
    fn test_dead_target_is_not_found() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let mut tree = ObjectTree::new();
        let id = tree.insert(WidgetNode::new("gone"));
        tree.remove(id).unwrap();

        let result = EventDispatcher::send_event(&mut tree, &handle, &Event::paint(id));
        assert_eq!(result, DispatchResult::WidgetNotFound);
    }

    #[test]
    fn test_disabled_target_is_dropped() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();
        let id = tree.insert(
            WidgetNode::new("off")
                .with_enabled(false)
                .with_behavior(recorder(&log, "off", true)),
        );

        let result = EventDispatcher::send_event(&mut tree, &handle, &Event::paint(id));
        assert_eq!(result, DispatchResult::Disabled);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_child_of_disabled_container_is_dropped() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();
        let root = tree.insert(WidgetNode::new("root").with_enabled(false));
        let child = tree
            .insert_child(root, WidgetNode::new("child").with_behavior(recorder(&log, "child", true)))
            .unwrap();

        for event in [Event::custom(child, 1), Event::timer(child, 1), Event::input(child, key())] {
            assert_eq!(EventDispatcher::send_event(&mut tree, &handle, &event), DispatchResult::Disabled);
        }
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_control_requests_skip_behaviors() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();
        let id = tree.insert(WidgetNode::new("w").with_behavior(recorder(&log, "w", true)));

        let event = Event::control(id, ControlRequest::Layout);
        assert_eq!(EventDispatcher::send_event(&mut tree, &handle, &event), DispatchResult::Ignored);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_direct_delivery_ignores_enabled_flag() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();
        let id = tree.insert(
            WidgetNode::new("off")
                .with_enabled(false)
                .with_behavior(recorder(&log, "off", false)),
        );

        EventDispatcher::send_event_direct(&mut tree, &handle, id, &Event::paint(id));
        assert_eq!(*log.lock(), vec!["off:paint".to_string()]);
        assert!(tree.get(id).unwrap().has_behavior());
    }

    #[test]
    fn test_unhandled_input_bubbles_to_parent() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();
        let root = tree.insert(WidgetNode::new("root").with_behavior(recorder(&log, "root", true)));
        let child = tree
            .insert_child(root, WidgetNode::new("child").with_behavior(recorder(&log, "child", false)))
            .unwrap();

        let result = EventDispatcher::send_event(&mut tree, &handle, &Event::input(child, key()));
        assert_eq!(result, DispatchResult::Accepted);
        assert_eq!(*log.lock(), vec!["child:input".to_string(), "root:input".to_string()]);
    }

    #[test]
    fn test_non_input_events_do_not_bubble() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();
        let root = tree.insert(WidgetNode::new("root").with_behavior(recorder(&log, "root", true)));
        let child = tree
            .insert_child(root, WidgetNode::new("child").with_behavior(recorder(&log, "child", false)))
            .unwrap();

        let result = EventDispatcher::send_event(&mut tree, &handle, &Event::custom(child, 9));
        assert_eq!(result, DispatchResult::Ignored);
        assert_eq!(*log.lock(), vec!["child:custom".to_string()]);
    }

    #[test]
    fn test_widget_without_behavior_ignores() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let mut tree = ObjectTree::new();
        let id = tree.insert(WidgetNode::new("plain"));

        let result = EventDispatcher::send_event(&mut tree, &handle, &Event::paint(id));
        assert_eq!(result, DispatchResult::Ignored);
    }
}
