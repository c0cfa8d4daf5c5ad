//! Keyboard focus for a widget tree.
//!
//! [`FocusManager`] tracks the single focused widget. Moving focus always
//! delivers FocusOut to the widget losing it before FocusIn reaches the
//! widget gaining it, and both are delivered synchronously, bypassing the
//! queue.
//!
//! # Tab Order
//!
//! Tab order is a depth-first pre-order walk from the head. Disabled widgets
//! are skipped together with their subtrees; of the rest, only widgets
//! marked focusable take part. Navigation wraps at both ends.
//!
//! Focusability only governs tab order. Programmatic focus through
//! [`FocusManager::set_focus_to`] needs a live widget whose whole ancestor
//! chain is enabled.

use trellis_core::{Event, EventKind, FocusReason, ObjectTree, WidgetId};

use super::dispatcher::EventDispatcher;
use super::node::WidgetNode;
use crate::handle::SystemHandle;

/// Tracks and moves keyboard focus.
#[derive(Debug, Default)]
pub struct FocusManager {
    /// The currently focused widget, if any.
    focused_widget: Option<WidgetId>,
}

impl FocusManager {
    /// Create a manager with nothing focused.
    pub fn new() -> Self {
        Self { focused_widget: None }
    }

    /// The focused widget.
    #[inline]
    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.focused_widget
    }

    /// Whether `id` holds focus.
    #[inline]
    pub fn has_focus(&self, id: WidgetId) -> bool {
        self.focused_widget == Some(id)
    }

    /// Move focus to `id`.
    ///
    /// Returns `false`, leaving focus unchanged, if `id` is dead or it or
    /// one of its ancestors is disabled. Focusing the focused widget is a
    /// no-op that returns `true`.
    pub fn set_focus_to(
        &mut self,
        tree: &mut ObjectTree<WidgetNode>,
        handle: &SystemHandle,
        id: WidgetId,
        reason: FocusReason,
    ) -> bool {
        if !is_effectively_enabled(tree, id) {
            tracing::debug!(target: "trellis::focus", ?id, "refusing focus for dead or disabled widget");
            return false;
        }
        if self.focused_widget == Some(id) {
            return true;
        }

        if let Some(old) = self.focused_widget.take() {
            self.unfocus_widget(tree, handle, old, reason);
        }
        self.focus_widget(tree, handle, id, reason);
        self.focused_widget = Some(id);
        tracing::debug!(target: "trellis::focus", ?id, ?reason, "focus changed");
        true
    }

    /// Remove focus, sending FocusOut to the widget that held it.
    pub fn clear_focus(&mut self, tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, reason: FocusReason) {
        if let Some(old) = self.focused_widget.take() {
            self.unfocus_widget(tree, handle, old, reason);
            tracing::debug!(target: "trellis::focus", ?old, ?reason, "focus cleared");
        }
    }

    /// Clear focus if it lies inside the subtree rooted at `id`.
    ///
    /// Called when `id` is disabled or about to be removed. Returns `true`
    /// if focus was cleared.
    pub fn on_disabled(
        &mut self,
        tree: &mut ObjectTree<WidgetNode>,
        handle: &SystemHandle,
        id: WidgetId,
        reason: FocusReason,
    ) -> bool {
        match self.focused_widget {
            Some(focused) if focused == id || tree.is_ancestor_of(id, focused) => {
                self.clear_focus(tree, handle, reason);
                true
            }
            _ => false,
        }
    }

    /// Move focus to the next widget in tab order under `root`.
    ///
    /// With nothing focused, the first widget in tab order gets focus.
    /// Returns `false` when there is no candidate.
    pub fn focus_next(&mut self, tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, root: WidgetId) -> bool {
        let order = build_tab_order(tree, root);
        let Some(&first) = order.first() else {
            return false;
        };
        let next = self
            .focused_widget
            .and_then(|current| order.iter().position(|&id| id == current))
            .map_or(first, |pos| order[(pos + 1) % order.len()]);
        self.set_focus_to(tree, handle, next, FocusReason::Tab)
    }

    /// Move focus to the previous widget in tab order under `root`.
    ///
    /// With nothing focused, the last widget in tab order gets focus.
    pub fn focus_previous(&mut self, tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, root: WidgetId) -> bool {
        let order = build_tab_order(tree, root);
        let Some(&last) = order.last() else {
            return false;
        };
        let previous = self
            .focused_widget
            .and_then(|current| order.iter().position(|&id| id == current))
            .map_or(last, |pos| order[(pos + order.len() - 1) % order.len()]);
        self.set_focus_to(tree, handle, previous, FocusReason::Backtab)
    }

    /// Widgets under `root` in tab order.
    pub fn tab_order(&self, tree: &ObjectTree<WidgetNode>, root: WidgetId) -> Vec<WidgetId> {
        build_tab_order(tree, root)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn unfocus_widget(&self, tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, id: WidgetId, reason: FocusReason) {
        let Some(node) = tree.get_mut(id) else {
            return;
        };
        node.set_focused(false);
        for ancestor in tree.ancestors(id).unwrap_or_default() {
            if let Some(node) = tree.get_mut(ancestor) {
                if node.focused_descendant() == Some(id) {
                    node.set_focused_descendant(None);
                }
            }
        }
        let event = Event::new(id, EventKind::FocusOut { reason });
        EventDispatcher::send_event_direct(tree, handle, id, &event);
    }

    fn focus_widget(&self, tree: &mut ObjectTree<WidgetNode>, handle: &SystemHandle, id: WidgetId, reason: FocusReason) {
        let Some(node) = tree.get_mut(id) else {
            return;
        };
        node.set_focused(true);
        for ancestor in tree.ancestors(id).unwrap_or_default() {
            if let Some(node) = tree.get_mut(ancestor) {
                node.set_focused_descendant(Some(id));
            }
        }
        let event = Event::new(id, EventKind::FocusIn { reason });
        EventDispatcher::send_event_direct(tree, handle, id, &event);
    }
}

/// Whether `id` is alive and neither it nor any ancestor is disabled.
pub(crate) fn is_effectively_enabled(tree: &ObjectTree<WidgetNode>, id: WidgetId) -> bool {
    let Some(node) = tree.get(id) else {
        return false;
    };
    node.is_enabled()
        && tree
            .ancestors(id)
            .map(|ancestors| {
                ancestors
                    .iter()
                    .all(|&ancestor| tree.get(ancestor).is_some_and(WidgetNode::is_enabled))
            })
            .unwrap_or(false)
}

fn build_tab_order(tree: &ObjectTree<WidgetNode>, root: WidgetId) -> Vec<WidgetId> {
    let mut order = Vec::new();
    collect_tab_order(tree, root, &mut order);
    order
}

fn collect_tab_order(tree: &ObjectTree<WidgetNode>, id: WidgetId, order: &mut Vec<WidgetId>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    if !node.is_enabled() {
        return;
    }
    if node.is_focusable() {
        order.push(id);
    }
    if let Ok(children) = tree.children(id) {
        for &child in children {
            collect_tab_order(tree, child, order);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use trellis_core::EventEngine;

    use super::*;
    use crate::widget::{EventContext, WidgetBehavior};

    struct FocusLog {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl WidgetBehavior for FocusLog {
        fn event(&mut self, cx: &mut EventContext<'_>, event: &Event) -> bool {
            let entry = match event.kind() {
                EventKind::FocusIn { .. } => format!("in:{}:{}", self.name, cx.is_focused()),
                EventKind::FocusOut { .. } => format!("out:{}:{}", self.name, cx.is_focused()),
                _ => return false,
            };
            self.log.lock().push(entry);
            true
        }
    }

    struct Fixture {
        tree: ObjectTree<WidgetNode>,
        handle: SystemHandle,
        log: Arc<Mutex<Vec<String>>>,
        root: WidgetId,
        a: WidgetId,
        b: WidgetId,
        c: WidgetId,
        _engine: EventEngine,
    }

    /// root
    /// |-- a (focusable)
    /// `-- panel
    ///     |-- b (focusable)
    ///     `-- c (focusable)
    fn fixture() -> Fixture {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tree = ObjectTree::new();

        let node = |name: &'static str| {
            WidgetNode::new(name).with_focusable(true).with_behavior(FocusLog {
                name,
                log: Arc::clone(&log),
            })
        };
        let root = tree.insert(WidgetNode::new("root"));
        let a = tree.insert_child(root, node("a")).unwrap();
        let panel = tree.insert_child(root, WidgetNode::new("panel")).unwrap();
        let b = tree.insert_child(panel, node("b")).unwrap();
        let c = tree.insert_child(panel, node("c")).unwrap();

        Fixture {
            tree,
            handle,
            log,
            root,
            a,
            b,
            c,
            _engine: engine,
        }
    }

    #[test]
    fn test_focus_out_precedes_focus_in() {
        let mut f = fixture();
        let mut focus = FocusManager::new();

        assert!(focus.set_focus_to(&mut f.tree, &f.handle, f.a, FocusReason::Other));
        assert!(focus.set_focus_to(&mut f.tree, &f.handle, f.b, FocusReason::Other));

        assert_eq!(*f.log.lock(), vec!["in:a:true", "out:a:false", "in:b:true"]);
        assert!(!f.tree.get(f.a).unwrap().is_focused());
        assert!(f.tree.get(f.b).unwrap().is_focused());
    }

    #[test]
    fn test_refocus_is_noop() {
        let mut f = fixture();
        let mut focus = FocusManager::new();

        focus.set_focus_to(&mut f.tree, &f.handle, f.a, FocusReason::Other);
        assert!(focus.set_focus_to(&mut f.tree, &f.handle, f.a, FocusReason::Other));
        assert_eq!(f.log.lock().len(), 1);
    }

    #[test]
    fn test_dead_or_disabled_widget_refused() {
        let mut f = fixture();
        let mut focus = FocusManager::new();

        f.tree.get_mut(f.a).unwrap().set_enabled(false);
        assert!(!focus.set_focus_to(&mut f.tree, &f.handle, f.a, FocusReason::Other));

        f.tree.remove(f.c).unwrap();
        assert!(!focus.set_focus_to(&mut f.tree, &f.handle, f.c, FocusReason::Other));
        assert_eq!(focus.focused_widget(), None);
    }

    #[test]
    fn test_disabled_ancestor_refuses_focus() {
        let mut f = fixture();
        let mut focus = FocusManager::new();
        let panel = f.tree.parent(f.b).unwrap().unwrap();

        f.tree.get_mut(panel).unwrap().set_enabled(false);
        assert!(!focus.set_focus_to(&mut f.tree, &f.handle, f.b, FocusReason::Other));
    }

    #[test]
    fn test_focused_descendant_markers() {
        let mut f = fixture();
        let mut focus = FocusManager::new();
        let panel = f.tree.parent(f.b).unwrap().unwrap();

        focus.set_focus_to(&mut f.tree, &f.handle, f.b, FocusReason::Other);
        assert_eq!(f.tree.get(panel).unwrap().focused_descendant(), Some(f.b));
        assert_eq!(f.tree.get(f.root).unwrap().focused_descendant(), Some(f.b));

        focus.set_focus_to(&mut f.tree, &f.handle, f.a, FocusReason::Other);
        assert_eq!(f.tree.get(panel).unwrap().focused_descendant(), None);
        assert_eq!(f.tree.get(f.root).unwrap().focused_descendant(), Some(f.a));
    }

    #[test]
    fn test_on_disabled_clears_focus_in_subtree() {
        let mut f = fixture();
        let mut focus = FocusManager::new();
        let panel = f.tree.parent(f.b).unwrap().unwrap();

        focus.set_focus_to(&mut f.tree, &f.handle, f.c, FocusReason::Other);
        assert!(!focus.on_disabled(&mut f.tree, &f.handle, f.a, FocusReason::Disabled));
        assert!(focus.on_disabled(&mut f.tree, &f.handle, panel, FocusReason::Disabled));

        assert_eq!(focus.focused_widget(), None);
        assert_eq!(f.log.lock().last().map(String::as_str), Some("out:c:false"));
    }

    #[test]
    fn test_tab_order_skips_disabled_subtrees() {
        let mut f = fixture();
        let focus = FocusManager::new();
        let panel = f.tree.parent(f.b).unwrap().unwrap();

        assert_eq!(focus.tab_order(&f.tree, f.root), vec![f.a, f.b, f.c]);
        f.tree.get_mut(panel).unwrap().set_enabled(false);
        assert_eq!(focus.tab_order(&f.tree, f.root), vec![f.a]);
    }

    #[test]
    fn test_focus_next_wraps() {
        let mut f = fixture();
        let mut focus = FocusManager::new();

        assert!(focus.focus_next(&mut f.tree, &f.handle, f.root));
        assert_eq!(focus.focused_widget(), Some(f.a));
        focus.focus_next(&mut f.tree, &f.handle, f.root);
        focus.focus_next(&mut f.tree, &f.handle, f.root);
        assert_eq!(focus.focused_widget(), Some(f.c));
        focus.focus_next(&mut f.tree, &f.handle, f.root);
        assert_eq!(focus.focused_widget(), Some(f.a));
    }

    #[test]
    fn test_focus_previous_wraps() {
        let mut f = fixture();
        let mut focus = FocusManager::new();

        assert!(focus.focus_previous(&mut f.tree, &f.handle, f.root));
        assert_eq!(focus.focused_widget(), Some(f.c));
        focus.set_focus_to(&mut f.tree, &f.handle, f.a, FocusReason::Other);
        focus.focus_previous(&mut f.tree, &f.handle, f.root);
        assert_eq!(focus.focused_widget(), Some(f.c));
    }

    #[test]
    fn test_no_focusable_widgets() {
        let engine = EventEngine::new();
        let handle = SystemHandle::new(engine.poster());
        let mut tree = ObjectTree::new();
        let root = tree.insert(WidgetNode::new("root"));
        let mut focus = FocusManager::new();

        assert!(!focus.focus_next(&mut tree, &handle, root));
        assert!(!focus.focus_previous(&mut tree, &handle, root));
    }
}
