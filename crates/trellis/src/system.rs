//! The application context and its dispatch loop.
//!
//! A [`System`] owns the widget tree, the head widget, the event engine,
//! the animation engine, the focus manager and the terminal. Applications
//! build a tree, optionally pick an initial focus, set the head, and call
//! [`System::run`]:
//!
//! ```no_run
//! use trellis::{CrosstermTerminal, Orientation, SizePolicy, System, WidgetNode};
//!
//! fn main() -> trellis::Result<()> {
//!     let mut system = System::new(CrosstermTerminal::new());
//!     let root = system.add_widget(WidgetNode::container("root", Orientation::Vertical));
//!     let field = system.add_child(
//!         root,
//!         WidgetNode::new("field")
//!             .with_vertical(SizePolicy::fixed(1))
//!             .with_focusable(true),
//!     )?;
//!     system.set_initial_focus(field);
//!     system.set_head(Some(root))?;
//!     std::process::exit(system.run()?);
//! }
//! ```
//!
//! # Cycle
//!
//! Each cycle of the loop reads terminal input, drains the event queue,
//! dispatches the batch, carries out requests made by behaviours, and runs
//! dirty layouts. Geometry changes queue Paint events for the next cycle.
//! The loop then waits for queue activity, for at most the poll interval (or
//! the animation tick while anything is animated).

use std::collections::HashSet;
use std::time::Duration;

use trellis_core::logging::{TreeFormatOptions, TreeFormatter};
use trellis_core::{
    AnimationEngine, ControlRequest, Event, EventEngine, EventKind, FocusReason, InputEvent, KeyCode, KeyInput, ObjectError, ObjectTree,
    Result, Signal, WidgetId,
};

use crate::config::SystemConfig;
use crate::handle::SystemHandle;
use crate::layout::{LayoutEngine, LayoutInvalidator};
use crate::terminal::{Terminal, TerminalInput};
use crate::widget::focus::is_effectively_enabled;
use crate::widget::{DispatchResult, EventDispatcher, FocusManager, Orientation, SizePolicy, WidgetNode};

/// Upper bound on terminal inputs handled in one cycle.
const INPUT_BURST: usize = 256;

/// Upper bound on rounds of control requests applied after one event.
/// Requests that keep spawning requests carry over to the next event.
const REQUEST_ROUNDS: usize = 16;

/// Explicit application context.
pub struct System {
    tree: ObjectTree<WidgetNode>,
    head: Option<WidgetId>,
    initial_focus: Option<WidgetId>,
    events: EventEngine,
    animation: AnimationEngine,
    focus: FocusManager,
    invalidator: LayoutInvalidator,
    terminal: Box<dyn Terminal>,
    config: SystemConfig,
    handle: SystemHandle,
}

impl System {
    /// Create a system on `terminal` with the default configuration.
    pub fn new(terminal: impl Terminal + 'static) -> Self {
        Self::with_config(terminal, SystemConfig::default())
    }

    /// Create a system on `terminal` with `config`.
    pub fn with_config(terminal: impl Terminal + 'static, config: SystemConfig) -> Self {
        let events = EventEngine::new();
        let animation = AnimationEngine::new(events.poster(), config.animation_interval);
        let handle = SystemHandle::new(events.poster());
        Self {
            tree: ObjectTree::new(),
            head: None,
            initial_focus: None,
            events,
            animation,
            focus: FocusManager::new(),
            invalidator: LayoutInvalidator::new(),
            terminal: Box::new(terminal),
            config,
            handle,
        }
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// The widget tree.
    pub fn tree(&self) -> &ObjectTree<WidgetNode> {
        &self.tree
    }

    /// Mutable access to the widget tree.
    ///
    /// Edits made here bypass layout invalidation; follow them with
    /// [`request_layout`](Self::request_layout) where geometry is affected.
    pub fn tree_mut(&mut self) -> &mut ObjectTree<WidgetNode> {
        &mut self.tree
    }

    /// A node by id.
    pub fn node(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.tree.get(id)
    }

    /// Add a parentless widget.
    pub fn add_widget(&mut self, node: WidgetNode) -> WidgetId {
        self.tree.insert(node)
    }

    /// Add `node` as the last child of `parent`.
    pub fn add_child(&mut self, parent: WidgetId, node: WidgetNode) -> Result<WidgetId> {
        let id = self.tree.insert_child(parent, node)?;
        self.invalidator.invalidate(parent);
        Ok(id)
    }

    /// Destroy `id` and its subtree.
    ///
    /// Focus inside the subtree is cleared first, so the focused widget
    /// receives FocusOut while it still exists.
    pub fn remove_widget(&mut self, id: WidgetId) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(ObjectError::InvalidWidgetId.into());
        }
        self.focus.on_disabled(&mut self.tree, &self.handle, id, FocusReason::Other);
        let parent = self.tree.parent(id)?;
        let removed = self.tree.remove(id)?;

        for &gone in &removed {
            self.animation.unregister(gone);
            self.invalidator.clear(gone);
        }
        if self.head.is_some_and(|head| removed.contains(&head)) {
            tracing::debug!(target: "trellis_core::event_loop", "head widget removed");
            self.head = None;
        }
        if self.initial_focus.is_some_and(|initial| removed.contains(&initial)) {
            self.initial_focus = None;
        }
        if let Some(parent) = parent {
            self.invalidator.invalidate(parent);
        }
        Ok(())
    }

    /// Replace both size policies of `id`.
    pub fn set_policies(&mut self, id: WidgetId, horizontal: SizePolicy, vertical: SizePolicy) -> Result<()> {
        let node = self.tree.get_mut(id).ok_or(ObjectError::InvalidWidgetId)?;
        node.set_horizontal_policy(horizontal);
        node.set_vertical_policy(vertical);
        self.invalidate_around(id);
        Ok(())
    }

    /// Replace the horizontal size policy of `id`.
    pub fn set_horizontal_policy(&mut self, id: WidgetId, policy: SizePolicy) -> Result<()> {
        let node = self.tree.get_mut(id).ok_or(ObjectError::InvalidWidgetId)?;
        node.set_horizontal_policy(policy);
        self.invalidate_around(id);
        Ok(())
    }

    /// Replace the vertical size policy of `id`.
    pub fn set_vertical_policy(&mut self, id: WidgetId, policy: SizePolicy) -> Result<()> {
        let node = self.tree.get_mut(id).ok_or(ObjectError::InvalidWidgetId)?;
        node.set_vertical_policy(policy);
        self.invalidate_around(id);
        Ok(())
    }

    /// Change the orientation of `id`, or make it a leaf with `None`.
    pub fn set_layout(&mut self, id: WidgetId, layout: Option<Orientation>) -> Result<()> {
        let node = self.tree.get_mut(id).ok_or(ObjectError::InvalidWidgetId)?;
        node.set_layout(layout);
        self.invalidator.invalidate(id);
        Ok(())
    }

    /// Enable or disable `id`.
    ///
    /// Disabling clears focus held by `id` or any of its descendants. A
    /// disabled widget keeps its place in the tree but is skipped by layout
    /// and event delivery.
    pub fn set_enabled(&mut self, id: WidgetId, enabled: bool) -> Result<()> {
        let node = self.tree.get_mut(id).ok_or(ObjectError::InvalidWidgetId)?;
        if node.is_enabled() == enabled {
            return Ok(());
        }
        node.set_enabled(enabled);
        if !enabled {
            self.focus.on_disabled(&mut self.tree, &self.handle, id, FocusReason::Disabled);
        }
        self.invalidate_around(id);
        Ok(())
    }

    /// Recompute the layout of container `id` at the end of the cycle.
    pub fn request_layout(&mut self, id: WidgetId) {
        self.invalidator.invalidate(id);
    }

    /// Lay out the whole head subtree at the end of the cycle.
    pub fn request_full_layout(&mut self) {
        self.invalidator.invalidate_all();
    }

    /// Batch tree edits so dirty layouts are recorded only once `resume_layout`
    /// is called.
    pub fn suspend_layout(&mut self) {
        self.invalidator.suspend();
    }

    /// End a [`suspend_layout`](Self::suspend_layout) batch. Batches nest.
    pub fn resume_layout(&mut self) {
        self.invalidator.resume();
    }

    // =========================================================================
    // Head and focus
    // =========================================================================

    /// The head widget, laid out over the whole terminal.
    pub fn head(&self) -> Option<WidgetId> {
        self.head
    }

    /// Replace the head widget.
    ///
    /// The previous head is disabled (clearing focus inside it) and
    /// detached; the new one is enabled and receives a Resize to the
    /// terminal size. `None` leaves the system without a head, so `run`
    /// returns -1.
    pub fn set_head(&mut self, head: Option<WidgetId>) -> Result<()> {
        if let Some(new) = head {
            if !self.tree.contains(new) {
                return Err(ObjectError::InvalidWidgetId.into());
            }
        }

        if let Some(old) = self.head.take() {
            if Some(old) != head && self.tree.contains(old) {
                self.focus.on_disabled(&mut self.tree, &self.handle, old, FocusReason::Disabled);
                if let Some(node) = self.tree.get_mut(old) {
                    node.set_enabled(false);
                }
            }
        }

        self.head = head;
        if let Some(new) = head {
            if let Some(node) = self.tree.get_mut(new) {
                node.set_enabled(true);
            }
            let (width, height) = (self.terminal.width(), self.terminal.height());
            self.events.post(Event::resize(new, width, height));
        }
        tracing::debug!(target: "trellis_core::event_loop", ?head, "head changed");
        Ok(())
    }

    /// Widget to focus when `run` starts.
    pub fn set_initial_focus(&mut self, id: WidgetId) {
        self.initial_focus = Some(id);
    }

    /// The focused widget.
    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.focus.focused_widget()
    }

    /// Move focus to `id` now. See [`FocusManager::set_focus_to`].
    pub fn set_focus(&mut self, id: WidgetId) -> bool {
        self.focus.set_focus_to(&mut self.tree, &self.handle, id, FocusReason::Other)
    }

    /// Remove focus.
    pub fn clear_focus(&mut self) {
        self.focus.clear_focus(&mut self.tree, &self.handle, FocusReason::Other);
    }

    // =========================================================================
    // Events, animation and exit
    // =========================================================================

    /// A cloneable handle for other threads and for behaviours.
    pub fn handle(&self) -> SystemHandle {
        self.handle.clone()
    }

    /// Post an event for the next cycle.
    pub fn post(&self, event: Event) {
        self.events.post(event);
    }

    /// Deliver Timer events to `id` roughly every `period`.
    pub fn start_animation(&mut self, id: WidgetId, period: Duration) {
        self.animation.register(id, period);
    }

    /// Stop Timer events for `id`.
    pub fn stop_animation(&mut self, id: WidgetId) {
        self.animation.unregister(id);
    }

    /// Whether `id` receives Timer events.
    pub fn is_animated(&self, id: WidgetId) -> bool {
        self.animation.is_registered(id)
    }

    /// End the loop with `code`. See [`SystemHandle::exit`].
    pub fn exit(&self, code: i32) {
        self.handle.exit(code);
    }

    /// End the loop with code 0.
    pub fn quit(&self) {
        self.handle.quit();
    }

    /// Emitted with the exit code whenever exit is requested.
    pub fn exit_signal(&self) -> &Signal<i32> {
        self.handle.exit_signal()
    }

    /// The active configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Render the head's subtree for debugging.
    pub fn dump_tree(&self, options: TreeFormatOptions) -> Option<String> {
        let head = self.head?;
        TreeFormatter::with_options(options)
            .format_subtree(&self.tree, head, |_, node| {
                let g = node.geometry();
                let mut label = format!("{} {}x{}+{}+{}", node.name(), g.width, g.height, g.x, g.y);
                if !node.is_enabled() {
                    label.push_str(" (disabled)");
                }
                if node.is_focused() {
                    label.push_str(" (focused)");
                }
                label
            })
            .ok()
    }

    // =========================================================================
    // Loop
    // =========================================================================

    /// Run the dispatch loop until exit is requested.
    ///
    /// Returns `Ok(-1)` without touching the terminal when there is no head,
    /// otherwise the exit code. A terminal that fails to initialize is
    /// reported as [`TrellisError::Terminal`](trellis_core::TrellisError::Terminal).
    pub fn run(&mut self) -> Result<i32> {
        let Some(head) = self.head.filter(|&head| self.tree.contains(head)) else {
            tracing::info!(target: "trellis_core::event_loop", "no head widget, not running");
            return Ok(-1);
        };

        if let Some(initial) = self.initial_focus {
            if let Some(node) = self.tree.get_mut(initial) {
                node.set_enabled(true);
                self.focus.set_focus_to(&mut self.tree, &self.handle, initial, FocusReason::Initial);
            }
        }

        self.terminal.initialize()?;
        if let Err(error) = self.animation.start() {
            let _ = self.terminal.uninitialize();
            return Err(error.into());
        }
        self.events
            .post(Event::resize(head, self.terminal.width(), self.terminal.height()));
        tracing::info!(target: "trellis_core::event_loop", ?head, "event loop started");

        let outcome = self.event_loop();

        self.animation.stop();
        let restored = self.terminal.uninitialize();
        outcome?;
        restored?;

        let code = self.handle.exit_code();
        self.handle.reset_exit();
        tracing::info!(target: "trellis_core::event_loop", code, "event loop finished");
        Ok(code)
    }

    /// Run one dispatch cycle without touching the terminal.
    ///
    /// Drains the queue, dispatches the batch, applies requests, and runs
    /// dirty layouts. Returns the number of events dispatched.
    pub fn process_events(&mut self) -> usize {
        let batch = self.events.drain();
        let mut painted = HashSet::new();
        for event in &batch {
            self.dispatch(event, &mut painted);
            self.apply_requests();
        }
        self.apply_requests();
        self.run_dirty_layouts();
        batch.len()
    }

    fn event_loop(&mut self) -> Result<()> {
        while !self.handle.exit_requested() {
            for _ in 0..INPUT_BURST {
                let Some(input) = self.terminal.poll_input(Duration::ZERO)? else {
                    break;
                };
                self.route_input(input);
                // Dispatch right away so the next key sees any focus change.
                self.process_events();
                if self.handle.exit_requested() {
                    return Ok(());
                }
            }

            self.process_events();
            if self.handle.exit_requested() {
                break;
            }
            self.events.queue().wait_for_activity(self.wait_interval());
        }
        Ok(())
    }

    fn wait_interval(&self) -> Duration {
        if self.animation.registered_count() > 0 {
            self.config.poll_interval.min(self.animation.interval())
        } else {
            self.config.poll_interval
        }
    }

    fn route_input(&mut self, input: TerminalInput) {
        match input {
            TerminalInput::Resize { width, height } => {
                if let Some(head) = self.head {
                    self.events.post(Event::resize(head, width, height));
                }
            }
            TerminalInput::Key(key) => {
                if self.config.exit_on_ctrl_c && key.is_interrupt() {
                    tracing::debug!(target: "trellis::dispatch", "ctrl+c received");
                    self.handle.exit(0);
                    return;
                }
                let target = self
                    .focus
                    .focused_widget()
                    .filter(|&id| self.tree.contains(id))
                    .or(self.head);
                if let Some(target) = target {
                    self.events.post(Event::input(target, InputEvent::Key(key)));
                }
            }
        }
    }

    #[tracing::instrument(skip_all, target = "trellis_core::event_loop", level = "trace", fields(kind = event.kind().name()))]
    fn dispatch(&mut self, event: &Event, painted: &mut HashSet<WidgetId>) {
        let target = event.target();
        match event.kind() {
            EventKind::Control(request) => self.apply_control(target, *request),
            EventKind::Resize { width, height } => {
                if !is_effectively_enabled(&self.tree, target) {
                    tracing::trace!(target: "trellis::dispatch", ?target, "dropping resize for dead or disabled widget");
                    return;
                }
                if let Ok(changed) = LayoutEngine::resize(&mut self.tree, target, *width, *height) {
                    for id in changed {
                        self.events.post(Event::paint(id));
                    }
                }
                EventDispatcher::send_event(&mut self.tree, &self.handle, event);
            }
            EventKind::Paint => self.paint_subtree(target, painted),
            EventKind::Input(InputEvent::Key(key)) => {
                let result = EventDispatcher::send_event(&mut self.tree, &self.handle, event);
                if !result.was_handled() && self.config.tab_focus {
                    self.handle_tab(*key);
                }
            }
            EventKind::Timer { .. } => {
                if EventDispatcher::send_event(&mut self.tree, &self.handle, event) == DispatchResult::WidgetNotFound {
                    self.animation.unregister(target);
                }
            }
            _ => {
                EventDispatcher::send_event(&mut self.tree, &self.handle, event);
            }
        }
    }

    /// Paint `root` and its enabled descendants, each at most once per cycle.
    /// Nothing is painted when `root` sits under a disabled ancestor.
    fn paint_subtree(&mut self, root: WidgetId, painted: &mut HashSet<WidgetId>) {
        if !is_effectively_enabled(&self.tree, root) {
            return;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.tree.get(id) else {
                continue;
            };
            if !node.is_enabled() || !painted.insert(id) {
                continue;
            }
            if let Ok(children) = self.tree.children(id) {
                stack.extend(children.iter().rev());
            }
            EventDispatcher::send_event(&mut self.tree, &self.handle, &Event::paint(id));
        }
    }

    fn handle_tab(&mut self, key: KeyInput) {
        let Some(head) = self.head else {
            return;
        };
        match key.code {
            KeyCode::Tab if key.modifiers.shift => {
                self.focus.focus_previous(&mut self.tree, &self.handle, head);
            }
            KeyCode::Tab => {
                self.focus.focus_next(&mut self.tree, &self.handle, head);
            }
            KeyCode::BackTab => {
                self.focus.focus_previous(&mut self.tree, &self.handle, head);
            }
            _ => {}
        }
    }

    /// Apply control requests still waiting in the queue, so a behaviour's
    /// focus or layout request takes effect before the next event.
    fn apply_requests(&mut self) {
        for _ in 0..REQUEST_ROUNDS {
            let requests = self.events.drain_control();
            if requests.is_empty() {
                return;
            }
            for event in requests {
                if let EventKind::Control(request) = event.kind() {
                    self.apply_control(event.target(), *request);
                }
            }
        }
    }

    fn apply_control(&mut self, id: WidgetId, request: ControlRequest) {
        match request {
            ControlRequest::Layout => self.invalidator.invalidate(id),
            ControlRequest::Focus => {
                self.focus.set_focus_to(&mut self.tree, &self.handle, id, FocusReason::Other);
            }
            ControlRequest::StartAnimation { period } => {
                if self.tree.contains(id) {
                    self.animation.register(id, period);
                }
            }
            ControlRequest::StopAnimation => {
                self.animation.unregister(id);
            }
        }
    }

    fn run_dirty_layouts(&mut self) {
        if !self.invalidator.has_dirty_layouts() {
            return;
        }
        let (full, dirty) = self.invalidator.take_dirty();
        let mut roots: Vec<WidgetId> = Vec::new();
        if full {
            roots.extend(self.head);
        }
        for id in dirty {
            if !roots.contains(&id) && is_effectively_enabled(&self.tree, id) {
                roots.push(id);
            }
        }
        // A pass recurses, so containers under another dirty container are covered.
        let covered: Vec<WidgetId> = roots
            .iter()
            .copied()
            .filter(|&id| {
                roots
                    .iter()
                    .any(|&other| other != id && self.tree.is_ancestor_of(other, id))
            })
            .collect();

        for root in roots.into_iter().filter(|id| !covered.contains(id)) {
            match LayoutEngine::layout(&mut self.tree, root) {
                Ok(changed) => {
                    for id in changed {
                        self.events.post(Event::paint(id));
                    }
                }
                Err(error) => {
                    tracing::trace!(target: "trellis::layout", ?root, %error, "skipping layout");
                }
            }
        }
    }

    /// Mark the layout that positions `id` dirty: its parent's, or its own
    /// when it has no parent.
    fn invalidate_around(&mut self, id: WidgetId) {
        match self.tree.parent(id) {
            Ok(Some(parent)) => self.invalidator.invalidate(parent),
            _ => self.invalidator.invalidate(id),
        }
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("widgets", &self.tree.len())
            .field("head", &self.head)
            .field("focused", &self.focus.focused_widget())
            .field("animation", &self.animation)
            .field("config", &self.config)
            .finish()
    }
}
