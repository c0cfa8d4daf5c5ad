//! Deferred layout recalculation.
//!
//! Tree mutations mark the affected container dirty instead of laying it out
//! on the spot. The dispatch loop collects the dirty set once per cycle, so a
//! burst of changes costs a single layout pass per container.

use std::collections::HashSet;

use trellis_core::WidgetId;

/// Marks waiting for a layout pass.
#[derive(Debug, Default)]
struct Marks {
    containers: HashSet<WidgetId>,
    from_head: bool,
}

impl Marks {
    fn is_empty(&self) -> bool {
        !self.from_head && self.containers.is_empty()
    }
}

/// Containers waiting for a layout pass.
///
/// Suspension nests: every [`suspend`](Self::suspend) needs a matching
/// [`resume`](Self::resume) before held-back marks, including a request for
/// a full pass, become visible.
#[derive(Debug, Default)]
pub(crate) struct LayoutInvalidator {
    pending: Marks,
    held: Marks,
    suspend_depth: u32,
}

impl LayoutInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn marks(&mut self) -> &mut Marks {
        if self.suspend_depth > 0 { &mut self.held } else { &mut self.pending }
    }

    /// Queue `container` for a layout pass.
    pub fn invalidate(&mut self, container: WidgetId) {
        self.marks().containers.insert(container);
    }

    /// Queue a pass over the whole tree, starting at the head.
    pub fn invalidate_all(&mut self) {
        self.marks().from_head = true;
    }

    #[inline]
    pub fn has_dirty_layouts(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Forget `container`, including a mark held back by suspension.
    ///
    /// Used when a widget leaves the tree.
    pub fn clear(&mut self, container: WidgetId) {
        self.pending.containers.remove(&container);
        self.held.containers.remove(&container);
    }

    /// Hand the pending work to the caller: whether a pass from the head was
    /// asked for, and which containers were marked.
    pub fn take_dirty(&mut self) -> (bool, Vec<WidgetId>) {
        let Marks { containers, from_head } = std::mem::take(&mut self.pending);
        (from_head, containers.into_iter().collect())
    }

    pub fn suspend(&mut self) {
        self.suspend_depth += 1;
    }

    /// Undo one [`suspend`](Self::suspend). The last one releases held marks.
    pub fn resume(&mut self) {
        self.suspend_depth = self.suspend_depth.saturating_sub(1);
        if self.suspend_depth == 0 {
            let held = std::mem::take(&mut self.held);
            self.pending.containers.extend(held.containers);
            self.pending.from_head |= held.from_head;
        }
    }

    #[cfg(test)]
    fn is_dirty(&self, container: WidgetId) -> bool {
        self.pending.from_head || self.pending.containers.contains(&container)
    }
}
