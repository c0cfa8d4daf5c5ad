//! Geometry computation for container widgets.
//!
//! A container places its enabled children along its orientation with one
//! allocator call, then sizes each child on the cross axis with a
//! single-child call against the container's own cross length. The two axes
//! are never coupled. Disabled children are skipped outright and keep their
//! last geometry.

use trellis_core::{ObjectError, ObjectResult, ObjectTree, WidgetId};

use super::allocator::{allocate, allocate_by};
use crate::widget::{Orientation, Rect, SizePolicy, WidgetNode};

/// Computes and writes widget geometry.
pub struct LayoutEngine;

/// An enabled child as seen by one layout pass.
struct Child {
    id: WidgetId,
    main: SizePolicy,
    cross: SizePolicy,
}

impl LayoutEngine {
    /// Lay out the subtree under `container`.
    ///
    /// Returns every widget whose geometry changed, parents before their
    /// children. A non-container is left untouched.
    #[tracing::instrument(skip(tree), target = "trellis::layout", level = "trace")]
    pub fn layout(tree: &mut ObjectTree<WidgetNode>, container: WidgetId) -> ObjectResult<Vec<WidgetId>> {
        let mut changed = Vec::new();
        Self::layout_into(tree, container, &mut changed)?;
        tracing::debug!(target: "trellis::layout", ?container, changed = changed.len(), "layout pass");
        Ok(changed)
    }

    /// Give `id` a new size, keeping its origin, and lay out its subtree.
    ///
    /// This is what a Resize event does. The returned list includes `id`
    /// itself when its geometry changed.
    pub fn resize(tree: &mut ObjectTree<WidgetNode>, id: WidgetId, width: u16, height: u16) -> ObjectResult<Vec<WidgetId>> {
        let node = tree.get_mut(id).ok_or(ObjectError::InvalidWidgetId)?;
        let old = node.geometry();
        let mut changed = Vec::new();
        if node.set_geometry(Rect::new(old.x, old.y, width, height)) {
            changed.push(id);
        }
        Self::layout_into(tree, id, &mut changed)?;
        Ok(changed)
    }

    fn layout_into(tree: &mut ObjectTree<WidgetNode>, container: WidgetId, changed: &mut Vec<WidgetId>) -> ObjectResult<()> {
        let node = tree.get(container).ok_or(ObjectError::InvalidWidgetId)?;
        let Some(orientation) = node.layout() else {
            return Ok(());
        };
        let area = node.geometry();
        let cross_axis = orientation.cross();

        let children: Vec<Child> = tree
            .children(container)?
            .iter()
            .filter_map(|&id| {
                tree.get(id).filter(|child| child.is_enabled()).map(|child| Child {
                    id,
                    main: child.policy(orientation),
                    cross: child.policy(cross_axis),
                })
            })
            .collect();

        let main = allocate_by(&children, area.length(orientation), |child| child.main);
        let cross_length = area.length(cross_axis);
        let cross_origin = area.origin(cross_axis);
        let mut cursor = area.origin(orientation);

        for (index, child) in children.iter().enumerate() {
            let length = main.length(index);
            let cross = if main.is_excluded(index) {
                0
            } else {
                allocate(&[child.cross], cross_length).length(0)
            };
            let rect = match orientation {
                Orientation::Horizontal => Rect::new(cursor, cross_origin, length, cross),
                Orientation::Vertical => Rect::new(cross_origin, cursor, cross, length),
            };
            cursor = cursor.saturating_add(length);

            if let Some(node) = tree.get_mut(child.id) {
                if node.set_geometry(rect) {
                    changed.push(child.id);
                }
            }
        }

        for child in &children {
            Self::layout_into(tree, child.id, changed)?;
        }
        Ok(())
    }
}
