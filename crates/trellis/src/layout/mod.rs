//! Space allocation and container layout.
//!
//! [`allocate`] divides a span among children according to their
//! [`SizePolicy`](crate::widget::SizePolicy) values. [`LayoutEngine`] applies
//! it to a container's children along the container's orientation and
//! writes the resulting geometry into the tree. Containers that need a pass
//! are collected until the end of a dispatch cycle; see
//! [`System::suspend_layout`](crate::System::suspend_layout) for batching.
//!
//! # Allocation
//!
//! Children are taken in order. Once the running sum of minimums exceeds the
//! span, that child and every later one are excluded with length zero. The
//! rest start at their hint; surplus space is then shared by stretch factor
//! among children that can grow, and a deficit is taken back in inverse
//! proportion to stretch from children that can shrink. A child that reaches
//! its maximum or minimum is pinned and the remainder is shared again.
//!
//! ```
//! use trellis::layout::allocate;
//! use trellis::widget::SizePolicy;
//!
//! let children = [SizePolicy::fixed(10), SizePolicy::expanding(0), SizePolicy::expanding(0)];
//! assert_eq!(allocate(&children, 50).lengths, vec![10, 20, 20]);
//! ```

mod allocator;
mod engine;
mod invalidation;

pub use allocator::{Allocation, DimensionState, INVERSE_STRETCH_SCALE, allocate, allocate_by};
pub use engine::LayoutEngine;
pub(crate) use invalidation::LayoutInvalidator;
