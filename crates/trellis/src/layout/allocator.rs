//! Constrained space allocation along one axis.
//!
//! [`allocate`] distributes a span of terminal cells among the children of a
//! container. Each child contributes a [`SizePolicy`]; the result holds one
//! length per child, in input order.
//!
//! # Algorithm
//!
//! 1. Walk the children in order, summing `min` over all of them. The first
//!    child whose minimum pushes the running sum past the span is excluded,
//!    together with every child after it. Excluded children get length 0.
//! 2. Survivors start at their hint. If the hints fall short of the span the
//!    surplus is handed out in proportion to `stretch` (growth pass); if they
//!    overshoot, the deficit is taken back in proportion to the inverse of
//!    `stretch` (shrink pass).
//! 3. Each pass repeatedly pins every child whose proportional share would
//!    reach its bound, until a round pins nobody. The rest split what remains
//!    by truncated shares, and the few leftover cells go one at a time to the
//!    child with the lowest next-cell threshold, earlier children first.
//!
//! All arithmetic is exact integer arithmetic, so the result is the same as
//! handing out cells one by one to whichever child is furthest below its
//! weighted share. A bigger span therefore never shrinks a child, as long as
//! the set of participants stays the same.

use crate::widget::SizePolicy;

/// Scale for shrink weights: `lcm(1..=16)`.
///
/// A child's shrink weight is `INVERSE_STRETCH_SCALE / stretch`, exact for
/// stretch factors up to 16 and still strictly decreasing beyond that.
pub const INVERSE_STRETCH_SCALE: u64 = 720_720;

/// Allocation state of a single child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionState {
    /// Excluded because the minimums before it already fill the span.
    Unreachable,
    /// Still taking part in the current pass.
    Active,
    /// Reached a bound; no further cells move in or out.
    Pinned,
}

#[derive(Debug, Clone, Copy)]
struct Dimension {
    index: usize,
    length: u16,
    state: DimensionState,
}

/// Result of one allocator call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allocation {
    /// One length per child, in input order.
    pub lengths: Vec<u16>,
    excluded: Vec<bool>,
}

impl Allocation {
    /// Number of children that were not excluded.
    pub fn participants(&self) -> usize {
        self.excluded.iter().filter(|excluded| !**excluded).count()
    }

    /// Sum of all lengths. Never more than the span.
    pub fn total(&self) -> u32 {
        self.lengths.iter().map(|&length| u32::from(length)).sum()
    }

    /// Whether child `index` was excluded. Out-of-range indices are.
    pub fn is_excluded(&self, index: usize) -> bool {
        self.excluded.get(index).copied().unwrap_or(true)
    }

    /// Length of child `index`, or 0 when out of range.
    pub fn length(&self, index: usize) -> u16 {
        self.lengths.get(index).copied().unwrap_or(0)
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether the allocation covers no children.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Allocate `span` cells among `policies`.
pub fn allocate(policies: &[SizePolicy], span: u16) -> Allocation {
    allocate_by(policies, span, |policy| *policy)
}

/// Allocate `span` cells among `children`, reading each policy through
/// `policy_of`.
#[tracing::instrument(skip_all, target = "trellis::layout", level = "trace", fields(count = children.len()))]
pub fn allocate_by<T, F>(children: &[T], span: u16, policy_of: F) -> Allocation
where
    F: Fn(&T) -> SizePolicy,
{
    let policies: Vec<SizePolicy> = children.iter().map(policy_of).collect();

    let mut dims = Vec::with_capacity(policies.len());
    let mut min_sum: u64 = 0;
    let mut starved = false;
    for (index, policy) in policies.iter().enumerate() {
        min_sum += u64::from(policy.min());
        starved |= min_sum > u64::from(span);
        dims.push(if starved {
            Dimension {
                index,
                length: 0,
                state: DimensionState::Unreachable,
            }
        } else {
            Dimension {
                index,
                length: policy.hint(),
                state: DimensionState::Active,
            }
        });
    }

    let seed: u64 = dims
        .iter()
        .filter(|dim| dim.state == DimensionState::Active)
        .map(|dim| u64::from(dim.length))
        .sum();
    let span = u64::from(span);
    if seed < span {
        distribute(&mut dims, &policies, span - seed, Pass::Grow);
    } else if seed > span {
        distribute(&mut dims, &policies, seed - span, Pass::Shrink);
    }

    tracing::trace!(
        target: "trellis::layout",
        available = span,
        seed,
        starved = dims.iter().filter(|dim| dim.state == DimensionState::Unreachable).count(),
        "space allocated"
    );

    Allocation {
        lengths: dims.iter().map(|dim| dim.length).collect(),
        excluded: dims
            .iter()
            .map(|dim| dim.state == DimensionState::Unreachable)
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Hand out surplus, pinning at `max`.
    Grow,
    /// Take back a deficit, pinning at `min`.
    Shrink,
}

impl Pass {
    fn weight(self, policy: &SizePolicy) -> u64 {
        let stretch = u64::from(policy.stretch().max(1));
        match self {
            Pass::Grow => stretch,
            Pass::Shrink => INVERSE_STRETCH_SCALE / stretch,
        }
    }

    fn room(self, policy: &SizePolicy, length: u16) -> u64 {
        match self {
            Pass::Grow => u64::from(policy.max().saturating_sub(length)),
            Pass::Shrink => u64::from(length.saturating_sub(policy.min())),
        }
    }

    fn apply(self, length: u16, cells: u64) -> u16 {
        let cells = u16::try_from(cells).unwrap_or(u16::MAX);
        match self {
            Pass::Grow => length.saturating_add(cells),
            Pass::Shrink => length.saturating_sub(cells),
        }
    }
}

/// Per-child bookkeeping for one pass.
struct Slot {
    dim: usize,
    weight: u64,
    room: u64,
    granted: u64,
}

/// Water-fill `amount` cells into (or out of) the active dimensions.
fn distribute(dims: &mut [Dimension], policies: &[SizePolicy], mut amount: u64, pass: Pass) {
    let mut slots: Vec<Slot> = Vec::new();
    for (position, dim) in dims.iter_mut().enumerate() {
        if dim.state != DimensionState::Active {
            continue;
        }
        let policy = &policies[dim.index];
        let room = pass.room(policy, dim.length);
        if room == 0 {
            dim.state = DimensionState::Pinned;
            continue;
        }
        slots.push(Slot {
            dim: position,
            weight: pass.weight(policy),
            room,
            granted: 0,
        });
    }

    // Pin rounds. A child is pinned when its share of what remains reaches
    // its room, judged against the totals at the start of the round.
    loop {
        let total_weight: u64 = slots
            .iter()
            .filter(|slot| dims[slot.dim].state == DimensionState::Active)
            .map(|slot| slot.weight)
            .sum();
        if total_weight == 0 || amount == 0 {
            break;
        }

        let mut pinned_room = 0;
        for slot in slots.iter_mut() {
            let dim = &mut dims[slot.dim];
            if dim.state == DimensionState::Active && slot.room * total_weight <= amount * slot.weight {
                slot.granted = slot.room;
                pinned_room += slot.room;
                dim.state = DimensionState::Pinned;
            }
        }
        if pinned_room == 0 {
            break;
        }
        amount -= pinned_room;
    }

    let active: Vec<usize> = (0..slots.len())
        .filter(|&i| dims[slots[i].dim].state == DimensionState::Active)
        .collect();
    let total_weight: u64 = active.iter().map(|&i| slots[i].weight).sum();

    if total_weight > 0 && amount > 0 {
        for &i in &active {
            let share = amount * slots[i].weight / total_weight;
            slots[i].granted = share.min(slots[i].room);
        }
        let mut leftover = amount - active.iter().map(|&i| slots[i].granted).sum::<u64>();

        while leftover > 0 {
            // Lowest (granted + 1) / weight wins; strict comparison keeps
            // ties with the earlier child.
            let mut best: Option<usize> = None;
            for &i in &active {
                let slot = &slots[i];
                if slot.granted >= slot.room {
                    continue;
                }
                best = match best {
                    Some(b) if (slots[b].granted + 1) * slot.weight <= (slot.granted + 1) * slots[b].weight => Some(b),
                    _ => Some(i),
                };
            }
            let Some(best) = best else {
                break;
            };
            slots[best].granted += 1;
            leftover -= 1;
        }
    }

    for slot in &slots {
        let dim = &mut dims[slot.dim];
        dim.length = pass.apply(dim.length, slot.granted);
        if slot.granted == slot.room {
            dim.state = DimensionState::Pinned;
        }
    }
}
