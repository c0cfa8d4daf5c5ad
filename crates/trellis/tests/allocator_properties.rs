//! Property-based invariant tests for the space allocator.
//!
//! 1. Every participating child lands within `[min, max]`; excluded ones get 0.
//! 2. The total never exceeds the span, and fills it whenever the
//!    participants' maximums allow.
//! 3. Excluded children form a suffix, starting at the first child whose
//!    running minimum sum passes the span.
//! 4. Rigid children (`min == max`) keep their length.
//! 5. With the same participants, a larger span never shrinks a child.

use proptest::prelude::*;
use trellis::layout::allocate;
use trellis::widget::{SizePolicy, UNBOUNDED};

// ── Helpers ─────────────────────────────────────────────────────────────

fn policy_strategy() -> impl Strategy<Value = SizePolicy> {
    (0u16..=20, 0u16..=30, prop::option::of(0u16..=40), 1u8..=6).prop_map(|(min, above_min, headroom, stretch)| {
        let max = headroom.map_or(UNBOUNDED, |headroom| min + above_min + headroom);
        SizePolicy::default()
            .with_max(max)
            .with_min(min)
            .with_hint(min + above_min)
            .with_stretch(stretch)
    })
}

fn policies_strategy() -> impl Strategy<Value = Vec<SizePolicy>> {
    prop::collection::vec(policy_strategy(), 0..8)
}

fn min_sum(policies: &[SizePolicy]) -> u32 {
    policies.iter().map(|policy| u32::from(policy.min())).sum()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lengths_respect_bounds(policies in policies_strategy(), span in 0u16..=400) {
        let allocation = allocate(&policies, span);
        prop_assert_eq!(allocation.len(), policies.len());
        for (index, policy) in policies.iter().enumerate() {
            let length = allocation.length(index);
            if allocation.is_excluded(index) {
                prop_assert_eq!(length, 0);
            } else {
                prop_assert!(
                    (policy.min()..=policy.max()).contains(&length),
                    "child {} got {} outside [{}, {}]",
                    index, length, policy.min(), policy.max()
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Total
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn total_fits_span(policies in policies_strategy(), span in 0u16..=400) {
        let allocation = allocate(&policies, span);
        prop_assert!(allocation.total() <= u32::from(span));

        let max_sum: u32 = policies
            .iter()
            .enumerate()
            .filter(|(index, _)| !allocation.is_excluded(*index))
            .map(|(_, policy)| u32::from(policy.max()))
            .sum();
        prop_assert_eq!(allocation.total(), max_sum.min(u32::from(span)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Exclusion is a suffix
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn excluded_children_form_suffix(policies in policies_strategy(), span in 0u16..=120) {
        let allocation = allocate(&policies, span);
        let mut running = 0u32;
        for (index, policy) in policies.iter().enumerate() {
            running += u32::from(policy.min());
            prop_assert_eq!(allocation.is_excluded(index), running > u32::from(span));
        }
        prop_assert_eq!(
            allocation.participants(),
            (0..policies.len()).take_while(|&index| !allocation.is_excluded(index)).count()
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Rigid children
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rigid_children_keep_length(
        policies in policies_strategy(),
        rigid in 0u16..=30,
        position in 0usize..8,
        span in 0u16..=400,
    ) {
        let mut policies = policies;
        let position = position.min(policies.len());
        policies.insert(position, SizePolicy::fixed(rigid));

        let allocation = allocate(&policies, span);
        if !allocation.is_excluded(position) {
            prop_assert_eq!(allocation.length(position), rigid);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn larger_span_never_shrinks_a_child(policies in policies_strategy(), extra in 0u16..=200, growth in 1u16..=100) {
        // Both spans cover every minimum, so nobody is excluded.
        let base = u16::try_from(min_sum(&policies)).unwrap() + extra;
        let small = allocate(&policies, base);
        let large = allocate(&policies, base + growth);

        for index in 0..policies.len() {
            prop_assert!(!small.is_excluded(index) && !large.is_excluded(index));
            prop_assert!(
                large.length(index) >= small.length(index),
                "child {} shrank from {} to {} when span grew {} -> {}",
                index, small.length(index), large.length(index), base, base + growth
            );
        }
    }
}
