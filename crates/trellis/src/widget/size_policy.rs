//! Size policies for widget layout.
//!
//! A [`SizePolicy`] is the sizing contract of one widget along one axis: the
//! inclusive bounds `min..=max`, the preferred length `hint`, and a
//! `stretch` weight that sets the widget's share of slack relative to its
//! siblings. The [`PolicyKind`] is advisory metadata in the spirit of Qt's
//! `QSizePolicy::Policy`; the space allocator reads only the numbers.
//!
//! Setters clamp rather than reject. Policies are usually assembled one
//! field at a time, so a temporarily contradictory request (say, a max below
//! the current min) resolves to the nearest consistent policy.

use serde::{Deserialize, Serialize};

/// Largest representable length, used as "unbounded".
pub const UNBOUNDED: u16 = u16::MAX;

/// How a widget would like to be sized relative to its hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum PolicyKind {
    /// The widget cannot grow or shrink. It always stays at its size hint.
    Fixed = 0,

    /// The size hint is the minimum size. The widget can grow but there's no
    /// benefit in making it larger than the size hint.
    Minimum = 1,

    /// The size hint is the maximum size. The widget can shrink but cannot
    /// grow larger than the size hint.
    Maximum = 2,

    /// The size hint is preferred but the widget can both grow and shrink.
    #[default]
    Preferred = 3,

    /// The widget wants to grow and take up as much space as possible.
    Expanding = 4,

    /// The size hint is the minimum and the widget wants to grow.
    MinimumExpanding = 5,

    /// The size hint is ignored and the widget takes whatever is available.
    Ignored = 6,
}

impl PolicyKind {
    /// Returns true if the policy allows the widget to grow.
    #[inline]
    pub fn can_grow(self) -> bool {
        !matches!(self, Self::Fixed | Self::Maximum)
    }

    /// Returns true if the policy allows the widget to shrink.
    #[inline]
    pub fn can_shrink(self) -> bool {
        !matches!(self, Self::Fixed | Self::Minimum | Self::MinimumExpanding)
    }

    /// Returns true if the widget actively wants more space.
    #[inline]
    pub fn wants_to_grow(self) -> bool {
        matches!(self, Self::Expanding | Self::MinimumExpanding | Self::Ignored)
    }
}

/// Per-axis sizing contract.
///
/// Invariants, upheld by every constructor and setter:
/// `min <= hint <= max` and `stretch >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizePolicy {
    min: u16,
    max: u16,
    hint: u16,
    stretch: u8,
    kind: PolicyKind,
}

impl Default for SizePolicy {
    fn default() -> Self {
        Self {
            min: 0,
            max: UNBOUNDED,
            hint: 0,
            stretch: 1,
            kind: PolicyKind::Preferred,
        }
    }
}

impl SizePolicy {
    /// A `Preferred` policy with the given hint and no bounds.
    pub fn new(hint: u16) -> Self {
        Self::default().with_hint(hint)
    }

    /// A policy with the conventional bounds for `kind` around `hint`.
    ///
    /// `Fixed` pins both bounds to the hint, `Minimum` and
    /// `MinimumExpanding` use the hint as the lower bound, and `Maximum`
    /// uses it as the upper bound. The rest are unbounded.
    pub fn from_kind(kind: PolicyKind, hint: u16) -> Self {
        let (min, max) = match kind {
            PolicyKind::Fixed => (hint, hint),
            PolicyKind::Minimum | PolicyKind::MinimumExpanding => (hint, UNBOUNDED),
            PolicyKind::Maximum => (0, hint),
            PolicyKind::Preferred | PolicyKind::Expanding | PolicyKind::Ignored => (0, UNBOUNDED),
        };
        Self {
            min,
            max,
            hint,
            stretch: 1,
            kind,
        }
    }

    /// A fixed-length policy.
    pub fn fixed(length: u16) -> Self {
        Self::from_kind(PolicyKind::Fixed, length)
    }

    /// An expanding policy with the given hint.
    pub fn expanding(hint: u16) -> Self {
        Self::from_kind(PolicyKind::Expanding, hint)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Inclusive lower bound.
    #[inline]
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Inclusive upper bound.
    #[inline]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Preferred length.
    #[inline]
    pub fn hint(&self) -> u16 {
        self.hint
    }

    /// Stretch weight, always at least 1.
    #[inline]
    pub fn stretch(&self) -> u8 {
        self.stretch
    }

    /// Advisory policy kind.
    #[inline]
    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Whether `min == max`, leaving no room to grow or shrink.
    #[inline]
    pub fn is_rigid(&self) -> bool {
        self.min == self.max
    }

    // =========================================================================
    // Setters (clamp, never reject)
    // =========================================================================

    /// Set the lower bound. Raises `max` (and `hint`) if they fall below it.
    pub fn set_min(&mut self, min: u16) {
        self.min = min;
        self.max = self.max.max(min);
        self.hint = self.hint.clamp(self.min, self.max);
    }

    /// Set the upper bound. Lowers `min` (and `hint`) if they exceed it.
    pub fn set_max(&mut self, max: u16) {
        self.max = max;
        self.min = self.min.min(max);
        self.hint = self.hint.clamp(self.min, self.max);
    }

    /// Set the preferred length, clamped into `[min, max]`.
    pub fn set_hint(&mut self, hint: u16) {
        self.hint = hint.clamp(self.min, self.max);
    }

    /// Set the stretch weight. Zero is stored as 1.
    pub fn set_stretch(&mut self, stretch: u8) {
        self.stretch = stretch.max(1);
    }

    /// Set the advisory policy kind without touching the bounds.
    pub fn set_kind(&mut self, kind: PolicyKind) {
        self.kind = kind;
    }

    /// Builder form of [`set_min`](Self::set_min).
    pub fn with_min(mut self, min: u16) -> Self {
        self.set_min(min);
        self
    }

    /// Builder form of [`set_max`](Self::set_max).
    pub fn with_max(mut self, max: u16) -> Self {
        self.set_max(max);
        self
    }

    /// Builder form of [`set_hint`](Self::set_hint).
    pub fn with_hint(mut self, hint: u16) -> Self {
        self.set_hint(hint);
        self
    }

    /// Builder form of [`set_stretch`](Self::set_stretch).
    pub fn with_stretch(mut self, stretch: u8) -> Self {
        self.set_stretch(stretch);
        self
    }

    /// Builder form of [`set_kind`](Self::set_kind).
    pub fn with_kind(mut self, kind: PolicyKind) -> Self {
        self.set_kind(kind);
        self
    }

    /// Clamp a length into this policy's bounds.
    #[inline]
    pub fn constrain(&self, length: u16) -> u16 {
        length.clamp(self.min, self.max)
    }
}

/// Serialized form, for policies read from TOML or another serde format.
///
/// Every field is optional. Conversion goes through the clamping setters, so
/// a file can never produce an inconsistent policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizePolicySpec {
    /// Advisory kind; also selects default bounds.
    pub kind: PolicyKind,
    /// Preferred length.
    pub hint: u16,
    /// Lower bound override.
    pub min: Option<u16>,
    /// Upper bound override.
    pub max: Option<u16>,
    /// Stretch weight.
    pub stretch: Option<u8>,
}

impl From<SizePolicySpec> for SizePolicy {
    fn from(desc: SizePolicySpec) -> Self {
        let mut policy = SizePolicy::from_kind(desc.kind, desc.hint);
        if let Some(min) = desc.min {
            policy.set_min(min);
        }
        if let Some(max) = desc.max {
            policy.set_max(max);
        }
        if let Some(stretch) = desc.stretch {
            policy.set_stretch(stretch);
        }
        policy.set_hint(desc.hint);
        policy
    }
}
