//! Formal concepts and the dominance order.
//!
//! A concept is a pair `(extent, intent)` with `extent = intent′` and
//! `intent = extent′`. Both halves are stored as ascending 1-based index
//! lists, so structural equality of the struct is set equality of both
//! components.

use crate::encode::CanonicalCode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A closed (extent, intent) pair.
///
/// Concepts are immutable once produced; they only hold indices into the
/// context they were derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    extent: Vec<usize>,
    intent: Vec<usize>,
}

impl Concept {
    /// Wrap two already ascending, duplicate-free index lists.
    pub(crate) fn from_sorted(extent: Vec<usize>, intent: Vec<usize>) -> Self {
        debug_assert!(extent.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(intent.windows(2).all(|w| w[0] < w[1]));
        Self { extent, intent }
    }

    /// Build a concept from arbitrary index lists (sorted and deduplicated
    /// here). Closure is not checked; use the derivation operator for that.
    pub fn new(mut extent: Vec<usize>, mut intent: Vec<usize>) -> Self {
        extent.sort_unstable();
        extent.dedup();
        intent.sort_unstable();
        intent.dedup();
        Self { extent, intent }
    }

    /// Object indices, ascending.
    pub fn extent(&self) -> &[usize] {
        &self.extent
    }

    /// Attribute indices, ascending.
    pub fn intent(&self) -> &[usize] {
        &self.intent
    }

    /// Canonical code of the extent over `object_count` objects.
    pub fn extent_code(&self, object_count: usize) -> CanonicalCode {
        CanonicalCode::encode(&self.extent, object_count)
    }

    /// Canonical code of the intent over `attribute_count` attributes.
    pub fn intent_code(&self, attribute_count: usize) -> CanonicalCode {
        CanonicalCode::encode(&self.intent, attribute_count)
    }

    /// Lattice order: `self ≤ other` iff `self.extent ⊆ other.extent`.
    ///
    /// For closed pairs this coincides with `other.intent ⊆ self.intent`;
    /// either inclusion is accepted.
    pub fn is_subconcept_of(&self, other: &Concept) -> bool {
        is_subset(&self.extent, &other.extent) || is_subset(&other.intent, &self.intent)
    }

    /// The dominance order used to put any concept set into canonical form.
    ///
    /// Extent size descending, then intent size descending, then intent
    /// indices ascending, then extent indices descending.
    pub fn dominance_cmp(&self, other: &Concept) -> Ordering {
        other
            .extent
            .len()
            .cmp(&self.extent.len())
            .then_with(|| other.intent.len().cmp(&self.intent.len()))
            .then_with(|| self.intent.cmp(&other.intent))
            .then_with(|| other.extent.cmp(&self.extent))
    }
}

impl PartialOrd for Concept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Concept {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dominance_cmp(other)
    }
}

/// Inclusion test on ascending index lists.
pub(crate) fn is_subset(small: &[usize], big: &[usize]) -> bool {
    let mut rest = big.iter();
    small.iter().all(|x| rest.any(|y| y == x))
}

/// Strict inclusion test on ascending index lists.
pub(crate) fn is_proper_subset(small: &[usize], big: &[usize]) -> bool {
    small.len() < big.len() && is_subset(small, big)
}

/// Intersection of two ascending index lists.
pub(crate) fn intersect(left: &[usize], right: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].cmp(&right[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
