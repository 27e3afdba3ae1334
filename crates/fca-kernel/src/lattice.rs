//! Concept sets and their canonical comparison.
//!
//! A [`Lattice`] is the duplicate-free collection of concepts produced by an
//! enumerator, together with the universe sizes its indices refer to. The
//! enumerators may emit concepts in any order; the dominance order from
//! [`Concept::dominance_cmp`] is the canonical form used for comparison and
//! fingerprinting.

use crate::concept::Concept;
use crate::encode::CanonicalCode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 fingerprint of a lattice's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeDigest(pub String);

impl fmt::Display for LatticeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The concepts of one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    object_count: usize,
    attribute_count: usize,
    concepts: Vec<Concept>,
}

impl Lattice {
    /// Wrap a concept collection over the given universe sizes.
    ///
    /// The collection is taken as-is; enumerators guarantee it is
    /// duplicate-free.
    pub fn from_concepts(
        object_count: usize,
        attribute_count: usize,
        concepts: Vec<Concept>,
    ) -> Self {
        Self {
            object_count,
            attribute_count,
            concepts,
        }
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Concept> {
        self.concepts.iter()
    }

    pub fn into_concepts(self) -> Vec<Concept> {
        self.concepts
    }

    /// Put the concepts into dominance order (top concept first).
    pub fn sort(&mut self) {
        self.concepts.sort_by(Concept::dominance_cmp);
    }

    /// Consuming form of [`Lattice::sort`].
    pub fn sorted(mut self) -> Self {
        self.sort();
        self
    }

    /// The concept with the largest extent.
    pub fn top(&self) -> Option<&Concept> {
        self.concepts.iter().min_by(|a, b| a.dominance_cmp(b))
    }

    /// The concept with the largest intent.
    pub fn bottom(&self) -> Option<&Concept> {
        self.concepts.iter().max_by(|a, b| a.dominance_cmp(b))
    }

    /// Whether `concept` is a member (set equality of both halves).
    pub fn contains(&self, concept: &Concept) -> bool {
        let extent = concept.extent_code(self.object_count);
        let intent = concept.intent_code(self.attribute_count);
        self.concepts.iter().any(|c| {
            c.extent_code(self.object_count) == extent
                && c.intent_code(self.attribute_count) == intent
        })
    }

    /// Whether every concept in `concepts` is a member.
    pub fn contains_all<'a>(&self, concepts: impl IntoIterator<Item = &'a Concept>) -> bool {
        concepts.into_iter().all(|c| self.contains(c))
    }

    /// Canonical codes of every concept, in dominance order.
    pub fn canonical_codes(&self) -> Vec<(CanonicalCode, CanonicalCode)> {
        let mut sorted: Vec<&Concept> = self.concepts.iter().collect();
        sorted.sort_by(|a, b| a.dominance_cmp(b));
        sorted
            .into_iter()
            .map(|c| {
                (
                    c.extent_code(self.object_count),
                    c.intent_code(self.attribute_count),
                )
            })
            .collect()
    }

    /// Canonical-form equality with another concept set.
    ///
    /// False on differing cardinality; otherwise both sides are put into
    /// dominance order and compared pairwise by canonical code.
    pub fn equals(&self, other: &Lattice) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.canonical_codes() == other.canonical_codes()
    }

    /// Deterministic fingerprint of the canonical form.
    ///
    /// Equal lattices over the same universes have equal fingerprints,
    /// independent of the order the enumerator produced them in.
    pub fn fingerprint(&self) -> LatticeDigest {
        let mut hasher = Sha256::new();
        hasher.update(format!("objects:{}\n", self.object_count).as_bytes());
        hasher.update(format!("attributes:{}\n", self.attribute_count).as_bytes());
        for (extent, intent) in self.canonical_codes() {
            hasher.update(b"concept:");
            hasher.update(extent.to_string().as_bytes());
            hasher.update(b":");
            hasher.update(intent.to_string().as_bytes());
            hasher.update(b"\n");
        }
        let hash = hasher.finalize();
        LatticeDigest(format!("{hash:x}"))
    }
}

impl<'a> IntoIterator for &'a Lattice {
    type Item = &'a Concept;
    type IntoIter = std::slice::Iter<'a, Concept>;

    fn into_iter(self) -> Self::IntoIter {
        self.concepts.iter()
    }
}

/// Free-function form of [`Lattice::equals`].
pub fn lattices_equal(left: &Lattice, right: &Lattice) -> bool {
    left.equals(right)
}
