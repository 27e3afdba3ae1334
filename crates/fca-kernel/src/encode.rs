//! Canonical bit encoding of index sets.
//!
//! An index set `S ⊆ {1..L}` is encoded as the unsigned integer
//! `Σ_{i ∈ S} 2^(L - i)`, so index 1 is the most significant bit and the
//! empty set is 0. Two sets over the same universe are equal iff their
//! codes are equal, and the numeric order of codes prefers sets containing
//! the lowest index.
//!
//! The value is stored as big-endian 64-bit words, which keeps the encoding
//! exact for universes of any size while still comparing in O(L/64).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical code of an index set over a fixed universe.
///
/// Ordering is numeric as long as both codes share a universe size, which
/// is the only comparison the kernel ever performs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalCode {
    universe: usize,
    words: Vec<u64>,
}

impl CanonicalCode {
    /// Encode `members` (1-based indices) over a universe of `universe` items.
    ///
    /// Members outside `1..=universe` are ignored; duplicates are idempotent.
    pub fn encode(members: &[usize], universe: usize) -> Self {
        let mut code = Self::empty(universe);
        for &index in members {
            code.insert(index);
        }
        code
    }

    /// The code of the empty set.
    pub fn empty(universe: usize) -> Self {
        Self {
            universe,
            words: vec![0; universe.div_ceil(64)],
        }
    }

    /// Set the bit for `index` (1-based).
    pub fn insert(&mut self, index: usize) {
        if index == 0 || index > self.universe {
            return;
        }
        let (word, bit) = self.locate(index);
        self.words[word] |= 1u64 << bit;
    }

    /// Whether `index` is a member.
    pub fn contains(&self, index: usize) -> bool {
        if index == 0 || index > self.universe {
            return false;
        }
        let (word, bit) = self.locate(index);
        self.words[word] & (1u64 << bit) != 0
    }

    /// Universe size the code was built over.
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Decode back into ascending 1-based indices.
    pub fn members(&self) -> Vec<usize> {
        (1..=self.universe).filter(|&i| self.contains(i)).collect()
    }

    /// The integer value, when the universe fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        match self.words.as_slice() {
            [] => Some(0),
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Big-endian words, most significant first.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    // Bit position p = L - index counted from the least significant end.
    fn locate(&self, index: usize) -> (usize, usize) {
        let position = self.universe - index;
        let word_from_end = position / 64;
        (self.words.len() - 1 - word_from_end, position % 64)
    }
}

impl fmt::Display for CanonicalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(value) => write!(f, "{value:#x}"),
            None => {
                write!(f, "0x")?;
                for word in &self.words {
                    write!(f, "{word:016x}")?;
                }
                Ok(())
            }
        }
    }
}
