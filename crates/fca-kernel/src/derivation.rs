//! The derivation operator (prime) of the Galois connection.
//!
//! For a set of attributes `B`, `B′` is the set of objects having every
//! attribute in `B`. For a set of objects `A`, `A′` is the set of
//! attributes shared by every object in `A`. The empty set on either side
//! derives to the whole other side.
//!
//! The operator is antitone (`S1 ⊆ S2 ⟹ S2′ ⊆ S1′`) and `S′′′ = S′`, so
//! `S ↦ S′′` is a closure operator. A pair `(S′, S)` with `S = S′′` is a
//! formal concept.

use crate::concept::Concept;
use crate::context::Context;
use crate::error::FcaError;
use crate::side::ItemKind;

impl Context {
    /// Derive `set` (drawn from side `kind`) onto the opposite side.
    ///
    /// Fails with `IndexOutOfRange` if a member is outside its side.
    pub fn prime(&self, set: &[usize], kind: ItemKind) -> Result<Vec<usize>, FcaError> {
        self.check_members(set, kind)?;
        Ok(self.derive(set, kind))
    }

    /// `prime(prime(set))`: the closure of `set` on its own side.
    pub fn closure(&self, set: &[usize], kind: ItemKind) -> Result<Vec<usize>, FcaError> {
        self.check_members(set, kind)?;
        Ok(self.close(set, kind))
    }

    /// Whether `set` equals its own closure.
    pub fn is_closed(&self, set: &[usize], kind: ItemKind) -> Result<bool, FcaError> {
        self.check_members(set, kind)?;
        let mut sorted = set.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        Ok(self.close(&sorted, kind) == sorted)
    }

    /// The concept generated by `set`: `(set′′, set′)` for objects,
    /// `(set′, set′′)` for attributes.
    pub fn concept_of(&self, set: &[usize], kind: ItemKind) -> Result<Concept, FcaError> {
        self.check_members(set, kind)?;
        Ok(self.generate(set, kind))
    }

    /// The attribute concept `({a}′, {a}′′)`.
    pub fn attribute_concept(&self, attribute: usize) -> Result<Concept, FcaError> {
        self.concept_of(&[attribute], ItemKind::Attribute)
    }

    /// The object concept `({o}′′, {o}′)`.
    pub fn object_concept(&self, object: usize) -> Result<Concept, FcaError> {
        self.concept_of(&[object], ItemKind::Object)
    }

    /// Derivation without range checks. Members must be in `1..=len(kind)`.
    ///
    /// The result is ascending and duplicate-free.
    pub(crate) fn derive(&self, set: &[usize], kind: ItemKind) -> Vec<usize> {
        match kind {
            ItemKind::Attribute => (1..=self.object_count())
                .filter(|&o| set.iter().all(|&a| self.incident(o, a)))
                .collect(),
            ItemKind::Object => (1..=self.attribute_count())
                .filter(|&a| set.iter().all(|&o| self.incident(o, a)))
                .collect(),
        }
    }

    pub(crate) fn close(&self, set: &[usize], kind: ItemKind) -> Vec<usize> {
        let derived = self.derive(set, kind);
        self.derive(&derived, kind.dual())
    }

    pub(crate) fn generate(&self, set: &[usize], kind: ItemKind) -> Concept {
        let derived = self.derive(set, kind);
        let closed = self.derive(&derived, kind.dual());
        match kind {
            ItemKind::Attribute => Concept::from_sorted(derived, closed),
            ItemKind::Object => Concept::from_sorted(closed, derived),
        }
    }

    fn check_members(&self, set: &[usize], kind: ItemKind) -> Result<(), FcaError> {
        let len = self.len(kind);
        match set.iter().find(|&&index| index == 0 || index > len) {
            Some(&index) => Err(FcaError::IndexOutOfRange { kind, index, len }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // objects 1..4, attributes a=1 b=2 c=3
    //   1: a b
    //   2: a   c
    //   3:   b c
    //   4: a b c
    fn ctx() -> Context {
        Context::from_matrix(&[
            vec![true, true, false],
            vec![true, false, true],
            vec![false, true, true],
            vec![true, true, true],
        ])
        .unwrap()
    }

    #[test]
    fn prime_of_attributes() {
        let ctx = ctx();
        assert_eq!(ctx.prime(&[1], ItemKind::Attribute).unwrap(), vec![1, 2, 4]);
        assert_eq!(ctx.prime(&[1, 2], ItemKind::Attribute).unwrap(), vec![1, 4]);
        assert_eq!(
            ctx.prime(&[], ItemKind::Attribute).unwrap(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn prime_of_objects() {
        let ctx = ctx();
        assert_eq!(ctx.prime(&[1, 2], ItemKind::Object).unwrap(), vec![1]);
        assert_eq!(ctx.prime(&[], ItemKind::Object).unwrap(), vec![1, 2, 3]);
        assert_eq!(ctx.prime(&[1, 2, 3], ItemKind::Object).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn out_of_range_member_is_rejected() {
        let ctx = ctx();
        let err = ctx.prime(&[4], ItemKind::Attribute).unwrap_err();
        assert!(matches!(
            err,
            FcaError::IndexOutOfRange {
                kind: ItemKind::Attribute,
                index: 4,
                len: 3
            }
        ));
        assert!(ctx.object_concept(0).is_err());
        assert!(ctx.attribute_concept(9).is_err());
    }

    #[test]
    fn antitone_on_every_attribute_pair() {
        let ctx = ctx();
        for a in 1..=3 {
            for b in 1..=3 {
                let small = ctx.prime(&[a], ItemKind::Attribute).unwrap();
                let big = ctx.prime(&[a, b], ItemKind::Attribute).unwrap();
                assert!(big.iter().all(|o| small.contains(o)));
            }
        }
    }

    #[test]
    fn triple_prime_equals_prime() {
        let ctx = ctx();
        for set in [vec![], vec![1], vec![2, 3], vec![1, 2, 3]] {
            let once = ctx.prime(&set, ItemKind::Object).unwrap();
            let thrice = ctx
                .prime(&ctx.closure(&set, ItemKind::Object).unwrap(), ItemKind::Object)
                .unwrap();
            assert_eq!(once, thrice);
        }
    }

    #[test]
    fn closedness() {
        let ctx = ctx();
        assert!(ctx.is_closed(&[1, 4], ItemKind::Object).unwrap());
        assert!(!ctx.is_closed(&[1], ItemKind::Object).unwrap());
        assert!(ctx.is_closed(&[], ItemKind::Attribute).unwrap());
    }

    #[test]
    fn object_and_attribute_concepts() {
        let ctx = ctx();
        let oc = ctx.object_concept(1).unwrap();
        assert_eq!(oc.extent(), &[1, 4]);
        assert_eq!(oc.intent(), &[1, 2]);

        let ac = ctx.attribute_concept(3).unwrap();
        assert_eq!(ac.extent(), &[2, 3, 4]);
        assert_eq!(ac.intent(), &[3]);
    }
}
