//! Clarification: merging objects (attributes) with identical rows (columns).
//!
//! Clarifying never gains or loses a closed set: the clarified lattice is
//! isomorphic to the original. Each side is clarified at most once; the
//! per-side flag in [`ContextStatus`](crate::context::ContextStatus) turns a
//! second request into a no-op.
//!
//! The pass works on a copy of the arena and swaps it in only once every
//! requested side has been merged and re-indexed, so a caller never observes
//! a half-clarified context.

use crate::context::{Cell, Context, Item};
use crate::error::FcaError;
use crate::side::{ItemKind, Selection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One group of identical items collapsed into a survivor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    pub kind: ItemKind,

    /// Survivor's index before the pass.
    pub survivor: usize,

    /// Survivor's index after re-indexing.
    pub reindexed: usize,

    /// Indices (before the pass) of the items folded into the survivor.
    pub absorbed: Vec<usize>,
}

/// What a clarification pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarifyReport {
    pub merges: Vec<Merge>,

    /// Sides that were already clarified and left untouched.
    pub skipped: Vec<ItemKind>,
}

impl ClarifyReport {
    /// Total number of items removed.
    pub fn removed(&self) -> usize {
        self.merges.iter().map(|m| m.absorbed.len()).sum()
    }

    /// Whether the pass changed the context's structure.
    pub fn changed(&self) -> bool {
        !self.merges.is_empty()
    }
}

impl Context {
    /// Groups of identical rows (objects) or columns (attributes).
    ///
    /// Each group lists the lowest index first; singletons are omitted.
    pub fn duplicate_groups(&self, kind: ItemKind) -> Vec<Vec<usize>> {
        let len = self.len(kind);
        let mut taken = vec![false; len + 1];
        let mut groups = Vec::new();

        for i in 1..=len {
            if taken[i] {
                continue;
            }
            let mut group = vec![i];
            for j in (i + 1)..=len {
                if !taken[j] && self.same_line(kind, i, j) {
                    taken[j] = true;
                    group.push(j);
                }
            }
            if group.len() > 1 {
                groups.push(group);
            }
        }

        groups
    }

    /// Merge duplicate items on the selected side(s) and re-index.
    ///
    /// Surviving items keep their row/column content and record the indices
    /// they absorbed in their provenance. Indices stay contiguous from 1.
    /// Existing arrow annotations are cleared when anything was merged.
    #[tracing::instrument(skip(self), fields(objects = self.object_count(), attributes = self.attribute_count()))]
    pub fn clarify(&mut self, selection: Selection) -> Result<ClarifyReport, FcaError> {
        self.assert_valid()?;

        let mut report = ClarifyReport::default();
        let mut work = self.clone();

        for &kind in selection.kinds() {
            if work.status().is_clarified(kind) {
                debug!(side = %kind, "already clarified; skipping");
                report.skipped.push(kind);
                continue;
            }

            let groups = work.duplicate_groups(kind);
            if !groups.is_empty() {
                report.merges.extend(work.collapse(kind, &groups));
            }
            work.status_mut().mark_clarified(kind);
        }

        if report.changed() {
            work.clear_arrows();
        }
        work.assert_valid()?;
        *self = work;

        info!(
            merges = report.merges.len(),
            removed = report.removed(),
            objects = self.object_count(),
            attributes = self.attribute_count(),
            "clarification finished"
        );
        Ok(report)
    }

    fn same_line(&self, kind: ItemKind, i: usize, j: usize) -> bool {
        match kind {
            ItemKind::Object => {
                (1..=self.attribute_count()).all(|a| self.incident(i, a) == self.incident(j, a))
            }
            ItemKind::Attribute => {
                (1..=self.object_count()).all(|o| self.incident(o, i) == self.incident(o, j))
            }
        }
    }

    /// Remove every absorbed item of `kind`, re-index the survivors and
    /// rebuild the incidence grid.
    fn collapse(&mut self, kind: ItemKind, groups: &[Vec<usize>]) -> Vec<Merge> {
        let len = self.len(kind);

        // remap[old] = new index, or None for an absorbed item.
        let mut absorbed_by = vec![None; len + 1];
        for group in groups {
            for &member in &group[1..] {
                absorbed_by[member] = Some(group[0]);
            }
        }
        let mut remap = vec![None; len + 1];
        let mut next = 0;
        for old in 1..=len {
            if absorbed_by[old].is_none() {
                next += 1;
                remap[old] = Some(next);
            }
        }

        let old_items = self.items(kind);
        let mut items: Vec<Item> = Vec::with_capacity(next);
        for (old, item) in old_items.iter().enumerate().map(|(p, item)| (p + 1, item)) {
            let Some(new_index) = remap[old] else {
                continue;
            };
            let mut survivor = item.clone();
            survivor.index = new_index;
            if let Some(group) = groups.iter().find(|g| g[0] == old) {
                for &member in &group[1..] {
                    survivor.provenance.push(member);
                    survivor
                        .provenance
                        .extend_from_slice(&old_items[member - 1].provenance);
                }
                survivor.provenance.sort_unstable();
                survivor.provenance.dedup();
            }
            items.push(survivor);
        }

        let incidence: Vec<Cell> = self
            .cells()
            .iter()
            .filter_map(|cell| {
                let mut cell = cell.clone();
                match kind {
                    ItemKind::Object => cell.object = remap[cell.object]?,
                    ItemKind::Attribute => cell.attribute = remap[cell.attribute]?,
                }
                Some(cell)
            })
            .collect();

        let merges = groups
            .iter()
            .filter_map(|group| {
                Some(Merge {
                    kind,
                    survivor: group[0],
                    reindexed: remap[group[0]]?,
                    absorbed: group[1..].to_vec(),
                })
            })
            .collect();

        match kind {
            ItemKind::Object => {
                let attributes = self.attributes().to_vec();
                self.replace_structure(items, attributes, incidence);
            }
            ItemKind::Attribute => {
                let objects = self.objects().to_vec();
                self.replace_structure(objects, items, incidence);
            }
        }

        merges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnumerationConfig;
    use crate::enumerate::enumerate;

    // objects 1 and 3 share a row; attributes 2 and 3 share a column.
    fn ctx() -> Context {
        Context::from_matrix(&[
            vec![true, false, false],
            vec![false, true, true],
            vec![true, false, false],
            vec![true, true, true],
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_groups_found_per_side() {
        let ctx = ctx();
        assert_eq!(ctx.duplicate_groups(ItemKind::Object), vec![vec![1, 3]]);
        assert_eq!(ctx.duplicate_groups(ItemKind::Attribute), vec![vec![2, 3]]);
    }

    #[test]
    fn clarify_objects_merges_and_reindexes() {
        let mut ctx = ctx();
        let report = ctx.clarify(Selection::Objects).unwrap();

        assert_eq!(report.merges.len(), 1);
        assert_eq!(report.merges[0].survivor, 1);
        assert_eq!(report.merges[0].absorbed, vec![3]);
        assert_eq!(ctx.object_count(), 3);
        assert_eq!(ctx.object(1).unwrap().provenance, vec![3]);

        // Old object 4 is now object 3 with its row intact.
        let row: Vec<bool> = ctx.row(3).unwrap().iter().map(|c| c.value).collect();
        assert_eq!(row, vec![true, true, true]);
        let indices: Vec<usize> = ctx.objects().iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(ctx.status().objects_clarified);
        assert!(!ctx.status().attributes_clarified);
    }

    #[test]
    fn clarify_both_sides() {
        let mut ctx = ctx();
        let before = enumerate(&ctx, &EnumerationConfig::default()).unwrap().len();
        let report = ctx.clarify(Selection::Both).unwrap();

        assert_eq!(report.removed(), 2);
        assert_eq!(ctx.object_count(), 3);
        assert_eq!(ctx.attribute_count(), 2);
        assert_eq!(ctx.attribute(2).unwrap().provenance, vec![3]);
        assert!(ctx.assert_valid().is_ok());

        let after = enumerate(&ctx, &EnumerationConfig::default()).unwrap().len();
        assert_eq!(before, after);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut ctx = ctx();
        ctx.clarify(Selection::Both).unwrap();
        let snapshot = ctx.clone();

        let report = ctx.clarify(Selection::Both).unwrap();
        assert!(!report.changed());
        assert_eq!(report.skipped, vec![ItemKind::Object, ItemKind::Attribute]);
        assert_eq!(ctx, snapshot);
    }

    #[test]
    fn triple_duplicates_collapse_into_lowest() {
        let mut ctx = Context::from_matrix(&[
            vec![true, false],
            vec![true, false],
            vec![false, true],
            vec![true, false],
        ])
        .unwrap();
        let report = ctx.clarify(Selection::Objects).unwrap();
        assert_eq!(report.merges.len(), 1);
        assert_eq!(report.merges[0].absorbed, vec![2, 4]);
        assert_eq!(report.merges[0].reindexed, 1);
        assert_eq!(ctx.object_count(), 2);
        assert_eq!(ctx.object(1).unwrap().provenance, vec![2, 4]);
        assert_eq!(ctx.value(2, 2), Some(true));
    }

    #[test]
    fn already_clarified_context_only_gains_the_flag() {
        let mut ctx = Context::from_matrix(&[vec![true, false], vec![false, true]]).unwrap();
        let report = ctx.clarify(Selection::Both).unwrap();
        assert!(!report.changed());
        assert!(report.skipped.is_empty());
        assert!(ctx.status().objects_clarified && ctx.status().attributes_clarified);
    }
}
