//! Concept enumeration.
//!
//! Three interchangeable strategies produce the same concept set:
//!
//! - [`PowerSet`]: walk every subset `B` of the chosen side and keep
//!   `(B′, B)` when `B = B′′`. `2^k` closure tests, so it is only usable for
//!   narrow sides; the width is bounded by
//!   [`EnumerationConfig::max_power_set_width`].
//! - [`Iteration`]: start from the top concept and close the set of extents
//!   (or intents) under intersection with each principal extent, as a
//!   worklist fixed point.
//! - [`ParallelPowerSet`]: the power-set test over contiguous rank ranges
//!   on a worker pool, with cooperative cancellation.
//!
//! Subsets are identified with their canonical code: rank `r` over a side of
//! width `k` is the subset whose canonical encoding equals `r`.

use crate::cancel::CancellationToken;
use crate::concept::{Concept, intersect};
use crate::config::{Algorithm, EnumerationConfig, POWER_SET_WIDTH_CAP};
use crate::context::Context;
use crate::encode::CanonicalCode;
use crate::error::FcaError;
use crate::lattice::Lattice;
use crate::side::{ItemKind, Side};
use rayon::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Partitions handed out per worker in the parallel search.
const PARTITIONS_PER_WORKER: usize = 4;

/// A concept search strategy.
pub trait ConceptSearch {
    /// Strategy name (for diagnostics).
    fn name(&self) -> &str;

    /// Enumerate every concept, walking the given side.
    ///
    /// The context is assumed valid; [`enumerate`] checks it first.
    fn search(&self, context: &Context, kind: ItemKind) -> Result<Vec<Concept>, FcaError>;
}

/// Enumerate the concept lattice of `context` as configured.
///
/// The parallel strategy runs with a private cancellation token; use
/// [`ParallelPowerSet::new`] with [`enumerate_with`] to keep a handle.
pub fn enumerate(context: &Context, config: &EnumerationConfig) -> Result<Lattice, FcaError> {
    match config.algorithm {
        Algorithm::PowerSet => enumerate_with(
            context,
            config.side,
            &PowerSet::new(config.width_limit()),
        ),
        Algorithm::Iteration => enumerate_with(context, config.side, &Iteration),
        Algorithm::ParallelPowerSet => enumerate_with(
            context,
            config.side,
            &ParallelPowerSet::new(config.workers, CancellationToken::new())
                .with_width_limit(config.width_limit()),
        ),
    }
}

/// Enumerate with an explicit strategy.
#[tracing::instrument(skip(context, strategy), fields(strategy = strategy.name()))]
pub fn enumerate_with(
    context: &Context,
    side: Side,
    strategy: &dyn ConceptSearch,
) -> Result<Lattice, FcaError> {
    context.assert_valid()?;
    let kind = side.resolve(context.object_count(), context.attribute_count());
    let concepts = strategy.search(context, kind)?;
    info!(
        concepts = concepts.len(),
        objects = context.object_count(),
        attributes = context.attribute_count(),
        side = %kind,
        "concept search finished"
    );
    Ok(Lattice::from_concepts(
        context.object_count(),
        context.attribute_count(),
        concepts,
    ))
}

/// Every subset of `{1..k}`, produced by backtracking.
///
/// The current set is kept strictly increasing; each step drops the trailing
/// run of top values `k, k-1, …` and inserts the next lower value. Starts at
/// the empty set, ends at the full set, and visits all `2^k` subsets once.
#[derive(Debug, Clone)]
pub struct Subsets {
    width: usize,
    current: Vec<usize>,
    done: bool,
}

impl Subsets {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            current: Vec::with_capacity(width),
            done: false,
        }
    }
}

impl Iterator for Subsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let out = self.current.clone();
        if self.current.len() == self.width {
            self.done = true;
        } else {
            let mut index = self.width;
            while self.current.last() == Some(&index) {
                self.current.pop();
                index -= 1;
            }
            self.current.push(index);
        }
        Some(out)
    }
}

/// The subset of `{1..width}` whose canonical code is `rank`.
pub fn subset_of_rank(rank: u64, width: usize) -> Vec<usize> {
    (1..=width)
        .filter(|&i| (rank >> (width - i)) & 1 == 1)
        .collect()
}

/// Closure test shared by both power-set strategies.
fn accept(context: &Context, kind: ItemKind, candidate: Vec<usize>) -> Option<Concept> {
    let derived = context.derive(&candidate, kind);
    if context.derive(&derived, kind.dual()) != candidate {
        return None;
    }
    Some(match kind {
        ItemKind::Attribute => Concept::from_sorted(derived, candidate),
        ItemKind::Object => Concept::from_sorted(candidate, derived),
    })
}

fn check_width(context: &Context, kind: ItemKind, limit: usize) -> Result<usize, FcaError> {
    let limit = limit.min(POWER_SET_WIDTH_CAP);
    let size = context.len(kind);
    if size > limit {
        return Err(FcaError::SearchSpaceTooLarge { kind, size, limit });
    }
    Ok(size)
}

/// Naive power-set search.
#[derive(Debug, Clone)]
pub struct PowerSet {
    width_limit: usize,
}

impl PowerSet {
    /// `width_limit` is capped at [`POWER_SET_WIDTH_CAP`].
    pub fn new(width_limit: usize) -> Self {
        Self {
            width_limit: width_limit.min(POWER_SET_WIDTH_CAP),
        }
    }
}

impl Default for PowerSet {
    fn default() -> Self {
        Self::new(EnumerationConfig::default().width_limit())
    }
}

impl ConceptSearch for PowerSet {
    fn name(&self) -> &str {
        "power_set"
    }

    fn search(&self, context: &Context, kind: ItemKind) -> Result<Vec<Concept>, FcaError> {
        let width = check_width(context, kind, self.width_limit)?;
        let mut concepts: Vec<Concept> = Subsets::new(width)
            .filter_map(|candidate| accept(context, kind, candidate))
            .collect();
        concepts.sort_by(Concept::dominance_cmp);
        debug!(width, concepts = concepts.len(), "power set walked");
        Ok(concepts)
    }
}

/// Incremental meet-closure search.
///
/// Concepts are returned in the order they were discovered.
#[derive(Debug, Clone, Copy, Default)]
pub struct Iteration;

impl ConceptSearch for Iteration {
    fn name(&self) -> &str {
        "iteration"
    }

    fn search(&self, context: &Context, kind: ItemKind) -> Result<Vec<Concept>, FcaError> {
        // Attribute side: close object extents under intersection with each
        // attribute extent. Object side: the dual on intents.
        let closed_kind = kind.dual();
        let universe = context.len(closed_kind);
        let half = |c: &Concept| -> Vec<usize> {
            match kind {
                ItemKind::Attribute => c.extent().to_vec(),
                ItemKind::Object => c.intent().to_vec(),
            }
        };

        let full: Vec<usize> = (1..=universe).collect();
        let top = context.generate(&full, closed_kind);
        let mut seen: HashSet<CanonicalCode> = HashSet::new();
        seen.insert(CanonicalCode::encode(&half(&top), universe));
        let mut concepts = vec![top];
        let mut meets = 0usize;

        for element in 1..=context.len(kind) {
            let principal = context.derive(&[element], kind);
            let mut pending: VecDeque<usize> = (0..concepts.len()).collect();

            while let Some(position) = pending.pop_front() {
                meets += 1;
                let meet = intersect(&half(&concepts[position]), &principal);
                if !seen.insert(CanonicalCode::encode(&meet, universe)) {
                    continue;
                }
                let derived = context.derive(&meet, closed_kind);
                concepts.push(match kind {
                    ItemKind::Attribute => Concept::from_sorted(meet, derived),
                    ItemKind::Object => Concept::from_sorted(derived, meet),
                });
                pending.push_back(concepts.len() - 1);
            }
        }

        debug!(meets, concepts = concepts.len(), "meet closure reached a fixed point");
        Ok(concepts)
    }
}

/// Power-set search split across a rayon worker pool.
///
/// Workers share the context by reference (it is never mutated during the
/// search) and append accepted concepts to a shared collection. The
/// cancellation token is polled when a worker picks up a partition and
/// before each subset it walks; once it is set the whole search fails with
/// [`FcaError::Cancelled`] and no partial result is returned.
#[derive(Debug, Clone)]
pub struct ParallelPowerSet {
    workers: Option<usize>,
    width_limit: usize,
    cancel: CancellationToken,
}

impl ParallelPowerSet {
    /// `workers = None` uses the pool's default thread count.
    pub fn new(workers: Option<usize>, cancel: CancellationToken) -> Self {
        Self {
            workers,
            width_limit: EnumerationConfig::default().width_limit(),
            cancel,
        }
    }

    /// `width_limit` is capped at [`POWER_SET_WIDTH_CAP`].
    pub fn with_width_limit(mut self, width_limit: usize) -> Self {
        self.width_limit = width_limit.min(POWER_SET_WIDTH_CAP);
        self
    }

    /// The token this search polls.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl ConceptSearch for ParallelPowerSet {
    fn name(&self) -> &str {
        "parallel_power_set"
    }

    fn search(&self, context: &Context, kind: ItemKind) -> Result<Vec<Concept>, FcaError> {
        let width = check_width(context, kind, self.width_limit)?;
        if self.cancel.is_cancelled() {
            warn!("cancelled before any partition started");
            return Err(FcaError::Cancelled);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers.unwrap_or(0))
            .build()?;

        let total: u64 = 1u64 << width;
        let partitions = (pool.current_num_threads() * PARTITIONS_PER_WORKER)
            .clamp(1, usize::try_from(total).unwrap_or(usize::MAX));
        let chunk = total.div_ceil(partitions as u64);
        let found: Mutex<Vec<Concept>> = Mutex::new(Vec::new());

        pool.install(|| {
            (0..partitions).into_par_iter().for_each(|partition| {
                if self.cancel.is_cancelled() {
                    return;
                }
                let start = partition as u64 * chunk;
                let end = start.saturating_add(chunk).min(total);
                let accepted: Vec<Concept> = (start..end)
                    .take_while(|_| !self.cancel.is_cancelled())
                    .filter_map(|rank| accept(context, kind, subset_of_rank(rank, width)))
                    .collect();
                found
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(accepted);
            });
        });

        if self.cancel.is_cancelled() {
            warn!(partitions, "parallel concept search cancelled; discarding results");
            return Err(FcaError::Cancelled);
        }

        let mut concepts = found.into_inner().unwrap_or_else(PoisonError::into_inner);
        concepts.sort_by(Concept::dominance_cmp);
        debug!(
            width,
            partitions,
            workers = pool.current_num_threads(),
            concepts = concepts.len(),
            "parallel power set walked"
        );
        Ok(concepts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Context {
        Context::labelled(&["1", "2"], &["a", "b"], &[vec![true, false], vec![false, true]])
            .unwrap()
    }

    fn chain() -> Context {
        // Nested rows over three attributes: {a}, {a,b}, {a,b,c}.
        Context::from_matrix(&[
            vec![true, false, false],
            vec![true, true, false],
            vec![true, true, true],
        ])
        .unwrap()
    }

    #[test]
    fn subsets_visit_every_subset_once() {
        let all: Vec<Vec<usize>> = Subsets::new(3).collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all.first().unwrap(), &Vec::<usize>::new());
        assert_eq!(all.last().unwrap(), &vec![1, 2, 3]);
        let distinct: HashSet<Vec<usize>> = all.iter().cloned().collect();
        assert_eq!(distinct.len(), 8);
        assert!(all.iter().all(|s| s.windows(2).all(|w| w[0] < w[1])));
    }

    #[test]
    fn subsets_of_width_zero_and_two() {
        assert_eq!(Subsets::new(0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(
            Subsets::new(2).collect::<Vec<_>>(),
            vec![vec![], vec![2], vec![1], vec![1, 2]]
        );
    }

    #[test]
    fn rank_matches_canonical_code() {
        for rank in 0..16u64 {
            let subset = subset_of_rank(rank, 4);
            assert_eq!(CanonicalCode::encode(&subset, 4).to_u64(), Some(rank));
        }
    }

    #[test]
    fn scenario_has_four_concepts_under_every_strategy() {
        let ctx = scenario();
        let strategies: Vec<Box<dyn ConceptSearch>> = vec![
            Box::new(PowerSet::default()),
            Box::new(Iteration),
            Box::new(ParallelPowerSet::new(Some(2), CancellationToken::new())),
        ];
        let expected = Lattice::from_concepts(
            2,
            2,
            vec![
                Concept::new(vec![1, 2], vec![]),
                Concept::new(vec![1], vec![1]),
                Concept::new(vec![2], vec![2]),
                Concept::new(vec![], vec![1, 2]),
            ],
        );
        for strategy in &strategies {
            for side in [Side::Attribute, Side::Object, Side::Auto] {
                let lattice = enumerate_with(&ctx, side, strategy.as_ref()).unwrap();
                assert_eq!(lattice.len(), 4, "{} over {side}", strategy.name());
                assert!(lattice.equals(&expected), "{} over {side}", strategy.name());
            }
        }
    }

    #[test]
    fn chain_context() {
        // Every object has `a`, so the empty attribute set closes to {a} and
        // the full attribute set is realized by object 3: three concepts.
        let ctx = chain();
        let lattice = enumerate(&ctx, &EnumerationConfig::default()).unwrap();
        assert_eq!(lattice.len(), 3);
        let intents: Vec<Vec<usize>> = lattice
            .sorted()
            .iter()
            .map(|c| c.intent().to_vec())
            .collect();
        assert_eq!(intents, vec![vec![1], vec![1, 2], vec![1, 2, 3]]);
    }

    #[test]
    fn width_limit_is_enforced() {
        let ctx = chain();
        let err = enumerate_with(&ctx, Side::Attribute, &PowerSet::new(2)).unwrap_err();
        assert!(matches!(
            err,
            FcaError::SearchSpaceTooLarge {
                kind: ItemKind::Attribute,
                size: 3,
                limit: 2
            }
        ));
    }

    #[test]
    fn width_beyond_the_rank_cap_is_rejected() {
        let ctx = Context::from_matrix(&[vec![false; 64]]).unwrap();
        let power_set = PowerSet::new(64);
        let parallel =
            ParallelPowerSet::new(Some(2), CancellationToken::new()).with_width_limit(64);
        let strategies: [&dyn ConceptSearch; 2] = [&power_set, &parallel];
        for strategy in strategies {
            let err = enumerate_with(&ctx, Side::Attribute, strategy).unwrap_err();
            assert!(
                matches!(
                    err,
                    FcaError::SearchSpaceTooLarge {
                        kind: ItemKind::Attribute,
                        size: 64,
                        limit: POWER_SET_WIDTH_CAP
                    }
                ),
                "{}: {err}",
                strategy.name()
            );
        }

        // The object side is one wide and still searchable.
        let lattice = enumerate_with(&ctx, Side::Object, &parallel).unwrap();
        assert_eq!(lattice.len(), 2);
    }

    #[test]
    fn cancelled_before_start_returns_cancelled() {
        let ctx = chain();
        let token = CancellationToken::new();
        token.cancel();
        let strategy = ParallelPowerSet::new(Some(2), token.clone());
        let err = enumerate_with(&ctx, Side::Auto, &strategy).unwrap_err();
        assert!(matches!(err, FcaError::Cancelled));
        assert!(token.is_cancelled());
        assert!(strategy.cancellation().is_cancelled());
    }

    #[test]
    fn empty_context_has_exactly_the_top_concept() {
        let ctx = Context::from_matrix(&[]).unwrap();
        for algorithm in [
            Algorithm::PowerSet,
            Algorithm::Iteration,
            Algorithm::ParallelPowerSet,
        ] {
            let config = EnumerationConfig::default().with_algorithm(algorithm);
            let lattice = enumerate(&ctx, &config).unwrap();
            assert_eq!(lattice.len(), 1, "{algorithm}");
        }
    }
}
