//! Error types for concept lattice operations.

use crate::side::ItemKind;

/// Errors raised by the kernel's public operations.
#[derive(Debug, thiserror::Error)]
pub enum FcaError {
    /// The context breaks a structural invariant (index gaps, duplicates,
    /// incomplete or misordered incidence).
    #[error("invalid context: {}", summarize(.violations))]
    InvalidContext { violations: Vec<Violation> },

    /// Arrow relations were requested on a context with reducible duplicates.
    #[error("context is not clarified on the {side} side")]
    NotClarified { side: ItemKind },

    /// A parallel search was cancelled; no partial result is returned.
    #[error("concept search cancelled")]
    Cancelled,

    /// A mandatory lookup addressed an index outside `1..=len`.
    #[error("{kind} index {index} out of range 1..={len}")]
    IndexOutOfRange {
        kind: ItemKind,
        index: usize,
        len: usize,
    },

    /// A power-set search was asked to walk more subsets than allowed.
    #[error("power set over {size} {kind}s exceeds the configured width limit of {limit}")]
    SearchSpaceTooLarge {
        kind: ItemKind,
        size: usize,
        limit: usize,
    },

    /// An item's source keywords disagree with the primary key of an item
    /// on the other side: a true cell whose key is missing, or a false cell
    /// whose key is listed.
    #[error(
        "{kind} {index}: primary key {key:?} of {} {other} is {}",
        dual(.kind),
        mismatch(.incident)
    )]
    PrimaryKeyMismatch {
        kind: ItemKind,
        index: usize,
        other: usize,
        key: String,
        incident: bool,
    },

    /// Enumeration configuration could not be parsed.
    #[error("invalid enumeration config: {0}")]
    Config(#[from] toml::de::Error),

    /// The worker pool for the parallel search could not be built.
    #[error("worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl FcaError {
    pub(crate) fn invalid(invariant: Invariant, description: impl Into<String>) -> Self {
        Self::InvalidContext {
            violations: vec![Violation::new(invariant, description)],
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    match violations {
        [] => "no violations recorded".to_string(),
        [only] => only.description.clone(),
        [first, rest @ ..] => format!("{} (+{} more)", first.description, rest.len()),
    }
}

fn dual(kind: &ItemKind) -> ItemKind {
    kind.dual()
}

fn mismatch(incident: &bool) -> &'static str {
    if *incident {
        "missing from its keywords"
    } else {
        "listed for a false cell"
    }
}

/// Which structural invariant of a context was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invariant {
    /// Object indices must be exactly `1..=N` in declaration order.
    ObjectIndexOrder,

    /// Attribute indices must be exactly `1..=M` in declaration order.
    AttributeIndexOrder,

    /// Incidence entries must be object-major, attribute-ascending.
    IncidenceOrder,

    /// Exactly one incidence entry per (object, attribute) pair.
    IncidenceCompleteness,

    /// Arrow annotations may only sit on false cells.
    ArrowPlacement,

    /// Labels, when given, must cover every item on their side.
    LabelCount,
}

/// A concrete violation found while validating a context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    pub invariant: Invariant,
    pub description: String,
}

impl Violation {
    pub fn new(invariant: Invariant, description: impl Into<String>) -> Self {
        Self {
            invariant,
            description: description.into(),
        }
    }
}
