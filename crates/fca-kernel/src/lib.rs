//! # FCA Kernel
//!
//! Formal concept analysis over binary contexts: the Galois derivation
//! between objects and attributes, enumeration of every formal concept,
//! lossless clarification of duplicate rows and columns, and the arrow
//! relations that expose reducible items.
//!
//! Three enumeration strategies (naive power set, incremental closure and a
//! parallel power set) must agree on every context; lattices are compared
//! through a canonical bit encoding so that agreement can be checked
//! independently of the order concepts were found in.
//!
//! ## Architecture
//!
//! ```text
//! Context                ← Objects × attributes, 1-based, row-major cells
//!     │
//! derivation             ← prime / closure: the Galois connection
//!     │
//! ConceptSearch          ← PowerSet, Iteration, ParallelPowerSet
//!     │
//! Lattice                ← Concept set in dominance order
//!     │
//! CanonicalCode          ← Bit encoding for equality and fingerprints
//!
//! clarify / arrows       ← Mutating passes over a validated Context
//! ```

pub mod arrows;
pub mod cancel;
pub mod clarify;
pub mod concept;
pub mod config;
pub mod context;
pub mod derivation;
pub mod encode;
pub mod enumerate;
pub mod error;
pub mod format;
pub mod lattice;
pub mod side;

pub use arrows::{Arrow, ArrowReport};
pub use cancel::CancellationToken;
pub use clarify::{ClarifyReport, Merge};
pub use concept::Concept;
pub use config::{Algorithm, EnumerationConfig};
pub use context::{Cell, Context, ContextDocument, ContextStatus, Item};
pub use encode::CanonicalCode;
pub use enumerate::{
    ConceptSearch, Iteration, ParallelPowerSet, PowerSet, enumerate, enumerate_with,
};
pub use error::{FcaError, Invariant, Violation};
pub use format::Implication;
pub use lattice::{Lattice, LatticeDigest, lattices_equal};
pub use side::{ItemKind, Selection, Side};
