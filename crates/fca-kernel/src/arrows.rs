//! Arrow relations on the empty cells of a clarified context.
//!
//! For a cell `(o, a)` with `o` not incident to `a`:
//!
//! - `o ↗ a` when every attribute extent strictly above `a`'s contains `o`;
//! - `o ↙ a` when every object intent strictly above `o`'s contains `a`.
//!
//! Both, one or neither may hold. The result is written onto the cells
//! themselves so renderers can read it back through [`Context::arrow`].

use crate::concept::is_proper_subset;
use crate::context::Context;
use crate::error::FcaError;
use crate::side::ItemKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// The arrow relation recorded on an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrow {
    Up,
    Down,
    Both,
    NotApplicable,
}

impl Arrow {
    /// Combine the two arrow conditions into one annotation.
    pub fn classify(up: bool, down: bool) -> Self {
        match (up, down) {
            (true, true) => Self::Both,
            (true, false) => Self::Up,
            (false, true) => Self::Down,
            (false, false) => Self::NotApplicable,
        }
    }

    /// Single-character form used in rendered cross tables.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Up => "+",
            Self::Down => "-",
            Self::Both => "0",
            Self::NotApplicable => "!",
        }
    }

    pub fn is_up(self) -> bool {
        matches!(self, Self::Up | Self::Both)
    }

    pub fn is_down(self) -> bool {
        matches!(self, Self::Down | Self::Both)
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Both => write!(f, "both"),
            Self::NotApplicable => write!(f, "not_applicable"),
        }
    }
}

impl FromStr for Arrow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "up" | "+" => Ok(Self::Up),
            "down" | "-" => Ok(Self::Down),
            "both" | "0" | ":" => Ok(Self::Both),
            "not_applicable" | "na" | "n/a" | "!" => Ok(Self::NotApplicable),
            _ => Err(format!("unknown arrow: {s}")),
        }
    }
}

/// Tally of one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowReport {
    pub up: usize,
    pub down: usize,
    pub both: usize,
    pub not_applicable: usize,
}

impl ArrowReport {
    fn record(&mut self, arrow: Arrow) {
        match arrow {
            Arrow::Up => self.up += 1,
            Arrow::Down => self.down += 1,
            Arrow::Both => self.both += 1,
            Arrow::NotApplicable => self.not_applicable += 1,
        }
    }

    /// Number of annotated cells.
    pub fn total(&self) -> usize {
        self.up + self.down + self.both + self.not_applicable
    }
}

impl Context {
    /// Annotate every empty cell with its arrow relation.
    ///
    /// Fails with [`FcaError::NotClarified`] unless both sides carry the
    /// clarified flag. Re-running overwrites earlier annotations.
    #[tracing::instrument(skip(self), fields(objects = self.object_count(), attributes = self.attribute_count()))]
    pub fn classify_arrows(&mut self) -> Result<ArrowReport, FcaError> {
        self.assert_valid()?;
        for kind in [ItemKind::Object, ItemKind::Attribute] {
            if !self.status().is_clarified(kind) {
                return Err(FcaError::NotClarified { side: kind });
            }
        }

        // Principal extents of attributes and principal intents of objects,
        // computed once for the whole pass.
        let extents: Vec<Vec<usize>> = (1..=self.attribute_count())
            .map(|a| self.derive(&[a], ItemKind::Attribute))
            .collect();
        let intents: Vec<Vec<usize>> = (1..=self.object_count())
            .map(|o| self.derive(&[o], ItemKind::Object))
            .collect();

        let mut report = ArrowReport::default();
        for o in 1..=self.object_count() {
            for a in 1..=self.attribute_count() {
                if self.incident(o, a) {
                    continue;
                }
                let arrow = Arrow::classify(
                    up_holds(&extents, o, a),
                    down_holds(&intents, o, a),
                );
                self.set_arrow(o, a, Some(arrow));
                report.record(arrow);
            }
        }

        info!(
            up = report.up,
            down = report.down,
            both = report.both,
            not_applicable = report.not_applicable,
            "arrow classification finished"
        );
        Ok(report)
    }
}

fn up_holds(extents: &[Vec<usize>], object: usize, attribute: usize) -> bool {
    let base = &extents[attribute - 1];
    extents
        .iter()
        .filter(|extent| is_proper_subset(base, extent))
        .all(|extent| extent.binary_search(&object).is_ok())
}

fn down_holds(intents: &[Vec<usize>], object: usize, attribute: usize) -> bool {
    let base = &intents[object - 1];
    intents
        .iter()
        .filter(|intent| is_proper_subset(base, intent))
        .all(|intent| intent.binary_search(&attribute).is_ok())
}
