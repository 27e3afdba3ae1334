//! The two sides of a formal context.
//!
//! Every set handled by the kernel is drawn from exactly one side: the
//! objects (rows) or the attributes (columns). The derivation operator maps
//! one side onto the other, so most operations are parameterized by which
//! side they start from.

use std::fmt;
use std::str::FromStr;

/// Which side of the context an index set is drawn from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Rows of the incidence relation.
    Object,

    /// Columns of the incidence relation.
    Attribute,
}

impl ItemKind {
    /// The opposite side: where the derivation operator lands.
    pub fn dual(self) -> Self {
        match self {
            Self::Object => Self::Attribute,
            Self::Attribute => Self::Object,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Attribute => write!(f, "attribute"),
        }
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "object" | "objects" | "row" | "rows" => Ok(Self::Object),
            "attribute" | "attributes" | "column" | "columns" => Ok(Self::Attribute),
            _ => Err(format!("unknown item kind: {s}")),
        }
    }
}

/// The side a concept search enumerates over.
///
/// The choice changes how many closure tests are run, never which concepts
/// are found.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Pick whichever side has fewer elements (attributes on a tie).
    #[default]
    Auto,

    /// Enumerate attribute sets and derive extents.
    Attribute,

    /// Enumerate object sets and derive intents.
    Object,
}

impl Side {
    /// Resolve to a concrete side for a context of the given shape.
    pub fn resolve(self, object_count: usize, attribute_count: usize) -> ItemKind {
        match self {
            Self::Attribute => ItemKind::Attribute,
            Self::Object => ItemKind::Object,
            Self::Auto if attribute_count <= object_count => ItemKind::Attribute,
            Self::Auto => ItemKind::Object,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Attribute => write!(f, "attribute"),
            Self::Object => write!(f, "object"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" | "generic" | "smallest" => Ok(Self::Auto),
            other => other
                .parse::<ItemKind>()
                .map(|kind| match kind {
                    ItemKind::Attribute => Self::Attribute,
                    ItemKind::Object => Self::Object,
                })
                .map_err(|_| format!("unknown side: {s}")),
        }
    }
}

/// Which side(s) a structural reduction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Objects,
    Attributes,
    Both,
}

impl Selection {
    /// The concrete sides covered, objects first.
    pub fn kinds(self) -> &'static [ItemKind] {
        match self {
            Self::Objects => &[ItemKind::Object],
            Self::Attributes => &[ItemKind::Attribute],
            Self::Both => &[ItemKind::Object, ItemKind::Attribute],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_side_prefers_smaller_universe() {
        assert_eq!(Side::Auto.resolve(5, 3), ItemKind::Attribute);
        assert_eq!(Side::Auto.resolve(3, 5), ItemKind::Object);
        assert_eq!(Side::Auto.resolve(4, 4), ItemKind::Attribute);
        assert_eq!(Side::Object.resolve(5, 3), ItemKind::Object);
    }

    #[test]
    fn side_parse() {
        assert_eq!("auto".parse::<Side>().unwrap(), Side::Auto);
        assert_eq!("Generic".parse::<Side>().unwrap(), Side::Auto);
        assert_eq!("attributes".parse::<Side>().unwrap(), Side::Attribute);
        assert_eq!("object".parse::<Side>().unwrap(), Side::Object);
        assert!("diagonal".parse::<Side>().is_err());
    }

    #[test]
    fn dual_flips() {
        assert_eq!(ItemKind::Object.dual(), ItemKind::Attribute);
        assert_eq!(ItemKind::Attribute.dual().dual(), ItemKind::Attribute);
    }
}
