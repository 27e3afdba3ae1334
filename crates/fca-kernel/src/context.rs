//! The formal context: objects, attributes and their incidence relation.
//!
//! A context is an arena. Objects and attributes live in dense vectors
//! addressed by their 1-based index, and the incidence relation is a
//! row-major grid with exactly one cell per (object, attribute) pair.
//! Contiguity of indices is therefore a property of the vector lengths;
//! validation only has to confirm that the declared indices agree with the
//! positions they sit at.
//!
//! A `Context` can only be obtained through validation. The document
//! collaborator hands over a [`ContextDocument`]; `Context::try_from` (or
//! deserializing a `Context` directly) checks every structural invariant
//! before the kernel ever sees the data.

use crate::arrows::Arrow;
use crate::error::{FcaError, Invariant, Violation};
use crate::side::ItemKind;
use serde::{Deserialize, Serialize};

/// An object or an attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// 1-based position on its side.
    pub index: usize,

    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Optional free-text memo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Optional primary-key descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,

    /// Keywords copied from the item's source record.
    ///
    /// Checked against the primary keys of the other side by
    /// [`Context::check_primary_keys`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Indices this item absorbed during clarification, ascending.
    ///
    /// Recorded in the numbering that was current when the merge happened.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<usize>,
}

impl Item {
    /// A bare item carrying only its index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            label: None,
            memo: None,
            primary_key: None,
            keywords: Vec::new(),
            provenance: Vec::new(),
        }
    }

    /// Builder-style label setter.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// One entry of the incidence relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub object: usize,
    pub attribute: usize,
    pub value: bool,

    /// Arrow relation of a false cell, once classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow: Option<Arrow>,
}

/// Per-side clarification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStatus {
    #[serde(default)]
    pub objects_clarified: bool,

    #[serde(default)]
    pub attributes_clarified: bool,
}

impl ContextStatus {
    /// Whether the given side has been clarified.
    pub fn is_clarified(&self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Object => self.objects_clarified,
            ItemKind::Attribute => self.attributes_clarified,
        }
    }

    pub(crate) fn mark_clarified(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Object => self.objects_clarified = true,
            ItemKind::Attribute => self.attributes_clarified = true,
        }
    }

    /// A context that has never been clarified on either side.
    pub fn is_standard(&self) -> bool {
        !self.objects_clarified && !self.attributes_clarified
    }
}

/// The unvalidated shape of a context as handed over by a document loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDocument {
    #[serde(default)]
    pub title: String,

    pub objects: Vec<Item>,

    pub attributes: Vec<Item>,

    /// Row-major incidence cells.
    pub incidence: Vec<Cell>,

    #[serde(default)]
    pub status: ContextStatus,
}

impl ContextDocument {
    /// Build a document from a boolean matrix (one inner vector per object).
    ///
    /// Ragged rows are kept as-is so that validation reports them.
    pub fn from_matrix(rows: &[Vec<bool>]) -> Self {
        let attribute_count = rows.first().map_or(0, Vec::len);
        let objects = (1..=rows.len()).map(Item::new).collect();
        let attributes = (1..=attribute_count).map(Item::new).collect();
        let incidence = rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter().enumerate().map(move |(j, &value)| Cell {
                    object: i + 1,
                    attribute: j + 1,
                    value,
                    arrow: None,
                })
            })
            .collect();

        Self {
            title: String::new(),
            objects,
            attributes,
            incidence,
            status: ContextStatus::default(),
        }
    }

    /// Check every structural invariant, collecting all violations found.
    ///
    /// Incidence ordering problems are reported once (at the first offending
    /// cell) rather than per cell.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (position, item) in self.objects.iter().enumerate() {
            if item.index != position + 1 {
                violations.push(Violation::new(
                    Invariant::ObjectIndexOrder,
                    format!(
                        "object declared at position {} carries index {}",
                        position + 1,
                        item.index
                    ),
                ));
            }
        }

        for (position, item) in self.attributes.iter().enumerate() {
            if item.index != position + 1 {
                violations.push(Violation::new(
                    Invariant::AttributeIndexOrder,
                    format!(
                        "attribute declared at position {} carries index {}",
                        position + 1,
                        item.index
                    ),
                ));
            }
        }

        let n = self.objects.len();
        let m = self.attributes.len();
        if self.incidence.len() != n * m {
            violations.push(Violation::new(
                Invariant::IncidenceCompleteness,
                format!(
                    "expected {} incidence cells for {n} objects x {m} attributes, found {}",
                    n * m,
                    self.incidence.len()
                ),
            ));
        }

        if m > 0 {
            let misplaced = self.incidence.iter().enumerate().find(|(k, cell)| {
                cell.object != k / m + 1 || cell.attribute != k % m + 1
            });
            if let Some((k, cell)) = misplaced {
                violations.push(Violation::new(
                    Invariant::IncidenceOrder,
                    format!(
                        "cell #{} is ({}, {}), expected ({}, {})",
                        k + 1,
                        cell.object,
                        cell.attribute,
                        k / m + 1,
                        k % m + 1
                    ),
                ));
            }
        }

        for cell in &self.incidence {
            if cell.value && cell.arrow.is_some() {
                violations.push(Violation::new(
                    Invariant::ArrowPlacement,
                    format!(
                        "true cell ({}, {}) carries an arrow annotation",
                        cell.object, cell.attribute
                    ),
                ));
            }
        }

        violations
    }
}

/// A validated binary formal context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContextDocument", into = "ContextDocument")]
pub struct Context {
    title: String,
    objects: Vec<Item>,
    attributes: Vec<Item>,
    incidence: Vec<Cell>,
    status: ContextStatus,
}

impl TryFrom<ContextDocument> for Context {
    type Error = FcaError;

    fn try_from(document: ContextDocument) -> Result<Self, Self::Error> {
        let violations = document.violations();
        if !violations.is_empty() {
            return Err(FcaError::InvalidContext { violations });
        }

        Ok(Self {
            title: document.title,
            objects: document.objects,
            attributes: document.attributes,
            incidence: document.incidence,
            status: document.status,
        })
    }
}

impl From<Context> for ContextDocument {
    fn from(context: Context) -> Self {
        Self {
            title: context.title,
            objects: context.objects,
            attributes: context.attributes,
            incidence: context.incidence,
            status: context.status,
        }
    }
}

impl Context {
    /// Validate a document into a context.
    pub fn new(document: ContextDocument) -> Result<Self, FcaError> {
        Self::try_from(document)
    }

    /// Build an unlabelled context from a boolean matrix.
    pub fn from_matrix(rows: &[Vec<bool>]) -> Result<Self, FcaError> {
        Self::try_from(ContextDocument::from_matrix(rows))
    }

    /// Build a labelled context from a boolean matrix.
    pub fn labelled(
        object_labels: &[&str],
        attribute_labels: &[&str],
        rows: &[Vec<bool>],
    ) -> Result<Self, FcaError> {
        let mut document = ContextDocument::from_matrix(rows);
        if object_labels.len() != document.objects.len()
            || attribute_labels.len() != document.attributes.len()
        {
            return Err(FcaError::invalid(
                Invariant::LabelCount,
                format!(
                    "{} x {} labels for a {} x {} matrix",
                    object_labels.len(),
                    attribute_labels.len(),
                    document.objects.len(),
                    document.attributes.len()
                ),
            ));
        }
        for (item, label) in document.objects.iter_mut().zip(object_labels) {
            item.label = Some((*label).to_string());
        }
        for (item, label) in document.attributes.iter_mut().zip(attribute_labels) {
            item.label = Some((*label).to_string());
        }
        Self::try_from(document)
    }

    /// Re-check the structural invariants.
    ///
    /// Every public operation that depends on them calls this first.
    pub fn assert_valid(&self) -> Result<(), FcaError> {
        // Allocation-free scan first; the full report is only built on failure.
        let n = self.objects.len();
        let m = self.attributes.len();
        let consistent = self.incidence.len() == n * m
            && self.objects.iter().enumerate().all(|(p, o)| o.index == p + 1)
            && self
                .attributes
                .iter()
                .enumerate()
                .all(|(p, a)| a.index == p + 1)
            && self
                .incidence
                .iter()
                .enumerate()
                .all(|(k, c)| {
                    c.object == k / m + 1
                        && c.attribute == k % m + 1
                        && !(c.value && c.arrow.is_some())
                });
        if consistent {
            return Ok(());
        }

        let violations = ContextDocument::from(self.clone()).violations();
        Err(FcaError::InvalidContext { violations })
    }

    /// Document title, empty if none was given.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Clarification flags.
    pub fn status(&self) -> ContextStatus {
        self.status
    }

    /// Object declarations in index order.
    pub fn objects(&self) -> &[Item] {
        &self.objects
    }

    /// Attribute declarations in index order.
    pub fn attributes(&self) -> &[Item] {
        &self.attributes
    }

    /// Declarations of one side.
    pub fn items(&self, kind: ItemKind) -> &[Item] {
        match kind {
            ItemKind::Object => &self.objects,
            ItemKind::Attribute => &self.attributes,
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Number of items on one side.
    pub fn len(&self, kind: ItemKind) -> usize {
        self.items(kind).len()
    }

    /// Whether the context has no objects and no attributes.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.attributes.is_empty()
    }

    /// One object by index, `None` outside `1..=N`.
    pub fn object(&self, index: usize) -> Option<&Item> {
        index.checked_sub(1).and_then(|i| self.objects.get(i))
    }

    /// One attribute by index, `None` outside `1..=M`.
    pub fn attribute(&self, index: usize) -> Option<&Item> {
        index.checked_sub(1).and_then(|i| self.attributes.get(i))
    }

    /// One item by side and index.
    pub fn item(&self, kind: ItemKind, index: usize) -> Option<&Item> {
        index.checked_sub(1).and_then(|i| self.items(kind).get(i))
    }

    /// Sorted, deduplicated objects for the given indices.
    ///
    /// Returns `None` if any index is absent; an empty selection is
    /// `Some(vec![])`.
    pub fn objects_by_indices(&self, indices: &[usize]) -> Option<Vec<&Item>> {
        self.items_by_indices(ItemKind::Object, indices)
    }

    /// Sorted, deduplicated attributes for the given indices.
    ///
    /// Same contract as [`Context::objects_by_indices`].
    pub fn attributes_by_indices(&self, indices: &[usize]) -> Option<Vec<&Item>> {
        self.items_by_indices(ItemKind::Attribute, indices)
    }

    /// Side-generic form of the multi-index selectors.
    pub fn items_by_indices(&self, kind: ItemKind, indices: &[usize]) -> Option<Vec<&Item>> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        sorted
            .into_iter()
            .map(|index| self.item(kind, index))
            .collect()
    }

    /// All cells of one object, ascending by attribute.
    pub fn row(&self, object: usize) -> Option<&[Cell]> {
        if object == 0 || object > self.objects.len() {
            return None;
        }
        let m = self.attributes.len();
        Some(&self.incidence[(object - 1) * m..object * m])
    }

    /// All cells of one attribute, ascending by object.
    pub fn column(&self, attribute: usize) -> Option<Vec<&Cell>> {
        if attribute == 0 || attribute > self.attributes.len() {
            return None;
        }
        let m = self.attributes.len();
        Some(
            self.incidence
                .iter()
                .skip(attribute - 1)
                .step_by(m)
                .collect(),
        )
    }

    /// The cell at (object, attribute), `None` outside the grid.
    pub fn cell(&self, object: usize, attribute: usize) -> Option<&Cell> {
        if object == 0
            || attribute == 0
            || object > self.objects.len()
            || attribute > self.attributes.len()
        {
            return None;
        }
        self.incidence.get(self.offset(object, attribute))
    }

    /// The incidence value at (object, attribute), `None` outside the grid.
    pub fn value(&self, object: usize, attribute: usize) -> Option<bool> {
        self.cell(object, attribute).map(|c| c.value)
    }

    /// The arrow annotation at (object, attribute), if any.
    pub fn arrow(&self, object: usize, attribute: usize) -> Option<Arrow> {
        self.cell(object, attribute).and_then(|c| c.arrow)
    }

    /// Every incidence cell, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.incidence
    }

    /// Upper bound on the number of concepts: `2^min(N, M)`.
    pub fn max_concept_count(&self) -> u128 {
        let width = self.objects.len().min(self.attributes.len());
        pow2_saturating(width)
    }

    /// Upper bound on the number of implications: `2^(2M)`.
    pub fn max_implication_count(&self) -> u128 {
        pow2_saturating(2 * self.attributes.len())
    }

    /// Check source keywords against the primary keys of the other side.
    ///
    /// For every item on `kind` (both sides when `None`, objects first)
    /// that carries keywords, each cell of its row or column whose
    /// counterpart has a primary key must agree with it: a true cell needs
    /// the key among the keywords, a false cell must not list it. Items
    /// without keywords and counterparts without a key are skipped.
    ///
    /// Returns the first disagreement found.
    pub fn check_primary_keys(&self, kind: Option<ItemKind>) -> Result<(), FcaError> {
        self.assert_valid()?;
        let kinds = match kind {
            Some(kind) => vec![kind],
            None => vec![ItemKind::Object, ItemKind::Attribute],
        };
        for kind in kinds {
            let others = self.items(kind.dual());
            for item in self.items(kind).iter().filter(|i| !i.keywords.is_empty()) {
                for other in others {
                    let Some(key) = other.primary_key.as_deref().filter(|k| !k.is_empty()) else {
                        continue;
                    };
                    let incident = match kind {
                        ItemKind::Object => self.incident(item.index, other.index),
                        ItemKind::Attribute => self.incident(other.index, item.index),
                    };
                    let listed = item.keywords.iter().any(|k| k == key);
                    if incident != listed {
                        return Err(FcaError::PrimaryKeyMismatch {
                            kind,
                            index: item.index,
                            other: other.index,
                            key: key.to_string(),
                            incident,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    // Unchecked accessors for the hot loops. Indices are 1-based and must be
    // in range; callers guarantee that.

    #[inline]
    fn offset(&self, object: usize, attribute: usize) -> usize {
        (object - 1) * self.attributes.len() + (attribute - 1)
    }

    #[inline]
    pub(crate) fn incident(&self, object: usize, attribute: usize) -> bool {
        self.incidence[self.offset(object, attribute)].value
    }

    pub(crate) fn set_arrow(&mut self, object: usize, attribute: usize, arrow: Option<Arrow>) {
        let offset = self.offset(object, attribute);
        self.incidence[offset].arrow = arrow;
    }

    pub(crate) fn clear_arrows(&mut self) {
        for cell in &mut self.incidence {
            cell.arrow = None;
        }
    }

    pub(crate) fn status_mut(&mut self) -> &mut ContextStatus {
        &mut self.status
    }

    /// Swap in a fully rebuilt arena.
    ///
    /// The caller must hand over a consistent structure; it is only used by
    /// the clarifier after it has built every piece.
    pub(crate) fn replace_structure(
        &mut self,
        objects: Vec<Item>,
        attributes: Vec<Item>,
        incidence: Vec<Cell>,
    ) {
        self.objects = objects;
        self.attributes = attributes;
        self.incidence = incidence;
    }
}

fn pow2_saturating(exponent: usize) -> u128 {
    if exponent >= 128 {
        u128::MAX
    } else {
        1u128 << exponent
    }
}
