//! Plain-text rendering of items, concepts and implications.
//!
//! These are the strings report writers and protocol logs print. Sets are
//! written `{1, 2, 3}`; with labels requested, an item's label replaces its
//! index when it has one.

use crate::concept::Concept;
use crate::context::{Context, Item};
use crate::side::ItemKind;
use serde::{Deserialize, Serialize};

/// An attribute implication `premise => conclusion` with its supporting
/// objects. A missing conclusion means the premise is never realized (`⊥`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implication {
    pub premise: Vec<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<Vec<usize>>,

    #[serde(default)]
    pub support: Vec<usize>,
}

fn token(item: &Item, with_label: bool) -> String {
    match (&item.label, with_label) {
        (Some(label), true) => label.clone(),
        _ => item.index.to_string(),
    }
}

fn braced<I>(tokens: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let body: Vec<String> = tokens.into_iter().collect();
    format!("{{{}}}", body.join(", "))
}

/// `{1, 2}` or `{red, green}`.
pub fn format_set<'a>(items: impl IntoIterator<Item = &'a Item>, with_label: bool) -> String {
    braced(items.into_iter().map(|item| token(item, with_label)))
}

/// A single item in braces; `{}` for no item.
pub fn format_item_braced(item: Option<&Item>, with_label: bool) -> String {
    braced(item.map(|item| token(item, with_label)))
}

/// `{extent} {intent}`: extent by index, intent by label when asked.
///
/// Indices the context does not know are written as plain numbers.
pub fn format_concept(context: &Context, concept: &Concept, with_label: bool) -> String {
    format!(
        "{} {}",
        format_indices(context, ItemKind::Object, concept.extent(), false),
        format_indices(context, ItemKind::Attribute, concept.intent(), with_label),
    )
}

/// A concept line followed by the object and attribute it is labelled
/// with in the line diagram: `{extent} {intent} Labels: {object} {attribute}`.
///
/// The object label is written by index, the attribute label by name. A
/// missing or unknown label renders as `{}`.
pub fn format_labelled_concept(
    context: &Context,
    concept: &Concept,
    object_label: Option<usize>,
    attribute_label: Option<usize>,
) -> String {
    format!(
        "{} Labels: {} {}",
        format_concept(context, concept, true),
        format_item_braced(object_label.and_then(|o| context.object(o)), false),
        format_item_braced(attribute_label.and_then(|a| context.attribute(a)), true),
    )
}

/// `<support count> {premise} => {conclusion}`, with `⊥` for a missing
/// conclusion and, optionally, the supporting object indices appended.
pub fn format_implication(
    context: &Context,
    implication: &Implication,
    with_support: bool,
) -> String {
    let mut out = format!(
        "<{}> {} => ",
        implication.support.len(),
        format_indices(context, ItemKind::Attribute, &implication.premise, true),
    );
    match &implication.conclusion {
        Some(conclusion) => {
            out.push_str(&format_indices(context, ItemKind::Attribute, conclusion, true));
        }
        None => out.push('⊥'),
    }
    if with_support {
        out.push(' ');
        out.push_str(&braced(implication.support.iter().map(usize::to_string)));
    }
    out
}

/// One-line descriptor of an item.
///
/// Objects read `index: label|memo|-`, attributes read
/// `label|index: primary_key|memo|-`.
pub fn describe_item(item: &Item, kind: ItemKind) -> String {
    match kind {
        ItemKind::Object => {
            let text = item.label.as_deref().or(item.memo.as_deref()).unwrap_or("-");
            format!("{}: {text}", item.index)
        }
        ItemKind::Attribute => {
            let name = item.label.clone().unwrap_or_else(|| item.index.to_string());
            let text = item
                .primary_key
                .as_deref()
                .or(item.memo.as_deref())
                .unwrap_or("-");
            format!("{name}: {text}")
        }
    }
}

fn format_indices(
    context: &Context,
    kind: ItemKind,
    indices: &[usize],
    with_label: bool,
) -> String {
    braced(indices.iter().map(|&index| match context.item(kind, index) {
        Some(item) => token(item, with_label),
        None => index.to_string(),
    }))
}
