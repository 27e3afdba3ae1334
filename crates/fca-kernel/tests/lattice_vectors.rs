//! Integration tests: run the context fixtures end to end.
//!
//! Each fixture in tests/fixtures/ has:
//! - context.json: either a full context document (objects, attributes,
//!   incidence) or a labelled matrix with rows written as `x`/`.` strings
//! - expect.json: the concepts in dominance order, the clarification report
//!   and the arrow table of the clarified context
//!
//! Every strategy is run on both sides and must reproduce the same concepts.

use fca_kernel::{
    Algorithm, Context, EnumerationConfig, Lattice, Selection, Side, enumerate,
};
use serde_json::Value;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(name: &str, file: &str) -> Value {
    let path = fixtures_dir().join(name).join(file);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn load_context(name: &str) -> Context {
    let value = read_json(name, "context.json");
    if value.get("incidence").is_some() {
        return serde_json::from_value(value)
            .unwrap_or_else(|e| panic!("fixture {name}: invalid context document: {e}"));
    }

    let labels = |key: &str| -> Vec<String> {
        serde_json::from_value(value[key].clone())
            .unwrap_or_else(|e| panic!("fixture {name}: bad {key}: {e}"))
    };
    let objects = labels("objects");
    let attributes = labels("attributes");
    let rows: Vec<Vec<bool>> = labels("rows")
        .iter()
        .map(|row| row.chars().map(|c| c == 'x').collect())
        .collect();

    let object_refs: Vec<&str> = objects.iter().map(String::as_str).collect();
    let attribute_refs: Vec<&str> = attributes.iter().map(String::as_str).collect();
    let mut context = Context::labelled(&object_refs, &attribute_refs, &rows)
        .unwrap_or_else(|e| panic!("fixture {name}: {e}"));
    if let Some(title) = value["title"].as_str() {
        context.set_title(title);
    }
    context
}

fn arrow_table(context: &Context) -> Vec<String> {
    (1..=context.object_count())
        .map(|o| {
            (1..=context.attribute_count())
                .map(|a| match (context.value(o, a), context.arrow(o, a)) {
                    (Some(true), _) => "x",
                    (_, Some(arrow)) => arrow.symbol(),
                    _ => ".",
                })
                .collect()
        })
        .collect()
}

fn all_lattices(context: &Context) -> Vec<(String, Lattice)> {
    let mut out = Vec::new();
    for algorithm in [
        Algorithm::PowerSet,
        Algorithm::Iteration,
        Algorithm::ParallelPowerSet,
    ] {
        for side in [Side::Object, Side::Attribute, Side::Auto] {
            let config = EnumerationConfig::default()
                .with_algorithm(algorithm)
                .with_side(side)
                .with_workers(2);
            let lattice = enumerate(context, &config)
                .unwrap_or_else(|e| panic!("{algorithm} over {side}: {e}"));
            out.push((format!("{algorithm}/{side}"), lattice));
        }
    }
    out
}

fn run_fixture(name: &str) {
    let expected = read_json(name, "expect.json");
    let mut context = load_context(name);

    // Enumeration
    let lattices = all_lattices(&context);
    let (_, reference) = &lattices[0];
    for (label, lattice) in &lattices {
        let concepts = serde_json::to_value(lattice.clone().sorted().concepts())
            .expect("failed to serialize concepts");
        assert_eq!(
            concepts,
            expected["concepts"],
            "\n\nFixture: {name} ({label})\n\nGot:\n{}\n",
            serde_json::to_string_pretty(&concepts).unwrap(),
        );
        assert_eq!(
            Some(lattice.len() as u64),
            expected["concept_count"].as_u64()
        );
        assert!(lattice.equals(reference), "fixture {name}: {label} differs");
        assert_eq!(lattice.fingerprint(), reference.fingerprint());
    }

    // Clarification
    let report = context
        .clarify(Selection::Both)
        .unwrap_or_else(|e| panic!("fixture {name}: clarify failed: {e}"));
    let clarified = &expected["clarified"];
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        clarified["report"],
        "fixture {name}: clarify report"
    );
    assert_eq!(
        Some(context.object_count() as u64),
        clarified["objects"].as_u64()
    );
    assert_eq!(
        Some(context.attribute_count() as u64),
        clarified["attributes"].as_u64()
    );
    let after = enumerate(&context, &EnumerationConfig::default()).unwrap();
    assert_eq!(Some(after.len() as u64), clarified["concept_count"].as_u64());

    // Arrows
    let arrows = context
        .classify_arrows()
        .unwrap_or_else(|e| panic!("fixture {name}: arrows failed: {e}"));
    assert_eq!(
        serde_json::to_value(arrows).unwrap(),
        expected["arrows"]["report"],
        "fixture {name}: arrow report"
    );
    let table: Vec<Value> = arrow_table(&context).into_iter().map(Value::from).collect();
    assert_eq!(
        Value::from(table),
        expected["arrows"]["table"],
        "fixture {name}: arrow table"
    );
}

#[test]
fn two_by_two() {
    run_fixture("two_by_two");
}

#[test]
fn duplicates() {
    run_fixture("duplicates");
}

#[test]
fn contranominal_4() {
    run_fixture("contranominal_4");
}

#[test]
fn living_beings() {
    run_fixture("living_beings");
}

#[test]
fn document_fixture_round_trips() {
    let context = load_context("two_by_two");
    let value = serde_json::to_value(&context).unwrap();
    let back: Context = serde_json::from_value(value).unwrap();
    assert_eq!(back, context);
    assert_eq!(back.title(), "two by two");
}
