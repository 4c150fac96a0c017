//! Export artifacts written to disk.

use std::fs;

use indexmap::IndexMap;
use serde_json::Value;
use tp_core::export::{self, DATA_FILE, INDEX_FILE, SYMBOL_FILE};
use tp_core::prelude::*;
use tp_test_utils::determinism::verify_export_determinism;
use tp_test_utils::fixtures::{hero_registry, hero_registry_unverified, hero_roster};

fn read_index(text: &str) -> IndexMap<String, [usize; 2]> {
    serde_json::from_str(text).unwrap()
}

// ==========================================================================
// Artifact Layout
// ==========================================================================

#[test]
fn test_write_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let reg = hero_registry();
    let summary = export::write(&reg, &out, &["Extra".to_owned()]).unwrap();
    assert_eq!(summary.resources, reg.len());

    let symbols: Vec<String> = serde_json::from_str(&fs::read_to_string(out.join(SYMBOL_FILE)).unwrap()).unwrap();
    assert_eq!(symbols[0], "Extra");
    assert_eq!(symbols.len(), summary.symbols);
    let rest = &symbols[1..];
    assert!(rest.windows(2).all(|w| w[0] < w[1]), "symbols must be sorted: {rest:?}");
    for symbol in ["Hero", "Blade", "Bow", "Power", "Ring"] {
        assert!(rest.iter().any(|s| s == symbol), "missing symbol {symbol}");
    }

    let data = fs::read_to_string(out.join(DATA_FILE)).unwrap();
    assert_eq!(data.len(), summary.bytes);
    assert!(data.starts_with("[\r\n{"));
    assert!(data.ends_with("}\r\n]"));

    let index = read_index(&fs::read_to_string(out.join(INDEX_FILE)).unwrap());
    let ids: Vec<&str> = reg.resources().map(Resource::id).collect();
    assert_eq!(index.keys().map(String::as_str).collect::<Vec<_>>(), ids);
    for (id, [offset, len]) in &index {
        let record: Value = serde_json::from_str(&data[*offset..offset + len]).unwrap();
        assert_eq!(record["id"], id.as_str());
    }
}

#[test]
fn test_records_carry_kind_tags() {
    let artifacts = export::render(&hero_registry(), &[]).unwrap();
    let records: Vec<Value> = serde_json::from_str(&artifacts.data).unwrap();
    let tag = |id: &str| {
        records
            .iter()
            .find(|record| record["id"] == id)
            .map(|record| record["T"].clone())
            .unwrap()
    };
    assert_eq!(tag("Character.Hero"), "Character");
    assert_eq!(tag("Action.Hero.Idle"), "ActionIdle");
    assert_eq!(tag("Action.Hero.Slash"), "ActionGeneral");
    assert_eq!(tag("Action.Hero.Run"), "ActionMove");

    let slash = records.iter().find(|record| record["id"] == "Action.Hero.Slash").unwrap();
    assert_eq!(slash["enabled"]["id"], "#.Hero.Blade.Combo");
    assert_eq!(slash["enabled"]["values"], serde_json::json!([false, true]));
}

#[test]
fn test_write_replaces_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.json"), "{}").unwrap();

    export::write(&hero_registry(), &out, &[]).unwrap();
    assert!(!out.join("stale.json").exists());
    assert!(out.join(DATA_FILE).exists());
}

#[test]
fn test_failed_verify_leaves_output_alone() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.json"), "{}").unwrap();

    let mut roster = hero_roster();
    roster.perks.shift_remove("Perk.Hero.Aim");
    let mut reg = Registry::new();
    roster.register(&mut reg).unwrap();

    assert!(export::write(&reg, &out, &[]).is_err());
    assert!(out.join("keep.json").exists());
    assert!(!out.join(DATA_FILE).exists());
}

// ==========================================================================
// Determinism
// ==========================================================================

#[test]
fn test_export_is_deterministic() {
    verify_export_determinism(3, hero_registry_unverified, &["Extra".to_owned()])
        .unwrap()
        .assert_deterministic();
}
