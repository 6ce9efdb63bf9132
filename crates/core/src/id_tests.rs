// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

crate::define_id! {
    /// Id type exercised by the macro tests.
    pub struct SampleId("smp-");
}

#[test]
fn minted_ids_carry_prefix_and_full_length() {
    let id = SampleId::new();
    assert!(id.as_str().starts_with(SampleId::PREFIX));
    assert_eq!(id.as_str().len(), ID_LEN);
}

#[test]
fn minted_ids_are_unique() {
    assert_ne!(SampleId::new(), SampleId::new());
}

#[test]
fn from_string_round_trips() {
    let id = SampleId::from_string("smp-abc123");
    assert_eq!(id.as_str(), "smp-abc123");
    assert_eq!(id, SampleId::from_string("smp-abc123"));
}

#[test]
fn display_and_as_str_agree() {
    let id = SampleId::new();
    assert_eq!(format!("{id}"), id.as_str());
    assert_eq!(format!("{id:?}"), format!("SampleId({:?})", id.as_str()));
}

#[test]
fn serde_is_a_transparent_string() {
    let id = SampleId::from_string("smp-xyz");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"smp-xyz\"");
    let back: SampleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}

#[test]
fn oversized_ids_fail_to_deserialize() {
    let long = format!("\"{}\"", "x".repeat(ID_LEN + 1));
    let result: Result<SampleId, _> = serde_json::from_str(&long);
    assert!(result.is_err());
}

// --- RawId tests ---

#[test]
fn parse_keeps_whole_characters_when_clamping() {
    // 22 ASCII bytes plus one 2-byte character straddling the limit.
    let input = format!("{}é", "a".repeat(ID_LEN - 1));
    let raw = RawId::parse(&input);
    assert_eq!(raw.as_str(), "a".repeat(ID_LEN - 1));
}

#[test]
fn raw_ids_hash_and_compare_by_contents() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(RawId::parse("one"));
    set.insert(RawId::parse("one"));
    set.insert(RawId::parse("two"));
    assert_eq!(set.len(), 2);
}

// --- short() tests ---

#[test]
fn short_truncates_long_strings() {
    assert_eq!(short("abcdefghijklmnop", 8), "abcdefgh");
    assert_eq!(short("abc", 8), "abc");
    assert_eq!(short("abcdefgh", 8), "abcdefgh");
}

#[test]
fn short_respects_character_boundaries() {
    assert_eq!(short("héllo", 2), "hé");
}
