// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn defaults() {
    let config = EngineConfig::new("programs/demo");
    assert_eq!(config.source, "programs/demo");
    assert_eq!(config.name, "programs/demo");
    assert_eq!(config.max_ticks, DEFAULT_MAX_TICKS);
    assert!(config.db_path.is_none());
}

#[test]
fn setters_override() {
    let config = EngineConfig::new("src")
        .name("demo")
        .max_ticks(5)
        .db_path("/tmp/orchard.db");
    assert_eq!(config.name, "demo");
    assert_eq!(config.max_ticks, 5);
    assert_eq!(config.db_path.as_deref(), Some(std::path::Path::new("/tmp/orchard.db")));
}

#[test]
#[serial]
fn from_env_reads_knobs() {
    std::env::set_var("ORCHARD_MAX_TICKS", "17");
    std::env::set_var("ORCHARD_DB", "/tmp/env.db");
    let config = EngineConfig::new("src").from_env();
    std::env::remove_var("ORCHARD_MAX_TICKS");
    std::env::remove_var("ORCHARD_DB");

    assert_eq!(config.max_ticks, 17);
    assert_eq!(config.db_path.as_deref(), Some(std::path::Path::new("/tmp/env.db")));
}

#[test]
#[serial]
fn from_env_ignores_malformed_values() {
    std::env::set_var("ORCHARD_MAX_TICKS", "not-a-number");
    std::env::set_var("ORCHARD_DB", "");
    let config = EngineConfig::new("src").from_env();
    std::env::remove_var("ORCHARD_MAX_TICKS");
    std::env::remove_var("ORCHARD_DB");

    assert_eq!(config.max_ticks, DEFAULT_MAX_TICKS);
    assert!(config.db_path.is_none());
}
