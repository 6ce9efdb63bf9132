// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.

use std::path::PathBuf;

/// Default tick cap per execution.
pub const DEFAULT_MAX_TICKS: u64 = 200;

/// Configuration for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Program source identifier; resume matches `running` executions on
    /// this.
    pub source: String,
    /// Human-readable execution name.
    pub name: String,
    /// SQLite file; `None` runs against an in-memory database (no
    /// resume across processes).
    pub db_path: Option<PathBuf>,
    /// Hard tick cap; exceeding it stops the run with reason
    /// `iteration-cap`.
    pub max_ticks: u64,
}

impl EngineConfig {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            name: source.clone(),
            source,
            db_path: None,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    orchard_core::setters! {
        into {
            name: String,
        }
        set {
            max_ticks: u64,
        }
        option {
            db_path: PathBuf,
        }
    }

    /// Apply `ORCHARD_MAX_TICKS` and `ORCHARD_DB` when set; malformed
    /// values are ignored.
    pub fn from_env(mut self) -> Self {
        if let Ok(raw) = std::env::var("ORCHARD_MAX_TICKS") {
            if let Ok(ticks) = raw.parse::<u64>() {
                self.max_ticks = ticks;
            }
        }
        if let Ok(path) = std::env::var("ORCHARD_DB") {
            if !path.is_empty() {
                self.db_path = Some(PathBuf::from(path));
            }
        }
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
