// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frozen state view for one render.

use orchard_core::{StateTarget, Value};
use std::collections::HashMap;

/// Immutable view of both stores as of the snapshot phase.
///
/// Rendering reads exclusively from this view; concurrent `set`s (there
/// are none under the single-threaded discipline, but executors queue
/// writes) never show through until the next tick's snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    volatile: HashMap<String, Value>,
    persistent: HashMap<String, Value>,
}

impl Snapshot {
    pub fn new(volatile: HashMap<String, Value>, persistent: HashMap<String, Value>) -> Self {
        Self { volatile, persistent }
    }

    pub fn get(&self, target: StateTarget, key: &str) -> Option<&Value> {
        match target {
            StateTarget::Volatile => self.volatile.get(key),
            StateTarget::Persistent => self.persistent.get(key),
        }
    }

    /// Persistent value for `key`.
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.persistent.get(key)
    }

    /// Volatile value for `key`.
    pub fn volatile(&self, key: &str) -> Option<&Value> {
        self.volatile.get(key)
    }

    /// Persistent value, defaulting to null.
    pub fn state_or_null(&self, key: &str) -> Value {
        self.persistent.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.volatile.len() + self.persistent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volatile.is_empty() && self.persistent.is_empty()
    }
}
