// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory half of the state pair.
//!
//! Same five-operation surface as the persistent store (get, set,
//! snapshot, enqueue, commit), but values vanish at process end. The
//! engine routes volatile-target write ops here at commit.

use crate::persistent::Transition;
use crate::version::VersionMap;
use orchard_core::{Value, WriteOp};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Volatile kv store with version tracking.
pub struct VolatileStore {
    values: HashMap<String, Value>,
    queue: Vec<WriteOp>,
    versions: Arc<Mutex<VersionMap>>,
}

impl VolatileStore {
    pub fn new(versions: Arc<Mutex<VersionMap>>) -> Self {
        Self { values: HashMap::new(), queue: Vec::new(), versions }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Apply a value immediately, outside the queue/commit discipline.
    ///
    /// Legal only outside a tick; in-tick mutation goes through
    /// [`VolatileStore::enqueue`].
    pub fn set_now(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let changed = self.values.get(&key) != Some(&value);
        self.values.insert(key.clone(), value);
        if changed {
            self.versions.lock().bump_key(&key);
        }
    }

    /// Queue a deferred write for the next commit.
    pub fn enqueue(&mut self, op: WriteOp) {
        self.queue.push(op);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Apply every queued write in enqueue order. Returns transitions for
    /// keys whose value actually changed; versions bump for those only.
    pub fn commit(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for op in std::mem::take(&mut self.queue) {
            let old = self.values.get(&op.key).cloned();
            if old.as_ref() == Some(&op.value) {
                continue;
            }
            self.values.insert(op.key.clone(), op.value.clone());
            self.versions.lock().bump_key(&op.key);
            transitions.push(Transition {
                key: op.key,
                old_value: old,
                new_value: op.value,
                trigger: op.trigger,
                origin: op.origin,
            });
        }
        transitions
    }

    /// Frozen copy of current values for a render snapshot.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.values.clone()
    }
}

#[cfg(test)]
#[path = "volatile_tests.rs"]
mod tests;
