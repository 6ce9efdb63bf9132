// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred state mutations.
//!
//! A [`WriteOp`] is queued during rendering, callbacks, and effects, and
//! applied atomically at commit. Ops never touch a store directly; the
//! commit phase owns application order (enqueue order) and version bumps.

use crate::Value;
use serde::{Deserialize, Serialize};

/// Which store a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateTarget {
    /// In-memory, wiped at process exit.
    Volatile,
    /// SQLite-backed, survives across runs and supports resume.
    Persistent,
}

crate::display_labels! {
    StateTarget {
        Volatile => "volatile",
        Persistent => "persistent",
    }
}

/// One deferred mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub target: StateTarget,
    pub key: String,
    pub value: Value,
    /// Short label naming what caused the write (e.g. "promote",
    /// "loop-advance"). Recorded in the transitions audit row.
    pub trigger: String,
    /// Where the write was queued from (node path, effect path, or
    /// "engine").
    pub origin: String,
}

impl WriteOp {
    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("target", self.target.to_string()),
            ("key", self.key.clone()),
            ("trigger", self.trigger.clone()),
            ("origin", self.origin.clone()),
        ]
    }
}

/// Ordered queue of deferred writes for one tick.
///
/// Handed to event callbacks and effects; drained by the engine at commit.
#[derive(Debug, Default)]
pub struct WriteQueue {
    ops: Vec<WriteOp>,
    /// Origin stamped onto ops queued while a callback runs.
    origin: String,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin label stamped onto subsequently queued ops.
    pub fn with_origin(&mut self, origin: impl Into<String>) -> &mut Self {
        self.origin = origin.into();
        self
    }

    /// Queue a write against the persistent store.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>, trigger: impl Into<String>) {
        self.push(StateTarget::Persistent, key, value, trigger);
    }

    /// Queue a write against the volatile store.
    pub fn set_volatile(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        trigger: impl Into<String>,
    ) {
        self.push(StateTarget::Volatile, key, value, trigger);
    }

    fn push(
        &mut self,
        target: StateTarget,
        key: impl Into<String>,
        value: impl Into<Value>,
        trigger: impl Into<String>,
    ) {
        self.ops.push(WriteOp {
            target,
            key: key.into(),
            value: value.into(),
            trigger: trigger.into(),
            origin: self.origin.clone(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Append every op from `other`, preserving its internal order.
    pub fn absorb(&mut self, other: WriteQueue) {
        self.ops.extend(other.ops);
    }

    /// Drain all queued ops in enqueue order.
    pub fn drain(&mut self) -> Vec<WriteOp> {
        std::mem::take(&mut self.ops)
    }

    /// Peek at queued ops without draining.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

#[cfg(test)]
#[path = "write_tests.rs"]
mod tests;
