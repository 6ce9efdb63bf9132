// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect registration types.
//!
//! Components register effects during render; the engine runs them after
//! commit, deduplicated by (component path, slot) and dependency tuple.
//! Effects never render and never touch stores directly; writes they
//! queue surface on the next tick.

use orchard_core::{Value, WriteQueue};
use orchard_store::Snapshot;
use std::sync::Arc;

/// Context handed to an effect run (and to its cleanup).
pub struct EffectCtx<'a> {
    /// Queue feeding the *next* tick's commit.
    pub queue: &'a mut WriteQueue,
    /// The snapshot the enclosing tick rendered against.
    pub snapshot: &'a Snapshot,
}

/// Cleanup recorded by an effect run; invoked before the next run with
/// changed deps, and on unmount.
pub type CleanupFn = Arc<dyn Fn(&mut EffectCtx<'_>) + Send + Sync>;

/// One effect body. Returns an optional cleanup.
pub type EffectFn = Arc<dyn Fn(&mut EffectCtx<'_>) -> Option<CleanupFn> + Send + Sync>;

/// A registration collected during render.
#[derive(Clone)]
pub struct EffectRegistration {
    /// Component path the effect belongs to.
    pub path: String,
    /// Declaration index within the component.
    pub slot: usize,
    /// Dependency tuple compared by value equality, slot for slot.
    pub deps: Vec<Value>,
    pub run: EffectFn,
}

impl std::fmt::Debug for EffectRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistration")
            .field("path", &self.path)
            .field("slot", &self.slot)
            .field("deps", &self.deps)
            .finish()
    }
}
