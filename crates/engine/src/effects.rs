// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred-effect registry.
//!
//! Effects are deduplicated by (component path, slot) and re-run only
//! when their dependency tuple changes, compared by value equality slot
//! for slot. Registration order is render order, which is declaration
//! order within a component and parent-before-child across components;
//! runs follow it. Entries whose component did not render this tick are
//! pruned, running their recorded cleanup in reverse registration order.

use indexmap::IndexMap;
use orchard_core::Value;
use orchard_program::{CleanupFn, EffectCtx, EffectRegistration};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EffectKey {
    path: String,
    slot: usize,
}

struct EffectEntry {
    deps: Vec<Value>,
    cleanup: Option<CleanupFn>,
}

/// Registry of effects that survived past renders.
#[derive(Default)]
pub(crate) struct EffectRegistry {
    entries: IndexMap<EffectKey, EffectEntry>,
}

impl EffectRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run the post-commit effects phase for one tick.
    ///
    /// Returns how many effect bodies executed.
    pub(crate) fn run(
        &mut self,
        registrations: &[EffectRegistration],
        ctx: &mut EffectCtx<'_>,
    ) -> usize {
        // Unmount pass: entries that did not re-register disappear,
        // cleanups run in reverse registration order.
        let live: HashSet<EffectKey> = registrations
            .iter()
            .map(|r| EffectKey { path: r.path.clone(), slot: r.slot })
            .collect();
        let dead: Vec<EffectKey> =
            self.entries.keys().filter(|k| !live.contains(*k)).cloned().collect();
        for key in dead.iter().rev() {
            if let Some(entry) = self.entries.shift_remove(key) {
                if let Some(cleanup) = entry.cleanup {
                    cleanup(ctx);
                }
            }
        }

        let mut ran = 0;
        for registration in registrations {
            let key = EffectKey { path: registration.path.clone(), slot: registration.slot };
            match self.entries.get_mut(&key) {
                Some(entry) if entry.deps == registration.deps => {}
                Some(entry) => {
                    if let Some(cleanup) = entry.cleanup.take() {
                        cleanup(ctx);
                    }
                    entry.cleanup = (registration.run)(ctx);
                    entry.deps = registration.deps.clone();
                    ran += 1;
                }
                None => {
                    let cleanup = (registration.run)(ctx);
                    self.entries.insert(
                        key,
                        EffectEntry { deps: registration.deps.clone(), cleanup },
                    );
                    ran += 1;
                }
            }
        }
        ran
    }

    /// Run every recorded cleanup (execution teardown).
    pub(crate) fn drain(&mut self, ctx: &mut EffectCtx<'_>) {
        let entries: Vec<EffectEntry> = self.entries.drain(..).map(|(_, e)| e).collect();
        for entry in entries.into_iter().rev() {
            if let Some(cleanup) = entry.cleanup {
                cleanup(ctx);
            }
        }
    }

    // NOTE(coverage): used in tests
    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[path = "effects_tests.rs"]
mod tests;
