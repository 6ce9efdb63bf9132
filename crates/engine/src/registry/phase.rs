// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase/step sequencing.
//!
//! Phases are siblings under a provider node; exactly one is active at a
//! time, tracked by an index persisted under a reserved state key. Steps
//! inside a phase sequence the same way unless the phase's `is-parallel`
//! prop makes every step active at once. Advancement writes are queued
//! like any other mutation and take effect at commit, so admission always
//! reads the tick's snapshot.

use super::{phase_key, phases_completed_key, step_key};
use orchard_core::{truthy, Lifecycle, Value, WriteQueue};
use orchard_store::Snapshot;
use orchard_tree::{Arena, NodeId, Tag};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Hook fired when every phase under a provider has completed.
pub type AllCompletedHook = Arc<dyn Fn(&mut WriteQueue) + Send + Sync>;

/// Task-lifecycle notifications for the durable log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Activated { path: String, name: String },
    Completed { path: String, name: String },
}

/// Registry coordinating phase and step advancement.
#[derive(Default)]
pub struct PhaseRegistry {
    hooks: HashMap<String, AllCompletedHook>,
    fired: HashSet<String>,
}

impl PhaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an `on-all-completed` hook for the provider at `path`.
    /// Fires exactly once per full pass, alongside the completed-flag
    /// write.
    pub fn on_all_completed(&mut self, provider_path: impl Into<String>, hook: AllCompletedHook) {
        self.hooks.insert(provider_path.into(), hook);
    }

    /// Post-execute evaluation: queue advancement writes and report step
    /// transitions.
    pub(crate) fn evaluate(
        &mut self,
        arena: &Arena,
        root: NodeId,
        snapshot: &Snapshot,
        queue: &mut WriteQueue,
    ) -> Vec<StepEvent> {
        let mut events = Vec::new();
        for id in arena.subtree(root) {
            self.evaluate_provider(arena, id, snapshot, queue, &mut events);
        }
        events
    }

    /// Evaluate one potential provider: a node with direct phase children.
    fn evaluate_provider(
        &mut self,
        arena: &Arena,
        provider: NodeId,
        snapshot: &Snapshot,
        queue: &mut WriteQueue,
        events: &mut Vec<StepEvent>,
    ) {
        let Some(node) = arena.node(provider) else { return };
        let phases: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|c| arena.node(*c).is_some_and(|n| n.tag == Tag::Phase))
            .collect();
        if phases.is_empty() {
            return;
        }
        let provider_path = node_path(arena, provider);

        let key = phase_key(&provider_path);
        let active = index_value(snapshot, &key);

        if let Some(phase) = phases.get(active) {
            if self.evaluate_phase(arena, *phase, snapshot, queue, events) {
                queue.set(key, active as u64 + 1, "phase-advance");
            }
            return;
        }

        // Every phase has completed: fire once per provider.
        let flag = phases_completed_key(&provider_path);
        let already = snapshot.state(&flag).map(truthy).unwrap_or(false);
        if !already && !self.fired.contains(&provider_path) {
            self.fired.insert(provider_path.clone());
            queue.set(flag, true, "phases-complete");
            if let Some(hook) = self.hooks.get(&provider_path) {
                hook(queue);
            }
            tracing::info!(provider = %provider_path, "all phases completed");
        }
    }

    /// Returns true when the phase is complete and the provider should
    /// advance past it.
    fn evaluate_phase(
        &mut self,
        arena: &Arena,
        phase: NodeId,
        snapshot: &Snapshot,
        queue: &mut WriteQueue,
        events: &mut Vec<StepEvent>,
    ) -> bool {
        let Some(node) = arena.node(phase) else { return false };
        let phase_path = node_path(arena, phase);
        let steps: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|c| arena.node(*c).is_some_and(|n| n.tag == Tag::Step))
            .collect();

        if steps.is_empty() {
            return observables_settled(arena, phase);
        }

        let is_parallel = node.props.get("is-parallel").map(truthy).unwrap_or(false);
        if is_parallel {
            let mut all_done = true;
            for step in &steps {
                let path = node_path(arena, *step);
                let name = step_name(arena, *step);
                if observables_settled(arena, *step) {
                    events.push(StepEvent::Completed { path, name });
                } else {
                    events.push(StepEvent::Activated { path, name });
                    all_done = false;
                }
            }
            return all_done;
        }

        let key = step_key(&phase_path);
        let active = index_value(snapshot, &key);
        match steps.get(active) {
            Some(step) => {
                let path = node_path(arena, *step);
                let name = step_name(arena, *step);
                if observables_settled(arena, *step) {
                    queue.set(key, active as u64 + 1, "step-advance");
                    events.push(StepEvent::Completed { path, name });
                } else {
                    events.push(StepEvent::Activated { path, name });
                }
                false
            }
            // Active index walked past the final step: phase complete.
            None => true,
        }
    }
}

/// A step (or phase) settles when every observable in its subtree reached
/// `completed`. No observables settles vacuously.
fn observables_settled(arena: &Arena, root: NodeId) -> bool {
    arena.subtree(root).into_iter().all(|id| {
        let observable = arena.node(id).is_some_and(|n| n.tag.is_observable());
        !observable
            || arena
                .scratch(id)
                .is_some_and(|s| s.lifecycle == Lifecycle::Completed)
    })
}

fn index_value(snapshot: &Snapshot, key: &str) -> usize {
    snapshot.state(key).and_then(Value::as_u64).unwrap_or(0) as usize
}

fn node_path(arena: &Arena, id: NodeId) -> String {
    arena
        .scratch(id)
        .and_then(|s| s.path.clone())
        .unwrap_or_default()
}

fn step_name(arena: &Arena, id: NodeId) -> String {
    arena
        .node(id)
        .and_then(|n| n.props.get("name"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| node_path(arena, id))
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
