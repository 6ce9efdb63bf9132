// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loop iteration bookkeeping.
//!
//! Each mounted loop node advances a persistent iteration counter once
//! per tick. While the predicate holds and the cap is not reached, the
//! loop's children are torn down at the end of the tick so the next
//! render remounts them with fresh scratch. Fresh scratch means new run
//! tokens, which is what advances dispatch identity per iteration. Otherwise the loop turns
//! terminal and stops admitting runnables.

use super::loop_key;
use orchard_core::{truthy, Value, WriteQueue};
use orchard_store::Snapshot;
use orchard_tree::{Arena, NodeId, Tag};
use std::collections::HashMap;

/// How a loop reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// Predicate went falsy.
    Predicate,
    /// `max-iterations` hit: terminal with reason `iteration-cap`.
    Cap,
}

/// Registry of loop terminal states. Iteration counters live in
/// persistent state (resume-safe); terminal marks are re-derived per run.
#[derive(Default)]
pub struct LoopRegistry {
    terminal: HashMap<String, LoopEnd>,
}

impl LoopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self, id: &str) -> bool {
        self.terminal.contains_key(id)
    }

    /// Whether any loop ended by hitting its cap.
    pub fn ended_by_cap(&self) -> bool {
        self.terminal.values().any(|end| *end == LoopEnd::Cap)
    }

    /// Any mounted loop that has not reached a terminal state keeps the
    /// engine ticking.
    pub fn any_live(&self, arena: &Arena, root: NodeId) -> bool {
        arena.subtree(root).into_iter().any(|id| {
            arena.node(id).is_some_and(|n| n.tag == Tag::Loop)
                && !self.is_terminal(&loop_id(arena, id))
        })
    }

    /// Post-execute evaluation. Queues iteration advances and returns the
    /// loop nodes whose children must be torn down for remount.
    pub(crate) fn evaluate(
        &mut self,
        arena: &Arena,
        root: NodeId,
        snapshot: &Snapshot,
        queue: &mut WriteQueue,
    ) -> Vec<NodeId> {
        let mut teardowns = Vec::new();
        for id in arena.subtree(root) {
            let Some(node) = arena.node(id) else { continue };
            if node.tag != Tag::Loop {
                continue;
            }
            let loop_id = loop_id(arena, id);
            if self.is_terminal(&loop_id) {
                continue;
            }

            let max = node
                .props
                .get("max-iterations")
                .and_then(Value::as_u64)
                .unwrap_or(u64::MAX);
            let predicate = node.props.get("while").map(truthy).unwrap_or(true);

            let key = loop_key(&loop_id);
            let iteration = snapshot.state(&key).and_then(Value::as_u64).unwrap_or(0);
            let next = iteration + 1;
            queue.set(key, next, "loop-advance");

            if next >= max {
                tracing::info!(loop_id = %loop_id, iterations = next, "loop hit iteration cap");
                self.terminal.insert(loop_id, LoopEnd::Cap);
            } else if !predicate {
                tracing::debug!(loop_id = %loop_id, "loop predicate ended");
                self.terminal.insert(loop_id, LoopEnd::Predicate);
            } else {
                teardowns.push(id);
            }
        }
        teardowns
    }
}

/// A loop's identity: its `id` prop, falling back to its node path.
pub(crate) fn loop_id(arena: &Arena, id: NodeId) -> String {
    arena
        .node(id)
        .and_then(|n| n.props.get("id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| arena.scratch(id).and_then(|s| s.path.clone()))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "loops_tests.rs"]
mod tests;
