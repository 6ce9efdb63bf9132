// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runnable collection.
//!
//! Traverses the tree in declared order, gathering observable nodes whose
//! lifecycle is idle and whose enclosing registries admit them: their
//! phase is active, their step is active (or the phase is parallel), and
//! no enclosing loop has turned terminal. Run tokens are minted at first
//! sight and survive pure re-renders.

use crate::registry::{loops, phase_key, step_key, LoopRegistry};
use orchard_core::{truthy, Value};
use orchard_store::Snapshot;
use orchard_tree::{Arena, NodeId, Tag};
use std::collections::HashSet;

/// One admitted, idle observable node.
#[derive(Debug, Clone)]
pub(crate) struct Runnable {
    pub id: NodeId,
    pub path: String,
    pub token: String,
}

/// Execution-order grouping consumed by the execute phase.
pub(crate) enum DispatchGroup {
    Sequential(Runnable),
    Parallel(Vec<Runnable>),
}

/// Collect runnables in declared order. Mints missing run tokens; skips
/// `(path, token)` pairs that already dispatched (at-most-once).
pub(crate) fn collect(
    arena: &mut Arena,
    root: NodeId,
    snapshot: &Snapshot,
    loops: &LoopRegistry,
    dispatched: &HashSet<(String, String)>,
) -> Vec<Runnable> {
    let mut out = Vec::new();
    walk(arena, root, true, snapshot, loops, dispatched, &mut out);
    out
}

fn walk(
    arena: &mut Arena,
    id: NodeId,
    admitted: bool,
    snapshot: &Snapshot,
    loops: &LoopRegistry,
    dispatched: &HashSet<(String, String)>,
    out: &mut Vec<Runnable>,
) {
    let Some(node) = arena.node(id) else { return };
    let tag = node.tag.clone();
    let children = node.children.clone();

    if admitted && tag.is_observable() {
        let idle = arena.scratch(id).is_some_and(|s| s.lifecycle.is_runnable());
        if idle {
            let path = arena
                .scratch(id)
                .and_then(|s| s.path.clone())
                .unwrap_or_default();
            let token = match arena.scratch(id).and_then(|s| s.run_token.clone()) {
                Some(token) => token,
                None => {
                    let token = orchard_exec::mint_run_token();
                    if let Some(scratch) = arena.scratch_mut(id) {
                        scratch.run_token = Some(token.clone());
                    }
                    token
                }
            };
            if !dispatched.contains(&(path.clone(), token.clone())) {
                out.push(Runnable { id, path, token });
            }
        }
    }

    let flags = child_admission(arena, id, &tag, &children, admitted, snapshot, loops);
    for (child, flag) in children.into_iter().zip(flags) {
        walk(arena, child, flag, snapshot, loops, dispatched, out);
    }
}

/// Per-child admission under one parent.
fn child_admission(
    arena: &Arena,
    parent: NodeId,
    parent_tag: &Tag,
    children: &[NodeId],
    admitted: bool,
    snapshot: &Snapshot,
    loops: &LoopRegistry,
) -> Vec<bool> {
    let mut flags = vec![admitted; children.len()];
    if !admitted {
        return flags;
    }

    // A terminal loop admits nothing below it.
    if *parent_tag == Tag::Loop {
        let loop_id = loops::loop_id(arena, parent);
        if loops.is_terminal(&loop_id) {
            flags.iter_mut().for_each(|f| *f = false);
            return flags;
        }
    }

    // Phase siblings: only the active index admits.
    let phase_positions: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| arena.node(**c).is_some_and(|n| n.tag == Tag::Phase))
        .map(|(i, _)| i)
        .collect();
    if !phase_positions.is_empty() {
        let provider_path = scratch_path(arena, parent);
        let active = index_value(snapshot, &phase_key(&provider_path));
        for (group_index, position) in phase_positions.iter().enumerate() {
            flags[*position] = flags[*position] && group_index == active;
        }
    }

    // Step siblings inside a phase: active index, unless the phase runs
    // its steps in parallel.
    if *parent_tag == Tag::Phase {
        let is_parallel = arena
            .node(parent)
            .and_then(|n| n.props.get("is-parallel"))
            .map(truthy)
            .unwrap_or(false);
        if !is_parallel {
            let step_positions: Vec<usize> = children
                .iter()
                .enumerate()
                .filter(|(_, c)| arena.node(**c).is_some_and(|n| n.tag == Tag::Step))
                .map(|(i, _)| i)
                .collect();
            let active = index_value(snapshot, &step_key(&scratch_path(arena, parent)));
            for (group_index, position) in step_positions.iter().enumerate() {
                flags[*position] = flags[*position] && group_index == active;
            }
        }
    }

    flags
}

fn scratch_path(arena: &Arena, id: NodeId) -> String {
    arena
        .scratch(id)
        .and_then(|s| s.path.clone())
        .unwrap_or_default()
}

fn index_value(snapshot: &Snapshot, key: &str) -> usize {
    snapshot.state(key).and_then(Value::as_u64).unwrap_or(0) as usize
}

#[cfg(test)]
#[path = "runnable_tests.rs"]
mod tests;
