// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel-dispatch marking.
//!
//! A `parallel` node marks its subtree: runnable descendants sharing the
//! same nearest parallel enclosure dispatch concurrently and are joined
//! together; everything else dispatches in declared sequential order.

use crate::runnable::{DispatchGroup, Runnable};
use orchard_tree::{Arena, NodeId, Tag};

/// Nearest ancestor with the parallel tag, if any.
pub(crate) fn nearest_parallel(arena: &Arena, id: NodeId) -> Option<NodeId> {
    let mut cursor = arena.parent_of(id);
    while let Some(ancestor) = cursor {
        if arena.node(ancestor).is_some_and(|n| n.tag == Tag::Parallel) {
            return Some(ancestor);
        }
        cursor = arena.parent_of(ancestor);
    }
    None
}

/// Fold runnables (in declared order) into dispatch groups: consecutive
/// members of one parallel enclosure join; the rest stay sequential.
pub(crate) fn group(arena: &Arena, runnables: Vec<Runnable>) -> Vec<DispatchGroup> {
    let mut groups: Vec<DispatchGroup> = Vec::new();
    let mut open: Option<(NodeId, Vec<Runnable>)> = None;

    for runnable in runnables {
        let enclosure = nearest_parallel(arena, runnable.id);
        match (enclosure, &mut open) {
            (Some(e), Some((current, batch))) if e == *current => batch.push(runnable),
            (Some(e), _) => {
                if let Some((_, batch)) = open.take() {
                    groups.push(DispatchGroup::Parallel(batch));
                }
                open = Some((e, vec![runnable]));
            }
            (None, _) => {
                if let Some((_, batch)) = open.take() {
                    groups.push(DispatchGroup::Parallel(batch));
                }
                groups.push(DispatchGroup::Sequential(runnable));
            }
        }
    }
    if let Some((_, batch)) = open.take() {
        groups.push(DispatchGroup::Parallel(batch));
    }
    groups
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
