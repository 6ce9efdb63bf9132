// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation: declarative output → host operations.
//!
//! Synchronous and single-threaded. Each render expands the program's
//! elements against the snapshot (evaluating components with their own
//! scopes), then diffs the result into the arena level by level: text
//! nodes are patched in place, same-tag/same-key nodes are reused with
//! prop diffs, mismatches tear the old subtree down post-order and mount
//! a fresh one. The reconciler never blocks on I/O and never inspects
//! executor results; those arrive only through state.

use crate::error::RuntimeError;
use orchard_core::{truthy, Callbacks, Value};
use orchard_program::{EffectRegistration, Element, ElementNode, ProgramError, Scope};
use orchard_store::{QueryEngine, QueryKey, Snapshot};
use orchard_tree::{Arena, NodeId, NodePath, Tag};
use smol_str::SmolStr;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Side table produced by one render.
#[derive(Debug, Default)]
pub(crate) struct RenderOutput {
    /// Effect registrations in render order.
    pub effects: Vec<EffectRegistration>,
    /// Query registrations still referenced by a live component.
    pub live_queries: HashSet<QueryKey>,
    /// Paths of nodes torn down this render (for in-flight cancellation).
    pub removed_paths: Vec<String>,
}

/// Fully evaluated element: components expanded, fragments spliced.
enum Resolved {
    Node(ResolvedNode),
    Text(String),
}

struct ResolvedNode {
    tag: Tag,
    key: Option<String>,
    props: BTreeMap<SmolStr, Value>,
    callbacks: Callbacks,
    children: Vec<Resolved>,
}

struct RenderCtx<'a> {
    snapshot: &'a Snapshot,
    queries: &'a mut QueryEngine,
    output: RenderOutput,
}

/// Render `program` into the subtree rooted at `root`.
pub(crate) fn render(
    arena: &mut Arena,
    root: NodeId,
    root_path: &NodePath,
    program: &Element,
    snapshot: &Snapshot,
    queries: &mut QueryEngine,
) -> Result<RenderOutput, RuntimeError> {
    let mut ctx = RenderCtx { snapshot, queries, output: RenderOutput::default() };

    let mut desired = Vec::new();
    expand_into(program.clone(), root_path, &mut desired, &mut ctx)?;
    check_sibling_keys(root_path, &desired)?;
    diff_children(arena, root, root_path, desired, &mut ctx.output)?;

    Ok(ctx.output)
}

// --- expansion ---

fn expand_into(
    element: Element,
    parent_path: &NodePath,
    out: &mut Vec<Resolved>,
    ctx: &mut RenderCtx<'_>,
) -> Result<(), RuntimeError> {
    match element {
        Element::Nothing => Ok(()),
        Element::Text(text) => {
            out.push(Resolved::Text(text));
            Ok(())
        }
        Element::Fragment(children) => {
            for child in children {
                expand_into(child, parent_path, out, ctx)?;
            }
            Ok(())
        }
        Element::Component(component) => {
            let path = parent_path.component(component.name(), out.len());
            let rendered = {
                let mut scope = Scope::new(
                    ctx.snapshot,
                    ctx.queries,
                    &mut ctx.output.effects,
                    &mut ctx.output.live_queries,
                    path.to_string(),
                );
                component.render(&mut scope).map_err(RuntimeError::Construction)?
            };
            expand_into(rendered, &path, out, ctx)
        }
        Element::Node(node) => {
            node.validate().map_err(RuntimeError::Construction)?;
            out.push(expand_node(*node, parent_path, out.len(), ctx)?);
            Ok(())
        }
    }
}

fn expand_node(
    node: ElementNode,
    parent_path: &NodePath,
    index: usize,
    ctx: &mut RenderCtx<'_>,
) -> Result<Resolved, RuntimeError> {
    let path = parent_path.child(&node.tag, node.key.as_deref(), index);

    // A false conditional keeps its node but renders no children; the
    // subtree tears down on the tick the predicate flips.
    let render_children = match node.tag {
        Tag::Conditional => node
            .props
            .get("condition")
            .map(truthy)
            .unwrap_or(false),
        _ => true,
    };

    let mut children = Vec::new();
    if render_children {
        for child in node.children {
            expand_into(child, &path, &mut children, ctx)?;
        }
        check_sibling_keys(&path, &children)?;
    }

    Ok(Resolved::Node(ResolvedNode {
        tag: node.tag,
        key: node.key,
        props: node.props,
        callbacks: node.callbacks,
        children,
    }))
}

fn check_sibling_keys(parent: &NodePath, siblings: &[Resolved]) -> Result<(), RuntimeError> {
    let mut seen = HashSet::new();
    for sibling in siblings {
        if let Resolved::Node(node) = sibling {
            if let Some(key) = &node.key {
                if !seen.insert(key.clone()) {
                    return Err(RuntimeError::Construction(ProgramError::DuplicateSiblingKey {
                        parent: parent.to_string(),
                        key: key.clone(),
                    }));
                }
            }
        }
    }
    Ok(())
}

// --- diffing ---

fn diff_children(
    arena: &mut Arena,
    parent: NodeId,
    parent_path: &NodePath,
    desired: Vec<Resolved>,
    output: &mut RenderOutput,
) -> Result<(), RuntimeError> {
    let old: Vec<NodeId> = arena.node(parent).map(|n| n.children.clone()).unwrap_or_default();

    // Pool existing children for matching: keyed by (tag, key), unkeyed
    // positionally per tag, text nodes positionally.
    let mut keyed: HashMap<(String, String), NodeId> = HashMap::new();
    let mut unkeyed: HashMap<String, VecDeque<NodeId>> = HashMap::new();
    let mut texts: VecDeque<NodeId> = VecDeque::new();
    for id in &old {
        let Some(node) = arena.node(*id) else { continue };
        if node.tag.is_text() {
            texts.push_back(*id);
        } else if let Some(key) = &node.key {
            keyed.insert((node.tag.name().to_string(), key.clone()), *id);
        } else {
            unkeyed.entry(node.tag.name().to_string()).or_default().push_back(*id);
        }
    }

    // Match-or-create pass.
    let mut placed: Vec<(NodeId, Option<(Vec<Resolved>, NodePath)>)> =
        Vec::with_capacity(desired.len());
    for (index, item) in desired.into_iter().enumerate() {
        match item {
            Resolved::Text(text) => {
                let id = match texts.pop_front() {
                    Some(id) => {
                        if arena.text_of(id) != Some(text.as_str()) {
                            arena.replace_text(id, &text);
                        }
                        id
                    }
                    None => arena.create_text(&text),
                };
                placed.push((id, None));
            }
            Resolved::Node(node) => {
                let matched = match &node.key {
                    Some(key) => keyed.remove(&(node.tag.name().to_string(), key.clone())),
                    None => unkeyed.get_mut(node.tag.name()).and_then(|pool| pool.pop_front()),
                };
                let path = parent_path.child(&node.tag, node.key.as_deref(), index);
                let id = match matched {
                    Some(id) => {
                        update_node(arena, id, &node);
                        id
                    }
                    None => create_node(arena, &node),
                };
                if let Some(scratch) = arena.scratch_mut(id) {
                    scratch.path = Some(path.to_string());
                    scratch.callbacks = node.callbacks.clone();
                }
                placed.push((id, Some((node.children, path))));
            }
        }
    }

    // Teardown pass: unmatched old children go away post-order.
    let leftovers: Vec<NodeId> = old
        .iter()
        .filter(|id| !placed.iter().any(|(placed_id, _)| placed_id == *id))
        .copied()
        .collect();
    for id in leftovers {
        remove_subtree(arena, parent, id, output);
    }

    // Ordering pass: converge arena order onto declared order.
    for (index, (id, _)) in placed.iter().enumerate() {
        let current = arena.node(parent).and_then(|n| n.children.get(index).copied());
        if current != Some(*id) {
            arena.insert_node(parent, *id, current);
        }
    }

    // Recurse in declared order.
    for (id, children) in placed {
        if let Some((children, path)) = children {
            diff_children(arena, id, &path, children, output)?;
        }
    }
    Ok(())
}

fn create_node(arena: &mut Arena, node: &ResolvedNode) -> NodeId {
    let id = arena.create_element(node.tag.clone());
    if let Some(n) = arena.node_mut(id) {
        n.key = node.key.clone();
        n.props = node.props.clone();
    }
    id
}

/// Prop diff on a reused node. Attribute updates never recreate the node.
fn update_node(arena: &mut Arena, id: NodeId, node: &ResolvedNode) {
    let stale: Vec<SmolStr> = arena
        .node(id)
        .map(|n| {
            n.props
                .keys()
                .filter(|name| !node.props.contains_key(*name))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    for name in stale {
        arena.remove_property(id, &name);
    }
    for (name, value) in &node.props {
        let unchanged = arena
            .node(id)
            .and_then(|n| n.props.get(name))
            .is_some_and(|current| current == value);
        if !unchanged {
            arena.set_property(id, name, value.clone());
        }
    }
}

/// Remove and release a whole subtree, recording paths for cancellation.
pub(crate) fn remove_subtree(
    arena: &mut Arena,
    parent: NodeId,
    child: NodeId,
    output: &mut RenderOutput,
) {
    let removed = arena.remove_node(parent, child);
    for id in &removed {
        if let Some(path) = arena.scratch(*id).and_then(|s| s.path.clone()) {
            output.removed_paths.push(path);
        }
    }
    // Post-order release: children before parents.
    for id in removed.iter().rev() {
        arena.release(*id);
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
