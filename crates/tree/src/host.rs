// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host mutation contract.
//!
//! The minimal surface the reconciler drives. Every operation mutates the
//! tree in place; attribute updates never recreate a node and only a tag
//! change forces replacement (the reconciler's job, not the host's).
//!
//! Removal dismantles the subtree: every descendant is unlinked from its
//! parent and its back-pointer cleared, so after `remove_node` each node of
//! the old subtree is individually detached. Callers release the returned
//! handles once teardown work (cleanup effects, cancellation) has run.

use crate::arena::{Arena, Node, NodeId};
use crate::tag::Tag;
use crate::{CHILDREN_ATTR, KEY_ATTRS, TEXT_PROP};
use orchard_core::Value;
use smol_str::SmolStr;

impl Arena {
    /// Fresh element with empty props, no children, no parent.
    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        self.alloc(Node { tag, ..Node::default() })
    }

    /// Fresh text node; content lives in the reserved text prop.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = Node { tag: Tag::Text, ..Node::default() };
        node.props.insert(SmolStr::new(TEXT_PROP), Value::String(text.to_string()));
        self.alloc(node)
    }

    /// Overwrite an attribute.
    ///
    /// The children attribute is a no-op; the reserved identity-key names
    /// assign the node's key instead of landing in props.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) {
        if name == CHILDREN_ATTR {
            return;
        }
        let Some(node) = self.node_mut(id) else { return };
        if KEY_ATTRS.contains(&name) {
            node.key = Some(stringify_key(&value));
        } else {
            node.props.insert(SmolStr::new(name), value);
        }
    }

    /// Remove an attribute previously set.
    pub fn remove_property(&mut self, id: NodeId, name: &str) {
        if name == CHILDREN_ATTR {
            return;
        }
        let Some(node) = self.node_mut(id) else { return };
        if KEY_ATTRS.contains(&name) {
            node.key = None;
        } else {
            node.props.remove(name);
        }
    }

    /// Insert `child` into `parent.children`.
    ///
    /// If the child currently has another parent it is first detached from
    /// it. Position is the index of `anchor` when provided and present;
    /// anchor-not-found falls back to append. Re-inserting an
    /// already-present child before an anchor yields a stable reorder with
    /// no duplication.
    pub fn insert_node(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>) {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return;
        }
        // Refuse inserts that would make a node its own ancestor.
        let mut cursor = self.node(parent).and_then(|n| n.parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return;
            }
            cursor = self.node(ancestor).and_then(|n| n.parent);
        }

        // Detach from the previous parent (which may be `parent` itself,
        // making this a reorder).
        if let Some(old_parent) = self.node(child).and_then(|n| n.parent) {
            if let Some(node) = self.node_mut(old_parent) {
                node.children.retain(|c| *c != child);
            }
        }

        let Some(node) = self.node_mut(parent) else { return };
        let index = anchor
            .and_then(|a| node.children.iter().position(|c| *c == a))
            .unwrap_or(node.children.len());
        node.children.insert(index, child);

        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Remove `child` from `parent.children` and dismantle its subtree.
    ///
    /// Idempotent when the child is not present. Returns every node of the
    /// dismantled subtree (child first, declared order) so the caller can
    /// run teardown and then [`Arena::release`] the slots.
    pub fn remove_node(&mut self, parent: NodeId, child: NodeId) -> Vec<NodeId> {
        let present = self
            .node(parent)
            .map(|n| n.children.contains(&child))
            .unwrap_or(false);
        if !present {
            return Vec::new();
        }

        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|c| *c != child);
        }

        let removed = self.subtree(child);
        for id in &removed {
            if let Some(node) = self.node_mut(*id) {
                node.parent = None;
                node.children.clear();
            }
        }
        removed
    }

    /// Overwrite a text node's content; preserves all other props.
    pub fn replace_text(&mut self, id: NodeId, text: &str) {
        let Some(node) = self.node_mut(id) else { return };
        if node.tag.is_text() {
            node.props.insert(SmolStr::new(TEXT_PROP), Value::String(text.to_string()));
        }
    }

    /// Text content of a text node.
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .filter(|n| n.tag.is_text())
            .and_then(|n| n.props.get(TEXT_PROP))
            .and_then(|v| v.as_str())
    }

    // --- reflection for the reconciler ---

    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.tag.is_text())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.children.first().copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        let siblings = &self.node(parent)?.children;
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }
}

fn stringify_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
