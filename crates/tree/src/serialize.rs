// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic text projection of the tree.
//!
//! Pure function of the tree: structurally-equal trees serialize to
//! byte-identical output. Attributes are emitted sorted by name; callbacks
//! and scratch never appear, but a synthetic `events` attribute lists the
//! names of attached callbacks for parity with sibling serializers.

use crate::arena::{Arena, NodeId};
use std::fmt::Write;

/// Serialize the subtree rooted at `root`.
pub fn serialize(arena: &Arena, root: NodeId) -> String {
    let mut out = String::new();
    write_node(arena, root, 0, &mut out);
    out
}

fn write_node(arena: &Arena, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = arena.node(id) else { return };
    let indent = "  ".repeat(depth);

    if node.tag.is_text() {
        let text = arena.text_of(id).unwrap_or_default();
        let _ = writeln!(out, "{indent}{}", escape(text));
        return;
    }

    let mut attrs: Vec<(String, String)> = node
        .props
        .iter()
        .map(|(name, value)| (name.to_string(), render_value(value)))
        .collect();
    if let Some(key) = &node.key {
        attrs.push(("key".to_string(), key.clone()));
    }
    if let Some(scratch) = arena.scratch(id) {
        let events = scratch.callbacks.names();
        if !events.is_empty() {
            attrs.push(("events".to_string(), events.join(",")));
        }
    }
    attrs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut open = format!("{indent}<{}", node.tag.name());
    for (name, value) in &attrs {
        let _ = write!(open, " {name}=\"{}\"", escape(value));
    }

    if node.children.is_empty() {
        let _ = writeln!(out, "{open}/>");
        return;
    }

    // A lone text child renders inline to keep frames compact.
    if node.children.len() == 1 && arena.is_text(node.children[0]) {
        let text = arena.text_of(node.children[0]).unwrap_or_default();
        let _ = writeln!(out, "{open}>{}</{}>", escape(text), node.tag.name());
        return;
    }

    let _ = writeln!(out, "{open}>");
    for child in &node.children {
        write_node(arena, *child, depth + 1, out);
    }
    let _ = writeln!(out, "{indent}</{}>", node.tag.name());
}

fn render_value(value: &orchard_core::Value) -> String {
    match value {
        orchard_core::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "serialize_tests.rs"]
mod tests;
