// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Constructors for the intrinsic node types.

use crate::element::{Element, ElementNode};
use orchard_core::Value;
use orchard_tree::Tag;

/// Gate: children render only while `condition` is truthy. A flip tears
/// the subtree down on the same tick.
pub fn conditional(condition: impl Into<Value>) -> ElementNode {
    ElementNode::new(Tag::Conditional).prop("condition", condition)
}

/// One phase in a sequenced sibling group.
pub fn phase(name: impl Into<String>) -> ElementNode {
    ElementNode::new(Tag::Phase).prop("name", Value::String(name.into()))
}

/// One step inside a phase.
pub fn step(name: impl Into<String>) -> ElementNode {
    ElementNode::new(Tag::Step).prop("name", Value::String(name.into()))
}

/// Marks a subtree for concurrent dispatch of its runnable children.
pub fn parallel() -> ElementNode {
    ElementNode::new(Tag::Parallel)
}

/// Loop block: re-mounts children per iteration while the `while` prop is
/// truthy, up to `max-iterations`.
pub fn loop_block(id: impl Into<String>, max_iterations: u64) -> ElementNode {
    ElementNode::new(Tag::Loop)
        .prop("id", Value::String(id.into()))
        .prop("max-iterations", max_iterations)
}

/// Runnable LLM-agent invocation.
pub fn agent(prompt: impl Into<String>) -> ElementNode {
    ElementNode::new(Tag::Agent).prop("prompt", Value::String(prompt.into()))
}

/// Runnable sub-orchestrator launch.
pub fn orchestrator(program: impl Into<String>) -> ElementNode {
    ElementNode::new(Tag::Orchestrator).prop("program", Value::String(program.into()))
}

/// Literal text child.
pub fn text(content: impl Into<String>) -> Element {
    Element::Text(content.into())
}

#[cfg(test)]
#[path = "intrinsics_tests.rs"]
mod tests;
