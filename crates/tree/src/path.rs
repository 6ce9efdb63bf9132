// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stable node paths.
//!
//! A path names a node by its position in the declared tree: each segment
//! is the node's tag plus its identity key when present, else its child
//! index. Effects, query subscriptions, and dispatch dedup all key off
//! paths, so the same declared node keeps the same path across re-renders.

use crate::tag::Tag;

/// Path from the root to a node, e.g. `/phase:R/step:s1/agent:0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(String);

impl NodePath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Extend with one child segment.
    pub fn child(&self, tag: &Tag, key: Option<&str>, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push('/');
        path.push_str(tag.name());
        path.push(':');
        match key {
            Some(key) => path.push_str(key),
            None => path.push_str(&index.to_string()),
        }
        Self(path)
    }

    /// Extend with a named component segment (for effect identity).
    pub fn component(&self, name: &str, index: usize) -> Self {
        Self(format!("{}/{{{name}:{index}}}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}
