// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orchard-tree: arena-backed node tree, host mutation contract, and the
//! deterministic serializer.
//!
//! The tree is the rendered form of a program. The reconciler drives it
//! exclusively through the host operations in [`host`]; nothing else
//! mutates nodes.

pub mod arena;
pub mod host;
pub mod path;
pub mod serialize;
pub mod tag;

pub use arena::{Arena, Node, NodeId, Scratch};
pub use path::NodePath;
pub use serialize::serialize;
pub use tag::Tag;

/// Reserved prop holding a text node's content.
pub const TEXT_PROP: &str = "#text";

/// Reserved attribute names that assign a node's identity key instead of
/// landing in props.
pub const KEY_ATTRS: [&str; 2] = ["key", "stable-key"];

/// Reserved attribute name that host `set_property` ignores; children are
/// only ever mutated through insert/remove.
pub const CHILDREN_ATTR: &str = "children";
