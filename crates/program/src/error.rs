// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Program construction errors

use thiserror::Error;

/// Errors raised while validating or rendering declarative output.
///
/// Construction errors are fatal: the reconciler aborts the execution
/// rather than rendering a malformed tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Event callbacks are reserved for observable node types.
    #[error("event callback {event:?} attached to non-observable node type {tag:?}")]
    CallbackOnStructural { tag: String, event: String },

    /// Sibling identity keys must be unique within their parent.
    #[error("duplicate sibling key {key:?} under {parent:?}")]
    DuplicateSiblingKey { parent: String, key: String },

    /// A component failed to render.
    #[error("render failed in {component:?}: {message}")]
    Render { component: String, message: String },
}
