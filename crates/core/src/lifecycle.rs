// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle state machine for observable nodes.
//!
//! Observable nodes represent pending work. Each starts `Idle`, moves to
//! `Started` when dispatched, and ends in exactly one of the terminal
//! states. Illegal transitions are engine bugs and surface as
//! [`LifecycleError`] rather than silently rewriting history.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of an observable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Idle,
    Started,
    Completed,
    Failed,
    Cancelled,
}

crate::display_labels! {
    Lifecycle {
        Idle => "idle",
        Started => "started",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// Attempted transition that the state machine forbids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal lifecycle transition {from} -> {to}")]
pub struct LifecycleError {
    pub from: Lifecycle,
    pub to: Lifecycle,
}

impl Lifecycle {
    /// Whether this state is terminal (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether a node in this state is awaiting dispatch.
    pub fn is_runnable(self) -> bool {
        self == Self::Idle
    }

    /// Validate and perform a transition.
    ///
    /// Legal moves: `Idle -> Started`, `Started -> {Completed, Failed,
    /// Cancelled}`, and `Idle -> Cancelled` (torn down before dispatch).
    pub fn advance(self, to: Lifecycle) -> Result<Lifecycle, LifecycleError> {
        let legal = matches!(
            (self, to),
            (Self::Idle, Self::Started)
                | (Self::Started, Self::Completed)
                | (Self::Started, Self::Failed)
                | (Self::Started, Self::Cancelled)
                | (Self::Idle, Self::Cancelled)
        );
        if legal {
            Ok(to)
        } else {
            Err(LifecycleError { from: self, to })
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
