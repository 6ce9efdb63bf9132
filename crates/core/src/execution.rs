// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution identity and terminal bookkeeping.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for one engine execution (a full run of a program).
    pub struct ExecutionId("exe-");
}

/// Status of an execution row in the durable log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Aborted,
}

crate::display_labels! {
    ExecutionStatus {
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Aborted => "aborted",
    }
}

impl ExecutionStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }
}

/// Why a run loop stopped ticking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationReason {
    /// No runnable, no pending writes, no live loop.
    Quiescent,
    /// The engine-wide or a loop-local iteration cap was hit.
    IterationCap,
    /// An explicit stop request arrived through the stop handle.
    Stopped,
    /// A fatal error aborted the execution.
    Fatal(String),
}

crate::display_labels! {
    TerminationReason {
        Quiescent => "quiescent",
        IterationCap => "iteration-cap",
        Stopped => "stopped",
        Fatal(..) => "fatal",
    }
}

impl TerminationReason {
    /// Column value written to `executions.reason`.
    pub fn as_reason(&self) -> String {
        match self {
            Self::Fatal(msg) => format!("fatal: {msg}"),
            other => other.to_string(),
        }
    }
}
