// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers and statuses for durable-log rows (agents, tasks, tool
//! calls, reports).

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for one agent-run row (a single executor dispatch).
    pub struct AgentRecordId("agt-");
}

crate::define_id! {
    /// Identifier for a tracked task (step registry bookkeeping).
    pub struct TaskId("tsk-");
}

crate::define_id! {
    /// Identifier for one recorded tool invocation inside an agent run.
    pub struct ToolCallId("tcl-");
}

crate::define_id! {
    /// Identifier for a report attached to an execution.
    pub struct ReportId("rpt-");
}

/// Status of an agent-run row. `Running` is set at dispatch, the terminal
/// state on result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRecordStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

crate::display_labels! {
    AgentRecordStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Status of a tracked task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Started,
    Completed,
    Failed,
}

crate::display_labels! {
    TaskStatus {
        Started => "started",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Severity attached to report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

crate::display_labels! {
    Severity {
        Info => "info",
        Warning => "warning",
        Error => "error",
    }
}
