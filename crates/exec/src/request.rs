// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/result shapes crossing the executor boundary.

use orchard_core::{ExecutionId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input projection handed to the executor for one runnable node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecRequest {
    pub execution_id: ExecutionId,
    /// Stable node path, e.g. `/phase:R/step:s1/agent:0`.
    pub node_path: String,
    /// Dispatch identity; at most one dispatch per (path, token).
    pub run_token: String,
    /// Node tag name (`agent` or `orchestrator`).
    pub tag: String,
    /// Props minus reserved attributes.
    pub input: BTreeMap<String, Value>,
}

impl ExecRequest {
    /// The prompt prop, when present. Convenience for executors and the
    /// agents log.
    pub fn prompt(&self) -> Option<&str> {
        self.input.get("prompt").and_then(|v| v.as_str())
    }

    /// The model prop, when present.
    pub fn model(&self) -> Option<&str> {
        self.input.get("model").and_then(|v| v.as_str())
    }
}

/// Why the executor stopped producing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    Aborted,
}

orchard_core::display_labels! {
    StopReason {
        EndTurn => "end-turn",
        MaxTokens => "max-tokens",
        ToolUse => "tool-use",
        Aborted => "aborted",
    }
}

/// A tool invocation the executor wants recorded against its agent row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallDraft {
    pub tool_name: String,
    pub input: Value,
    pub output: Value,
}

/// A report the executor wants persisted against the execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
    pub report_type: String,
    pub title: String,
    pub content: String,
    pub severity: orchard_core::Severity,
    pub data: Option<Value>,
}

/// Result of one dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
    pub stop_reason: StopReason,
    /// Tool invocations to record, in call order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallDraft>,
    /// Reports to persist against the execution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reports: Vec<ReportDraft>,
}

impl ExecResult {
    /// Minimal successful result with the given output text.
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            structured: None,
            input_tokens: 0,
            output_tokens: 0,
            duration_ms: 0,
            stop_reason: StopReason::EndTurn,
            tool_calls: Vec::new(),
            reports: Vec::new(),
        }
    }

    orchard_core::setters! {
        set {
            input_tokens: u64,
            output_tokens: u64,
            duration_ms: u64,
            stop_reason: StopReason,
        }
        option {
            structured: Value,
        }
    }
}
