// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-run rows, tool calls, and reports.

use super::DurableLog;
use crate::error::StoreError;
use orchard_core::{
    AgentRecordId, AgentRecordStatus, ExecutionId, ReportId, Severity, ToolCallId, Value,
};
use sqlx::Row;

/// One row of the `agents` table.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRow {
    pub id: AgentRecordId,
    pub execution_id: ExecutionId,
    pub node_path: String,
    pub model: Option<String>,
    pub status: AgentRecordStatus,
    pub prompt: Option<String>,
    pub output: Option<String>,
    pub structured_output: Option<Value>,
    pub error: Option<String>,
}

impl DurableLog {
    /// Insert a `pending` agent row for a runnable about to dispatch.
    pub async fn insert_agent(
        &self,
        execution_id: &ExecutionId,
        node_path: &str,
        model: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<AgentRecordId, StoreError> {
        let id = AgentRecordId::new();
        sqlx::query(
            "INSERT INTO agents (id, execution_id, node_path, model, status, prompt) \
             VALUES (?, ?, ?, ?, 'pending', ?)",
        )
        .bind(id.as_str())
        .bind(execution_id.as_str())
        .bind(node_path)
        .bind(model)
        .bind(prompt)
        .execute(self.pool())
        .await?;
        self.bump("agents");
        Ok(id)
    }

    /// Mark an agent row `running` at dispatch.
    pub async fn agent_running(&self, id: &AgentRecordId) -> Result<(), StoreError> {
        sqlx::query("UPDATE agents SET status = 'running' WHERE id = ?")
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        self.bump("agents");
        Ok(())
    }

    /// Record a successful result.
    pub async fn agent_completed(
        &self,
        id: &AgentRecordId,
        output: &str,
        structured: Option<&Value>,
    ) -> Result<(), StoreError> {
        let structured_text = match structured {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };
        sqlx::query(
            "UPDATE agents SET status = 'completed', output = ?, structured_output = ? WHERE id = ?",
        )
        .bind(output)
        .bind(structured_text)
        .bind(id.as_str())
        .execute(self.pool())
        .await?;
        self.bump("agents");
        Ok(())
    }

    /// Record a failure.
    pub async fn agent_failed(&self, id: &AgentRecordId, error: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE agents SET status = 'failed', error = ? WHERE id = ?")
            .bind(error)
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        self.bump("agents");
        Ok(())
    }

    /// Fetch agent rows for an execution, insertion order.
    pub async fn agents(&self, execution_id: &ExecutionId) -> Result<Vec<AgentRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, execution_id, node_path, model, status, prompt, output, \
             structured_output, error FROM agents WHERE execution_id = ? ORDER BY rowid",
        )
        .bind(execution_id.as_str())
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(decode_agent).collect()
    }

    /// Record one tool invocation against an agent row.
    pub async fn record_tool_call(
        &self,
        agent_id: &AgentRecordId,
        tool_name: &str,
        input: &Value,
        output: &Value,
        now_ms: u64,
    ) -> Result<ToolCallId, StoreError> {
        let id = ToolCallId::new();
        sqlx::query(
            "INSERT INTO tool_calls (id, agent_id, tool_name, input, output, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(agent_id.as_str())
        .bind(tool_name)
        .bind(serde_json::to_string(input)?)
        .bind(serde_json::to_string(output)?)
        .bind(now_ms as i64)
        .execute(self.pool())
        .await?;
        self.bump("tool_calls");
        Ok(id)
    }

    /// Persist a report against an execution (optionally tied to an agent).
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_report(
        &self,
        execution_id: &ExecutionId,
        agent_id: Option<&AgentRecordId>,
        report_type: &str,
        title: &str,
        content: &str,
        severity: Severity,
        data: Option<&Value>,
        now_ms: u64,
    ) -> Result<ReportId, StoreError> {
        let id = ReportId::new();
        let data_text = match data {
            Some(value) => Some(serde_json::to_string(value)?),
            None => None,
        };
        sqlx::query(
            "INSERT INTO reports (id, execution_id, agent_id, type, title, content, severity, data, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(execution_id.as_str())
        .bind(agent_id.map(|a| a.as_str().to_string()))
        .bind(report_type)
        .bind(title)
        .bind(content)
        .bind(severity.label())
        .bind(data_text)
        .bind(now_ms as i64)
        .execute(self.pool())
        .await?;
        self.bump("reports");
        Ok(id)
    }
}

fn decode_agent(row: sqlx::sqlite::SqliteRow) -> Result<AgentRow, StoreError> {
    let status_text: String = row.try_get("status")?;
    let status = match status_text.as_str() {
        "pending" => AgentRecordStatus::Pending,
        "running" => AgentRecordStatus::Running,
        "completed" => AgentRecordStatus::Completed,
        "failed" => AgentRecordStatus::Failed,
        other => {
            return Err(StoreError::StateConflict(format!("unknown agent status {other:?}")))
        }
    };
    let structured_output = row
        .try_get::<Option<String>, _>("structured_output")?
        .map(|text| serde_json::from_str(&text))
        .transpose()?;
    Ok(AgentRow {
        id: AgentRecordId::from_string(row.try_get::<String, _>("id")?),
        execution_id: ExecutionId::from_string(row.try_get::<String, _>("execution_id")?),
        node_path: row.try_get("node_path")?,
        model: row.try_get("model")?,
        status,
        prompt: row.try_get("prompt")?,
        output: row.try_get("output")?,
        structured_output,
        error: row.try_get("error")?,
    })
}
