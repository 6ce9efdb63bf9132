// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution rows and the resume query.

use super::DurableLog;
use crate::error::StoreError;
use orchard_core::{ExecutionId, ExecutionStatus, TerminationReason};
use sqlx::Row;

/// One row of the `executions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRow {
    pub id: ExecutionId,
    pub name: String,
    pub source: String,
    pub status: ExecutionStatus,
    pub started_at: u64,
    pub completed_at: Option<u64>,
    pub reason: Option<String>,
}

impl DurableLog {
    /// Create a fresh `running` execution.
    pub async fn create_execution(
        &self,
        name: &str,
        source: &str,
        now_ms: u64,
    ) -> Result<ExecutionId, StoreError> {
        let id = ExecutionId::new();
        sqlx::query(
            "INSERT INTO executions (id, name, source, status, started_at) \
             VALUES (?, ?, ?, 'running', ?)",
        )
        .bind(id.as_str())
        .bind(name)
        .bind(source)
        .bind(now_ms as i64)
        .execute(self.pool())
        .await?;
        self.bump("executions");
        tracing::info!(execution_id = %id, source, "execution created");
        Ok(id)
    }

    /// The `running` execution for `source`, if any. Resume attaches only
    /// to this; completed/failed/aborted rows start fresh.
    pub async fn find_running(&self, source: &str) -> Result<Option<ExecutionRow>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, source, status, started_at, completed_at, reason \
             FROM executions WHERE source = ? AND status = 'running' \
             ORDER BY started_at DESC LIMIT 1",
        )
        .bind(source)
        .fetch_optional(self.pool())
        .await?;
        row.map(decode_execution).transpose()
    }

    /// Fetch one execution by id.
    pub async fn execution(&self, id: &ExecutionId) -> Result<Option<ExecutionRow>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, source, status, started_at, completed_at, reason \
             FROM executions WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(self.pool())
        .await?;
        row.map(decode_execution).transpose()
    }

    /// Move an execution to a terminal status with a reason.
    pub async fn finish_execution(
        &self,
        id: &ExecutionId,
        status: ExecutionStatus,
        reason: &TerminationReason,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE executions SET status = ?, completed_at = ?, reason = ? WHERE id = ?",
        )
        .bind(status.label())
        .bind(now_ms as i64)
        .bind(reason.as_reason())
        .bind(id.as_str())
        .execute(self.pool())
        .await?;
        self.bump("executions");
        tracing::info!(execution_id = %id, %status, reason = %reason.as_reason(), "execution finished");
        Ok(())
    }
}

fn decode_execution(row: sqlx::sqlite::SqliteRow) -> Result<ExecutionRow, StoreError> {
    let status_text: String = row.try_get("status")?;
    let status = ExecutionStatus::parse(&status_text)
        .ok_or_else(|| StoreError::StateConflict(format!("unknown status {status_text:?}")))?;
    Ok(ExecutionRow {
        id: ExecutionId::from_string(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        source: row.try_get("source")?,
        status,
        started_at: row.try_get::<i64, _>("started_at")? as u64,
        completed_at: row.try_get::<Option<i64>, _>("completed_at")?.map(|v| v as u64),
        reason: row.try_get("reason")?,
    })
}
