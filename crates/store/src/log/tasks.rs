// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle rows (step-registry bookkeeping).

use super::DurableLog;
use crate::error::StoreError;
use orchard_core::{TaskId, TaskStatus};
use sqlx::Row;

impl DurableLog {
    /// Insert a `started` task row.
    pub async fn start_task(&self, name: &str, now_ms: u64) -> Result<TaskId, StoreError> {
        let id = TaskId::new();
        sqlx::query("INSERT INTO tasks (id, name, status, started_at) VALUES (?, ?, 'started', ?)")
            .bind(id.as_str())
            .bind(name)
            .bind(now_ms as i64)
            .execute(self.pool())
            .await?;
        self.bump("tasks");
        Ok(id)
    }

    /// Move a task to a terminal status.
    pub async fn finish_task(
        &self,
        id: &TaskId,
        status: TaskStatus,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE tasks SET status = ?, completed_at = ? WHERE id = ?")
            .bind(status.label())
            .bind(now_ms as i64)
            .bind(id.as_str())
            .execute(self.pool())
            .await?;
        self.bump("tasks");
        Ok(())
    }

    /// Status of one task, if it exists.
    pub async fn task_status(&self, id: &TaskId) -> Result<Option<TaskStatus>, StoreError> {
        let row = sqlx::query("SELECT status FROM tasks WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await?;
        match row {
            Some(row) => {
                let text: String = row.try_get(0)?;
                let status = match text.as_str() {
                    "started" => TaskStatus::Started,
                    "completed" => TaskStatus::Completed,
                    "failed" => TaskStatus::Failed,
                    other => {
                        return Err(StoreError::StateConflict(format!(
                            "unknown task status {other:?}"
                        )))
                    }
                };
                Ok(Some(status))
            }
            None => Ok(None),
        }
    }
}
