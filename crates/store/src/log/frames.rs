// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render frames.
//!
//! Sequence numbers are dense and strictly increasing per execution,
//! enforced by the UNIQUE (execution_id, sequence_number) constraint plus
//! the next-sequence query.

use super::DurableLog;
use crate::error::StoreError;
use orchard_core::ExecutionId;
use sqlx::Row;

/// One persisted frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub execution_id: ExecutionId,
    pub sequence_number: u64,
    pub content: String,
    pub timestamp: u64,
}

impl FrameRow {
    /// Frame content wrapped in the retrieval header.
    pub fn with_header(&self) -> String {
        format!(
            "-- execution {} frame {} --\n{}",
            self.execution_id, self.sequence_number, self.content
        )
    }
}

impl DurableLog {
    /// Sequence number the next frame should carry (1-based, dense).
    pub async fn next_frame_sequence(&self, id: &ExecutionId) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(sequence_number), 0) FROM render_frames WHERE execution_id = ?",
        )
        .bind(id.as_str())
        .fetch_one(self.pool())
        .await?;
        let max: i64 = row.try_get(0)?;
        Ok(max as u64 + 1)
    }

    /// Append one frame. The UNIQUE constraint turns an out-of-order
    /// append into an error instead of silent corruption.
    pub async fn append_frame(
        &self,
        id: &ExecutionId,
        sequence_number: u64,
        content: &str,
        now_ms: u64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO render_frames (execution_id, sequence_number, content, timestamp) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(sequence_number as i64)
        .bind(content)
        .bind(now_ms as i64)
        .execute(self.pool())
        .await?;
        self.bump("render_frames");
        Ok(())
    }

    /// Fetch one frame.
    pub async fn frame(
        &self,
        id: &ExecutionId,
        sequence_number: u64,
    ) -> Result<Option<FrameRow>, StoreError> {
        let row = sqlx::query(
            "SELECT execution_id, sequence_number, content, timestamp FROM render_frames \
             WHERE execution_id = ? AND sequence_number = ?",
        )
        .bind(id.as_str())
        .bind(sequence_number as i64)
        .fetch_optional(self.pool())
        .await?;
        row.map(decode_frame).transpose()
    }

    /// All frames of an execution, in sequence order.
    pub async fn frames(&self, id: &ExecutionId) -> Result<Vec<FrameRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT execution_id, sequence_number, content, timestamp FROM render_frames \
             WHERE execution_id = ? ORDER BY sequence_number",
        )
        .bind(id.as_str())
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(decode_frame).collect()
    }
}

fn decode_frame(row: sqlx::sqlite::SqliteRow) -> Result<FrameRow, StoreError> {
    Ok(FrameRow {
        execution_id: ExecutionId::from_string(row.try_get::<String, _>("execution_id")?),
        sequence_number: row.try_get::<i64, _>("sequence_number")? as u64,
        content: row.try_get("content")?,
        timestamp: row.try_get::<i64, _>("timestamp")? as u64,
    })
}
