// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read access to the transitions audit trail.
//!
//! Rows are appended by the persistent store's commit; this is the
//! inspection surface hosts and tests read them through.

use super::DurableLog;
use crate::error::StoreError;
use sqlx::Row;

/// One audit row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRow {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub trigger: String,
    pub origin: String,
    pub timestamp: u64,
}

impl DurableLog {
    /// All transitions recorded for one key, oldest first.
    pub async fn transitions_for(&self, key: &str) -> Result<Vec<TransitionRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT key, old_value, new_value, \"trigger\", origin, timestamp \
             FROM transitions WHERE key = ? ORDER BY id",
        )
        .bind(key)
        .fetch_all(self.pool())
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(TransitionRow {
                    key: row.try_get("key")?,
                    old_value: row.try_get("old_value")?,
                    new_value: row.try_get("new_value")?,
                    trigger: row.try_get("trigger")?,
                    origin: row.try_get("origin")?,
                    timestamp: row.try_get::<i64, _>("timestamp")? as u64,
                })
            })
            .collect()
    }
}
