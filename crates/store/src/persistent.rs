// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed half of the state pair.
//!
//! Values live in `state(key PRIMARY KEY, value, updated_at)`; every
//! committed change appends a `transitions` audit row. Queued writes apply
//! inside one SQL transaction in enqueue order, so a tick's writes become
//! visible together or not at all.

use crate::error::StoreError;
use crate::version::VersionMap;
use orchard_core::{Value, WriteOp};
use parking_lot::Mutex;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// One committed change, for the audit trail and version bumps.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Value,
    pub trigger: String,
    pub origin: String,
}

/// Persistent kv store sharing the engine's SQLite pool.
pub struct PersistentStore {
    pool: SqlitePool,
    queue: Vec<WriteOp>,
    versions: Arc<Mutex<VersionMap>>,
}

impl PersistentStore {
    pub fn new(pool: SqlitePool, versions: Arc<Mutex<VersionMap>>) -> Self {
        Self { pool, queue: Vec::new(), versions }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let text: String = row.try_get(0)?;
                Ok(Some(serde_json::from_str(&text)?))
            }
            None => Ok(None),
        }
    }

    /// Queue a deferred write for the next commit.
    pub fn enqueue(&mut self, op: WriteOp) {
        self.queue.push(op);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Apply every queued write atomically in enqueue order.
    ///
    /// For each key whose value changed: update `state`, append a
    /// `transitions` row, and bump its version. Unchanged values write
    /// nothing.
    pub async fn commit(&mut self, now_ms: u64) -> Result<Vec<Transition>, StoreError> {
        if self.queue.is_empty() {
            return Ok(Vec::new());
        }

        let ops = std::mem::take(&mut self.queue);
        let mut transitions = Vec::new();
        let mut tx = self.pool.begin().await?;

        for op in ops {
            let old: Option<Value> = {
                let row = sqlx::query("SELECT value FROM state WHERE key = ?")
                    .bind(&op.key)
                    .fetch_optional(&mut *tx)
                    .await?;
                match row {
                    Some(row) => {
                        let text: String = row.try_get(0)?;
                        Some(serde_json::from_str(&text)?)
                    }
                    None => None,
                }
            };
            if old.as_ref() == Some(&op.value) {
                continue;
            }

            let new_text = serde_json::to_string(&op.value)?;
            sqlx::query(
                "INSERT INTO state (key, value, updated_at) VALUES (?, ?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                 updated_at = excluded.updated_at",
            )
            .bind(&op.key)
            .bind(&new_text)
            .bind(now_ms as i64)
            .execute(&mut *tx)
            .await?;

            let old_text = match &old {
                Some(value) => Some(serde_json::to_string(value)?),
                None => None,
            };
            sqlx::query(
                "INSERT INTO transitions (key, old_value, new_value, \"trigger\", origin, timestamp) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&op.key)
            .bind(old_text)
            .bind(&new_text)
            .bind(&op.trigger)
            .bind(&op.origin)
            .bind(now_ms as i64)
            .execute(&mut *tx)
            .await?;

            transitions.push(Transition {
                key: op.key,
                old_value: old,
                new_value: op.value,
                trigger: op.trigger,
                origin: op.origin,
            });
        }

        tx.commit().await?;

        {
            let mut versions = self.versions.lock();
            for t in &transitions {
                versions.bump_key(&t.key);
            }
            if !transitions.is_empty() {
                versions.bump_table("state");
                versions.bump_table("transitions");
            }
        }

        Ok(transitions)
    }

    /// Frozen copy of the whole `state` table for a render snapshot.
    pub async fn snapshot(&self) -> Result<HashMap<String, Value>, StoreError> {
        let rows = sqlx::query("SELECT key, value FROM state")
            .fetch_all(&self.pool)
            .await?;
        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get(0)?;
            let text: String = row.try_get(1)?;
            values.insert(key, serde_json::from_str(&text)?);
        }
        Ok(values)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
#[path = "persistent_tests.rs"]
mod tests;
