// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema bootstrap.
//!
//! Migrations are forward-only and idempotent on start: every statement is
//! `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT EXISTS`, guarded by
//! `PRAGMA user_version`. A database stamped with a newer version than
//! this engine understands refuses to open.

use crate::error::StoreError;
use sqlx::{Row, SqlitePool};

/// Version stamped into `PRAGMA user_version` after migration.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS transitions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL,
        old_value TEXT,
        new_value TEXT NOT NULL,
        \"trigger\" TEXT NOT NULL,
        origin TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS executions (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        source TEXT NOT NULL,
        status TEXT NOT NULL,
        started_at INTEGER NOT NULL,
        completed_at INTEGER,
        reason TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_executions_source ON executions (source, status)",
    "CREATE TABLE IF NOT EXISTS render_frames (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        execution_id TEXT NOT NULL,
        sequence_number INTEGER NOT NULL,
        content TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        UNIQUE (execution_id, sequence_number)
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        status TEXT NOT NULL,
        started_at INTEGER NOT NULL,
        completed_at INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS agents (
        id TEXT PRIMARY KEY,
        execution_id TEXT NOT NULL,
        node_path TEXT NOT NULL,
        model TEXT,
        status TEXT NOT NULL,
        prompt TEXT,
        output TEXT,
        structured_output TEXT,
        error TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_agents_execution ON agents (execution_id)",
    "CREATE TABLE IF NOT EXISTS tool_calls (
        id TEXT PRIMARY KEY,
        agent_id TEXT NOT NULL,
        tool_name TEXT NOT NULL,
        input TEXT,
        output TEXT,
        timestamp INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reports (
        id TEXT PRIMARY KEY,
        execution_id TEXT NOT NULL,
        agent_id TEXT,
        type TEXT NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        severity TEXT NOT NULL,
        data TEXT,
        created_at INTEGER NOT NULL
    )",
];

/// Run migrations against a freshly opened pool.
pub async fn run(pool: &SqlitePool) -> Result<(), StoreError> {
    let row = sqlx::query("PRAGMA user_version").fetch_one(pool).await?;
    let found: i64 = row.try_get(0)?;
    if found > SCHEMA_VERSION {
        return Err(StoreError::ResumeMismatch { found, supported: SCHEMA_VERSION });
    }

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    if found < SCHEMA_VERSION {
        sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .execute(pool)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrate_tests.rs"]
mod tests;
