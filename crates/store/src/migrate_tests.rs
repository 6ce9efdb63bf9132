// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::StoreError;

#[tokio::test]
async fn migrate_is_idempotent() {
    let pool = crate::open_memory_db().await.unwrap();
    // open_memory_db already ran migrations; run twice more.
    run(&pool).await.unwrap();
    run(&pool).await.unwrap();

    let row = sqlx::query("PRAGMA user_version").fetch_one(&pool).await.unwrap();
    let version: i64 = sqlx::Row::try_get(&row, 0).unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn migrate_creates_all_tables() {
    let pool = crate::open_memory_db().await.unwrap();
    for table in [
        "state",
        "transitions",
        "executions",
        "render_frames",
        "tasks",
        "agents",
        "tool_calls",
        "reports",
    ] {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        sqlx::query(&sql).fetch_one(&pool).await.unwrap();
    }
}

#[tokio::test]
async fn newer_schema_refuses_to_open() {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION + 1))
        .execute(&pool)
        .await
        .unwrap();

    let result = run(&pool).await;
    assert!(matches!(result, Err(StoreError::ResumeMismatch { .. })));
}

#[tokio::test]
async fn migrate_survives_file_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orchard.db");

    let pool = crate::open_db(&path).await.unwrap();
    sqlx::query("INSERT INTO state (key, value, updated_at) VALUES ('k', '1', 0)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = crate::open_db(&path).await.unwrap();
    let row = sqlx::query("SELECT value FROM state WHERE key = 'k'")
        .fetch_one(&pool)
        .await
        .unwrap();
    let value: String = sqlx::Row::try_get(&row, 0).unwrap();
    assert_eq!(value, "1");
}
