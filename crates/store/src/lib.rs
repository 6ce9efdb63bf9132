// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orchard-store: reactive state and the durable log.
//!
//! Two collaborating kv stores feed the render: a volatile in-memory map
//! and a persistent SQLite table, both version-tracked. Writes queued
//! during a tick apply atomically at commit and append transition audit
//! rows. The same SQLite connection also carries the durable log:
//! executions, render frames, agent runs, tasks, tool calls, and reports.

pub mod error;
pub mod log;
pub mod migrate;
pub mod persistent;
pub mod query;
pub mod snapshot;
pub mod version;
pub mod volatile;

pub use error::StoreError;
pub use log::{AgentRow, DurableLog, ExecutionRow, FrameRow, TransitionRow};
pub use migrate::SCHEMA_VERSION;
pub use persistent::{PersistentStore, Transition};
pub use query::{QueryEngine, QueryKey, QueryResult, QueryShape, QuerySpec};
pub use snapshot::Snapshot;
pub use version::VersionMap;
pub use volatile::VolatileStore;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Open (or create) the engine database at `path` and run migrations.
///
/// A single connection serializes all writes; the persistent store and the
/// durable log share the returned pool.
pub async fn open_db(path: &Path) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .map_err(StoreError::Sqlx)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    migrate::run(&pool).await?;
    Ok(pool)
}

/// In-memory database for tests and ephemeral runs.
pub async fn open_memory_db() -> Result<SqlitePool, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    migrate::run(&pool).await?;
    Ok(pool)
}
