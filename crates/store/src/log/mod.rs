// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable log: executions, frames, agent runs, tasks, tool calls, and
//! reports.
//!
//! Append-only where the data is history (frames, transitions, tool
//! calls, reports); status-transition updates where the row models a
//! lifecycle (executions, agents, tasks). Shares the engine's single
//! SQLite connection with the persistent store.

mod agents;
mod executions;
mod frames;
mod tasks;
mod transitions;

pub use agents::AgentRow;
pub use executions::ExecutionRow;
pub use frames::FrameRow;
pub use transitions::TransitionRow;

use crate::version::VersionMap;
use parking_lot::Mutex;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Handle to the durable log tables.
#[derive(Clone)]
pub struct DurableLog {
    pool: SqlitePool,
    versions: Arc<Mutex<VersionMap>>,
}

impl DurableLog {
    pub fn new(pool: SqlitePool, versions: Arc<Mutex<VersionMap>>) -> Self {
        Self { pool, versions }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Broadcast a table mutation to reactive queries.
    pub(crate) fn bump(&self, table: &str) {
        self.versions.lock().bump_table(table);
    }
}

#[cfg(test)]
#[path = "../log_tests.rs"]
mod tests;
