// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage errors

use thiserror::Error;

/// Errors from the state stores and the durable log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// On-disk schema is newer than this engine understands.
    #[error("schema version {found} is newer than supported version {supported}")]
    ResumeMismatch { found: i64, supported: i64 },

    /// A commit observed a state the single-threaded discipline forbids.
    #[error("state conflict: {0}")]
    StateConflict(String),
}
