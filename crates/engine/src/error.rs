// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine errors.
//!
//! Recoverable outcomes (executor failure, cancellation) are delivered to
//! node callbacks and never surface here; the variants below are the
//! fatal kinds that abort an execution.

use orchard_core::LifecycleError;
use orchard_program::ProgramError;
use orchard_store::StoreError;
use thiserror::Error;

/// Fatal engine errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Invalid tree shape detected during reconciliation.
    #[error("construction error: {0}")]
    Construction(#[from] ProgramError),

    /// Storage failure, including resume-mismatch on open.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The engine attempted a lifecycle transition the state machine
    /// forbids; under single-threaded discipline this is a bug.
    #[error("state conflict at {path}: {source}")]
    StateConflict { path: String, source: LifecycleError },
}
