// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orchard-exec: the executor boundary.
//!
//! The engine never interprets LLM output; it hands a runnable node's
//! input projection to an [`Executor`] and feeds the result back through
//! node callbacks. Concrete executors (LLM clients, tool runners,
//! sub-process launchers) live outside the core.

pub mod request;

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeExecutor, ScriptedOutcome};

pub use request::{ExecRequest, ExecResult, ReportDraft, StopReason, ToolCallDraft};

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors an executor may return. `Cancelled` is a distinguished outcome,
/// not a failure: the node transitions to `cancelled` and `on_cancel` runs.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("executor failure: {0}")]
    Failed(String),
    #[error("dispatch cancelled")]
    Cancelled,
}

/// Boundary to runnable-node handlers.
///
/// Implementations must be safe to invoke concurrently from distinct
/// runnables of a parallel enclosure, and must honor the cancellation
/// token. Timeouts are the executor's to honor; the core only records
/// the terminal outcome it receives.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn dispatch(
        &self,
        request: ExecRequest,
        cancel: CancellationToken,
    ) -> Result<ExecResult, ExecError>;
}

/// Mint a run token: an opaque value identifying one distinct dispatch of
/// a node. Stable across pure re-renders (it lives in node scratch);
/// re-minted on explicit retry or loop remount.
pub fn mint_run_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
