// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted executor for tests.

use crate::{ExecError, ExecRequest, ExecResult, Executor};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What the fake should do for one dispatch.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Succeed(ExecResult),
    Fail(String),
    /// Sleep until cancelled, then report cancellation.
    HangUntilCancelled,
}

#[derive(Default)]
struct Script {
    /// Per-path outcome queues, drained front-first per dispatch.
    by_path: HashMap<String, Vec<ScriptedOutcome>>,
    /// Fallback outcome when a path has no queue entry.
    default: Option<ScriptedOutcome>,
    /// Artificial latency before resolving, for ordering tests.
    delay: HashMap<String, Duration>,
}

/// Executor whose outcomes are scripted per node path.
///
/// Records every dispatch so tests can assert at-most-once delivery and
/// dispatch order.
#[derive(Clone, Default)]
pub struct FakeExecutor {
    script: Arc<Mutex<Script>>,
    dispatched: Arc<Mutex<Vec<ExecRequest>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next dispatch of `path`.
    pub fn script(&self, path: impl Into<String>, outcome: ScriptedOutcome) {
        self.script.lock().by_path.entry(path.into()).or_default().push(outcome);
    }

    /// Outcome used when no per-path entry is queued.
    pub fn script_default(&self, outcome: ScriptedOutcome) {
        self.script.lock().default = Some(outcome);
    }

    /// Delay resolution of `path` dispatches, for ordering tests.
    pub fn delay(&self, path: impl Into<String>, delay: Duration) {
        self.script.lock().delay.insert(path.into(), delay);
    }

    /// Every request dispatched so far, in dispatch order.
    pub fn dispatched(&self) -> Vec<ExecRequest> {
        self.dispatched.lock().clone()
    }

    /// Number of dispatches for one node path.
    pub fn dispatch_count(&self, path: &str) -> usize {
        self.dispatched.lock().iter().filter(|r| r.node_path == path).count()
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn dispatch(
        &self,
        request: ExecRequest,
        cancel: CancellationToken,
    ) -> Result<ExecResult, ExecError> {
        let (outcome, delay) = {
            let mut script = self.script.lock();
            self.dispatched.lock().push(request.clone());
            let outcome = match script.by_path.get_mut(&request.node_path) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => script
                    .default
                    .clone()
                    .unwrap_or_else(|| ScriptedOutcome::Succeed(ExecResult::text("ok"))),
            };
            (outcome, script.delay.get(&request.node_path).copied())
        };

        if let Some(delay) = delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(ExecError::Cancelled),
            }
        }

        match outcome {
            ScriptedOutcome::Succeed(result) => Ok(result),
            ScriptedOutcome::Fail(message) => Err(ExecError::Failed(message)),
            ScriptedOutcome::HangUntilCancelled => {
                cancel.cancelled().await;
                Err(ExecError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
