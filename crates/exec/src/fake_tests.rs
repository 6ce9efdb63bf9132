// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::mint_run_token;
use orchard_core::ExecutionId;
use std::collections::BTreeMap;

fn request(path: &str) -> ExecRequest {
    ExecRequest {
        execution_id: ExecutionId::new(),
        node_path: path.to_string(),
        run_token: crate::mint_run_token(),
        tag: "agent".to_string(),
        input: BTreeMap::new(),
    }
}

#[tokio::test]
async fn scripted_outcomes_drain_in_order() {
    let exec = FakeExecutor::new();
    exec.script("/agent:0", ScriptedOutcome::Succeed(ExecResult::text("first")));
    exec.script("/agent:0", ScriptedOutcome::Fail("second".into()));

    let ok = exec.dispatch(request("/agent:0"), CancellationToken::new()).await;
    assert_eq!(ok.unwrap().output, "first");

    let err = exec.dispatch(request("/agent:0"), CancellationToken::new()).await;
    assert!(matches!(err, Err(ExecError::Failed(m)) if m == "second"));
}

#[tokio::test]
async fn default_outcome_applies_to_unscripted_paths() {
    let exec = FakeExecutor::new();
    let result = exec.dispatch(request("/agent:9"), CancellationToken::new()).await;
    assert_eq!(result.unwrap().output, "ok");
    assert_eq!(exec.dispatch_count("/agent:9"), 1);
}

#[tokio::test]
async fn hang_until_cancelled_reports_cancellation() {
    let exec = FakeExecutor::new();
    exec.script("/agent:0", ScriptedOutcome::HangUntilCancelled);

    let cancel = CancellationToken::new();
    let fut = exec.dispatch(request("/agent:0"), cancel.clone());
    cancel.cancel();
    assert!(matches!(fut.await, Err(ExecError::Cancelled)));
}

#[test]
fn run_tokens_are_unique() {
    assert_ne!(mint_run_token(), mint_run_token());
}
