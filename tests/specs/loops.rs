// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loop with a cap: the counter climbs once per iteration and the
//! run ends gracefully with reason `iteration-cap`.

use super::support;
use orchard_core::{ExecutionStatus, TerminationReason};
use orchard_exec::{ExecResult, FakeExecutor, ScriptedOutcome};
use orchard_program::{agent, loop_block, Component, Element, ProgramError, Scope};
use serde_json::json;
use std::sync::Arc;

struct CappedLoop;

impl Component for CappedLoop {
    fn name(&self) -> &'static str {
        "capped-loop"
    }

    fn render(&self, scope: &mut Scope<'_>) -> Result<Element, ProgramError> {
        let counter = scope.state("counter").and_then(|v| v.as_u64()).unwrap_or(0);
        Ok(loop_block("L", 3)
            .prop("while", true)
            .child(agent("increment").on_finished(move |queue, _result| {
                queue.set("counter", json!(counter + 1), "increment");
            }))
            .into())
    }
}

#[tokio::test]
async fn loop_counter_reaches_cap_then_completes() {
    let executor = FakeExecutor::new();
    executor.script_default(ScriptedOutcome::Succeed(ExecResult::text("bumped")));
    let program = Element::Component(Arc::new(CappedLoop));
    let mut engine = support::engine("specs/s4", program, executor.clone()).await;

    let summary = engine.run().await.unwrap();

    assert_eq!(engine.state("counter").await.unwrap(), Some(json!(3)));
    assert_eq!(summary.reason, TerminationReason::IterationCap);
    assert_eq!(summary.status, ExecutionStatus::Completed);

    let row = engine
        .log()
        .execution(engine.execution_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, ExecutionStatus::Completed);
    assert_eq!(row.reason.as_deref(), Some("iteration-cap"));

    // One dispatch per iteration: remounted children carry fresh run
    // tokens, so dedup never blocks the next iteration.
    let agents = engine.log().agents(engine.execution_id()).await.unwrap();
    assert_eq!(agents.len(), 3);
    let tokens: std::collections::HashSet<String> =
        executor.dispatched().into_iter().map(|r| r.run_token).collect();
    assert_eq!(tokens.len(), 3);
}

#[tokio::test]
async fn falsy_predicate_ends_the_loop_quiescent() {
    let program: Element = loop_block("M", 10)
        .prop("while", false)
        .child(agent("never matters twice"))
        .into();
    let executor = FakeExecutor::new();
    executor.script_default(ScriptedOutcome::Succeed(ExecResult::text("ok")));
    let mut engine = support::engine("specs/s4b", program, executor).await;

    let summary = engine.run().await.unwrap();
    assert_eq!(summary.reason, TerminationReason::Quiescent);
    assert_eq!(summary.status, ExecutionStatus::Completed);
}
