// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable lifecycle: idle → started → completed, result writes
//! re-entering state through commit.

use super::support;
use orchard_exec::{ExecResult, FakeExecutor, ScriptedOutcome};
use orchard_program::{agent, Element};
use serde_json::json;

#[tokio::test]
async fn observable_lifecycle_promotes_state() {
    let program: Element = agent("reach milestone")
        .on_finished(|queue, _result| queue.set("milestone", json!("M1"), "promote"))
        .into();
    let executor = FakeExecutor::new();
    executor.script_default(ScriptedOutcome::Succeed(ExecResult::text("reached")));
    let mut engine = support::engine("specs/s2", program, executor.clone()).await;

    let report = engine.tick().await.unwrap();
    assert_eq!(report.runnables, 1);

    // A transitions row for the milestone write.
    let transitions = engine.log().transitions_for("milestone").await.unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].new_value, "\"M1\"");
    assert_eq!(transitions[0].trigger, "promote");
    assert!(transitions[0].origin.contains("agent"));

    // The following tick renders with milestone=M1.
    engine.tick().await.unwrap();
    assert_eq!(engine.state("milestone").await.unwrap(), Some(json!("M1")));

    // The agent ran exactly once and its record is terminal.
    assert_eq!(executor.dispatch_count("/root:0/agent:0"), 1);
    let agents = engine.log().agents(engine.execution_id()).await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].status, orchard_core::AgentRecordStatus::Completed);
}

#[tokio::test]
async fn result_payload_reaches_the_callback() {
    let program: Element = agent("summarize")
        .on_finished(|queue, result| {
            let output = result
                .get("output")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            queue.set("summary", json!(output), "record-summary");
        })
        .into();
    let executor = FakeExecutor::new();
    executor.script_default(ScriptedOutcome::Succeed(
        ExecResult::text("three findings").structured(json!({"count": 3})),
    ));
    let mut engine = support::engine("specs/s2b", program, executor).await;

    engine.tick().await.unwrap();
    assert_eq!(
        engine.state("summary").await.unwrap(),
        Some(json!("three findings"))
    );
}
