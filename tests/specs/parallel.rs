// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parallel dispatch: one tick, concurrent resolution out of
//! declared order, atomic commit, exactly-once callbacks.

use super::support;
use orchard_exec::{ExecResult, FakeExecutor, ScriptedOutcome};
use orchard_program::{agent, parallel, Element};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn parallel_enclosure_dispatches_all_in_one_tick() {
    let finished: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let mut enclosure = parallel();
    for i in 0..3 {
        let finished = finished.clone();
        let label = format!("agent-{i}");
        enclosure = enclosure.child(
            agent(format!("job {i}"))
                .on_finished(move |queue, _result| {
                    finished.lock().push(label.clone());
                    queue.set(format!("result/{label}"), json!(true), "record");
                }),
        );
    }
    let program: Element = enclosure.into();

    let executor = FakeExecutor::new();
    executor.script_default(ScriptedOutcome::Succeed(ExecResult::text("ok")));
    // Resolve in reverse declared order.
    executor.delay("/root:0/parallel:0/agent:0", Duration::from_millis(30));
    executor.delay("/root:0/parallel:0/agent:1", Duration::from_millis(20));
    executor.delay("/root:0/parallel:0/agent:2", Duration::from_millis(10));

    let mut engine = support::engine("specs/s3", program, executor.clone()).await;
    let report = engine.tick().await.unwrap();

    // All three dispatched in the same tick.
    assert_eq!(report.runnables, 3);
    for i in 0..3 {
        assert_eq!(executor.dispatch_count(&format!("/root:0/parallel:0/agent:{i}")), 1);
    }

    // All three writes committed atomically: the next snapshot sees every
    // one of them.
    for i in 0..3 {
        assert_eq!(
            engine.state(&format!("result/agent-{i}")).await.unwrap(),
            Some(json!(true)),
        );
    }

    // on_finished ran exactly once per agent.
    let mut calls = finished.lock().clone();
    calls.sort();
    assert_eq!(calls, ["agent-0", "agent-1", "agent-2"]);

    // Frame order preserves declared order regardless of resolution order.
    let frame = engine
        .log()
        .frame(engine.execution_id(), 1)
        .await
        .unwrap()
        .unwrap();
    let p0 = frame.content.find("job 0").unwrap();
    let p1 = frame.content.find("job 1").unwrap();
    let p2 = frame.content.find("job 2").unwrap();
    assert!(p0 < p1 && p1 < p2);
}

#[tokio::test]
async fn parallel_failure_does_not_poison_siblings() {
    let program: Element = parallel()
        .child(agent("a").on_finished(|q, _| q.set("a", json!(true), "t")))
        .child(agent("b").on_error(|q, _| q.set("b-failed", json!(true), "t")))
        .into();

    let executor = FakeExecutor::new();
    executor.script(
        "/root:0/parallel:0/agent:0",
        ScriptedOutcome::Succeed(ExecResult::text("fine")),
    );
    executor.script("/root:0/parallel:0/agent:1", ScriptedOutcome::Fail("boom".into()));

    let mut engine = support::engine("specs/s3b", program, executor).await;
    engine.tick().await.unwrap();

    assert_eq!(engine.state("a").await.unwrap(), Some(json!(true)));
    assert_eq!(engine.state("b-failed").await.unwrap(), Some(json!(true)));
}
