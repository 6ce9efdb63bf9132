// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resume: a second engine attaches to the running execution,
//! state survives, frame numbering continues, nothing dispatches twice.

use super::support;
use orchard_exec::{ExecResult, FakeExecutor, ScriptedOutcome};
use orchard_program::{agent, conditional, Component, Element, ProgramError, Scope};
use serde_json::json;
use std::sync::Arc;

/// Dispatches its agent only while the milestone is unset, so completed
/// work stays completed across a resume.
struct OnceOnly;

impl Component for OnceOnly {
    fn name(&self) -> &'static str {
        "once-only"
    }

    fn render(&self, scope: &mut Scope<'_>) -> Result<Element, ProgramError> {
        let done = scope.state("milestone").is_some();
        Ok(conditional(!done)
            .child(agent("do the work").on_finished(|queue, _result| {
                queue.set("milestone", json!("M1"), "promote");
            }))
            .into())
    }
}

#[tokio::test]
async fn resume_attaches_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("orchard.db");

    let first_executor = FakeExecutor::new();
    first_executor.script_default(ScriptedOutcome::Succeed(ExecResult::text("done")));
    let execution_id = {
        let program = Element::Component(Arc::new(OnceOnly));
        let mut engine =
            support::engine_at("specs/s5", &db, program, first_executor.clone()).await;
        assert!(!engine.resumed());

        engine.tick().await.unwrap();
        engine.tick().await.unwrap();
        *engine.execution_id()
        // Engine dropped here without finishing: the execution row stays
        // `running`, simulating a killed process after tick 2's commit.
    };
    assert_eq!(first_executor.dispatch_count("/root:0/conditional:0/agent:0"), 1);

    let second_executor = FakeExecutor::new();
    let program = Element::Component(Arc::new(OnceOnly));
    let mut engine = support::engine_at("specs/s5", &db, program, second_executor.clone()).await;

    // Attached to the same execution, not a fresh one.
    assert!(engine.resumed());
    assert_eq!(*engine.execution_id(), execution_id);

    // Persistent state is intact and drives the render: no re-dispatch.
    assert_eq!(engine.state("milestone").await.unwrap(), Some(json!("M1")));
    let report = engine.tick().await.unwrap();
    assert_eq!(report.sequence, 3, "frame numbering continues after resume");
    assert_eq!(report.runnables, 0);
    assert!(second_executor.dispatched().is_empty());
}

#[tokio::test]
async fn finished_executions_start_fresh_not_resumed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("orchard.db");

    let first = {
        let executor = FakeExecutor::new();
        executor.script_default(ScriptedOutcome::Succeed(ExecResult::text("done")));
        let program = Element::Component(Arc::new(OnceOnly));
        let mut engine = support::engine_at("specs/s5b", &db, program, executor).await;
        engine.run().await.unwrap();
        *engine.execution_id()
    };

    let program = Element::Component(Arc::new(OnceOnly));
    let engine = support::engine_at("specs/s5b", &db, program, FakeExecutor::new()).await;
    assert!(!engine.resumed());
    assert_ne!(*engine.execution_id(), first);
}
