// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional render and same-tick teardown on predicate flip.

use super::support;
use orchard_exec::FakeExecutor;
use orchard_program::{conditional, phase, step, Component, Element, ProgramError, Scope};
use std::sync::Arc;

struct Research;

impl Component for Research {
    fn name(&self) -> &'static str {
        "research"
    }

    fn render(&self, scope: &mut Scope<'_>) -> Result<Element, ProgramError> {
        let current = scope
            .state("phase")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(conditional(current == "research")
            .child(phase("R").child(step("s1").child("hello")))
            .into())
    }
}

#[tokio::test]
async fn conditional_renders_then_tears_down_on_flip() {
    let program = Element::Component(Arc::new(Research));
    let mut engine = support::engine("specs/s1", program, FakeExecutor::new()).await;
    engine.seed("phase", "research", "init").await.unwrap();

    let report = engine.tick().await.unwrap();
    assert_eq!(report.sequence, 1);

    let frame = engine
        .log()
        .frame(engine.execution_id(), 1)
        .await
        .unwrap()
        .unwrap();
    assert!(frame.content.contains("<phase name=\"R\">"));
    assert!(frame.content.contains("hello"));

    // Flip the predicate through state; the next tick tears the phase
    // subtree down and renders an empty-body conditional.
    engine.seed("phase", "implement", "advance").await.unwrap();
    engine.tick().await.unwrap();

    let text = engine.tree_text();
    assert!(text.contains("<conditional condition=\"false\"/>"));
    assert!(!text.contains("phase name"));
    assert!(!text.contains("hello"));
}
