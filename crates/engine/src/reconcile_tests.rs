// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orchard_core::Lifecycle;
use orchard_program::{intrinsics, Component, Scope};
use orchard_store::VersionMap;
use orchard_tree::serialize;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

struct Harness {
    arena: Arena,
    root: NodeId,
    root_path: NodePath,
    snapshot: Snapshot,
    queries: QueryEngine,
}

async fn harness() -> Harness {
    let pool = orchard_store::open_memory_db().await.unwrap();
    let versions = Arc::new(Mutex::new(VersionMap::new()));
    let mut arena = Arena::new();
    let root_tag = Tag::Custom("root".into());
    let root = arena.create_element(root_tag.clone());
    let root_path = NodePath::root().child(&root_tag, None, 0);
    Harness {
        arena,
        root,
        root_path,
        snapshot: Snapshot::default(),
        queries: QueryEngine::new(pool, versions),
    }
}

impl Harness {
    fn render(&mut self, program: &Element) -> Result<RenderOutput, RuntimeError> {
        render(
            &mut self.arena,
            self.root,
            &self.root_path,
            program,
            &self.snapshot,
            &mut self.queries,
        )
    }

    fn text(&self) -> String {
        serialize(&self.arena, self.root)
    }

    fn only_child(&self) -> NodeId {
        self.arena.first_child(self.root).unwrap()
    }
}

#[tokio::test]
async fn mounts_a_simple_tree() {
    let mut h = harness().await;
    let program: Element = intrinsics::phase("R")
        .child(intrinsics::step("s1").child("hello"))
        .into();
    h.render(&program).unwrap();

    assert!(h.text().contains("<phase name=\"R\">"));
    assert!(h.text().contains("hello"));
}

#[tokio::test]
async fn rerender_reuses_nodes_and_scratch() {
    let mut h = harness().await;
    let program: Element = intrinsics::agent("go").into();
    h.render(&program).unwrap();

    let agent = h.only_child();
    h.arena.scratch_mut(agent).unwrap().lifecycle = Lifecycle::Completed;
    h.arena.scratch_mut(agent).unwrap().run_token = Some("tok".into());

    h.render(&program).unwrap();
    assert_eq!(h.only_child(), agent);
    let scratch = h.arena.scratch(agent).unwrap();
    assert_eq!(scratch.lifecycle, Lifecycle::Completed);
    assert_eq!(scratch.run_token.as_deref(), Some("tok"));
}

#[tokio::test]
async fn prop_change_updates_in_place() {
    let mut h = harness().await;
    let v1: Element = intrinsics::step("s1").prop("retries", 1).into();
    let v2: Element = intrinsics::step("s1").prop("retries", 2).into();
    h.render(&v1).unwrap();
    let id = h.only_child();
    h.render(&v2).unwrap();

    assert_eq!(h.only_child(), id);
    assert_eq!(h.arena.node(id).unwrap().props.get("retries"), Some(&json!(2)));
}

#[tokio::test]
async fn removed_props_disappear() {
    let mut h = harness().await;
    let v1: Element = intrinsics::step("s1").prop("retries", 1).into();
    let v2: Element = intrinsics::step("s1").into();
    h.render(&v1).unwrap();
    h.render(&v2).unwrap();

    let id = h.only_child();
    assert!(h.arena.node(id).unwrap().props.get("retries").is_none());
}

#[tokio::test]
async fn tag_change_replaces_the_node() {
    let mut h = harness().await;
    let v1: Element = intrinsics::agent("go").into();
    let v2: Element = intrinsics::orchestrator("sub").into();
    h.render(&v1).unwrap();
    let before = h.only_child();
    h.arena.scratch_mut(before).unwrap().lifecycle = Lifecycle::Completed;

    h.render(&v2).unwrap();
    let after = h.only_child();
    assert_eq!(h.arena.node(after).unwrap().tag, Tag::Orchestrator);
    // Fresh node, fresh scratch.
    assert_eq!(h.arena.scratch(after).unwrap().lifecycle, Lifecycle::Idle);
    assert_eq!(h.arena.len(), 2, "old subtree released");
}

#[tokio::test]
async fn keyed_reorder_preserves_identity() {
    let mut h = harness().await;
    let v1: Element = Element::Fragment(vec![
        intrinsics::step("a").key("a").into(),
        intrinsics::step("b").key("b").into(),
    ]);
    let v2: Element = Element::Fragment(vec![
        intrinsics::step("b").key("b").into(),
        intrinsics::step("a").key("a").into(),
    ]);
    h.render(&v1).unwrap();
    let children_before = h.arena.node(h.root).unwrap().children.clone();

    h.render(&v2).unwrap();
    let children_after = h.arena.node(h.root).unwrap().children.clone();
    assert_eq!(children_after, vec![children_before[1], children_before[0]]);
}

#[tokio::test]
async fn text_patches_in_place() {
    let mut h = harness().await;
    let v1: Element = intrinsics::step("s").child("before").into();
    let v2: Element = intrinsics::step("s").child("after").into();
    h.render(&v1).unwrap();
    let step = h.only_child();
    let text = h.arena.first_child(step).unwrap();

    h.render(&v2).unwrap();
    assert_eq!(h.arena.first_child(step), Some(text));
    assert_eq!(h.arena.text_of(text), Some("after"));
}

#[tokio::test]
async fn false_conditional_renders_empty_body() {
    let mut h = harness().await;
    let hidden: Element = intrinsics::conditional(false)
        .child(intrinsics::phase("R").child(intrinsics::step("s1")))
        .into();
    h.render(&hidden).unwrap();

    assert_eq!(h.text(), "<root>\n  <conditional condition=\"false\"/>\n</root>\n");
    assert_eq!(h.arena.len(), 2);
}

#[tokio::test]
async fn conditional_flip_tears_down_and_remounts() {
    let mut h = harness().await;
    let shown: Element = intrinsics::conditional(true)
        .child(intrinsics::phase("R").child(intrinsics::step("s1")))
        .into();
    let hidden: Element = intrinsics::conditional(false)
        .child(intrinsics::phase("R").child(intrinsics::step("s1")))
        .into();

    h.render(&shown).unwrap();
    assert!(h.text().contains("<phase name=\"R\">"));
    let before = h.arena.len();

    let output = h.render(&hidden).unwrap();
    assert!(!h.text().contains("phase"));
    assert_eq!(h.arena.len(), 2);
    assert!(before > 2);
    assert_eq!(output.removed_paths.len(), 2, "phase and step paths recorded");
}

#[tokio::test]
async fn duplicate_sibling_keys_are_fatal() {
    let mut h = harness().await;
    let program: Element = Element::Fragment(vec![
        intrinsics::step("a").key("dup").into(),
        intrinsics::step("b").key("dup").into(),
    ]);
    let err = h.render(&program).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Construction(ProgramError::DuplicateSiblingKey { .. })
    ));
}

#[tokio::test]
async fn callback_on_structural_node_is_fatal() {
    let mut h = harness().await;
    let program: Element = intrinsics::step("s1").on_finished(|_, _| {}).into();
    let err = h.render(&program).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Construction(ProgramError::CallbackOnStructural { .. })
    ));
}

#[tokio::test]
async fn components_expand_with_effects() {
    struct Greeter;
    impl Component for Greeter {
        fn name(&self) -> &'static str {
            "greeter"
        }
        fn render(&self, scope: &mut Scope<'_>) -> Result<Element, ProgramError> {
            let phase = scope
                .state("phase")
                .and_then(|v| v.as_str())
                .unwrap_or("research")
                .to_string();
            scope.use_effect(vec![json!(phase.clone())], Arc::new(|_| None));
            Ok(intrinsics::phase(phase).into())
        }
    }

    let mut h = harness().await;
    h.snapshot = Snapshot::new(Default::default(), {
        let mut m = std::collections::HashMap::new();
        m.insert("phase".to_string(), json!("research"));
        m
    });
    let program = Element::Component(Arc::new(Greeter));
    let output = h.render(&program).unwrap();

    assert!(h.text().contains("<phase name=\"research\"/>"));
    assert_eq!(output.effects.len(), 1);
    assert!(output.effects[0].path.contains("greeter"));
    assert_eq!(output.effects[0].deps, vec![json!("research")]);
}

#[tokio::test]
async fn node_paths_are_stable_across_renders() {
    let mut h = harness().await;
    let program: Element = intrinsics::phase("R")
        .child(intrinsics::step("s1").child(intrinsics::agent("go")))
        .into();
    h.render(&program).unwrap();

    let phase = h.only_child();
    let step = h.arena.first_child(phase).unwrap();
    let agent = h.arena.first_child(step).unwrap();
    let path_before = h.arena.scratch(agent).unwrap().path.clone();

    h.render(&program).unwrap();
    let path_after = h.arena.scratch(agent).unwrap().path.clone();
    assert_eq!(path_before, path_after);
    assert_eq!(
        path_before.as_deref(),
        Some("/root:0/phase:0/step:0/agent:0")
    );
}
