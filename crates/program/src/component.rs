// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Components and the render scope.

use crate::effect::{EffectFn, EffectRegistration};
use crate::element::Element;
use crate::error::ProgramError;
use orchard_core::Value;
use orchard_store::{QueryEngine, QueryKey, QueryResult, QueryShape, QuerySpec, Snapshot};
use std::collections::HashSet;

/// A program building block: renders elements against a state snapshot.
///
/// Rendering is synchronous and pure apart from scope registrations
/// (effects, query subscriptions). Executor results never reach a
/// component directly; they arrive through state.
pub trait Component: Send + Sync + 'static {
    /// Stable name used in component paths.
    fn name(&self) -> &'static str {
        "component"
    }

    fn render(&self, scope: &mut Scope<'_>) -> Result<Element, ProgramError>;
}

/// Per-component render scope.
///
/// Identity is the component path (parent path + name + child index), so
/// effects and query subscriptions key off stable `(path, slot)` tuples
/// across re-renders.
pub struct Scope<'a> {
    snapshot: &'a Snapshot,
    queries: &'a mut QueryEngine,
    effects: &'a mut Vec<EffectRegistration>,
    live_queries: &'a mut HashSet<QueryKey>,
    path: String,
    query_slot: usize,
    effect_slot: usize,
}

impl<'a> Scope<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        queries: &'a mut QueryEngine,
        effects: &'a mut Vec<EffectRegistration>,
        live_queries: &'a mut HashSet<QueryKey>,
        path: String,
    ) -> Self {
        Self {
            snapshot,
            queries,
            effects,
            live_queries,
            path,
            query_slot: 0,
            effect_slot: 0,
        }
    }

    /// The component path this scope renders under.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The frozen snapshot for this render.
    pub fn snapshot(&self) -> &Snapshot {
        self.snapshot
    }

    /// Persistent state value.
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.snapshot.state(key)
    }

    /// Persistent state value, defaulting to null.
    pub fn state_or_null(&self, key: &str) -> Value {
        self.snapshot.state_or_null(key)
    }

    /// Volatile state value.
    pub fn volatile(&self, key: &str) -> Option<&Value> {
        self.snapshot.volatile(key)
    }

    /// Register a reactive query and read its cached result.
    ///
    /// The first read of a fresh query reports `is_loading: true`; the
    /// engine pumps pending queries between ticks and re-renders.
    pub fn query(&mut self, spec: QuerySpec) -> QueryResult {
        let key = QueryKey(format!("{}#q{}", self.path, self.query_slot));
        self.query_slot += 1;
        self.live_queries.insert(key.clone());
        self.queries.read(key, spec)
    }

    /// First column of the first row, else null.
    pub fn query_value(&mut self, sql: &str, params: Vec<Value>) -> QueryResult {
        self.query(QuerySpec::new(sql, QueryShape::Value).params(params))
    }

    /// First row as an object, else null.
    pub fn query_one(&mut self, sql: &str, params: Vec<Value>) -> QueryResult {
        self.query(QuerySpec::new(sql, QueryShape::One).params(params))
    }

    /// Ordered sequence of rows.
    pub fn query_many(&mut self, sql: &str, params: Vec<Value>) -> QueryResult {
        self.query(QuerySpec::new(sql, QueryShape::Many).params(params))
    }

    /// Register an effect with a dependency tuple.
    ///
    /// Runs after commit on first registration and whenever `deps`
    /// differs (value equality, slot for slot) from the previous run.
    pub fn use_effect(&mut self, deps: Vec<Value>, run: EffectFn) {
        let registration = EffectRegistration {
            path: self.path.clone(),
            slot: self.effect_slot,
            deps,
            run,
        };
        self.effect_slot += 1;
        self.effects.push(registration);
    }
}
