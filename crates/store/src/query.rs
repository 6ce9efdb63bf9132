// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reactive SQL queries with versioned read sets.
//!
//! A registered query caches its last result. [`QueryEngine::read`] is
//! synchronous (rendering never blocks on I/O): it returns the cache, or a
//! loading result for a query that has not executed yet. Between renders
//! the engine calls [`QueryEngine::pump`], which re-executes exactly the
//! queries whose read set intersects the versions bumped since their last
//! run, plus anything explicitly refetched.
//!
//! Read sets are tracked at two granularities: state keys (the `watch`
//! list, string params against the `state` table, and key columns of
//! returned rows) and table names referenced by the SQL.

use crate::error::StoreError;
use crate::version::VersionMap;
use orchard_core::Value;
use parking_lot::Mutex;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Tables the read-set scanner recognizes.
const KNOWN_TABLES: &[&str] = &[
    "state",
    "transitions",
    "executions",
    "render_frames",
    "tasks",
    "agents",
    "tool_calls",
    "reports",
];

/// Identity of a registered query: component path + slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(pub String);

/// Result projection shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// First column of the first row, else null.
    Value,
    /// First row as an object, else null.
    One,
    /// Ordered sequence of row objects.
    Many,
}

/// One query registration.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub sql: String,
    pub params: Vec<Value>,
    pub shape: QueryShape,
    /// Short-circuit: no execution, `{data: null, is_loading: false}`.
    pub skip: bool,
    /// Extra state keys to watch beyond the inferred read set.
    pub watch: Vec<String>,
}

impl QuerySpec {
    pub fn new(sql: impl Into<String>, shape: QueryShape) -> Self {
        Self { sql: sql.into(), params: Vec::new(), shape, skip: false, watch: Vec::new() }
    }

    orchard_core::setters! {
        set {
            params: Vec<Value>,
            skip: bool,
            watch: Vec<String>,
        }
    }
}

/// Cached outcome handed to renders.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub data: Value,
    pub is_loading: bool,
    /// Captured execution error; never thrown into the renderer.
    pub error: Option<String>,
}

impl QueryResult {
    fn loading() -> Self {
        Self { data: Value::Null, is_loading: true, error: None }
    }

    fn skipped() -> Self {
        Self { data: Value::Null, is_loading: false, error: None }
    }
}

struct QueryEntry {
    spec: QuerySpec,
    result: QueryResult,
    read_keys: BTreeSet<String>,
    read_tables: BTreeSet<String>,
    /// Version counter at last execution.
    as_of: u64,
    dirty: bool,
}

/// Registry of reactive queries sharing the engine pool.
pub struct QueryEngine {
    pool: SqlitePool,
    versions: Arc<Mutex<VersionMap>>,
    entries: HashMap<QueryKey, QueryEntry>,
}

impl QueryEngine {
    pub fn new(pool: SqlitePool, versions: Arc<Mutex<VersionMap>>) -> Self {
        Self { pool, versions, entries: HashMap::new() }
    }

    /// Synchronous cache read used during rendering.
    ///
    /// Registers (or re-registers) the query under `key`. A changed spec
    /// invalidates the cache; the fresh result arrives after the next
    /// [`QueryEngine::pump`].
    pub fn read(&mut self, key: QueryKey, spec: QuerySpec) -> QueryResult {
        if spec.skip {
            self.entries.remove(&key);
            return QueryResult::skipped();
        }

        match self.entries.get_mut(&key) {
            Some(entry) if entry.spec == spec => entry.result.clone(),
            Some(entry) => {
                entry.read_keys = initial_read_keys(&spec);
                entry.read_tables = referenced_tables(&spec.sql);
                entry.spec = spec;
                entry.result = QueryResult::loading();
                entry.dirty = true;
                entry.result.clone()
            }
            None => {
                let entry = QueryEntry {
                    read_keys: initial_read_keys(&spec),
                    read_tables: referenced_tables(&spec.sql),
                    spec,
                    result: QueryResult::loading(),
                    as_of: 0,
                    dirty: true,
                };
                let result = entry.result.clone();
                self.entries.insert(key, entry);
                result
            }
        }
    }

    /// Force re-execution of one query on the next pump.
    pub fn refetch(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.dirty = true;
        }
    }

    /// Cached result without registering anything.
    pub fn cached(&self, key: &QueryKey) -> Option<&QueryResult> {
        self.entries.get(key).map(|e| &e.result)
    }

    /// Registered queries still waiting on their first execution.
    pub fn loading_count(&self) -> usize {
        self.entries.values().filter(|e| e.result.is_loading).count()
    }

    /// Drop registrations not in `live` (components unmounted).
    pub fn retain(&mut self, live: &std::collections::HashSet<QueryKey>) {
        self.entries.retain(|key, _| live.contains(key));
    }

    /// Execute every dirty or stale query. Returns how many ran.
    pub async fn pump(&mut self) -> Result<usize, StoreError> {
        let stale: Vec<QueryKey> = {
            let versions = self.versions.lock();
            self.entries
                .iter()
                .filter(|(_, entry)| {
                    entry.dirty
                        || entry.read_keys.iter().any(|k| versions.key(k) > entry.as_of)
                        || entry.read_tables.iter().any(|t| versions.table(t) > entry.as_of)
                })
                .map(|(key, _)| key.clone())
                .collect()
        };

        for key in &stale {
            let (sql, params, shape) = {
                let Some(entry) = self.entries.get(key) else { continue };
                (entry.spec.sql.clone(), entry.spec.params.clone(), entry.spec.shape)
            };
            let outcome = self.execute(&sql, &params, shape).await;
            let as_of = self.versions.lock().counter();
            if let Some(entry) = self.entries.get_mut(key) {
                match outcome {
                    Ok((data, row_keys)) => {
                        entry.result = QueryResult { data, is_loading: false, error: None };
                        entry.read_keys.extend(row_keys);
                    }
                    Err(e) => {
                        entry.result = QueryResult {
                            data: Value::Null,
                            is_loading: false,
                            error: Some(e.to_string()),
                        };
                    }
                }
                entry.as_of = as_of;
                entry.dirty = false;
            }
        }
        Ok(stale.len())
    }

    async fn execute(
        &self,
        sql: &str,
        params: &[Value],
        shape: QueryShape,
    ) -> Result<(Value, BTreeSet<String>), StoreError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::Number(n) if n.is_i64() => query.bind(n.as_i64()),
                Value::Number(n) => query.bind(n.as_f64()),
                Value::String(s) => query.bind(s.clone()),
                other => query.bind(other.to_string()),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut row_keys = BTreeSet::new();
        for row in &rows {
            if let Some(pos) = row.columns().iter().position(|c| c.name() == "key") {
                if let Ok(key) = row.try_get::<String, _>(pos) {
                    row_keys.insert(key);
                }
            }
        }

        let data = match shape {
            QueryShape::Value => match rows.first() {
                Some(row) => column_value(row, 0),
                None => Value::Null,
            },
            QueryShape::One => match rows.first() {
                Some(row) => row_object(row),
                None => Value::Null,
            },
            QueryShape::Many => Value::Array(rows.iter().map(row_object).collect()),
        };
        Ok((data, row_keys))
    }
}

/// State keys a query watches before its first execution: the explicit
/// watch list, plus string params when the SQL touches the state table.
fn initial_read_keys(spec: &QuerySpec) -> BTreeSet<String> {
    let mut keys: BTreeSet<String> = spec.watch.iter().cloned().collect();
    if referenced_tables(&spec.sql).contains("state") {
        for param in &spec.params {
            if let Value::String(s) = param {
                keys.insert(s.clone());
            }
        }
    }
    keys
}

fn referenced_tables(sql: &str) -> BTreeSet<String> {
    let lowered = sql.to_lowercase();
    KNOWN_TABLES
        .iter()
        .filter(|table| {
            lowered
                .match_indices(*table)
                .any(|(at, _)| is_word_boundary(&lowered, at, table.len()))
        })
        .map(|t| t.to_string())
        .collect()
}

fn is_word_boundary(text: &str, at: usize, len: usize) -> bool {
    let before = text[..at].chars().next_back();
    let after = text[at + len..].chars().next();
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    !is_word(before) && !is_word(after)
}

fn row_object(row: &SqliteRow) -> Value {
    let mut object = serde_json::Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_value(row, index));
    }
    Value::Object(object)
}

fn column_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = row.columns().get(index).map(|c| c.type_info().name().to_string());
    match type_name.as_deref() {
        Some("INTEGER") => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
        Some("REAL") => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
        Some("BOOLEAN") => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::from)
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
