// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The execute phase.
//!
//! For each runnable: transition to `started` and run `on_start`, hand
//! the input projection to the executor with a cancellation token, then
//! settle the outcome: `completed`/`on_finished`, `failed`/`on_error`,
//! or `cancelled`/`on_cancel`. Parallel enclosures dispatch their members
//! concurrently and join; everything else runs in declared order. Every
//! callback queues writes into a per-node queue which is absorbed into
//! the tick queue in declared sibling order, so commit order stays
//! deterministic even when executors resolve out of order.

use crate::error::RuntimeError;
use crate::runnable::{DispatchGroup, Runnable};
use orchard_core::{CallbackKind, ExecutionId, Lifecycle, Value, WriteQueue};
use orchard_exec::{ExecError, ExecRequest, ExecResult, Executor};
use orchard_store::DurableLog;
use orchard_tree::{Arena, NodeId};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio_util::sync::CancellationToken;

/// Shared context for one tick's execute phase.
pub(crate) struct ExecuteCtx<'a, X: Executor> {
    pub executor: &'a X,
    pub log: &'a DurableLog,
    pub execution_id: &'a ExecutionId,
    /// Parent token; stop requests cancel every in-flight dispatch.
    pub stop: &'a CancellationToken,
    /// Per-path tokens so tree removal can cancel in-flight work.
    pub inflight: &'a Mutex<HashMap<String, CancellationToken>>,
    pub now_ms: u64,
}

struct Prepared {
    id: NodeId,
    path: String,
    token: String,
    request: ExecRequest,
    queue: WriteQueue,
}

struct Settled {
    prepared: Prepared,
    agent: orchard_core::AgentRecordId,
    outcome: Result<ExecResult, ExecError>,
}

/// Run every dispatch group in order, absorbing queued writes into
/// `tick_queue` and recording `(path, token)` pairs into `dispatched`.
pub(crate) async fn run_groups<X: Executor>(
    arena: &mut Arena,
    groups: Vec<DispatchGroup>,
    ctx: &ExecuteCtx<'_, X>,
    tick_queue: &mut WriteQueue,
    dispatched: &mut HashSet<(String, String)>,
) -> Result<(), RuntimeError> {
    for group in groups {
        match group {
            DispatchGroup::Sequential(runnable) => {
                let prepared = prepare(arena, runnable, ctx.execution_id)?;
                let settled = execute(prepared, ctx).await?;
                let queue = settle(arena, settled, ctx, dispatched).await?;
                tick_queue.absorb(queue);
            }
            DispatchGroup::Parallel(batch) => {
                // Start every sibling before any await, in declared order.
                let mut prepared = Vec::with_capacity(batch.len());
                for runnable in batch {
                    prepared.push(prepare(arena, runnable, ctx.execution_id)?);
                }

                // Concurrent dispatch; no ordering between siblings.
                let settled = futures_util::future::join_all(
                    prepared.into_iter().map(|p| execute(p, ctx)),
                )
                .await;

                // Settle and absorb in declared order for determinism.
                for result in settled {
                    let queue = settle(arena, result?, ctx, dispatched).await?;
                    tick_queue.absorb(queue);
                }
            }
        }
    }
    Ok(())
}

/// Phase A (sync): lifecycle to `started`, `on_start`, input projection.
fn prepare(
    arena: &mut Arena,
    runnable: Runnable,
    execution_id: &ExecutionId,
) -> Result<Prepared, RuntimeError> {
    let Runnable { id, path, token } = runnable;

    transition(arena, id, &path, Lifecycle::Started)?;

    let (input, tag) = {
        let node = arena.node(id);
        let input: BTreeMap<String, Value> = node
            .map(|n| {
                n.props
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let tag = node.map(|n| n.tag.name().to_string()).unwrap_or_default();
        (input, tag)
    };

    let mut queue = WriteQueue::new();
    queue.with_origin(path.clone());
    let payload = Value::Object(input.clone().into_iter().collect());
    if let Some(scratch) = arena.scratch(id) {
        scratch.callbacks.invoke(CallbackKind::Start, &mut queue, &payload);
    }

    let request = ExecRequest {
        execution_id: *execution_id,
        node_path: path.clone(),
        run_token: token.clone(),
        tag,
        input,
    };
    Ok(Prepared { id, path, token, request, queue })
}

/// Phase B (async): record the agent row and dispatch through C9.
async fn execute<X: Executor>(
    prepared: Prepared,
    ctx: &ExecuteCtx<'_, X>,
) -> Result<Settled, RuntimeError> {
    let agent = ctx
        .log
        .insert_agent(
            ctx.execution_id,
            &prepared.path,
            prepared.request.model(),
            prepared.request.prompt(),
        )
        .await?;
    ctx.log.agent_running(&agent).await?;

    let cancel = ctx.stop.child_token();
    ctx.inflight.lock().insert(prepared.path.clone(), cancel.clone());

    tracing::info!(path = %prepared.path, token = %orchard_core::short(&prepared.token, 8), "dispatching runnable");
    let started = std::time::Instant::now();
    let outcome = ctx.executor.dispatch(prepared.request.clone(), cancel).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    ctx.inflight.lock().remove(&prepared.path);
    match &outcome {
        Ok(_) => tracing::info!(path = %prepared.path, elapsed_ms, "dispatch completed"),
        Err(ExecError::Cancelled) => {
            tracing::info!(path = %prepared.path, elapsed_ms, "dispatch cancelled")
        }
        Err(e) => tracing::error!(path = %prepared.path, elapsed_ms, error = %e, "dispatch failed"),
    }

    Ok(Settled { prepared, agent, outcome })
}

/// Phase C: lifecycle terminal, result callback, durable-log updates.
async fn settle<X: Executor>(
    arena: &mut Arena,
    settled: Settled,
    ctx: &ExecuteCtx<'_, X>,
    dispatched: &mut HashSet<(String, String)>,
) -> Result<WriteQueue, RuntimeError> {
    let Settled { prepared, agent, outcome } = settled;
    let Prepared { id, path, token, mut queue, .. } = prepared;

    dispatched.insert((path.clone(), token));

    match outcome {
        Ok(result) => {
            transition(arena, id, &path, Lifecycle::Completed)?;
            let payload = serde_json::to_value(&result).unwrap_or(Value::Null);
            if let Some(scratch) = arena.scratch_mut(id) {
                scratch.result = Some(payload.clone());
            }
            if let Some(scratch) = arena.scratch(id) {
                scratch.callbacks.invoke(CallbackKind::Finished, &mut queue, &payload);
            }

            ctx.log
                .agent_completed(&agent, &result.output, result.structured.as_ref())
                .await?;
            for call in &result.tool_calls {
                ctx.log
                    .record_tool_call(&agent, &call.tool_name, &call.input, &call.output, ctx.now_ms)
                    .await?;
            }
            for report in &result.reports {
                ctx.log
                    .insert_report(
                        ctx.execution_id,
                        Some(&agent),
                        &report.report_type,
                        &report.title,
                        &report.content,
                        report.severity,
                        report.data.as_ref(),
                        ctx.now_ms,
                    )
                    .await?;
            }
        }
        Err(ExecError::Cancelled) => {
            transition(arena, id, &path, Lifecycle::Cancelled)?;
            if let Some(scratch) = arena.scratch(id) {
                scratch.callbacks.invoke(CallbackKind::Cancel, &mut queue, &Value::Null);
            }
            ctx.log.agent_failed(&agent, "cancelled").await?;
        }
        Err(ExecError::Failed(message)) => {
            transition(arena, id, &path, Lifecycle::Failed)?;
            let payload = Value::String(message.clone());
            if let Some(scratch) = arena.scratch(id) {
                scratch.callbacks.invoke(CallbackKind::Error, &mut queue, &payload);
            }
            ctx.log.agent_failed(&agent, &message).await?;
        }
    }

    Ok(queue)
}

fn transition(
    arena: &mut Arena,
    id: NodeId,
    path: &str,
    to: Lifecycle,
) -> Result<(), RuntimeError> {
    let Some(scratch) = arena.scratch_mut(id) else {
        return Ok(());
    };
    scratch.lifecycle = scratch
        .lifecycle
        .advance(to)
        .map_err(|source| RuntimeError::StateConflict { path: path.to_string(), source })?;
    Ok(())
}
