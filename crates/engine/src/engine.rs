// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The six-phase tick loop.
//!
//! Snapshot → Render → Persist → Execute → Commit → Effects, repeated
//! until quiescence, a stop request, or the tick cap. Every phase
//! function takes the engine's own fields; there is no module-level
//! mutable state. The only suspension points are executor dispatch,
//! commit, and frame persistence (plus the reactive-query pump between
//! ticks).

use crate::config::EngineConfig;
use crate::dispatch::{self, ExecuteCtx};
use crate::effects::EffectRegistry;
use crate::error::RuntimeError;
use crate::reconcile::{self, RenderOutput};
use crate::registry::{parallel, LoopRegistry, PhaseRegistry, StepEvent};
use crate::runnable;
use orchard_core::{
    Clock, ExecutionId, ExecutionStatus, StateTarget, SystemClock, TaskId, TaskStatus,
    TerminationReason, Value, WriteOp, WriteQueue,
};
use orchard_exec::Executor;
use orchard_program::{EffectCtx, Element};
use orchard_store::{
    DurableLog, PersistentStore, QueryEngine, Snapshot, VersionMap, VolatileStore,
};
use orchard_tree::{serialize, Arena, NodeId, NodePath, Tag};
use parking_lot::Mutex;
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Frame sequence number persisted this tick.
    pub sequence: u64,
    /// Runnables dispatched.
    pub runnables: usize,
    /// Writes that changed a value at commit.
    pub writes_changed: usize,
    /// Writes queued by effects, pending the next commit.
    pub pending_writes: usize,
    /// Reactive queries still waiting on first execution.
    pub queries_loading: usize,
}

/// Terminal summary of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub status: ExecutionStatus,
    pub reason: TerminationReason,
    pub ticks: u64,
}

/// Cloneable handle that stops a run at the next phase boundary and
/// cancels in-flight dispatches.
#[derive(Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }
}

/// One execution's engine.
pub struct Engine<X: Executor, C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
    executor: X,
    program: Element,

    arena: Arena,
    root: NodeId,
    root_path: NodePath,

    volatile: VolatileStore,
    persistent: PersistentStore,
    queries: QueryEngine,
    log: DurableLog,

    effects: EffectRegistry,
    phases: PhaseRegistry,
    loops: LoopRegistry,

    queue: WriteQueue,
    dispatched: HashSet<(String, String)>,
    inflight: Mutex<HashMap<String, CancellationToken>>,
    task_ids: HashMap<String, TaskId>,
    stop: CancellationToken,

    execution_id: ExecutionId,
    resumed: bool,
    tick_no: u64,
    next_sequence: u64,
    last_snapshot: Snapshot,
}

impl<X: Executor, C: Clock> Engine<X, C> {
    /// Open the database, attach to a `running` execution for this source
    /// (resume) or create a fresh one, and prepare the tree.
    pub async fn start(
        config: EngineConfig,
        program: Element,
        executor: X,
        clock: C,
    ) -> Result<Self, RuntimeError> {
        let pool = match &config.db_path {
            Some(path) => orchard_store::open_db(path).await?,
            None => orchard_store::open_memory_db().await?,
        };
        let versions = Arc::new(Mutex::new(VersionMap::new()));
        let log = DurableLog::new(pool.clone(), versions.clone());

        let now = clock.epoch_ms();
        let (execution_id, next_sequence, resumed) = match log.find_running(&config.source).await? {
            Some(row) => {
                let sequence = log.next_frame_sequence(&row.id).await?;
                tracing::info!(execution_id = %row.id, sequence, "attaching to running execution");
                (row.id, sequence, true)
            }
            None => {
                let id = log.create_execution(&config.name, &config.source, now).await?;
                (id, 1, false)
            }
        };

        let mut arena = Arena::new();
        let root_tag = Tag::Custom(SmolStr::new("root"));
        let root = arena.create_element(root_tag.clone());
        let root_path = NodePath::root().child(&root_tag, None, 0);
        if let Some(scratch) = arena.scratch_mut(root) {
            scratch.path = Some(root_path.to_string());
        }

        Ok(Self {
            volatile: VolatileStore::new(versions.clone()),
            persistent: PersistentStore::new(pool.clone(), versions.clone()),
            queries: QueryEngine::new(pool, versions),
            log,
            config,
            clock,
            executor,
            program,
            arena,
            root,
            root_path,
            effects: EffectRegistry::new(),
            phases: PhaseRegistry::default(),
            loops: LoopRegistry::default(),
            queue: WriteQueue::new(),
            dispatched: HashSet::new(),
            inflight: Mutex::new(HashMap::new()),
            task_ids: HashMap::new(),
            stop: CancellationToken::new(),
            execution_id,
            resumed,
            tick_no: 0,
            next_sequence,
            last_snapshot: Snapshot::default(),
        })
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    /// Whether `start` attached to an existing `running` execution.
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    pub fn log(&self) -> &DurableLog {
        &self.log
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { token: self.stop.clone() }
    }

    /// Phase registry access (hook registration).
    pub fn phases_mut(&mut self) -> &mut PhaseRegistry {
        &mut self.phases
    }

    /// Current serialized tree.
    pub fn tree_text(&self) -> String {
        serialize(&self.arena, self.root)
    }

    /// Read one persistent state value (committed).
    pub async fn state(&self, key: &str) -> Result<Option<Value>, RuntimeError> {
        Ok(self.persistent.get(key).await?)
    }

    /// Apply a persistent write immediately, outside any tick. Host
    /// control surface (seeding, set-state); never legal mid-tick.
    pub async fn seed(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        trigger: &str,
    ) -> Result<(), RuntimeError> {
        self.persistent.enqueue(WriteOp {
            target: StateTarget::Persistent,
            key: key.into(),
            value: value.into(),
            trigger: trigger.to_string(),
            origin: "host".to_string(),
        });
        self.persistent.commit(self.clock.epoch_ms()).await?;
        Ok(())
    }

    /// One full Snapshot→Render→Persist→Execute→Commit→Effects pass.
    pub async fn tick(&mut self) -> Result<TickReport, RuntimeError> {
        self.tick_no += 1;
        let now = self.clock.epoch_ms();

        // Re-execute reactive queries invalidated by the last commit so
        // this render sees fresh data.
        self.queries.pump().await?;

        // Phase 1: snapshot. Freeze both stores.
        let snapshot = Snapshot::new(self.volatile.snapshot(), self.persistent.snapshot().await?);

        // Phase 2: render.
        let output = reconcile::render(
            &mut self.arena,
            self.root,
            &self.root_path,
            &self.program,
            &snapshot,
            &mut self.queries,
        )?;
        self.queries.retain(&output.live_queries);
        self.cancel_inflight(&output.removed_paths);

        // Phase 3: persist the frame.
        let sequence = self.next_sequence;
        let content = serialize(&self.arena, self.root);
        self.log
            .append_frame(&self.execution_id, sequence, &content, now)
            .await?;
        self.next_sequence += 1;

        // Phase 4: find runnables.
        let runnables = runnable::collect(
            &mut self.arena,
            self.root,
            &snapshot,
            &self.loops,
            &self.dispatched,
        );
        let runnable_count = runnables.len();
        let groups = parallel::group(&self.arena, runnables);

        // Phase 5: execute.
        {
            let ctx = ExecuteCtx {
                executor: &self.executor,
                log: &self.log,
                execution_id: &self.execution_id,
                stop: &self.stop,
                inflight: &self.inflight,
                now_ms: now,
            };
            dispatch::run_groups(
                &mut self.arena,
                groups,
                &ctx,
                &mut self.queue,
                &mut self.dispatched,
            )
            .await?;
        }

        // Registry bookkeeping: phase/step advancement, loop iteration.
        let events = self
            .phases
            .evaluate(&self.arena, self.root, &snapshot, &mut self.queue);
        self.record_step_events(events, now).await?;

        let teardowns = self
            .loops
            .evaluate(&self.arena, self.root, &snapshot, &mut self.queue);
        self.teardown_loop_children(teardowns);

        // Phase 6: commit. Atomic, enqueue order.
        let ops = self.queue.drain();
        for op in ops {
            match op.target {
                StateTarget::Volatile => self.volatile.enqueue(op),
                StateTarget::Persistent => self.persistent.enqueue(op),
            }
        }
        let volatile_changes = self.volatile.commit();
        let persistent_changes = self.persistent.commit(now).await?;
        let writes_changed = volatile_changes.len() + persistent_changes.len();

        // Phase 7: effects. May queue writes for the next tick.
        {
            let mut ctx = EffectCtx { queue: &mut self.queue, snapshot: &snapshot };
            self.effects.run(&output.effects, &mut ctx);
        }

        self.last_snapshot = snapshot;
        let report = TickReport {
            sequence,
            runnables: runnable_count,
            writes_changed,
            pending_writes: self.queue.len(),
            queries_loading: self.queries.loading_count(),
        };
        tracing::debug!(
            tick = self.tick_no,
            sequence,
            runnables = report.runnables,
            writes = report.writes_changed,
            "tick complete"
        );
        Ok(report)
    }

    /// Tick until quiescent, stopped, or capped.
    pub async fn run(&mut self) -> Result<RunSummary, RuntimeError> {
        loop {
            if self.stop.is_cancelled() {
                return self
                    .finish(ExecutionStatus::Aborted, TerminationReason::Stopped)
                    .await;
            }
            if self.tick_no >= self.config.max_ticks {
                return self
                    .finish(ExecutionStatus::Completed, TerminationReason::IterationCap)
                    .await;
            }

            let report = match self.tick().await {
                Ok(report) => report,
                Err(error) => {
                    self.abort_with(&error).await;
                    return Err(error);
                }
            };

            if self.stop.is_cancelled() {
                return self
                    .finish(ExecutionStatus::Aborted, TerminationReason::Stopped)
                    .await;
            }

            let loops_live = self.loops.any_live(&self.arena, self.root);
            let quiescent = report.runnables == 0
                && report.writes_changed == 0
                && report.pending_writes == 0
                && report.queries_loading == 0
                && !loops_live;
            if quiescent {
                let reason = if self.loops.ended_by_cap() {
                    TerminationReason::IterationCap
                } else {
                    TerminationReason::Quiescent
                };
                return self.finish(ExecutionStatus::Completed, reason).await;
            }
        }
    }

    async fn finish(
        &mut self,
        status: ExecutionStatus,
        reason: TerminationReason,
    ) -> Result<RunSummary, RuntimeError> {
        // Cancel anything still in flight (stop path).
        self.stop.cancel();

        // Execution teardown runs every recorded effect cleanup; writes
        // they queue have no commit left and are dropped.
        let mut discard = WriteQueue::new();
        let mut ctx = EffectCtx { queue: &mut discard, snapshot: &self.last_snapshot };
        self.effects.drain(&mut ctx);

        self.log
            .finish_execution(&self.execution_id, status, &reason, self.clock.epoch_ms())
            .await?;
        Ok(RunSummary { status, reason, ticks: self.tick_no })
    }

    /// Fatal path: persist a final frame with the last known tree, mark
    /// the execution failed, surface the reason. Best effort: the
    /// original error wins over secondary storage failures.
    async fn abort_with(&mut self, error: &RuntimeError) {
        self.stop.cancel();
        let content = serialize(&self.arena, self.root);
        let now = self.clock.epoch_ms();
        let _ = self
            .log
            .append_frame(&self.execution_id, self.next_sequence, &content, now)
            .await;
        let _ = self
            .log
            .finish_execution(
                &self.execution_id,
                ExecutionStatus::Failed,
                &TerminationReason::Fatal(error.to_string()),
                now,
            )
            .await;
    }

    fn cancel_inflight(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        let mut inflight = self.inflight.lock();
        for path in paths {
            if let Some(token) = inflight.remove(path) {
                tracing::info!(path = %path, "cancelling in-flight dispatch (node removed)");
                token.cancel();
            }
        }
    }

    /// Mirror step activation/completion into the tasks table.
    async fn record_step_events(
        &mut self,
        events: Vec<StepEvent>,
        now: u64,
    ) -> Result<(), RuntimeError> {
        for event in events {
            match event {
                StepEvent::Activated { path, name } => {
                    if !self.task_ids.contains_key(&path) {
                        let id = self.log.start_task(&name, now).await?;
                        self.task_ids.insert(path, id);
                    }
                }
                StepEvent::Completed { path, name } => {
                    let id = match self.task_ids.get(&path) {
                        Some(id) => *id,
                        None => {
                            // Step settled within its first tick.
                            let id = self.log.start_task(&name, now).await?;
                            self.task_ids.insert(path.clone(), id);
                            id
                        }
                    };
                    self.log.finish_task(&id, TaskStatus::Completed, now).await?;
                }
            }
        }
        Ok(())
    }

    /// Tear down a non-terminal loop's children so the next render
    /// remounts them with fresh scratch (new run tokens).
    fn teardown_loop_children(&mut self, loop_nodes: Vec<NodeId>) {
        let mut removal = RenderOutput::default();
        for loop_node in loop_nodes {
            let children = self
                .arena
                .node(loop_node)
                .map(|n| n.children.clone())
                .unwrap_or_default();
            for child in children {
                reconcile::remove_subtree(&mut self.arena, loop_node, child, &mut removal);
            }
        }
        self.cancel_inflight(&removal.removed_paths);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
