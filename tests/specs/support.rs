// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the end-to-end scenarios.

use orchard_core::FakeClock;
use orchard_engine::{Engine, EngineConfig};
use orchard_exec::FakeExecutor;
use orchard_program::Element;

pub async fn engine(source: &str, program: Element, executor: FakeExecutor) -> Engine<FakeExecutor, FakeClock> {
    Engine::start(EngineConfig::new(source), program, executor, FakeClock::new())
        .await
        .expect("engine start")
}

pub async fn engine_at(
    source: &str,
    db_path: &std::path::Path,
    program: Element,
    executor: FakeExecutor,
) -> Engine<FakeExecutor, FakeClock> {
    Engine::start(
        EngineConfig::new(source).db_path(db_path),
        program,
        executor,
        FakeClock::new(),
    )
    .await
    .expect("engine start")
}
