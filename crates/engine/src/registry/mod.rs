// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination registries.
//!
//! Registries attach bookkeeping to subtrees: phase/step active indices,
//! loop iteration counters, and parallel-dispatch marking. Their durable
//! state lives under reserved persistent keys so a resumed execution
//! picks up where it stopped.

pub mod loops;
pub mod parallel;
pub mod phase;

pub use loops::{LoopEnd, LoopRegistry};
pub use phase::{PhaseRegistry, StepEvent};

/// Reserved key holding the active phase index under a provider.
pub fn phase_key(provider_path: &str) -> String {
    format!("orchard/phases{provider_path}/active")
}

/// Reserved key set exactly once when every phase under a provider has
/// completed.
pub fn phases_completed_key(provider_path: &str) -> String {
    format!("orchard/phases{provider_path}/completed")
}

/// Reserved key holding the active step index inside a phase.
pub fn step_key(phase_path: &str) -> String {
    format!("orchard/steps{phase_path}/active")
}

/// Reserved key holding a loop's iteration counter.
pub fn loop_key(id: &str) -> String {
    format!("orchard/loops/{id}/iteration")
}
