// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orchard-program: the declarative side of the engine.
//!
//! Authors compose programs out of [`Element`] descriptors: intrinsic
//! nodes (conditional, phase, step, parallel, loop), runnable nodes
//! (agent, orchestrator), text, and [`Component`] values that render more
//! elements against a state snapshot. The reconciler consumes these
//! descriptors; nothing here touches the tree directly.

pub mod component;
pub mod effect;
pub mod element;
pub mod error;
pub mod intrinsics;

pub use component::{Component, Scope};
pub use effect::{CleanupFn, EffectCtx, EffectFn, EffectRegistration};
pub use element::{Element, ElementNode};
pub use error::ProgramError;
pub use intrinsics::{
    agent, conditional, loop_block, orchestrator, parallel, phase, step, text,
};
