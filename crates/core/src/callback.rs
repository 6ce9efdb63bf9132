// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event callbacks for observable nodes.
//!
//! Every callback has the same shape: it receives the tick's write queue
//! and a payload value, and returns nothing. Queued writes are calls on
//! the queue, not return values, so callback results never bypass the
//! commit discipline.

use crate::{Value, WriteQueue};
use std::fmt;
use std::sync::Arc;

/// Uniform handler signature for all node event callbacks.
pub type Handler = Arc<dyn Fn(&mut WriteQueue, &Value) + Send + Sync>;

/// The closed set of event-callback slots an observable node may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Fired when the node transitions `idle -> started`; payload is the
    /// input projection.
    Start,
    /// Fired on `started -> completed`; payload is the executor result.
    Finished,
    /// Fired on `started -> failed`; payload is the error description.
    Error,
    /// Fired on cancellation; payload is null.
    Cancel,
}

crate::display_labels! {
    CallbackKind {
        Start => "start",
        Finished => "finished",
        Error => "error",
        Cancel => "cancel",
    }
}

impl CallbackKind {
    /// All kinds in serialization order.
    pub const ALL: [CallbackKind; 4] = [Self::Start, Self::Finished, Self::Error, Self::Cancel];
}

/// Callback table attached to a node.
#[derive(Clone, Default)]
pub struct Callbacks {
    on_start: Option<Handler>,
    on_finished: Option<Handler>,
    on_error: Option<Handler>,
    on_cancel: Option<Handler>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, kind: CallbackKind, handler: Handler) {
        let slot = match kind {
            CallbackKind::Start => &mut self.on_start,
            CallbackKind::Finished => &mut self.on_finished,
            CallbackKind::Error => &mut self.on_error,
            CallbackKind::Cancel => &mut self.on_cancel,
        };
        *slot = Some(handler);
    }

    pub fn get(&self, kind: CallbackKind) -> Option<&Handler> {
        match kind {
            CallbackKind::Start => self.on_start.as_ref(),
            CallbackKind::Finished => self.on_finished.as_ref(),
            CallbackKind::Error => self.on_error.as_ref(),
            CallbackKind::Cancel => self.on_cancel.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        CallbackKind::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Names of attached callbacks, in serialization order. Feeds the
    /// serializer's synthetic `events` attribute.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.on_start.is_some() {
            names.push("start");
        }
        if self.on_finished.is_some() {
            names.push("finished");
        }
        if self.on_error.is_some() {
            names.push("error");
        }
        if self.on_cancel.is_some() {
            names.push("cancel");
        }
        names
    }

    /// Invoke a callback if attached; missing handlers are a no-op.
    pub fn invoke(&self, kind: CallbackKind, queue: &mut WriteQueue, payload: &Value) {
        if let Some(handler) = self.get(kind) {
            handler(queue, payload);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").field("events", &self.names()).finish()
    }
}
