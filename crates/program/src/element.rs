// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Element descriptors.
//!
//! An element is what a render produces: a pure description of one tree
//! level, consumed by the reconciler. Elements are transient: they live
//! for a single render and never carry engine state.

use crate::component::Component;
use crate::error::ProgramError;
use orchard_core::{CallbackKind, Callbacks, Handler, Value, WriteQueue};
use orchard_tree::Tag;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Declarative output of one render step.
#[derive(Clone)]
pub enum Element {
    Node(Box<ElementNode>),
    Text(String),
    /// Deferred: the reconciler evaluates the component with its own
    /// scope, then splices the result in place.
    Component(Arc<dyn Component>),
    /// Splices its children into the parent without a node of its own.
    Fragment(Vec<Element>),
    /// Renders nothing.
    Nothing,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Node(node) => f.debug_tuple("Node").field(&node.tag).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Component(component) => {
                f.debug_tuple("Component").field(&component.name()).finish()
            }
            Self::Fragment(children) => f.debug_tuple("Fragment").field(&children.len()).finish(),
            Self::Nothing => f.write_str("Nothing"),
        }
    }
}

/// One intrinsic element descriptor.
#[derive(Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub key: Option<String>,
    pub props: BTreeMap<SmolStr, Value>,
    pub callbacks: Callbacks,
    pub children: Vec<Element>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            key: None,
            props: BTreeMap::new(),
            callbacks: Callbacks::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn prop(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.props.insert(SmolStr::new(name.as_ref()), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children(mut self, children: Vec<Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach an event callback.
    ///
    /// Validity is checked by [`ElementNode::validate`] during
    /// reconciliation; a callback on a structural tag is a fatal
    /// construction error there.
    pub fn on(mut self, kind: CallbackKind, handler: Handler) -> Self {
        self.callbacks.attach(kind, handler);
        self
    }

    /// `on_start` sugar taking a plain closure.
    pub fn on_start<F>(self, f: F) -> Self
    where
        F: Fn(&mut WriteQueue, &Value) + Send + Sync + 'static,
    {
        self.on(CallbackKind::Start, Arc::new(f))
    }

    /// `on_finished` sugar taking a plain closure.
    pub fn on_finished<F>(self, f: F) -> Self
    where
        F: Fn(&mut WriteQueue, &Value) + Send + Sync + 'static,
    {
        self.on(CallbackKind::Finished, Arc::new(f))
    }

    /// `on_error` sugar taking a plain closure.
    pub fn on_error<F>(self, f: F) -> Self
    where
        F: Fn(&mut WriteQueue, &Value) + Send + Sync + 'static,
    {
        self.on(CallbackKind::Error, Arc::new(f))
    }

    /// `on_cancel` sugar taking a plain closure.
    pub fn on_cancel<F>(self, f: F) -> Self
    where
        F: Fn(&mut WriteQueue, &Value) + Send + Sync + 'static,
    {
        self.on(CallbackKind::Cancel, Arc::new(f))
    }

    /// Construction-time validation: only observable tags carry event
    /// callbacks.
    pub fn validate(&self) -> Result<(), ProgramError> {
        if !self.callbacks.is_empty() && !self.tag.is_observable() {
            let event = self
                .callbacks
                .names()
                .first()
                .copied()
                .unwrap_or("unknown")
                .to_string();
            return Err(ProgramError::CallbackOnStructural {
                tag: self.tag.name().to_string(),
                event,
            });
        }
        Ok(())
    }
}

impl From<ElementNode> for Element {
    fn from(node: ElementNode) -> Self {
        Element::Node(Box::new(node))
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Element::Text(text.to_string())
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Element::Text(text)
    }
}

#[cfg(test)]
#[path = "element_tests.rs"]
mod tests;
