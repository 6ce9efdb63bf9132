// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node type tags.
//!
//! Observable-vs-structural is a variant-category query here, not a string
//! compare; callback-attachment validation in the program layer reduces to
//! [`Tag::is_observable`].

use smol_str::SmolStr;

/// The type of a node in the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Renders children only while its `condition` prop is truthy.
    Conditional,
    /// Sequenced sibling under a phase provider.
    Phase,
    /// Sequenced (or parallel) unit inside a phase.
    Step,
    /// Marks a subtree for concurrent dispatch.
    Parallel,
    /// Re-mounts its children each iteration until its predicate fails.
    Loop,
    /// Runnable LLM-agent invocation.
    Agent,
    /// Runnable sub-orchestrator launch.
    Orchestrator,
    /// Literal text content.
    Text,
    /// Pass-through tag with no engine semantics.
    Custom(SmolStr),
}

impl Tag {
    /// Element name used by the serializer and node paths.
    pub fn name(&self) -> &str {
        match self {
            Self::Conditional => "conditional",
            Self::Phase => "phase",
            Self::Step => "step",
            Self::Parallel => "parallel",
            Self::Loop => "loop",
            Self::Agent => "agent",
            Self::Orchestrator => "orchestrator",
            Self::Text => "#text",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Parse an intrinsic name; unknown names become [`Tag::Custom`].
    pub fn parse(name: &str) -> Self {
        match name {
            "conditional" => Self::Conditional,
            "phase" => Self::Phase,
            "step" => Self::Step,
            "parallel" => Self::Parallel,
            "loop" => Self::Loop,
            "agent" => Self::Agent,
            "orchestrator" => Self::Orchestrator,
            "#text" => Self::Text,
            other => Self::Custom(SmolStr::new(other)),
        }
    }

    /// Whether nodes of this type represent pending work and may carry
    /// event callbacks.
    pub fn is_observable(&self) -> bool {
        matches!(self, Self::Agent | Self::Orchestrator)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

impl Default for Tag {
    fn default() -> Self {
        Tag::Text
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
