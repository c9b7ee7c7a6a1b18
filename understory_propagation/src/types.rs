// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: phases, outcomes, dispatch entries, and parent lookup.

/// Propagation phase of a dispatch entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Walking from the outermost ancestor down to the target's parent.
    Capture,
    /// At the target itself.
    Target,
    /// Walking from the target's parent back up to the outermost ancestor.
    Bubble,
}

impl Phase {
    /// Short lowercase name, handy for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Target => "target",
            Self::Bubble => "bubble",
        }
    }
}

/// Result of handling one dispatch entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Keep propagating.
    Continue,
    /// Stop propagation; no later entries are visited.
    Stop,
}

/// One step of a propagation sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch<K> {
    /// Phase of this step.
    pub phase: Phase,
    /// Node visited at this step.
    pub node: K,
}

impl<K> Dispatch<K> {
    /// A capture-phase step.
    pub fn capture(node: K) -> Self {
        Self {
            phase: Phase::Capture,
            node,
        }
    }

    /// The target step.
    pub fn target(node: K) -> Self {
        Self {
            phase: Phase::Target,
            node,
        }
    }

    /// A bubble-phase step.
    pub fn bubble(node: K) -> Self {
        Self {
            phase: Phase::Bubble,
            node,
        }
    }
}

/// Source of parent links used to reconstruct a propagation path.
///
/// Implementations may be backed by anything that can answer "who is my
/// parent", including a remote tree that is only reachable through
/// synchronous queries. Returning `None` marks the outermost ancestor.
pub trait ParentLookup<K> {
    /// Parent of `node`, or `None` at the top of the chain.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// Parent lookup that treats every node as a root.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    fn parent_of(&self, _: &K) -> Option<K> {
        None
    }
}

/// Adapts a closure into a [`ParentLookup`].
#[derive(Clone, Copy, Debug)]
pub struct ParentFn<F>(pub F);

impl<K, F: Fn(&K) -> Option<K>> ParentLookup<K> for ParentFn<F> {
    fn parent_of(&self, node: &K) -> Option<K> {
        (self.0)(node)
    }
}
