// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router: reconstructs a target's ancestor chain and emits dispatch steps.
//!
//! ## Overview
//!
//! The router asks a [`ParentLookup`] for the target's parent repeatedly,
//! collecting the chain nearest → farthest, and then emits:
//!
//! - `Capture` for every ancestor, farthest → nearest;
//! - `Target` once, for the target;
//! - `Bubble` for every ancestor, nearest → farthest.
//!
//! The chain is computed once, up front. Handlers run later by
//! [`dispatcher::run`](crate::dispatcher::run) observe the path as it was when
//! the event was routed, even if they restructure the tree while running.
//!
//! ## Depth bound
//!
//! Parent links can come from a source the router does not control (for
//! example a tree mirrored from another process, which may be mid-update).
//! [`Router::with_max_depth`] bounds the number of ancestors collected so a
//! cyclic or corrupted chain cannot loop forever.

use alloc::vec::Vec;

use crate::types::{Dispatch, NoParent, ParentLookup};

/// Default bound on the number of ancestors collected for one path.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Builds capture → target → bubble sequences from parent links.
///
/// ## Usage
///
/// - Construct with [`Router::with_parent`] and a [`ParentLookup`].
/// - Call [`Router::dispatch_for`] to get the full propagation sequence for a
///   target, or [`Router::ancestors`] for the raw chain.
pub struct Router<K, P: ParentLookup<K> = NoParent> {
    pub(crate) parent: P,
    pub(crate) max_depth: usize,
    pub(crate) _phantom: core::marker::PhantomData<fn() -> K>,
}

impl<K, P: ParentLookup<K>> core::fmt::Debug for Router<K, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl<K: Clone, P: ParentLookup<K> + Default> Default for Router<K, P> {
    fn default() -> Self {
        Self::with_parent(P::default())
    }
}

impl<K: Clone, P: ParentLookup<K>> Router<K, P> {
    /// Create a router over an explicit parent lookup provider.
    pub fn with_parent(parent: P) -> Self {
        Self {
            parent,
            max_depth: DEFAULT_MAX_DEPTH,
            _phantom: core::marker::PhantomData,
        }
    }

    /// Bound the number of ancestors collected for a single path.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Ancestors of `target`, nearest first, excluding `target` itself.
    ///
    /// Stops after [`Router::with_max_depth`] ancestors.
    pub fn ancestors(&self, target: &K) -> Vec<K> {
        let mut out = Vec::new();
        let mut cur = self.parent.parent_of(target);
        while let Some(node) = cur {
            if out.len() >= self.max_depth {
                break;
            }
            cur = self.parent.parent_of(&node);
            out.push(node);
        }
        out
    }

    /// Emit the propagation sequence for `target`.
    pub fn dispatch_for(&self, target: K) -> Vec<Dispatch<K>> {
        let ancestors = self.ancestors(&target);
        Self::emit(target, &ancestors)
    }

    fn emit(target: K, ancestors: &[K]) -> Vec<Dispatch<K>> {
        let mut out = Vec::with_capacity(ancestors.len() * 2 + 1);

        // Capture: farthest → nearest.
        for n in ancestors.iter().rev() {
            out.push(Dispatch::capture(n.clone()));
        }

        out.push(Dispatch::target(target));

        // Bubble: nearest → farthest.
        for n in ancestors {
            out.push(Dispatch::bubble(n.clone()));
        }
        out
    }
}
