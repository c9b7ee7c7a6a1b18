// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_propagation --heading-base-level=0

//! Understory Propagation: deterministic, `no_std` capture → target → bubble.
//!
//! ## Overview
//!
//! Given a target node and a way to ask for a node's parent, this crate
//! produces the DOM-style three-phase propagation sequence and walks it:
//!
//! 1. **Capture**: ancestors from the outermost down to the target's parent.
//! 2. **Target**: the target itself.
//! 3. **Bubble**: ancestors from the target's parent back up to the outermost.
//!
//! It does not own nodes, listeners, or events. Callers supply a
//! [`ParentLookup`](crate::types::ParentLookup), get back a list of
//! [`Dispatch`](crate::types::Dispatch) steps from
//! [`Router::dispatch_for`](crate::router::Router::dispatch_for), and run their
//! own handlers with [`dispatcher::run`], returning
//! [`Outcome::Stop`](crate::types::Outcome::Stop) to end propagation early.
//!
//! ```
//! use understory_propagation::dispatcher;
//! use understory_propagation::router::Router;
//! use understory_propagation::types::{Outcome, ParentFn, Phase};
//!
//! // 3 → 2 → 1
//! let router = Router::with_parent(ParentFn(|n: &u32| (*n > 1).then(|| n - 1)));
//! let seq = router.dispatch_for(3);
//!
//! let mut order = Vec::new();
//! dispatcher::run(&seq, &mut order, |d, order| {
//!     order.push((d.phase, d.node));
//!     Outcome::Continue
//! });
//! assert_eq!(order, vec![
//!     (Phase::Capture, 1), (Phase::Capture, 2),
//!     (Phase::Target, 3),
//!     (Phase::Bubble, 2), (Phase::Bubble, 1),
//! ]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
pub mod router;
pub mod types;
