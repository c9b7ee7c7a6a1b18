// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher helper: walk a propagation sequence and honor stop outcomes.
//!
//! - [`Outcome`] only controls propagation (`Continue` vs `Stop`).
//! - The return value from [`run`] reports where propagation stopped (if at all).
//! - Anything richer (for example "stop after the remaining listeners on this
//!   node have run") belongs in the handler: run every listener registered on
//!   the entry's node, then return `Stop` if one of them asked for it.
//!
//! ## Minimal example
//!
//! ```
//! use understory_propagation::dispatcher;
//! use understory_propagation::types::{Dispatch, Outcome, Phase};
//!
//! let seq = vec![
//!     Dispatch::capture(1_u32),
//!     Dispatch::target(2_u32),
//!     Dispatch::bubble(1_u32),
//! ];
//!
//! let mut seen: Vec<(Phase, u32)> = Vec::new();
//! let stopped = dispatcher::run(&seq, &mut seen, |d, seen| {
//!     seen.push((d.phase, d.node));
//!     Outcome::Continue
//! });
//! assert!(stopped.is_none());
//! assert_eq!(seen.len(), 3);
//! ```

use crate::types::{Dispatch, Outcome};

/// Run `handler` over `seq` in order, stopping at the first [`Outcome::Stop`].
///
/// `event` is threaded through every call; its shape is up to the caller.
///
/// Returns `None` if the whole sequence was visited, or the entry whose
/// handler stopped propagation.
///
/// ```
/// use understory_propagation::dispatcher::run;
/// use understory_propagation::types::{Dispatch, Outcome, Phase};
///
/// // Stopping in the first capture entry skips target and bubble.
/// let seq = vec![
///     Dispatch::capture(1_u32),
///     Dispatch::capture(2_u32),
///     Dispatch::target(3_u32),
/// ];
/// let mut count = 0;
/// let stopped = run(&seq, &mut count, |d, count| {
///     *count += 1;
///     if d.phase == Phase::Capture { Outcome::Stop } else { Outcome::Continue }
/// });
/// assert_eq!(stopped.map(|d| d.node), Some(1));
/// assert_eq!(count, 1);
/// ```
pub fn run<'a, K, E>(
    seq: &'a [Dispatch<K>],
    event: &mut E,
    mut handler: impl FnMut(&Dispatch<K>, &mut E) -> Outcome,
) -> Option<&'a Dispatch<K>> {
    seq.iter()
        .find(|d| handler(d, event) == Outcome::Stop)
}
