// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_automation --heading-base-level=0

//! Understory Automation: a client-side proxy for remote accessibility trees.
//!
//! ## Overview
//!
//! A host process owns one or more accessibility trees and answers queries
//! about them through a [`Bridge`]. This crate gives clients a typed,
//! identity-preserving view of those trees:
//!
//! - [`Session`] is the entry point. It keeps a registry of [`Tree`]s keyed by
//!   [`TreeId`], tracks each tree's [`TreeState`], and consumes everything the
//!   host reports asynchronously as [`Notification`]s.
//! - [`Tree`] hands out at most one [`Node`] per live id, so listeners attached
//!   to a node survive repeated lookups.
//! - [`Node`] reads attributes, walks relationships (including across
//!   embedded child trees), searches descendants with [`FindParams`], and
//!   issues [`Action`]s.
//! - Events are dispatched capture → target → bubble over the node's
//!   ancestor path, using `understory_propagation`.
//! - Actions that expect a reply are correlated by [`RequestId`]. A hit test
//!   landing on an embedded application's surface is re-issued on that
//!   application's tree before the caller hears back.
//!
//! Everything is single-threaded: handles are `Rc`-based and callbacks may
//! re-enter the session freely.
//!
//! ## Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use understory_automation::{Bridge, EventFrom, EventType, Session, listener};
//!
//! fn watch_focus(bridge: Rc<dyn Bridge>) {
//!     let session = Session::new(bridge);
//!     let Some(desktop) = session.desktop() else {
//!         return;
//!     };
//!     let on_focus = listener(|event| {
//!         println!("focus: {}", event.target().describe());
//!         Ok(())
//!     });
//!     desktop
//!         .root()
//!         .add_event_listener(EventType::Focus, &on_focus, true);
//!
//!     // Host notifications are fed back with `session.handle(..)`.
//!     let _ = desktop.root().dispatch_event(EventType::Focus, EventFrom::User);
//! }
//! ```

mod action;
mod attributes;
mod bridge;
mod config;
mod correlator;
mod error;
mod event;
mod find;
mod ids;
mod node;
mod notification;
mod observer;
mod relations;
mod session;
mod tree;
mod values;

#[cfg(test)]
mod testing;

pub use action::{Action, ActionCallback, ActionRequest, ActionResult, ActionType, Scroll};
pub use attributes::{
    Attribute, AttributeValue, BoolAttribute, FloatAttribute, IntAttribute, IntListAttribute,
    StringAttribute,
};
pub use bridge::{AttributeSource, Bridge, HostControl, TreeSource};
pub use config::SessionConfig;
pub use error::AutomationError;
pub use event::{AutomationEvent, EventListener, ListenerError, ListenerResult, listener};
pub use find::{AttributeMatch, FindParams};
pub use ids::{ChildIds, NodeId, NodeRef, ObserverId, RequestId, TreeId};
pub use node::Node;
pub use notification::{EventParams, Notification, TextLocationParams};
pub use observer::{TreeChange, TreeChangeObserver, observer};
pub use session::{Session, TreeCallback};
pub use tree::{Tree, TreeState};
pub use values::{
    CheckedState, CustomAction, EventFrom, EventType, HasPopup, Restriction, Role,
    SelectionEndpoint, SortDirection, State, TextAffinity, TextStyle, TreeChangeObserverFilter,
    TreeChangeType, TreeSelection,
};

pub use understory_propagation::types::Phase;
