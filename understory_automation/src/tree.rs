// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trees and their node identity cache.
//!
//! A [`Tree`] is the local face of one remote tree. It hands out at most one
//! [`Node`] handle per live node id, validating unknown ids against the host
//! before allocating. The root handle is special: it is created with the tree
//! and always answers with whatever root id the host currently reports.
//!
//! Destroying a tree detaches every handle it produced, drops its pending
//! action replies without calling them, and removes it from its
//! [`Session`](crate::Session).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::action::{Action, ActionCallback, ActionResult};
use crate::bridge::Bridge;
use crate::config::SessionConfig;
use crate::correlator::PendingActions;
use crate::event::AutomationEvent;
use crate::ids::{NodeId, RequestId, TreeId};
use crate::node::{Node, Slot};
use crate::notification::EventParams;
use crate::session::{Session, SessionInner};
use crate::values::{TextAffinity, TreeSelection};

/// Lifecycle of a tree id within a session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TreeState {
    /// Nothing has been heard about the tree yet.
    #[default]
    Unknown,
    /// The host sent a first, empty version of the tree.
    Placeholder,
    /// The tree has content and a resolvable root.
    Loaded,
    /// The tree was destroyed. Terminal.
    Destroyed,
}

/// One remote tree.
///
/// Cloning is cheap; clones refer to the same tree.
#[derive(Clone)]
pub struct Tree {
    pub(crate) inner: Rc<TreeInner>,
}

pub(crate) struct TreeInner {
    tree_id: TreeId,
    bridge: Rc<dyn Bridge>,
    session: Weak<SessionInner>,
    config: Rc<SessionConfig>,
    root: Node,
    cache: RefCell<HashMap<NodeId, Node>>,
    pub(crate) pending: RefCell<PendingActions>,
    state: Cell<TreeState>,
}

impl Tree {
    pub(crate) fn new(
        tree_id: TreeId,
        bridge: Rc<dyn Bridge>,
        session: Weak<SessionInner>,
        config: Rc<SessionConfig>,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<TreeInner>| TreeInner {
            root: Node::new(tree_id.clone(), Slot::Root, weak.clone()),
            tree_id,
            bridge,
            session,
            config,
            cache: RefCell::new(HashMap::new()),
            pending: RefCell::new(PendingActions::default()),
            state: Cell::new(TreeState::Unknown),
        });
        Self { inner }
    }

    /// Id of this tree.
    pub fn id(&self) -> &TreeId {
        &self.inner.tree_id
    }

    /// The root handle. Its id follows the host's current root.
    pub fn root(&self) -> Node {
        self.inner.root.clone()
    }

    /// Current root id as reported by the host.
    pub fn root_id(&self) -> Option<NodeId> {
        if self.is_destroyed() {
            return None;
        }
        self.inner
            .bridge
            .root_id(&self.inner.tree_id)
            .filter(|id| id.is_valid())
    }

    /// Handle for `id`, or `None` if the id does not denote a live node.
    ///
    /// Repeated calls with the same live id return the same handle. Unknown
    /// ids are validated with one host query before a handle is allocated.
    pub fn get(&self, id: NodeId) -> Option<Node> {
        if self.is_destroyed() || !id.is_valid() {
            return None;
        }
        if self.root_id() == Some(id) {
            return Some(self.root());
        }
        if let Some(node) = self.inner.cache.borrow().get(&id) {
            return Some(node.clone());
        }
        self.inner.bridge.role(&self.inner.tree_id, id)?;
        let node = Node::new(
            self.inner.tree_id.clone(),
            Slot::Node(id),
            Rc::downgrade(&self.inner),
        );
        self.inner.cache.borrow_mut().insert(id, node.clone());
        Some(node)
    }

    /// Detach and forget the handle for `id`. Unknown ids are ignored.
    pub fn remove(&self, id: NodeId) {
        let removed = self.inner.cache.borrow_mut().remove(&id);
        if let Some(node) = removed {
            node.detach();
        }
    }

    /// Detach every handle, drop pending replies, and leave the session.
    ///
    /// Calling this more than once is harmless.
    pub fn destroy(&self) {
        if self.inner.state.replace(TreeState::Destroyed) == TreeState::Destroyed {
            return;
        }
        debug!(tree = %self.inner.tree_id, "destroying tree");
        let nodes: Vec<Node> = self
            .inner
            .cache
            .borrow_mut()
            .drain()
            .map(|(_, node)| node)
            .collect();
        for node in &nodes {
            node.detach();
        }
        self.inner.root.detach();
        let dropped = core::mem::take(&mut *self.inner.pending.borrow_mut());
        if !dropped.is_empty() {
            debug!(
                tree = %self.inner.tree_id,
                count = dropped.len(),
                "dropping pending action replies"
            );
        }
        drop(dropped);
        if let Some(session) = self.session() {
            session.forget_tree(&self.inner.tree_id);
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> TreeState {
        self.inner.state.get()
    }

    /// Whether [`Tree::destroy`] was called.
    pub fn is_destroyed(&self) -> bool {
        self.state() == TreeState::Destroyed
    }

    pub(crate) fn set_state(&self, state: TreeState) {
        if !self.is_destroyed() {
            self.inner.state.set(state);
        }
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub(crate) fn bridge(&self) -> &dyn Bridge {
        &*self.inner.bridge
    }

    pub(crate) fn session(&self) -> Option<Session> {
        self.inner.session.upgrade().map(|inner| Session { inner })
    }

    pub(crate) fn register_pending(&self, action: Action, callback: ActionCallback) -> RequestId {
        self.inner.pending.borrow_mut().insert(action, callback)
    }

    /// Number of cached non-root handles.
    pub fn cached_len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    /// Whether `self` and `other` are the same tree object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn doc_query<R>(&self, query: impl FnOnce(&dyn Bridge, &TreeId) -> Option<R>) -> Option<R> {
        if self.is_destroyed() {
            return None;
        }
        query(self.bridge(), &self.inner.tree_id)
    }

    /// Document URL.
    pub fn doc_url(&self) -> Option<String> {
        self.doc_query(|bridge, tree| bridge.doc_url(tree))
    }

    /// Document title.
    pub fn doc_title(&self) -> Option<String> {
        self.doc_query(|bridge, tree| bridge.doc_title(tree))
    }

    /// Whether the document finished loading.
    pub fn doc_loaded(&self) -> Option<bool> {
        self.doc_query(|bridge, tree| bridge.doc_loaded(tree))
    }

    /// Load progress in `0.0..=1.0`.
    pub fn doc_loading_progress(&self) -> Option<f64> {
        self.doc_query(|bridge, tree| bridge.doc_loading_progress(tree))
    }

    /// Text selection of the document.
    pub fn selection(&self) -> Option<TreeSelection> {
        self.doc_query(|bridge, tree| bridge.selection(tree))
    }

    /// Node holding the selection anchor.
    pub fn anchor_object(&self) -> Option<Node> {
        self.get(self.selection()?.anchor.node()?)
    }

    /// Anchor offset, when the anchor is set.
    pub fn anchor_offset(&self) -> Option<i32> {
        let anchor = self.selection()?.anchor;
        anchor.node().map(|_| anchor.offset)
    }

    /// Anchor affinity, when the anchor is set.
    pub fn anchor_affinity(&self) -> Option<TextAffinity> {
        let anchor = self.selection()?.anchor;
        anchor.node().map(|_| anchor.affinity)
    }

    /// Node holding the selection focus.
    pub fn focus_object(&self) -> Option<Node> {
        self.get(self.selection()?.focus.node()?)
    }

    /// Focus offset, when the focus is set.
    pub fn focus_offset(&self) -> Option<i32> {
        let focus = self.selection()?.focus;
        focus.node().map(|_| focus.offset)
    }

    /// Focus affinity, when the focus is set.
    pub fn focus_affinity(&self) -> Option<TextAffinity> {
        let focus = self.selection()?.focus;
        focus.node().map(|_| focus.affinity)
    }

    /// Whether the focus precedes the anchor.
    pub fn is_selection_backward(&self) -> Option<bool> {
        self.selection().map(|s| s.is_backward)
    }

    /// Indented dump of the tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let max_depth = self.config().max_ancestor_depth;
        dump_node(&mut out, &self.root(), 0, max_depth);
        out
    }

    /// Deliver an event reported by the host.
    ///
    /// Events carrying an action request id are first offered to the pending
    /// reply; if that re-targets the action, the event is not dispatched.
    pub(crate) fn on_accessibility_event(&self, params: &EventParams) {
        let target = if params.event_type.is_tree_global() {
            Some(self.root())
        } else {
            self.get(params.target_id)
        };
        let Some(target) = target else {
            warn!(
                tree = %self.inner.tree_id,
                event = params.event_type.as_str(),
                target = params.target_id.0,
                "event on unknown node"
            );
            return;
        };
        if let Some(request_id) = params.action_request_id
            && self.on_action_result(request_id, ActionResult::Node(target.clone()))
        {
            return;
        }
        let event = AutomationEvent::new(
            params.event_type,
            target.clone(),
            params.event_from,
            params.event_from_action,
            params.mouse_location,
        );
        target.dispatch(&event);
    }
}

fn dump_node(out: &mut String, node: &Node, depth: usize, max_depth: usize) {
    let indent = "  ".repeat(depth);
    if node.is_root() {
        let _ = writeln!(out, "{indent}tree id={}", node.tree_id());
    }
    let _ = writeln!(out, "{indent}{}", node.describe());
    if depth >= max_depth {
        return;
    }
    for child in node.children() {
        dump_node(out, &child, depth + 1, max_depth);
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("id", &self.inner.tree_id)
            .field("state", &self.inner.state.get())
            .field("cached", &self.inner.cache.borrow().len())
            .field("pending", &self.inner.pending.borrow().len())
            .finish_non_exhaustive()
    }
}
