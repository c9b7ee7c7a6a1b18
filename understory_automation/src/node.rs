// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node proxies.
//!
//! A [`Node`] is a handle on one remote node. It holds the node's address and
//! its listeners, nothing else: every getter is a fresh bridge query. Once the
//! owning tree is destroyed, or the node is removed, the handle is detached
//! and every getter answers `None` (or an empty list).

use std::cell::RefCell;
use std::fmt;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use kurbo::Rect;
use tracing::warn;

use crate::action::ActionType;
use crate::bridge::Bridge;
use crate::event::ListenerMap;
use crate::ids::{NodeId, NodeRef, TreeId};
use crate::tree::{Tree, TreeInner};
use crate::values::{
    CheckedState, CustomAction, HasPopup, Restriction, Role, SortDirection, State, TextStyle,
};

/// Handle on one remote node.
///
/// Clones share identity: [`Tree::get`] hands out at most one handle per live
/// id, and [`Node::ptr_eq`] tells whether two handles are that same one.
/// Equality (`==`) compares `(tree id, node id)`.
#[derive(Clone)]
pub struct Node {
    pub(crate) inner: Rc<NodeInner>,
}

pub(crate) struct NodeInner {
    pub(crate) tree_id: TreeId,
    pub(crate) slot: Slot,
    pub(crate) owner: RefCell<Option<Weak<TreeInner>>>,
    pub(crate) listeners: RefCell<ListenerMap>,
}

/// How a node knows its id.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The tree root; its id is whatever the host currently reports.
    Root,
    /// A regular node.
    Node(NodeId),
}

impl Node {
    pub(crate) fn new(tree_id: TreeId, slot: Slot, owner: Weak<TreeInner>) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                tree_id,
                slot,
                owner: RefCell::new(Some(owner)),
                listeners: RefCell::new(ListenerMap::default()),
            }),
        }
    }

    /// Id of the tree this node belongs to.
    pub fn tree_id(&self) -> &TreeId {
        &self.inner.tree_id
    }

    /// Id of this node.
    ///
    /// For a tree root this asks the host for the current root id, and is
    /// `None` once detached.
    pub fn id(&self) -> Option<NodeId> {
        match self.inner.slot {
            Slot::Node(id) => Some(id),
            Slot::Root => self.tree()?.root_id(),
        }
    }

    /// Whether this is the root proxy of its tree.
    pub fn is_root(&self) -> bool {
        self.inner.slot == Slot::Root
    }

    /// Whether the node's tree was destroyed or the node removed.
    pub fn is_detached(&self) -> bool {
        self.tree().is_none()
    }

    /// Whether `self` and `other` are the same handle.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The owning tree, unless detached.
    pub fn tree(&self) -> Option<Tree> {
        let owner = self.inner.owner.borrow();
        let inner = owner.as_ref()?.upgrade()?;
        Some(Tree { inner })
    }

    pub(crate) fn detach(&self) {
        self.inner.owner.borrow_mut().take();
    }

    /// Run one bridge query against this node's live address.
    pub(crate) fn with_bridge<R>(
        &self,
        query: impl FnOnce(&dyn Bridge, &TreeId, NodeId) -> Option<R>,
    ) -> Option<R> {
        let tree = self.tree()?;
        let id = match self.inner.slot {
            Slot::Node(id) => id,
            Slot::Root => tree.root_id()?,
        };
        query(tree.bridge(), &self.inner.tree_id, id)
    }

    /// Resolve an address reported for this node, which may be in another tree.
    pub(crate) fn resolve(&self, target: &NodeRef) -> Option<Self> {
        let tree = self.tree()?;
        if target.tree_id == self.inner.tree_id {
            return tree.get(target.node_id);
        }
        tree.session()?.node_from_tree(&target.tree_id, target.node_id)
    }

    /// Role. `None` once the node is gone.
    pub fn role(&self) -> Option<Role> {
        self.with_bridge(|bridge, tree, id| bridge.role(tree, id))
    }

    /// State flags.
    pub fn state(&self) -> Option<State> {
        self.with_bridge(|bridge, tree, id| bridge.state(tree, id))
    }

    /// Interaction restriction, if any.
    pub fn restriction(&self) -> Option<Restriction> {
        self.with_bridge(|bridge, tree, id| bridge.restriction(tree, id))
    }

    /// Checked state, for checkable nodes.
    pub fn checked(&self) -> Option<CheckedState> {
        self.with_bridge(|bridge, tree, id| bridge.checked(tree, id))
    }

    /// Sort direction, for table headers.
    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.with_bridge(|bridge, tree, id| bridge.sort_direction(tree, id))
    }

    /// Popup kind.
    pub fn has_popup(&self) -> Option<HasPopup> {
        self.with_bridge(|bridge, tree, id| bridge.has_popup(tree, id))
    }

    /// Text decoration.
    pub fn text_style(&self) -> Option<TextStyle> {
        self.with_bridge(|bridge, tree, id| bridge.text_style(tree, id))
    }

    /// Bold text.
    pub fn bold(&self) -> bool {
        self.text_style().is_some_and(|s| s.contains(TextStyle::BOLD))
    }

    /// Italic text.
    pub fn italic(&self) -> bool {
        self.text_style().is_some_and(|s| s.contains(TextStyle::ITALIC))
    }

    /// Underlined text.
    pub fn underline(&self) -> bool {
        self.text_style()
            .is_some_and(|s| s.contains(TextStyle::UNDERLINE))
    }

    /// Struck-through text.
    pub fn line_through(&self) -> bool {
        self.text_style()
            .is_some_and(|s| s.contains(TextStyle::LINE_THROUGH))
    }

    /// Accessible name.
    pub fn name(&self) -> Option<String> {
        self.with_bridge(|bridge, tree, id| bridge.name(tree, id))
    }

    /// Value, for example the text of a text field.
    pub fn value(&self) -> Option<String> {
        self.with_bridge(|bridge, tree, id| bridge.value(tree, id))
    }

    /// Clipped screen bounds.
    pub fn location(&self) -> Option<Rect> {
        self.with_bridge(|bridge, tree, id| bridge.location(tree, id))
    }

    /// Unclipped screen bounds, falling back to [`Node::location`].
    pub fn unclipped_location(&self) -> Option<Rect> {
        self.with_bridge(|bridge, tree, id| bridge.unclipped_location(tree, id))
            .or_else(|| self.location())
    }

    /// Screen bounds of the caret inside this node.
    pub fn caret_bounds(&self) -> Option<Rect> {
        let data = self.with_bridge(|bridge, tree, id| bridge.caret_bounds(tree, id))?;
        let &[left, top, width, height] = data.as_slice() else {
            warn!(
                tree = %self.inner.tree_id,
                len = data.len(),
                "malformed caret bounds payload"
            );
            return None;
        };
        Some(Rect::from_origin_size(
            (f64::from(left), f64::from(top)),
            (f64::from(width), f64::from(height)),
        ))
    }

    /// A raw markup attribute.
    pub fn html_attribute(&self, name: &str) -> Option<String> {
        self.with_bridge(|bridge, tree, id| bridge.html_attribute(tree, id, name))
    }

    /// Standard actions the node supports. Empty when detached.
    pub fn standard_actions(&self) -> Vec<ActionType> {
        self.with_bridge(|bridge, tree, id| bridge.standard_actions(tree, id))
            .unwrap_or_default()
    }

    /// Custom actions the node offers. Empty when detached.
    pub fn custom_actions(&self) -> Vec<CustomAction> {
        self.with_bridge(|bridge, tree, id| bridge.custom_actions(tree, id))
            .unwrap_or_default()
    }

    /// Next node, in document order, whose text contains `search`.
    pub fn next_text_match(&self, search: &str, backward: bool) -> Option<Self> {
        let found = self
            .with_bridge(|bridge, tree, id| bridge.next_text_match(tree, id, search, backward))?;
        self.resolve(&found)
    }

    /// One-line summary, for logs and tree dumps.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let id = self.id().map_or_else(|| "?".to_owned(), |id| id.to_string());
        let role = self.role().unwrap_or_default();
        let _ = write!(
            out,
            "node id={id} role={} state={:?}",
            role.as_str(),
            self.state().unwrap_or_default()
        );
        let parent = self
            .with_bridge(|bridge, tree, id| bridge.parent(tree, id))
            .map(|p| p.node_id.0);
        match parent {
            Some(p) => {
                let _ = write!(out, " parentID={p}");
            }
            None => out.push_str(" parentID=null"),
        }
        let children: Vec<i32> = self
            .with_bridge(|bridge, tree, id| bridge.child_ids(tree, id))
            .map(|c| c.node_ids.iter().map(|id| id.0).collect())
            .unwrap_or_default();
        let _ = write!(out, " childIds={children:?}");
        if let Some(child_tree) = self.child_tree_id().filter(|s| !s.is_empty()) {
            let _ = write!(out, " childTreeID={child_tree}");
        }
        if let Some(name) = self.name().filter(|s| !s.is_empty()) {
            let _ = write!(out, " name={name}");
        }
        if let Some(class) = self.class_name().filter(|s| !s.is_empty()) {
            let _ = write!(out, " className={class}");
        }
        out
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.inner.tree_id != other.inner.tree_id {
            return false;
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("tree_id", &self.inner.tree_id);
        match self.inner.slot {
            Slot::Root => s.field("id", &"root"),
            Slot::Node(id) => s.field("id", &id.0),
        };
        s.field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}
