// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers for trees, nodes, requests, and observers.

use std::fmt;
use std::rc::Rc;

/// Opaque identifier of one remote tree.
///
/// Cloning is cheap; the underlying string is shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(Rc<str>);

impl TreeId {
    /// Create a tree id from its string form.
    pub fn new(id: &str) -> Self {
        Self(Rc::from(id))
    }

    /// The string form of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TreeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TreeId {
    fn from(id: String) -> Self {
        Self(Rc::from(id))
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeId({:?})", &*self.0)
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host-assigned node identifier, unique within one [`TreeId`].
///
/// Zero never denotes a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub i32);

impl NodeId {
    /// Whether this id can denote a node at all.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node address that may point into another tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Tree the node lives in.
    pub tree_id: TreeId,
    /// Node within that tree.
    pub node_id: NodeId,
}

impl NodeRef {
    /// Convenience constructor.
    pub fn new(tree_id: TreeId, node_id: NodeId) -> Self {
        Self { tree_id, node_id }
    }
}

/// Child ids of a node. All children of one node live in the same tree,
/// which is not necessarily the parent's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildIds {
    /// Tree the children live in.
    pub tree_id: TreeId,
    /// Children in order.
    pub node_ids: Vec<NodeId>,
}

/// Correlation id for an action whose result is awaited.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u32);

/// Identifier of a registered tree change observer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);
