// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural relationships between nodes.
//!
//! Parents and children may live in other trees: the host merges embedded
//! trees into their embedder, and every reported address is resolved through
//! the owning tree's (or the session's) identity cache.
//!
//! A child that carries an application id and sits in the same tree as its
//! parent is skipped. Such a node is reachable only as the root of its own
//! tree.

use crate::ids::{NodeRef, TreeId};
use crate::node::Node;
use crate::tree::{Tree, TreeState};

impl Node {
    /// Parent node, possibly in an embedding tree.
    pub fn parent(&self) -> Option<Self> {
        let parent = self.with_bridge(|bridge, tree, id| bridge.parent(tree, id))?;
        self.resolve(&parent)
    }

    /// Children in order, skipping unresolvable ids.
    pub fn children(&self) -> Vec<Self> {
        let Some(ids) = self.with_bridge(|bridge, tree, id| bridge.child_ids(tree, id)) else {
            return Vec::new();
        };
        ids.node_ids
            .iter()
            .filter_map(|&id| self.resolve(&NodeRef::new(ids.tree_id.clone(), id)))
            .filter(|child| !self.is_app_boundary(child))
            .collect()
    }

    /// First child.
    pub fn first_child(&self) -> Option<Self> {
        self.child_at(0)
    }

    /// Last child.
    pub fn last_child(&self) -> Option<Self> {
        let count = self.with_bridge(|bridge, tree, id| Some(bridge.child_count(tree, id)))?;
        self.child_at(count.checked_sub(1)?)
    }

    fn child_at(&self, index: usize) -> Option<Self> {
        let child = self.with_bridge(|bridge, tree, id| bridge.child_at_index(tree, id, index))?;
        let child = self.resolve(&child)?;
        (!self.is_app_boundary(&child)).then_some(child)
    }

    fn is_app_boundary(&self, child: &Self) -> bool {
        child.tree_id() == self.tree_id() && child.app_id().is_some_and(|id| !id.is_empty())
    }

    /// Sibling before this node.
    pub fn previous_sibling(&self) -> Option<Self> {
        let index = self.index_in_parent()?.checked_sub(1)?;
        self.sibling_at(index)
    }

    /// Sibling after this node.
    pub fn next_sibling(&self) -> Option<Self> {
        let index = self.index_in_parent()?.checked_add(1)?;
        self.sibling_at(index)
    }

    // Siblings are not filtered for application boundaries.
    fn sibling_at(&self, index: usize) -> Option<Self> {
        let parent = self.parent()?;
        let sibling =
            parent.with_bridge(|bridge, tree, id| bridge.child_at_index(tree, id, index))?;
        parent.resolve(&sibling)
    }

    /// Position among the parent's children, as reported by the host.
    pub fn index_in_parent(&self) -> Option<usize> {
        self.with_bridge(|bridge, tree, id| bridge.index_in_parent(tree, id))
    }

    /// Root of the merged tree this node is shown in.
    ///
    /// For a node of an embedded tree this is the embedder's root, not the
    /// embedded tree's own root.
    pub fn root(&self) -> Option<Self> {
        let tree = self.tree()?;
        let root = tree.bridge().public_root(self.tree_id())?;
        self.resolve(&root)
    }

    /// Root of the tree named by this node's child tree id, if that tree is
    /// already known to the session.
    pub fn child_tree(&self) -> Option<Self> {
        let id = self.child_tree_id().filter(|id| !id.is_empty())?;
        let session = self.tree()?.session()?;
        let tree = session.get_tree(&TreeId::from(id))?;
        Some(tree.root())
    }

    /// Run `callback` with this node's child tree once it has loaded.
    ///
    /// Runs immediately when the tree is already loaded. Otherwise the
    /// callback is queued and the host is asked to send the tree. Returns
    /// `false` when the node has no child tree.
    pub fn with_child_tree(&self, callback: impl FnOnce(&Tree) + 'static) -> bool {
        let Some(id) = self.child_tree_id().filter(|id| !id.is_empty()) else {
            return false;
        };
        let Some(tree) = self.tree() else {
            return false;
        };
        let Some(session) = tree.session() else {
            return false;
        };
        let id = TreeId::from(id);
        let loaded = session.tree_state(&id) == TreeState::Loaded;
        let requested = session.has_tree_callbacks(&id);
        session.store_tree_callback(&id, Box::new(callback));
        if !loaded && !requested {
            tree.bridge().enable_child_tree(&id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::attributes::StringAttribute;
    use crate::ids::NodeId;
    use crate::notification::{EventParams, Notification};
    use crate::testing::desktop_session;
    use crate::values::{EventType, Role};

    #[test]
    fn walks_parents_children_and_siblings() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        bridge.add_node("desktop", 3, 10, Role::Label);
        bridge.add_node("desktop", 3, 11, Role::Label);
        let group = tree.get(NodeId(3)).unwrap();
        let button = tree.get(NodeId(4)).unwrap();

        assert!(button.parent().unwrap().ptr_eq(&group));
        let ids: Vec<_> = group.children().iter().filter_map(|c| c.id()).collect();
        assert_eq!(ids, vec![NodeId(4), NodeId(10), NodeId(11)]);
        assert!(group.first_child().unwrap().ptr_eq(&button));
        assert_eq!(group.last_child().unwrap().id(), Some(NodeId(11)));
        assert_eq!(button.next_sibling().unwrap().id(), Some(NodeId(10)));
        assert!(button.previous_sibling().is_none());
        let last = tree.get(NodeId(11)).unwrap();
        assert!(last.next_sibling().is_none());
        assert_eq!(last.previous_sibling().unwrap().id(), Some(NodeId(10)));
        assert_eq!(last.index_in_parent(), Some(2));
        assert!(tree.root().parent().is_none());
    }

    #[test]
    fn siblings_include_app_nodes() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        bridge.add_node("desktop", 3, 10, Role::Window);
        bridge.add_node("desktop", 3, 11, Role::Label);
        bridge.set_string("desktop", 10, StringAttribute::AppId, "org.example.app");
        let button = tree.get(NodeId(4)).unwrap();
        let app = tree.get(NodeId(10)).unwrap();
        let label = tree.get(NodeId(11)).unwrap();

        assert!(button.next_sibling().unwrap().ptr_eq(&app));
        assert!(app.previous_sibling().unwrap().ptr_eq(&button));
        assert!(app.next_sibling().unwrap().ptr_eq(&label));
        assert!(label.previous_sibling().unwrap().ptr_eq(&app));

        bridge.reset_calls();
        assert!(label.next_sibling().is_none());
        assert!(bridge.calls() <= 3, "sibling lookup should not scan children");
    }

    #[test]
    fn leaf_has_no_children() {
        let (_bridge, session) = desktop_session();
        let button = session.desktop().unwrap().get(NodeId(4)).unwrap();
        assert!(button.children().is_empty());
        assert!(button.first_child().is_none());
        assert!(button.last_child().is_none());
    }

    #[test]
    fn same_tree_app_nodes_are_not_children() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        bridge.add_node("desktop", 3, 10, Role::Window);
        bridge.set_string("desktop", 10, StringAttribute::AppId, "org.example.app");
        let group = tree.get(NodeId(3)).unwrap();
        let ids: Vec<_> = group.children().iter().filter_map(|c| c.id()).collect();
        assert_eq!(ids, vec![NodeId(4)]);
        assert!(group.last_child().is_none());
        assert_eq!(group.first_child().unwrap().id(), Some(NodeId(4)));
    }

    #[test]
    fn children_cross_into_child_trees() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        bridge.add_tree("web", 1, Role::RootWebArea);
        bridge.set_string("web", 1, StringAttribute::AppId, "embedded");
        bridge.link_child_tree("desktop", 4, "web");
        bridge.set_public_root("web", "desktop", 1);
        let button = tree.get(NodeId(4)).unwrap();

        let children = button.children();
        assert_eq!(children.len(), 1);
        let web_root = &children[0];
        assert_eq!(web_root.tree_id(), &TreeId::new("web"));
        assert!(web_root.is_root());
        assert!(web_root.parent().unwrap().ptr_eq(&button));
        assert!(web_root.root().unwrap().ptr_eq(&tree.root()));
        assert!(button.child_tree().unwrap().ptr_eq(web_root));
    }

    #[test]
    fn child_tree_callback_waits_for_load() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        bridge.set_string("desktop", 4, StringAttribute::ChildTreeId, "web");
        let button = tree.get(NodeId(4)).unwrap();
        assert!(button.child_tree().is_none());

        let loaded = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let sink = loaded.clone();
            assert!(button.with_child_tree(move |t| sink.borrow_mut().push(t.id().clone())));
        }
        assert_eq!(bridge.enabled_child_trees(), vec!["web".to_owned()]);
        assert!(loaded.borrow().is_empty());

        bridge.add_tree("web", 1, Role::RootWebArea);
        bridge.set_doc_url("web", "https://example.com/");
        let load = || {
            Notification::AccessibilityEvent(EventParams::new(
                "web",
                NodeId(1),
                EventType::LoadComplete,
            ))
        };
        session.handle(load());
        session.handle(load());
        assert_eq!(*loaded.borrow(), vec![TreeId::new("web"), TreeId::new("web")]);

        let sink = loaded.clone();
        assert!(button.with_child_tree(move |t| sink.borrow_mut().push(t.id().clone())));
        assert_eq!(loaded.borrow().len(), 3);
        assert_eq!(bridge.enabled_child_trees().len(), 1);
    }

    #[test]
    fn nodes_without_child_tree_decline() {
        let (_bridge, session) = desktop_session();
        let button = session.desktop().unwrap().get(NodeId(4)).unwrap();
        assert!(!button.with_child_tree(|_| {}));
        assert!(button.child_tree().is_none());
    }
}
