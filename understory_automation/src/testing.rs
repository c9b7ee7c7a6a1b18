// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory host for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::{Rect, Vec2};

use crate::action::{ActionRequest, ActionType};
use crate::attributes::{
    BoolAttribute, FloatAttribute, IntAttribute, IntListAttribute, StringAttribute,
};
use crate::bridge::{AttributeSource, HostControl, TreeSource};
use crate::ids::{ChildIds, NodeId, NodeRef, ObserverId, TreeId};
use crate::session::Session;
use crate::values::{
    CheckedState, CustomAction, EventType, HasPopup, Restriction, Role, SortDirection, State,
    TextStyle, TreeChangeObserverFilter, TreeSelection,
};

/// Listener bookkeeping the proxy reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListenerNotice {
    Added(NodeId, EventType),
    Removed(NodeId, EventType),
}

#[derive(Debug, Default)]
struct FakeNode {
    role: Option<Role>,
    parent: Option<NodeRef>,
    children: Vec<NodeId>,
    child_tree: Option<TreeId>,
    state: State,
    name: Option<String>,
    value: Option<String>,
    location: Option<Rect>,
    caret: Option<Vec<i32>>,
    standard_actions: Option<Vec<ActionType>>,
    strings: HashMap<StringAttribute, String>,
    bools: HashMap<BoolAttribute, bool>,
    ints: HashMap<IntAttribute, i32>,
    floats: HashMap<FloatAttribute, f32>,
    int_lists: HashMap<IntListAttribute, Vec<i32>>,
    reverse_lists: HashMap<IntListAttribute, Vec<NodeId>>,
}

#[derive(Debug)]
struct FakeTree {
    root: NodeId,
    nodes: HashMap<NodeId, FakeNode>,
    public_root: Option<NodeRef>,
    doc_url: Option<String>,
    selection: Option<TreeSelection>,
}

#[derive(Debug, Default)]
struct FakeHost {
    trees: HashMap<TreeId, FakeTree>,
    focus: Option<NodeRef>,
    enable: Option<TreeId>,
    range_bounds: Option<Rect>,
}

impl FakeHost {
    fn node(&self, tree: &TreeId, id: NodeId) -> Option<&FakeNode> {
        self.trees.get(tree)?.nodes.get(&id)
    }

    fn child_refs(&self, tree: &TreeId, id: NodeId) -> Option<ChildIds> {
        let node = self.node(tree, id)?;
        if let Some(child_tree) = &node.child_tree
            && let Some(child) = self.trees.get(child_tree)
        {
            return Some(ChildIds {
                tree_id: child_tree.clone(),
                node_ids: vec![child.root],
            });
        }
        Some(ChildIds {
            tree_id: tree.clone(),
            node_ids: node.children.clone(),
        })
    }
}

/// A host backed by plain maps. Every trait query is counted.
#[derive(Debug, Default)]
pub(crate) struct FakeBridge {
    host: RefCell<FakeHost>,
    calls: Cell<usize>,
    actions: RefCell<Vec<ActionRequest>>,
    notices: RefCell<Vec<ListenerNotice>>,
    enabled: RefCell<Vec<String>>,
    destroyed: RefCell<Vec<String>>,
    observers: RefCell<Vec<(ObserverId, TreeChangeObserverFilter)>>,
}

impl FakeBridge {
    /// A host with no trees that refuses to enable.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A host whose desktop is `1 desktop → 2 window → 3 group → 4 button`.
    pub(crate) fn with_desktop() -> Self {
        let bridge = Self::new();
        bridge.add_tree("desktop", 1, Role::Desktop);
        bridge.add_node("desktop", 1, 2, Role::Window);
        bridge.add_node("desktop", 2, 3, Role::Group);
        bridge.add_node("desktop", 3, 4, Role::Button);
        bridge.set_enable_result(Some("desktop"));
        bridge
    }

    pub(crate) fn add_tree(&self, tree: &str, root: i32, role: Role) {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeId(root),
            FakeNode {
                role: Some(role),
                ..FakeNode::default()
            },
        );
        self.host.borrow_mut().trees.insert(
            TreeId::new(tree),
            FakeTree {
                root: NodeId(root),
                nodes,
                public_root: None,
                doc_url: None,
                selection: None,
            },
        );
    }

    /// Append node `id` to the children of `parent`.
    pub(crate) fn add_node(&self, tree: &str, parent: i32, id: i32, role: Role) {
        let tree_id = TreeId::new(tree);
        let mut host = self.host.borrow_mut();
        let fake = host.trees.get_mut(&tree_id).expect("unknown tree");
        fake.nodes
            .get_mut(&NodeId(parent))
            .expect("unknown parent")
            .children
            .push(NodeId(id));
        fake.nodes.insert(
            NodeId(id),
            FakeNode {
                role: Some(role),
                parent: Some(NodeRef::new(tree_id, NodeId(parent))),
                ..FakeNode::default()
            },
        );
    }

    /// Host `child_tree` below node `id`: its root becomes the node's only child.
    pub(crate) fn link_child_tree(&self, tree: &str, id: i32, child_tree: &str) {
        let child_id = TreeId::new(child_tree);
        self.with_node(tree, id, |node| {
            node.child_tree = Some(child_id.clone());
            node.strings
                .insert(StringAttribute::ChildTreeId, child_tree.to_owned());
        });
        let mut host = self.host.borrow_mut();
        if let Some(child) = host.trees.get_mut(&child_id) {
            let root = child.root;
            if let Some(node) = child.nodes.get_mut(&root) {
                node.parent = Some(NodeRef::new(TreeId::new(tree), NodeId(id)));
            }
        }
    }

    pub(crate) fn set_public_root(&self, tree: &str, public_tree: &str, id: i32) {
        let mut host = self.host.borrow_mut();
        let fake = host.trees.get_mut(&TreeId::new(tree)).expect("unknown tree");
        fake.public_root = Some(NodeRef::new(TreeId::new(public_tree), NodeId(id)));
    }

    pub(crate) fn set_root(&self, tree: &str, id: i32) {
        let mut host = self.host.borrow_mut();
        host.trees
            .get_mut(&TreeId::new(tree))
            .expect("unknown tree")
            .root = NodeId(id);
    }

    pub(crate) fn set_enable_result(&self, tree: Option<&str>) {
        self.host.borrow_mut().enable = tree.map(TreeId::new);
    }

    pub(crate) fn set_focus(&self, tree: &str, id: i32) {
        self.host.borrow_mut().focus = Some(NodeRef::new(TreeId::new(tree), NodeId(id)));
    }

    pub(crate) fn set_range_bounds(&self, bounds: Rect) {
        self.host.borrow_mut().range_bounds = Some(bounds);
    }

    pub(crate) fn set_doc_url(&self, tree: &str, url: &str) {
        let mut host = self.host.borrow_mut();
        host.trees
            .get_mut(&TreeId::new(tree))
            .expect("unknown tree")
            .doc_url = Some(url.to_owned());
    }

    pub(crate) fn set_selection(&self, tree: &str, selection: TreeSelection) {
        let mut host = self.host.borrow_mut();
        host.trees
            .get_mut(&TreeId::new(tree))
            .expect("unknown tree")
            .selection = Some(selection);
    }

    fn with_node(&self, tree: &str, id: i32, f: impl FnOnce(&mut FakeNode)) {
        let mut host = self.host.borrow_mut();
        let node = host
            .trees
            .get_mut(&TreeId::new(tree))
            .and_then(|t| t.nodes.get_mut(&NodeId(id)))
            .expect("unknown node");
        f(node);
    }

    pub(crate) fn set_name(&self, tree: &str, id: i32, name: &str) {
        self.with_node(tree, id, |n| n.name = Some(name.to_owned()));
    }

    pub(crate) fn set_state(&self, tree: &str, id: i32, state: State) {
        self.with_node(tree, id, |n| n.state = state);
    }

    pub(crate) fn set_location(&self, tree: &str, id: i32, location: Rect) {
        self.with_node(tree, id, |n| n.location = Some(location));
    }

    pub(crate) fn set_caret_bounds(&self, tree: &str, id: i32, data: &[i32]) {
        self.with_node(tree, id, |n| n.caret = Some(data.to_vec()));
    }

    pub(crate) fn set_standard_actions(&self, tree: &str, id: i32, actions: &[ActionType]) {
        self.with_node(tree, id, |n| n.standard_actions = Some(actions.to_vec()));
    }

    pub(crate) fn set_string(&self, tree: &str, id: i32, attr: StringAttribute, value: &str) {
        self.with_node(tree, id, |n| {
            n.strings.insert(attr, value.to_owned());
        });
    }

    pub(crate) fn set_bool(&self, tree: &str, id: i32, attr: BoolAttribute, value: bool) {
        self.with_node(tree, id, |n| {
            n.bools.insert(attr, value);
        });
    }

    pub(crate) fn set_int(&self, tree: &str, id: i32, attr: IntAttribute, value: i32) {
        self.with_node(tree, id, |n| {
            n.ints.insert(attr, value);
        });
    }

    pub(crate) fn set_int_list(&self, tree: &str, id: i32, attr: IntListAttribute, value: &[i32]) {
        self.with_node(tree, id, |n| {
            n.int_lists.insert(attr, value.to_vec());
        });
    }

    /// Override what the host answers for the reverse of a list relation.
    pub(crate) fn set_reverse_list(
        &self,
        tree: &str,
        id: i32,
        attr: IntListAttribute,
        ids: &[i32],
    ) {
        self.with_node(tree, id, |n| {
            n.reverse_lists
                .insert(attr, ids.iter().copied().map(NodeId).collect());
        });
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.set(0);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn take_actions(&self) -> Vec<ActionRequest> {
        core::mem::take(&mut *self.actions.borrow_mut())
    }

    pub(crate) fn listener_notices(&self) -> Vec<ListenerNotice> {
        self.notices.borrow().clone()
    }

    pub(crate) fn enabled_child_trees(&self) -> Vec<String> {
        self.enabled.borrow().clone()
    }

    pub(crate) fn destroyed_trees(&self) -> Vec<String> {
        self.destroyed.borrow().clone()
    }

    pub(crate) fn registered_observers(&self) -> Vec<(ObserverId, TreeChangeObserverFilter)> {
        self.observers.borrow().clone()
    }

    /// Count one query and read the host.
    fn query<R>(&self, f: impl FnOnce(&FakeHost) -> Option<R>) -> Option<R> {
        self.calls.set(self.calls.get() + 1);
        let host = self.host.borrow();
        let result = f(&host);
        drop(host);
        result
    }

    fn node_query<R>(
        &self,
        tree: &TreeId,
        id: NodeId,
        f: impl FnOnce(&FakeNode) -> Option<R>,
    ) -> Option<R> {
        self.query(|host| f(host.node(tree, id)?))
    }
}

impl AttributeSource for FakeBridge {
    fn string_attribute(
        &self,
        tree: &TreeId,
        node: NodeId,
        attr: StringAttribute,
    ) -> Option<String> {
        self.node_query(tree, node, |n| n.strings.get(&attr).cloned())
    }

    fn bool_attribute(&self, tree: &TreeId, node: NodeId, attr: BoolAttribute) -> Option<bool> {
        self.node_query(tree, node, |n| n.bools.get(&attr).copied())
    }

    fn int_attribute(&self, tree: &TreeId, node: NodeId, attr: IntAttribute) -> Option<i32> {
        self.node_query(tree, node, |n| n.ints.get(&attr).copied())
    }

    fn float_attribute(&self, tree: &TreeId, node: NodeId, attr: FloatAttribute) -> Option<f32> {
        self.node_query(tree, node, |n| n.floats.get(&attr).copied())
    }

    fn int_list_attribute(
        &self,
        tree: &TreeId,
        node: NodeId,
        attr: IntListAttribute,
    ) -> Option<Vec<i32>> {
        self.node_query(tree, node, |n| n.int_lists.get(&attr).cloned())
    }

    fn int_reverse_relations(
        &self,
        tree: &TreeId,
        node: NodeId,
        attr: IntAttribute,
    ) -> Vec<NodeId> {
        self.query(|host| {
            let mut ids: Vec<NodeId> = host
                .trees
                .get(tree)?
                .nodes
                .iter()
                .filter(|(_, n)| n.ints.get(&attr) == Some(&node.0))
                .map(|(id, _)| *id)
                .collect();
            ids.sort();
            Some(ids)
        })
        .unwrap_or_default()
    }

    fn int_list_reverse_relations(
        &self,
        tree: &TreeId,
        node: NodeId,
        attr: IntListAttribute,
    ) -> Vec<NodeId> {
        self.query(|host| {
            let fake = host.trees.get(tree)?;
            if let Some(ids) = fake.nodes.get(&node)?.reverse_lists.get(&attr) {
                return Some(ids.clone());
            }
            let mut ids: Vec<NodeId> = fake
                .nodes
                .iter()
                .filter(|(_, n)| n.int_lists.get(&attr).is_some_and(|l| l.contains(&node.0)))
                .map(|(id, _)| *id)
                .collect();
            ids.sort();
            Some(ids)
        })
        .unwrap_or_default()
    }

    fn html_attribute(&self, tree: &TreeId, node: NodeId, _name: &str) -> Option<String> {
        self.node_query(tree, node, |_| None)
    }
}

impl TreeSource for FakeBridge {
    fn root_id(&self, tree: &TreeId) -> Option<NodeId> {
        self.query(|host| Some(host.trees.get(tree)?.root))
    }

    fn public_root(&self, tree: &TreeId) -> Option<NodeRef> {
        self.query(|host| {
            let fake = host.trees.get(tree)?;
            Some(
                fake.public_root
                    .clone()
                    .unwrap_or_else(|| NodeRef::new(tree.clone(), fake.root)),
            )
        })
    }

    fn parent(&self, tree: &TreeId, node: NodeId) -> Option<NodeRef> {
        self.node_query(tree, node, |n| n.parent.clone())
    }

    fn child_count(&self, tree: &TreeId, node: NodeId) -> usize {
        self.query(|host| host.child_refs(tree, node))
            .map_or(0, |c| c.node_ids.len())
    }

    fn child_at_index(&self, tree: &TreeId, node: NodeId, index: usize) -> Option<NodeRef> {
        self.query(|host| {
            let children = host.child_refs(tree, node)?;
            let id = *children.node_ids.get(index)?;
            Some(NodeRef::new(children.tree_id, id))
        })
    }

    fn child_ids(&self, tree: &TreeId, node: NodeId) -> Option<ChildIds> {
        self.query(|host| host.child_refs(tree, node))
    }

    fn index_in_parent(&self, tree: &TreeId, node: NodeId) -> Option<usize> {
        self.query(|host| {
            let parent = host.node(tree, node)?.parent.as_ref()?;
            host.node(&parent.tree_id, parent.node_id)?
                .children
                .iter()
                .position(|&c| c == node)
        })
    }

    fn role(&self, tree: &TreeId, node: NodeId) -> Option<Role> {
        self.node_query(tree, node, |n| n.role)
    }

    fn state(&self, tree: &TreeId, node: NodeId) -> Option<State> {
        self.node_query(tree, node, |n| Some(n.state))
    }

    fn restriction(&self, tree: &TreeId, node: NodeId) -> Option<Restriction> {
        self.node_query(tree, node, |_| None)
    }

    fn checked(&self, tree: &TreeId, node: NodeId) -> Option<CheckedState> {
        self.node_query(tree, node, |_| None)
    }

    fn sort_direction(&self, tree: &TreeId, node: NodeId) -> Option<SortDirection> {
        self.node_query(tree, node, |_| None)
    }

    fn has_popup(&self, tree: &TreeId, node: NodeId) -> Option<HasPopup> {
        self.node_query(tree, node, |_| None)
    }

    fn text_style(&self, tree: &TreeId, node: NodeId) -> Option<TextStyle> {
        self.node_query(tree, node, |_| None)
    }

    fn name(&self, tree: &TreeId, node: NodeId) -> Option<String> {
        self.node_query(tree, node, |n| n.name.clone())
    }

    fn value(&self, tree: &TreeId, node: NodeId) -> Option<String> {
        self.node_query(tree, node, |n| n.value.clone())
    }

    fn location(&self, tree: &TreeId, node: NodeId) -> Option<Rect> {
        self.node_query(tree, node, |n| n.location)
    }

    fn unclipped_location(&self, tree: &TreeId, node: NodeId) -> Option<Rect> {
        self.node_query(tree, node, |_| None)
    }

    fn caret_bounds(&self, tree: &TreeId, node: NodeId) -> Option<Vec<i32>> {
        self.node_query(tree, node, |n| n.caret.clone())
    }

    fn bounds_for_range(
        &self,
        tree: &TreeId,
        node: NodeId,
        _start: i32,
        _end: i32,
        _clipped: bool,
    ) -> Option<Rect> {
        self.query(|host| {
            host.node(tree, node)?;
            host.range_bounds
        })
    }

    fn compute_global_bounds(&self, tree: &TreeId, node: NodeId, local: Rect) -> Option<Rect> {
        self.node_query(tree, node, |n| {
            let offset = n.location.map_or(Vec2::ZERO, |l| l.origin().to_vec2());
            Some(local + offset)
        })
    }

    fn standard_actions(&self, tree: &TreeId, node: NodeId) -> Option<Vec<ActionType>> {
        self.node_query(tree, node, |n| n.standard_actions.clone())
    }

    fn custom_actions(&self, tree: &TreeId, node: NodeId) -> Option<Vec<CustomAction>> {
        self.node_query(tree, node, |_| None)
    }

    fn next_text_match(
        &self,
        tree: &TreeId,
        node: NodeId,
        _search: &str,
        _backward: bool,
    ) -> Option<NodeRef> {
        self.node_query(tree, node, |_| None)
    }

    fn doc_url(&self, tree: &TreeId) -> Option<String> {
        self.query(|host| host.trees.get(tree)?.doc_url.clone())
    }

    fn doc_title(&self, _tree: &TreeId) -> Option<String> {
        self.query(|_| None)
    }

    fn doc_loaded(&self, _tree: &TreeId) -> Option<bool> {
        self.query(|_| None)
    }

    fn doc_loading_progress(&self, _tree: &TreeId) -> Option<f64> {
        self.query(|_| None)
    }

    fn selection(&self, tree: &TreeId) -> Option<TreeSelection> {
        self.query(|host| host.trees.get(tree)?.selection)
    }

    fn focus(&self) -> Option<NodeRef> {
        self.query(|host| host.focus.clone())
    }

    fn accessibility_focus(&self) -> Option<NodeRef> {
        self.query(|_| None)
    }

    fn enable(&self) -> Option<TreeId> {
        self.query(|host| host.enable.clone())
    }
}

impl HostControl for FakeBridge {
    fn perform_action(&self, request: &ActionRequest) {
        self.actions.borrow_mut().push(request.clone());
    }

    fn event_listener_added(&self, _tree: &TreeId, node: NodeId, event_type: EventType) {
        self.notices
            .borrow_mut()
            .push(ListenerNotice::Added(node, event_type));
    }

    fn event_listener_removed(&self, _tree: &TreeId, node: NodeId, event_type: EventType) {
        self.notices
            .borrow_mut()
            .push(ListenerNotice::Removed(node, event_type));
    }

    fn add_tree_change_observer(&self, id: ObserverId, filter: TreeChangeObserverFilter) {
        self.observers.borrow_mut().push((id, filter));
    }

    fn remove_tree_change_observer(&self, id: ObserverId) {
        self.observers.borrow_mut().retain(|(o, _)| *o != id);
    }

    fn enable_child_tree(&self, tree: &TreeId) {
        self.enabled.borrow_mut().push(tree.to_string());
    }

    fn destroy_tree(&self, tree: &TreeId) {
        self.destroyed.borrow_mut().push(tree.to_string());
    }

    fn disable(&self) {
        self.host.borrow_mut().enable = None;
    }
}

/// A session over [`FakeBridge::with_desktop`].
pub(crate) fn desktop_session() -> (Rc<FakeBridge>, Session) {
    let bridge = Rc::new(FakeBridge::with_desktop());
    let session = Session::new(bridge.clone());
    (bridge, session)
}
