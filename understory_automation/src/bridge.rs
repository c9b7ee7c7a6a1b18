// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host boundary.
//!
//! The proxy owns no tree data. Everything it reports comes from a
//! [`Bridge`], split into three traits by concern:
//!
//! - [`AttributeSource`]: one method per attribute category, plus reverse
//!   relation lookups.
//! - [`TreeSource`]: structure, enumerated properties, geometry, and
//!   tree-scoped document data.
//! - [`HostControl`]: fire-and-forget requests to the host.
//!
//! All query methods are synchronous and answer `None` (or an empty list) for
//! anything the host does not know, including ids that are no longer live.
//! They must not call back into the proxy.

use kurbo::Rect;

use crate::action::{ActionRequest, ActionType};
use crate::attributes::{
    BoolAttribute, FloatAttribute, IntAttribute, IntListAttribute, StringAttribute,
};
use crate::ids::{ChildIds, NodeId, NodeRef, ObserverId, TreeId};
use crate::values::{
    CheckedState, CustomAction, EventType, HasPopup, Restriction, Role, SortDirection, State,
    TextStyle, TreeChangeObserverFilter, TreeSelection,
};

/// Attribute reads keyed by `(tree, node, attribute)`.
pub trait AttributeSource {
    /// A string attribute.
    fn string_attribute(&self, tree: &TreeId, node: NodeId, attr: StringAttribute)
    -> Option<String>;
    /// A boolean attribute.
    fn bool_attribute(&self, tree: &TreeId, node: NodeId, attr: BoolAttribute) -> Option<bool>;
    /// An integer attribute.
    fn int_attribute(&self, tree: &TreeId, node: NodeId, attr: IntAttribute) -> Option<i32>;
    /// A float attribute.
    fn float_attribute(&self, tree: &TreeId, node: NodeId, attr: FloatAttribute) -> Option<f32>;
    /// An integer list attribute.
    fn int_list_attribute(
        &self,
        tree: &TreeId,
        node: NodeId,
        attr: IntListAttribute,
    ) -> Option<Vec<i32>>;
    /// Nodes in `tree` whose `attr` holds `node`.
    fn int_reverse_relations(&self, tree: &TreeId, node: NodeId, attr: IntAttribute)
    -> Vec<NodeId>;
    /// Nodes in `tree` whose list `attr` contains `node`.
    fn int_list_reverse_relations(
        &self,
        tree: &TreeId,
        node: NodeId,
        attr: IntListAttribute,
    ) -> Vec<NodeId>;
    /// A raw markup attribute by name.
    fn html_attribute(&self, tree: &TreeId, node: NodeId, name: &str) -> Option<String>;
}

/// Structural and tree-scoped queries.
pub trait TreeSource {
    /// Current root of `tree`.
    fn root_id(&self, tree: &TreeId) -> Option<NodeId>;
    /// Root of the outermost tree `tree` is merged into. For a tree embedded
    /// in another this may be a node of the embedding tree.
    fn public_root(&self, tree: &TreeId) -> Option<NodeRef>;
    /// Parent of a node, possibly in another tree.
    fn parent(&self, tree: &TreeId, node: NodeId) -> Option<NodeRef>;
    /// Number of children.
    fn child_count(&self, tree: &TreeId, node: NodeId) -> usize;
    /// Child at `index`, possibly in another tree.
    fn child_at_index(&self, tree: &TreeId, node: NodeId, index: usize) -> Option<NodeRef>;
    /// All children.
    fn child_ids(&self, tree: &TreeId, node: NodeId) -> Option<ChildIds>;
    /// Position among the parent's children.
    fn index_in_parent(&self, tree: &TreeId, node: NodeId) -> Option<usize>;

    /// Role. A node with no role does not exist.
    fn role(&self, tree: &TreeId, node: NodeId) -> Option<Role>;
    /// State flags.
    fn state(&self, tree: &TreeId, node: NodeId) -> Option<State>;
    /// Restriction.
    fn restriction(&self, tree: &TreeId, node: NodeId) -> Option<Restriction>;
    /// Checked state.
    fn checked(&self, tree: &TreeId, node: NodeId) -> Option<CheckedState>;
    /// Sort direction.
    fn sort_direction(&self, tree: &TreeId, node: NodeId) -> Option<SortDirection>;
    /// Popup kind.
    fn has_popup(&self, tree: &TreeId, node: NodeId) -> Option<HasPopup>;
    /// Text decoration.
    fn text_style(&self, tree: &TreeId, node: NodeId) -> Option<TextStyle>;
    /// Accessible name.
    fn name(&self, tree: &TreeId, node: NodeId) -> Option<String>;
    /// Value.
    fn value(&self, tree: &TreeId, node: NodeId) -> Option<String>;

    /// Clipped screen bounds.
    fn location(&self, tree: &TreeId, node: NodeId) -> Option<Rect>;
    /// Unclipped screen bounds.
    fn unclipped_location(&self, tree: &TreeId, node: NodeId) -> Option<Rect>;
    /// Raw caret bounds payload; well-formed payloads are `[left, top, width, height]`.
    fn caret_bounds(&self, tree: &TreeId, node: NodeId) -> Option<Vec<i32>>;
    /// Screen bounds of a character range.
    fn bounds_for_range(
        &self,
        tree: &TreeId,
        node: NodeId,
        start: i32,
        end: i32,
        clipped: bool,
    ) -> Option<Rect>;
    /// Convert node-local bounds to screen bounds.
    fn compute_global_bounds(&self, tree: &TreeId, node: NodeId, local: Rect) -> Option<Rect>;

    /// Standard actions the node supports.
    fn standard_actions(&self, tree: &TreeId, node: NodeId) -> Option<Vec<ActionType>>;
    /// Custom actions the node offers.
    fn custom_actions(&self, tree: &TreeId, node: NodeId) -> Option<Vec<CustomAction>>;
    /// Next node whose text contains `search`.
    fn next_text_match(
        &self,
        tree: &TreeId,
        node: NodeId,
        search: &str,
        backward: bool,
    ) -> Option<NodeRef>;

    /// Document URL.
    fn doc_url(&self, tree: &TreeId) -> Option<String>;
    /// Document title.
    fn doc_title(&self, tree: &TreeId) -> Option<String>;
    /// Whether the document finished loading.
    fn doc_loaded(&self, tree: &TreeId) -> Option<bool>;
    /// Load progress in `0.0..=1.0`.
    fn doc_loading_progress(&self, tree: &TreeId) -> Option<f64>;
    /// Text selection of the tree.
    fn selection(&self, tree: &TreeId) -> Option<TreeSelection>;

    /// Node with keyboard focus.
    fn focus(&self) -> Option<NodeRef>;
    /// Node with accessibility focus.
    fn accessibility_focus(&self) -> Option<NodeRef>;
    /// Start automation and return the desktop tree id.
    fn enable(&self) -> Option<TreeId>;
}

/// Requests sent to the host. None of these return anything.
pub trait HostControl {
    /// Perform an action. Results, if any, come back as notifications.
    fn perform_action(&self, request: &ActionRequest);
    /// The first listener for `event_type` was added on a node.
    fn event_listener_added(&self, tree: &TreeId, node: NodeId, event_type: EventType);
    /// The last listener for `event_type` was removed from a node.
    fn event_listener_removed(&self, tree: &TreeId, node: NodeId, event_type: EventType);
    /// A tree change observer was registered.
    fn add_tree_change_observer(&self, id: ObserverId, filter: TreeChangeObserverFilter);
    /// A tree change observer was removed.
    fn remove_tree_change_observer(&self, id: ObserverId);
    /// Ask the host to start sending a tree.
    fn enable_child_tree(&self, tree: &TreeId);
    /// Drop the host-side cache of a tree.
    fn destroy_tree(&self, tree: &TreeId);
    /// Stop automation.
    fn disable(&self);
}

/// Everything the proxy needs from the host.
pub trait Bridge: AttributeSource + TreeSource + HostControl {}

impl<T: AttributeSource + TreeSource + HostControl + ?Sized> Bridge for T {}
