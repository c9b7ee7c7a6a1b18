// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inbound traffic from the host.
//!
//! The host pushes everything asynchronous as a [`Notification`], delivered
//! through [`Session::handle`](crate::Session::handle).

use kurbo::Point;

use crate::action::ActionType;
use crate::ids::{NodeId, RequestId, TreeId};
use crate::values::{EventFrom, EventType, TreeChangeType};

/// An event the host fired on a node.
#[derive(Clone, Debug, PartialEq)]
pub struct EventParams {
    /// Tree of the target.
    pub tree_id: TreeId,
    /// Target node. Ignored for events that apply to the whole tree.
    pub target_id: NodeId,
    /// Event type.
    pub event_type: EventType,
    /// What caused the event.
    pub event_from: EventFrom,
    /// Action that caused the event.
    pub event_from_action: Option<ActionType>,
    /// Pointer location, for mouse events.
    pub mouse_location: Option<Point>,
    /// Request the event answers, when it is the result of an action.
    pub action_request_id: Option<RequestId>,
}

impl EventParams {
    /// An event with no cause, location, or request attached.
    pub fn new(tree_id: impl Into<TreeId>, target_id: NodeId, event_type: EventType) -> Self {
        Self {
            tree_id: tree_id.into(),
            target_id,
            event_type,
            event_from: EventFrom::None,
            event_from_action: None,
            mouse_location: None,
            action_request_id: None,
        }
    }

    /// Set the cause.
    pub fn with_event_from(mut self, event_from: EventFrom) -> Self {
        self.event_from = event_from;
        self
    }

    /// Set the causing action.
    pub fn with_event_from_action(mut self, action: ActionType) -> Self {
        self.event_from = EventFrom::Action;
        self.event_from_action = Some(action);
        self
    }

    /// Set the pointer location.
    pub fn with_mouse_location(mut self, location: Point) -> Self {
        self.mouse_location = Some(location);
        self
    }

    /// Mark the event as the result of request `id`.
    pub fn with_action_request_id(mut self, id: RequestId) -> Self {
        self.action_request_id = Some(id);
        self
    }
}

/// Result of an asynchronous text-location request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLocationParams {
    /// Tree of the node.
    pub tree_id: TreeId,
    /// Node the range belongs to.
    pub node_id: NodeId,
    /// Request being answered.
    pub request_id: RequestId,
    /// Whether the host found the range.
    pub result: bool,
    /// Node-local `[left, top, width, height]`.
    pub geometry: Vec<i32>,
}

/// Something the host reports asynchronously.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// An event on a node.
    AccessibilityEvent(EventParams),
    /// A structural change, for tree change observers.
    TreeChange {
        /// Tree of the node.
        tree_id: TreeId,
        /// Changed node.
        node_id: NodeId,
        /// Kind of change.
        change_type: TreeChangeType,
    },
    /// Nodes that no longer exist.
    NodesRemoved {
        /// Tree the nodes belonged to.
        tree_id: TreeId,
        /// Removed ids.
        node_ids: Vec<NodeId>,
    },
    /// A node references a child tree the client may not know yet.
    ChildTreeId {
        /// The referenced tree.
        tree_id: TreeId,
    },
    /// A tree was destroyed on the host side.
    TreeDestroyed {
        /// The destroyed tree.
        tree_id: TreeId,
    },
    /// The host failed to serialize a tree and wants it requested again.
    SerializationError {
        /// The affected tree.
        tree_id: TreeId,
    },
    /// Completion of an action whose result is a status.
    ActionResult {
        /// Tree the action was sent to.
        tree_id: TreeId,
        /// Request being answered.
        request_id: RequestId,
        /// Whether the action succeeded.
        result: bool,
    },
    /// Completion of a text-location request.
    TextLocationResult(TextLocationParams),
    /// The host dropped every event listener, for example after a restart.
    AllListenersRemoved,
}

impl Notification {
    /// Tree the notification concerns, if it concerns one.
    pub fn tree_id(&self) -> Option<&TreeId> {
        match self {
            Self::AccessibilityEvent(params) => Some(&params.tree_id),
            Self::TextLocationResult(params) => Some(&params.tree_id),
            Self::TreeChange { tree_id, .. }
            | Self::NodesRemoved { tree_id, .. }
            | Self::ChildTreeId { tree_id }
            | Self::TreeDestroyed { tree_id }
            | Self::SerializationError { tree_id }
            | Self::ActionResult { tree_id, .. } => Some(tree_id),
            Self::AllListenersRemoved => None,
        }
    }
}
