// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actions: the request vocabulary and the node methods that issue it.
//!
//! Every action is fire-and-forget at the bridge. Methods that take a reply
//! callback register it with the owning tree under a fresh [`RequestId`]; the
//! host echoes that id back when the result is ready (see
//! [`Session::handle`](crate::Session::handle)).
//!
//! Actions on a detached node are silently dropped. Actions that only apply to
//! editable nodes silently do nothing on other nodes.

use std::fmt;

use kurbo::{Point, Rect, Vec2};
use tracing::trace;

use crate::error::AutomationError;
use crate::ids::{NodeId, RequestId, TreeId};
use crate::node::Node;
use crate::values::{EventType, State};

/// Kind of action, without arguments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "action names are self-describing")]
pub enum ActionType {
    Blur,
    Collapse,
    CustomAction,
    Decrement,
    DoDefault,
    Expand,
    Focus,
    GetImageData,
    GetTextLocation,
    HitTest,
    Increment,
    LongClick,
    ReplaceSelectedText,
    ResumeMedia,
    ScrollBackward,
    ScrollDown,
    ScrollForward,
    ScrollLeft,
    ScrollRight,
    ScrollToMakeVisible,
    ScrollToPoint,
    ScrollToPositionAtRowColumn,
    ScrollUp,
    SetAccessibilityFocus,
    SetScrollOffset,
    SetSelection,
    SetSequentialFocusNavigationStartingPoint,
    SetValue,
    ShowContextMenu,
    StartDuckingMedia,
    StopDuckingMedia,
    SuspendMedia,
}

impl ActionType {
    /// Host name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Collapse => "collapse",
            Self::CustomAction => "customAction",
            Self::Decrement => "decrement",
            Self::DoDefault => "doDefault",
            Self::Expand => "expand",
            Self::Focus => "focus",
            Self::GetImageData => "getImageData",
            Self::GetTextLocation => "getTextLocation",
            Self::HitTest => "hitTest",
            Self::Increment => "increment",
            Self::LongClick => "longClick",
            Self::ReplaceSelectedText => "replaceSelectedText",
            Self::ResumeMedia => "resumeMedia",
            Self::ScrollBackward => "scrollBackward",
            Self::ScrollDown => "scrollDown",
            Self::ScrollForward => "scrollForward",
            Self::ScrollLeft => "scrollLeft",
            Self::ScrollRight => "scrollRight",
            Self::ScrollToMakeVisible => "scrollToMakeVisible",
            Self::ScrollToPoint => "scrollToPoint",
            Self::ScrollToPositionAtRowColumn => "scrollToPositionAtRowColumn",
            Self::ScrollUp => "scrollUp",
            Self::SetAccessibilityFocus => "setAccessibilityFocus",
            Self::SetScrollOffset => "setScrollOffset",
            Self::SetSelection => "setSelection",
            Self::SetSequentialFocusNavigationStartingPoint => {
                "setSequentialFocusNavigationStartingPoint"
            }
            Self::SetValue => "setValue",
            Self::ShowContextMenu => "showContextMenu",
            Self::StartDuckingMedia => "startDuckingMedia",
            Self::StopDuckingMedia => "stopDuckingMedia",
            Self::SuspendMedia => "suspendMedia",
        }
    }

    /// Whether this is a hit-test family action.
    pub const fn is_hit_test(self) -> bool {
        matches!(self, Self::HitTest)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action together with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// An action that takes no arguments.
    Plain(ActionType),
    /// Perform a host-defined action.
    CustomAction {
        /// Id from [`CustomAction::id`](crate::CustomAction::id).
        custom_action_id: i32,
    },
    /// Request the node's image, scaled to fit.
    GetImageData {
        /// Maximum width in pixels.
        max_width: i32,
        /// Maximum height in pixels.
        max_height: i32,
    },
    /// Request the bounds of a character range asynchronously.
    GetTextLocation {
        /// First character.
        start_index: i32,
        /// One past the last character.
        end_index: i32,
    },
    /// Find the node under a point.
    HitTest {
        /// Tree-relative point.
        point: Point,
        /// Event the host fires on the hit node.
        event_to_fire: EventType,
    },
    /// Replace the selected text of an editable node.
    ReplaceSelectedText {
        /// Replacement text.
        value: String,
    },
    /// Scroll so that a point is visible.
    ScrollToPoint {
        /// Target point.
        point: Point,
    },
    /// Scroll a grid to a cell.
    ScrollToPositionAtRowColumn {
        /// Row index.
        row: i32,
        /// Column index.
        column: i32,
    },
    /// Set the scroll offset.
    SetScrollOffset {
        /// New offset.
        offset: Vec2,
    },
    /// Set a text selection.
    SetSelection {
        /// Node holding the anchor.
        anchor_node: NodeId,
        /// Anchor offset.
        anchor_offset: i32,
        /// Node holding the focus.
        focus_node: NodeId,
        /// Focus offset.
        focus_offset: i32,
    },
    /// Set the value of an editable node.
    SetValue {
        /// New value.
        value: String,
    },
}

impl Action {
    /// An argument-less action.
    pub const fn simple(action_type: ActionType) -> Self {
        Self::Plain(action_type)
    }

    /// Kind of this action.
    pub const fn action_type(&self) -> ActionType {
        match self {
            Self::Plain(t) => *t,
            Self::CustomAction { .. } => ActionType::CustomAction,
            Self::GetImageData { .. } => ActionType::GetImageData,
            Self::GetTextLocation { .. } => ActionType::GetTextLocation,
            Self::HitTest { .. } => ActionType::HitTest,
            Self::ReplaceSelectedText { .. } => ActionType::ReplaceSelectedText,
            Self::ScrollToPoint { .. } => ActionType::ScrollToPoint,
            Self::ScrollToPositionAtRowColumn { .. } => ActionType::ScrollToPositionAtRowColumn,
            Self::SetScrollOffset { .. } => ActionType::SetScrollOffset,
            Self::SetSelection { .. } => ActionType::SetSelection,
            Self::SetValue { .. } => ActionType::SetValue,
        }
    }
}

/// What is sent to [`HostControl::perform_action`](crate::HostControl::perform_action).
#[derive(Clone, Debug, PartialEq)]
pub struct ActionRequest {
    /// Tree of the target node.
    pub tree_id: TreeId,
    /// Target node.
    pub node_id: NodeId,
    /// Correlation id, or `None` when no reply is expected.
    pub request_id: Option<RequestId>,
    /// The action.
    pub action: Action,
}

/// Result delivered to an action callback.
#[derive(Debug)]
pub enum ActionResult {
    /// The node an event was reported on, for example the node under a hit test.
    Node(Node),
    /// Completion status reported by the host.
    Completed(bool),
    /// Screen bounds of a text range, or `None` when unavailable.
    Bounds(Option<Rect>),
}

/// One-shot reply callback of an action.
pub type ActionCallback = Box<dyn FnOnce(ActionResult)>;

/// Scroll directions understood by [`Node::scroll`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "directions are self-describing")]
pub enum Scroll {
    Backward,
    Forward,
    Up,
    Down,
    Left,
    Right,
}

impl Scroll {
    const fn action_type(self) -> ActionType {
        match self {
            Self::Backward => ActionType::ScrollBackward,
            Self::Forward => ActionType::ScrollForward,
            Self::Up => ActionType::ScrollUp,
            Self::Down => ActionType::ScrollDown,
            Self::Left => ActionType::ScrollLeft,
            Self::Right => ActionType::ScrollRight,
        }
    }
}

impl Node {
    /// Issue `action` on this node, registering `callback` for the reply.
    ///
    /// Detached nodes drop the request.
    pub fn perform_action(
        &self,
        action: Action,
        callback: Option<ActionCallback>,
    ) -> Result<(), AutomationError> {
        let Some(tree) = self.tree() else {
            return Ok(());
        };
        let Some(node_id) = self.id() else {
            return Ok(());
        };
        if !tree.config().interact_permitted {
            return Err(AutomationError::InteractNotPermitted {
                action: action.action_type(),
            });
        }
        let request_id = callback.map(|cb| tree.register_pending(action.clone(), cb));
        trace!(
            tree = %tree.id(),
            node = node_id.0,
            action = action.action_type().as_str(),
            request = ?request_id,
            "perform action"
        );
        let request = ActionRequest {
            tree_id: tree.id().clone(),
            node_id,
            request_id,
            action,
        };
        tree.bridge().perform_action(&request);
        Ok(())
    }

    /// Like [`Node::perform_action`] with a plain closure for the reply.
    pub fn perform_action_with_reply(
        &self,
        action: Action,
        reply: impl FnOnce(ActionResult) + 'static,
    ) -> Result<(), AutomationError> {
        self.perform_action(action, Some(Box::new(reply)))
    }

    fn perform_simple(&self, action_type: ActionType) -> Result<(), AutomationError> {
        self.perform_action(Action::simple(action_type), None)
    }

    fn is_editable(&self) -> bool {
        self.state().is_some_and(|s| s.contains(State::EDITABLE))
    }

    /// Activate the node.
    pub fn do_default(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::DoDefault)
    }

    /// Move keyboard focus to the node.
    pub fn focus(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::Focus)
    }

    /// Ask the host for the node's image; it arrives in
    /// [`StringAttribute::ImageDataUrl`](crate::StringAttribute::ImageDataUrl).
    pub fn get_image_data(&self, max_width: i32, max_height: i32) -> Result<(), AutomationError> {
        self.perform_action(
            Action::GetImageData {
                max_width,
                max_height,
            },
            None,
        )
    }

    /// Hit test at a screen point; the host fires `event_to_fire` on the hit node.
    pub fn hit_test(&self, point: Point, event_to_fire: EventType) -> Result<(), AutomationError> {
        // A reply is registered even though nobody waits for it, so that
        // results crossing into an embedded application are re-targeted.
        self.hit_test_internal(point, event_to_fire, Box::new(|_| {}))
    }

    /// Hit test at a screen point and receive the hit node.
    pub fn hit_test_with_reply(
        &self,
        point: Point,
        reply: impl FnOnce(Option<Node>) + 'static,
    ) -> Result<(), AutomationError> {
        self.hit_test_internal(
            point,
            EventType::HitTestResult,
            Box::new(move |result| {
                reply(match result {
                    ActionResult::Node(node) => Some(node),
                    _ => None,
                });
            }),
        )
    }

    fn hit_test_internal(
        &self,
        point: Point,
        event_to_fire: EventType,
        callback: ActionCallback,
    ) -> Result<(), AutomationError> {
        let origin = self
            .tree()
            .and_then(|tree| tree.root().location())
            .map_or(Point::ORIGIN, |r| r.origin());
        let local = Point::new((point.x - origin.x).floor(), (point.y - origin.y).floor());
        self.perform_action(
            Action::HitTest {
                point: local,
                event_to_fire,
            },
            Some(callback),
        )
    }

    /// Scroll the node into view.
    pub fn make_visible(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::ScrollToMakeVisible)
    }

    /// Perform one of the node's [custom actions](Node::custom_actions).
    pub fn perform_custom_action(&self, custom_action_id: i32) -> Result<(), AutomationError> {
        self.perform_action(Action::CustomAction { custom_action_id }, None)
    }

    /// Perform a standard action, which must be one the node reports
    /// supporting.
    pub fn perform_standard_action(&self, action: ActionType) -> Result<(), AutomationError> {
        let supported = self.standard_actions();
        if !supported.contains(&action) {
            return Err(AutomationError::UnsupportedAction {
                action,
                node: self.id().unwrap_or(NodeId(0)),
            });
        }
        self.perform_simple(action)
    }

    /// Replace the selected text. Does nothing unless the node is editable.
    pub fn replace_selected_text(&self, value: &str) -> Result<(), AutomationError> {
        if !self.is_editable() {
            return Ok(());
        }
        self.perform_action(
            Action::ReplaceSelectedText {
                value: value.to_owned(),
            },
            None,
        )
    }

    /// Set the value. Does nothing unless the node is editable.
    pub fn set_value(&self, value: &str) -> Result<(), AutomationError> {
        if !self.is_editable() {
            return Ok(());
        }
        self.perform_action(
            Action::SetValue {
                value: value.to_owned(),
            },
            None,
        )
    }

    /// Select `start..end` within this node. Does nothing unless the node is
    /// editable.
    pub fn set_selection(&self, start: i32, end: i32) -> Result<(), AutomationError> {
        if !self.is_editable() {
            return Ok(());
        }
        let Some(id) = self.id() else {
            return Ok(());
        };
        self.perform_action(
            Action::SetSelection {
                anchor_node: id,
                anchor_offset: start,
                focus_node: id,
                focus_offset: end,
            },
            None,
        )
    }

    /// Resume media playback.
    pub fn resume_media(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::ResumeMedia)
    }

    /// Suspend media playback.
    pub fn suspend_media(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::SuspendMedia)
    }

    /// Lower media volume while speech is playing.
    pub fn start_ducking_media(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::StartDuckingMedia)
    }

    /// Restore media volume.
    pub fn stop_ducking_media(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::StopDuckingMedia)
    }

    /// Scroll one page in `direction`.
    pub fn scroll(&self, direction: Scroll) -> Result<(), AutomationError> {
        self.perform_simple(direction.action_type())
    }

    /// Scroll one page in `direction`, then report whether the host scrolled.
    pub fn scroll_with_reply(
        &self,
        direction: Scroll,
        reply: impl FnOnce(bool) + 'static,
    ) -> Result<(), AutomationError> {
        self.perform_action_with_reply(Action::simple(direction.action_type()), move |result| {
            reply(matches!(result, ActionResult::Completed(true)));
        })
    }

    /// Scroll so that `point` is visible.
    pub fn scroll_to_point(&self, point: Point) -> Result<(), AutomationError> {
        self.perform_action(Action::ScrollToPoint { point }, None)
    }

    /// Scroll a grid so that a cell is visible.
    pub fn scroll_to_position_at_row_column(
        &self,
        row: i32,
        column: i32,
    ) -> Result<(), AutomationError> {
        self.perform_action(Action::ScrollToPositionAtRowColumn { row, column }, None)
    }

    /// Set the scroll offset.
    pub fn set_scroll_offset(&self, offset: Vec2) -> Result<(), AutomationError> {
        self.perform_action(Action::SetScrollOffset { offset }, None)
    }

    /// Move accessibility focus to the node.
    pub fn set_accessibility_focus(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::SetAccessibilityFocus)
    }

    /// Make this node the starting point for sequential focus navigation.
    pub fn set_sequential_focus_navigation_starting_point(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::SetSequentialFocusNavigationStartingPoint)
    }

    /// Open the node's context menu.
    pub fn show_context_menu(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::ShowContextMenu)
    }

    /// Long-press the node.
    pub fn long_click(&self) -> Result<(), AutomationError> {
        self.perform_simple(ActionType::LongClick)
    }

    /// Screen bounds of the characters `start..end`, clipped to the viewport.
    ///
    /// Answered synchronously from the host's cached geometry, or through an
    /// asynchronous text-location request when the node
    /// [supports it](Node::supports_text_location). Detached nodes never call
    /// `reply`.
    pub fn bounds_for_range(
        &self,
        start: i32,
        end: i32,
        reply: impl FnOnce(Option<Rect>) + 'static,
    ) -> Result<(), AutomationError> {
        self.bounds_for_range_internal(start, end, true, reply)
    }

    /// Like [`Node::bounds_for_range`], without clipping.
    pub fn unclipped_bounds_for_range(
        &self,
        start: i32,
        end: i32,
        reply: impl FnOnce(Option<Rect>) + 'static,
    ) -> Result<(), AutomationError> {
        self.bounds_for_range_internal(start, end, false, reply)
    }

    fn bounds_for_range_internal(
        &self,
        start: i32,
        end: i32,
        clipped: bool,
        reply: impl FnOnce(Option<Rect>) + 'static,
    ) -> Result<(), AutomationError> {
        if self.is_detached() {
            return Ok(());
        }
        if self.supports_text_location() != Some(true) {
            let bounds = self.with_bridge(|bridge, tree, id| {
                bridge.bounds_for_range(tree, id, start, end, clipped)
            });
            reply(bounds);
            return Ok(());
        }
        self.perform_action_with_reply(
            Action::GetTextLocation {
                start_index: start,
                end_index: end,
            },
            move |result| {
                reply(match result {
                    ActionResult::Bounds(bounds) => bounds,
                    _ => None,
                });
            },
        )
    }
}
