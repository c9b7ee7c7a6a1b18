// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Correlation of action replies with the requests that caused them.
//!
//! Each tree numbers its requests from 1. A reply is consumed when its result
//! arrives; a second result for the same id finds nothing and is ignored.
//!
//! Hit tests get one extra step. When the host reports a hit on the window
//! that hosts an embedded application's surface, the hit really belongs to
//! the application. The correlator then searches below the outermost
//! enclosing shell surface for the node carrying an application id, without
//! leaving the merged tree the hit was reported in, and re-issues the hit
//! test there with the same reply. That reply runs only once, when the
//! re-issued test answers.

use hashbrown::HashMap;
use kurbo::Rect;
use tracing::{debug, warn};

use crate::action::{Action, ActionCallback, ActionResult};
use crate::ids::RequestId;
use crate::node::Node;
use crate::notification::TextLocationParams;
use crate::tree::Tree;
use crate::values::Role;

pub(crate) struct PendingAction {
    action: Action,
    callback: ActionCallback,
}

/// Replies awaited by one tree.
#[derive(Default)]
pub(crate) struct PendingActions {
    next: u32,
    entries: HashMap<RequestId, PendingAction>,
}

impl PendingActions {
    pub(crate) fn insert(&mut self, action: Action, callback: ActionCallback) -> RequestId {
        self.next = self.next.wrapping_add(1);
        let id = RequestId(self.next);
        self.entries.insert(id, PendingAction { action, callback });
        id
    }

    pub(crate) fn take(&mut self, id: RequestId) -> Option<PendingAction> {
        self.entries.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Tree {
    /// Complete the request `request_id` with `result`.
    ///
    /// Returns `true` when the request was a hit test that got re-targeted
    /// into an embedded application; its reply is then still outstanding.
    pub(crate) fn on_action_result(&self, request_id: RequestId, result: ActionResult) -> bool {
        let Some(pending) = self.inner.pending.borrow_mut().take(request_id) else {
            return false;
        };
        if pending.action.action_type().is_hit_test()
            && let ActionResult::Node(hit) = &result
            && let Some(app) = self.embedded_app_for(hit)
        {
            debug!(
                tree = %self.id(),
                request = request_id.0,
                app_tree = %app.tree_id(),
                "re-targeting hit test into embedded application"
            );
            if let Err(err) = app.perform_action(pending.action, Some(pending.callback)) {
                warn!(error = %err, "could not re-issue hit test");
            }
            return true;
        }
        (pending.callback)(result);
        false
    }

    /// Complete an asynchronous text-location request.
    pub(crate) fn on_text_location_result(&self, params: &TextLocationParams) {
        let Some(pending) = self.inner.pending.borrow_mut().take(params.request_id) else {
            return;
        };
        let bounds = if params.result {
            self.text_location_bounds(params)
        } else {
            None
        };
        (pending.callback)(ActionResult::Bounds(bounds));
    }

    fn text_location_bounds(&self, params: &TextLocationParams) -> Option<Rect> {
        let &[left, top, width, height] = params.geometry.as_slice() else {
            warn!(
                tree = %self.id(),
                node = params.node_id.0,
                len = params.geometry.len(),
                "malformed text location geometry"
            );
            return None;
        };
        let local = Rect::from_origin_size(
            (f64::from(left), f64::from(top)),
            (f64::from(width), f64::from(height)),
        );
        self.bridge()
            .compute_global_bounds(self.id(), params.node_id, local)
    }

    fn embedded_app_for(&self, hit: &Node) -> Option<Node> {
        let config = self.config();
        if hit.role() != Some(Role::Window) {
            return None;
        }
        let surface = &config.embedded_surface_class_prefix;
        if !hit.class_name().is_some_and(|c| c.starts_with(surface.as_str())) {
            return None;
        }

        let shell = &config.embedded_shell_class_prefix;
        let mut start = hit.clone();
        for _ in 0..config.max_ancestor_depth {
            match start.parent() {
                Some(parent)
                    if parent
                        .class_name()
                        .is_some_and(|c| c.starts_with(shell.as_str())) =>
                {
                    start = parent;
                }
                _ => break,
            }
        }

        let boundary = hit.root();
        find_app(&start, boundary.as_ref(), config.max_embedded_search_depth)
    }
}

fn find_app(node: &Node, boundary: Option<&Node>, depth: usize) -> Option<Node> {
    if node.root().as_ref() != boundary {
        return None;
    }
    if node.app_id().is_some_and(|id| !id.is_empty()) {
        return Some(node.clone());
    }
    if depth == 0 {
        return None;
    }
    node.children()
        .iter()
        .find_map(|child| find_app(child, boundary, depth - 1))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kurbo::Point;

    use super::*;
    use crate::action::ActionType;
    use crate::attributes::StringAttribute;
    use crate::ids::{NodeId, TreeId};
    use crate::notification::{EventParams, Notification};
    use crate::session::Session;
    use crate::testing::{FakeBridge, desktop_session};
    use crate::values::EventType;

    fn hits(log: &Rc<RefCell<Vec<Option<Node>>>>) -> impl FnOnce(Option<Node>) + 'static {
        let log = log.clone();
        move |node| log.borrow_mut().push(node)
    }

    #[test]
    fn reply_runs_exactly_once() {
        let (_bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        let node = tree.get(NodeId(4)).unwrap();
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        node.perform_action_with_reply(Action::simple(ActionType::Focus), move |result| {
            assert!(matches!(result, ActionResult::Completed(true)));
            *counter.borrow_mut() += 1;
        })
        .unwrap();
        assert!(!tree.on_action_result(RequestId(1), ActionResult::Completed(true)));
        assert!(!tree.on_action_result(RequestId(1), ActionResult::Completed(true)));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unknown_request_ids_are_ignored() {
        let (_bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        assert!(!tree.on_action_result(RequestId(77), ActionResult::Completed(false)));
    }

    #[test]
    fn replies_may_arrive_out_of_order() {
        let (_bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        let node = tree.get(NodeId(4)).unwrap();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let order = order.clone();
            node.perform_action_with_reply(Action::simple(ActionType::Focus), move |_| {
                order.borrow_mut().push(tag);
            })
            .unwrap();
        }
        tree.on_action_result(RequestId(2), ActionResult::Completed(true));
        tree.on_action_result(RequestId(1), ActionResult::Completed(true));
        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn hit_test_reply_gets_the_event_target() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        tree.root()
            .hit_test_with_reply(Point::new(5.0, 5.0), hits(&log))
            .unwrap();
        let request = bridge.take_actions().remove(0).request_id.unwrap();
        session.handle(Notification::AccessibilityEvent(
            EventParams::new("desktop", NodeId(4), EventType::HitTestResult)
                .with_action_request_id(request),
        ));
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].as_ref().and_then(Node::id), Some(NodeId(4)));
    }

    /// desktop: 1 → 2 (shell) → 3 (surface window) → 4 → 5 ⇒ app:1 (app id)
    fn embedded_fixture() -> (Rc<FakeBridge>, Session) {
        let bridge = Rc::new(FakeBridge::new());
        bridge.add_tree("desktop", 1, Role::Desktop);
        bridge.add_node("desktop", 1, 2, Role::Group);
        bridge.set_string("desktop", 2, StringAttribute::ClassName, "ExoShellSurface-1");
        bridge.add_node("desktop", 2, 3, Role::Window);
        bridge.set_string("desktop", 3, StringAttribute::ClassName, "ExoSurface-7");
        bridge.add_node("desktop", 3, 4, Role::Group);
        bridge.add_node("desktop", 4, 5, Role::Group);
        bridge.add_tree("app", 1, Role::Window);
        bridge.set_string("app", 1, StringAttribute::AppId, "org.example.app");
        bridge.link_child_tree("desktop", 5, "app");
        bridge.set_public_root("app", "desktop", 1);
        bridge.set_enable_result(Some("desktop"));
        let session = Session::new(bridge.clone());
        (bridge, session)
    }

    #[test]
    fn hit_on_embedded_surface_is_reissued_on_the_app() {
        let (bridge, session) = embedded_fixture();
        let desktop = session.desktop().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        desktop
            .root()
            .hit_test_with_reply(Point::new(40.0, 40.0), hits(&log))
            .unwrap();
        let first = bridge.take_actions().remove(0);

        let dispatched = Rc::new(RefCell::new(0));
        let seen = dispatched.clone();
        let on_hit = crate::listener(move |_| {
            *seen.borrow_mut() += 1;
            Ok(())
        });
        desktop
            .root()
            .add_event_listener(EventType::HitTestResult, &on_hit, true);

        session.handle(Notification::AccessibilityEvent(
            EventParams::new("desktop", NodeId(3), EventType::HitTestResult)
                .with_action_request_id(first.request_id.unwrap()),
        ));
        assert!(log.borrow().is_empty());
        assert_eq!(*dispatched.borrow(), 0);

        let reissued = bridge.take_actions();
        assert_eq!(reissued.len(), 1);
        assert_eq!(reissued[0].tree_id, TreeId::new("app"));
        assert_eq!(reissued[0].node_id, NodeId(1));
        assert_eq!(reissued[0].action, first.action);
        let app_request = reissued[0].request_id.unwrap();

        session.handle(Notification::AccessibilityEvent(
            EventParams::new("app", NodeId(1), EventType::HitTestResult)
                .with_action_request_id(app_request),
        ));
        session.handle(Notification::AccessibilityEvent(
            EventParams::new("app", NodeId(1), EventType::HitTestResult)
                .with_action_request_id(app_request),
        ));
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        let hit = log[0].as_ref().unwrap();
        assert_eq!(hit.tree_id(), &TreeId::new("app"));
        assert_eq!(hit.app_id().as_deref(), Some("org.example.app"));
    }

    #[test]
    fn surface_without_app_completes_normally() {
        let (bridge, session) = embedded_fixture();
        bridge.set_string("app", 1, StringAttribute::AppId, "");
        let desktop = session.desktop().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        desktop
            .root()
            .hit_test_with_reply(Point::new(40.0, 40.0), hits(&log))
            .unwrap();
        let request = bridge.take_actions().remove(0).request_id.unwrap();
        session.handle(Notification::AccessibilityEvent(
            EventParams::new("desktop", NodeId(3), EventType::HitTestResult)
                .with_action_request_id(request),
        ));
        assert!(bridge.take_actions().is_empty());
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].as_ref().and_then(Node::id), Some(NodeId(3)));
    }

    #[test]
    fn search_stops_at_the_depth_bound() {
        let bridge = Rc::new(FakeBridge::new());
        bridge.add_tree("desktop", 1, Role::Desktop);
        bridge.add_node("desktop", 1, 3, Role::Window);
        bridge.set_string("desktop", 3, StringAttribute::ClassName, "ExoSurface");
        bridge.add_node("desktop", 3, 4, Role::Group);
        bridge.add_node("desktop", 4, 5, Role::Group);
        bridge.set_string("desktop", 5, StringAttribute::AppId, "deep");
        bridge.set_enable_result(Some("desktop"));
        let session = Session::with_config(
            bridge.clone(),
            crate::SessionConfig::default().with_max_embedded_search_depth(1),
        );
        let desktop = session.desktop().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        desktop
            .root()
            .hit_test_with_reply(Point::ORIGIN, hits(&log))
            .unwrap();
        let request = bridge.take_actions().remove(0).request_id.unwrap();
        assert!(!desktop.on_action_result(
            request,
            ActionResult::Node(desktop.get(NodeId(3)).unwrap())
        ));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn non_hit_test_actions_are_never_retargeted() {
        let (bridge, session) = embedded_fixture();
        let desktop = session.desktop().unwrap();
        let surface = desktop.get(NodeId(3)).unwrap();
        let done = Rc::new(RefCell::new(false));
        let flag = done.clone();
        surface
            .perform_action_with_reply(Action::simple(ActionType::Focus), move |_| {
                *flag.borrow_mut() = true;
            })
            .unwrap();
        let request = bridge.take_actions().remove(0).request_id.unwrap();
        assert!(!desktop.on_action_result(request, ActionResult::Node(surface.clone())));
        assert!(*done.borrow());
    }

    #[test]
    fn text_location_maps_to_screen_bounds() {
        let (bridge, session) = desktop_session();
        let tree = session.desktop().unwrap();
        bridge.set_bool(
            "desktop",
            4,
            crate::attributes::BoolAttribute::SupportsTextLocation,
            true,
        );
        bridge.set_location("desktop", 4, Rect::new(10.0, 20.0, 110.0, 40.0));
        let node = tree.get(NodeId(4)).unwrap();
        let got = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let sink = got.clone();
            node.bounds_for_range(0, 3, move |r| sink.borrow_mut().push(r))
                .unwrap();
        }
        session.handle(Notification::TextLocationResult(TextLocationParams {
            tree_id: TreeId::new("desktop"),
            node_id: NodeId(4),
            request_id: RequestId(1),
            result: true,
            geometry: vec![1, 2, 3, 4],
        }));
        session.handle(Notification::TextLocationResult(TextLocationParams {
            tree_id: TreeId::new("desktop"),
            node_id: NodeId(4),
            request_id: RequestId(2),
            result: true,
            geometry: vec![1, 2, 3],
        }));
        assert_eq!(
            *got.borrow(),
            vec![Some(Rect::new(11.0, 22.0, 14.0, 26.0)), None]
        );
    }
}
