// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event listeners and three-phase dispatch.
//!
//! ## Propagation
//!
//! Dispatching an event on a target computes the target's ancestor chain once,
//! through [`Node::parent`], and walks it with
//! [`understory_propagation`]:
//!
//! 1. Capture, outermost ancestor first: only listeners added with
//!    `capture = true` run.
//! 2. Target: every listener on the target runs.
//! 3. Bubble, nearest ancestor first: only non-capturing listeners run.
//!
//! [`AutomationEvent::stop_propagation`] ends the walk after the current node:
//! the remaining listeners on that node still run, later nodes are skipped.
//!
//! ## Reentrancy
//!
//! A node's listener list is copied before its listeners run, so listeners may
//! add or remove listeners (on any node) while an event is being dispatched.
//! Listener errors are logged and do not interrupt dispatch. Detached nodes on
//! the path are skipped.
//!
//! ## Host notices
//!
//! The host is told when a `(node, event type)` pair gains its first listener
//! and when it loses its last one, so it only generates events somebody
//! listens to.

use std::cell::Cell;
use std::error::Error;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;
use kurbo::Point;
use smallvec::SmallVec;
use tracing::warn;
use understory_propagation::dispatcher;
use understory_propagation::router::Router;
use understory_propagation::types::{Outcome, ParentFn, Phase};

use crate::action::ActionType;
use crate::node::Node;
use crate::values::{EventFrom, EventType};

/// Error a listener or observer may report. It is logged, never propagated.
pub type ListenerError = Box<dyn Error>;

/// Return type of listeners and observers.
pub type ListenerResult = Result<(), ListenerError>;

/// An event listener. Identity (the `Rc` allocation) distinguishes listeners.
pub type EventListener = Rc<dyn Fn(&AutomationEvent) -> ListenerResult>;

/// Wrap a closure as an [`EventListener`].
///
/// ```
/// use understory_automation::{listener, AutomationEvent};
///
/// let on_focus = listener(|event: &AutomationEvent| {
///     let _ = event.event_type();
///     Ok(())
/// });
/// let _second_handle = on_focus.clone();
/// ```
pub fn listener(f: impl Fn(&AutomationEvent) -> ListenerResult + 'static) -> EventListener {
    Rc::new(f)
}

#[derive(Clone)]
pub(crate) struct ListenerEntry {
    callback: EventListener,
    capture: bool,
}

pub(crate) type ListenerMap = HashMap<EventType, Vec<ListenerEntry>>;

/// An event being dispatched.
pub struct AutomationEvent {
    event_type: EventType,
    target: Node,
    event_from: EventFrom,
    event_from_action: Option<ActionType>,
    mouse_location: Option<Point>,
    phase: Cell<Option<Phase>>,
    stopped: Cell<bool>,
}

impl AutomationEvent {
    pub(crate) fn new(
        event_type: EventType,
        target: Node,
        event_from: EventFrom,
        event_from_action: Option<ActionType>,
        mouse_location: Option<Point>,
    ) -> Self {
        Self {
            event_type,
            target,
            event_from,
            event_from_action,
            mouse_location,
            phase: Cell::new(None),
            stopped: Cell::new(false),
        }
    }

    /// Event type.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Node the event was fired on.
    pub fn target(&self) -> &Node {
        &self.target
    }

    /// What caused the event.
    pub fn event_from(&self) -> EventFrom {
        self.event_from
    }

    /// The action that caused the event, when [`EventFrom::Action`].
    pub fn event_from_action(&self) -> Option<ActionType> {
        self.event_from_action
    }

    /// Pointer location for mouse events.
    pub fn mouse_location(&self) -> Option<Point> {
        self.mouse_location
    }

    /// Phase currently being dispatched.
    pub fn phase(&self) -> Option<Phase> {
        self.phase.get()
    }

    /// Stop propagation after the node currently being visited.
    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    /// Whether [`AutomationEvent::stop_propagation`] was called.
    pub fn propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl fmt::Debug for AutomationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationEvent")
            .field("event_type", &self.event_type)
            .field("target", &self.target)
            .field("event_from", &self.event_from)
            .field("event_from_action", &self.event_from_action)
            .field("mouse_location", &self.mouse_location)
            .field("phase", &self.phase.get())
            .field("stopped", &self.stopped.get())
            .finish()
    }
}

impl Node {
    /// Add `callback` for `event_type`.
    ///
    /// Adding a listener that is already registered for `event_type` moves it
    /// (and its `capture` flag) instead of duplicating it.
    pub fn add_event_listener(
        &self,
        event_type: EventType,
        callback: &EventListener,
        capture: bool,
    ) {
        let first = {
            let mut listeners = self.inner.listeners.borrow_mut();
            let list = listeners.entry(event_type).or_default();
            let first = list.is_empty();
            list.retain(|e| !Rc::ptr_eq(&e.callback, callback));
            list.push(ListenerEntry {
                callback: callback.clone(),
                capture,
            });
            first
        };
        if first {
            self.notify_listeners_changed(event_type, true);
        }
    }

    /// Remove `callback` for `event_type`. Unknown listeners are ignored.
    pub fn remove_event_listener(&self, event_type: EventType, callback: &EventListener) {
        let emptied = {
            let mut listeners = self.inner.listeners.borrow_mut();
            let Some(list) = listeners.get_mut(&event_type) else {
                return;
            };
            let before = list.len();
            list.retain(|e| !Rc::ptr_eq(&e.callback, callback));
            let emptied = before > 0 && list.is_empty();
            if list.is_empty() {
                listeners.remove(&event_type);
            }
            emptied
        };
        if emptied {
            self.notify_listeners_changed(event_type, false);
        }
    }

    /// Number of listeners registered for `event_type` on this node.
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.inner
            .listeners
            .borrow()
            .get(&event_type)
            .map_or(0, Vec::len)
    }

    fn notify_listeners_changed(&self, event_type: EventType, added: bool) {
        self.with_bridge(|bridge, tree, id| {
            if added {
                bridge.event_listener_added(tree, id, event_type);
            } else {
                bridge.event_listener_removed(tree, id, event_type);
            }
            Some(())
        });
    }

    /// Dispatch a synthetic event with this node as the target.
    ///
    /// Returns `false` if a listener stopped propagation.
    pub fn dispatch_event(&self, event_type: EventType, event_from: EventFrom) -> bool {
        let event = AutomationEvent::new(event_type, self.clone(), event_from, None, None);
        self.dispatch(&event)
    }

    pub(crate) fn dispatch(&self, event: &AutomationEvent) -> bool {
        let max_depth = self
            .tree()
            .map_or(0, |tree| tree.config().max_ancestor_depth);
        let router =
            Router::with_parent(ParentFn(|node: &Self| node.parent())).with_max_depth(max_depth);
        let seq = router.dispatch_for(self.clone());
        let stopped = dispatcher::run(&seq, &mut (), |step, _| {
            event.phase.set(Some(step.phase));
            step.node.fire_listeners(event, step.phase);
            if event.propagation_stopped() {
                Outcome::Stop
            } else {
                Outcome::Continue
            }
        });
        stopped.is_none()
    }

    fn fire_listeners(&self, event: &AutomationEvent, phase: Phase) {
        if self.is_detached() {
            return;
        }
        let snapshot: SmallVec<[ListenerEntry; 4]> =
            match self.inner.listeners.borrow().get(&event.event_type) {
                Some(list) => list.iter().cloned().collect(),
                None => return,
            };
        for entry in snapshot {
            let wanted = match phase {
                Phase::Capture => entry.capture,
                Phase::Target => true,
                Phase::Bubble => !entry.capture,
            };
            if !wanted {
                continue;
            }
            if let Err(err) = (entry.callback)(event) {
                warn!(
                    event = event.event_type.as_str(),
                    phase = phase.as_str(),
                    error = %err,
                    "error in event listener"
                );
            }
        }
    }
}
