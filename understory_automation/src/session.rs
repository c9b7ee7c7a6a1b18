// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session: tree registry, lifecycle, and inbound notifications.
//!
//! ## Tree lifecycle
//!
//! Each tree id moves through [`TreeState`]: unknown, then placeholder when the
//! host sends an empty first version, then loaded once the tree has content,
//! then destroyed. A destroyed id is remembered: later notifications about it
//! are ignored until [`Session::get_or_create_tree`] revives it explicitly or
//! the session is [reset](Session::reset).
//!
//! ## Child trees
//!
//! Callbacks waiting for a tree ([`Session::store_tree_callback`]) are queued
//! per tree id and run exactly once, when the tree first reports content.
//! When the host announces a child tree the client has never seen, the session
//! queues a callback that fires `loadComplete` on the new root and
//! `childrenChanged` on the node hosting it, then asks the host to send the
//! tree.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use crate::action::{Action, ActionResult};
use crate::bridge::Bridge;
use crate::config::SessionConfig;
use crate::error::AutomationError;
use crate::ids::{NodeId, NodeRef, ObserverId, TreeId};
use crate::node::Node;
use crate::notification::{EventParams, Notification};
use crate::observer::{ObserverRegistry, TreeChange, TreeChangeObserver, accepts};
use crate::tree::{Tree, TreeState};
use crate::values::{EventFrom, EventType, TreeChangeObserverFilter, TreeChangeType};

/// One-shot callback waiting for a tree to load.
pub type TreeCallback = Box<dyn FnOnce(&Tree)>;

/// Entry point of the automation client.
///
/// A session owns every [`Tree`] it has heard of. Trees hold only a weak
/// link back, so dropping the last `Session` clone detaches every node.
///
/// ```
/// # use std::rc::Rc;
/// # use understory_automation::{Bridge, Session};
/// # fn demo(bridge: Rc<dyn Bridge>) {
/// let session = Session::new(bridge);
/// if let Some(desktop) = session.desktop() {
///     for child in desktop.root().children() {
///         println!("{}", child.describe());
///     }
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Rc<SessionInner>,
}

pub(crate) struct SessionInner {
    bridge: Rc<dyn Bridge>,
    config: Rc<SessionConfig>,
    trees: RefCell<HashMap<TreeId, Tree>>,
    destroyed: RefCell<HashSet<TreeId>>,
    tree_callbacks: RefCell<HashMap<TreeId, Vec<TreeCallback>>>,
    observers: RefCell<ObserverRegistry>,
    desktop_id: RefCell<Option<TreeId>>,
}

impl Session {
    /// Create a session with the default configuration.
    pub fn new(bridge: Rc<dyn Bridge>) -> Self {
        Self::with_config(bridge, SessionConfig::default())
    }

    /// Create a session with `config`.
    pub fn with_config(bridge: Rc<dyn Bridge>, config: SessionConfig) -> Self {
        Self {
            inner: Rc::new(SessionInner {
                bridge,
                config: Rc::new(config),
                trees: RefCell::new(HashMap::new()),
                destroyed: RefCell::new(HashSet::new()),
                tree_callbacks: RefCell::new(HashMap::new()),
                observers: RefCell::new(ObserverRegistry::default()),
                desktop_id: RefCell::new(None),
            }),
        }
    }

    /// The configuration shared by every tree.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The desktop tree, enabling automation on first use.
    pub fn desktop(&self) -> Option<Tree> {
        let known = self.inner.desktop_id.borrow().clone();
        if let Some(id) = known
            && let Some(tree) = self.get_tree(&id)
        {
            return Some(tree);
        }
        let id = self.inner.bridge.enable()?;
        debug!(tree = %id, "desktop enabled");
        *self.inner.desktop_id.borrow_mut() = Some(id.clone());
        let tree = self.get_or_create_tree(&id);
        if tree.root_id().is_some() {
            self.mark_loaded(&tree);
        }
        Some(tree)
    }

    /// Id of the desktop tree, once [`Session::desktop`] succeeded.
    pub fn desktop_id(&self) -> Option<TreeId> {
        self.inner.desktop_id.borrow().clone()
    }

    /// The node with keyboard focus.
    pub fn focused_node(&self) -> Option<Node> {
        let focus = self.inner.bridge.focus()?;
        self.resolve(&focus)
    }

    /// The node with accessibility focus.
    pub fn accessibility_focused_node(&self) -> Option<Node> {
        let focus = self.inner.bridge.accessibility_focus()?;
        self.resolve(&focus)
    }

    /// The tree for `id`, created if needed.
    ///
    /// Creating a tree whose id was destroyed revives the id.
    pub fn get_or_create_tree(&self, id: &TreeId) -> Tree {
        if let Some(tree) = self.get_tree(id) {
            return tree;
        }
        self.inner.destroyed.borrow_mut().remove(id);
        debug!(tree = %id, "creating tree");
        let tree = Tree::new(
            id.clone(),
            self.inner.bridge.clone(),
            Rc::downgrade(&self.inner),
            self.inner.config.clone(),
        );
        self.inner.trees.borrow_mut().insert(id.clone(), tree.clone());
        tree
    }

    /// The tree for `id`, if it exists.
    pub fn get_tree(&self, id: &TreeId) -> Option<Tree> {
        self.inner.trees.borrow().get(id).cloned()
    }

    /// Node `node_id` of tree `tree_id`, creating the tree if needed.
    ///
    /// `None` for destroyed trees and for ids that do not denote a node.
    pub fn node_from_tree(&self, tree_id: &TreeId, node_id: NodeId) -> Option<Node> {
        if self.is_destroyed(tree_id) {
            return None;
        }
        self.get_or_create_tree(tree_id).get(node_id)
    }

    /// Resolve a node address.
    pub fn resolve(&self, node: &NodeRef) -> Option<Node> {
        self.node_from_tree(&node.tree_id, node.node_id)
    }

    /// Destroy the tree for `id`, if it exists.
    pub fn destroy_tree(&self, id: &TreeId) {
        if let Some(tree) = self.get_tree(id) {
            tree.destroy();
        }
    }

    pub(crate) fn forget_tree(&self, id: &TreeId) {
        self.inner.trees.borrow_mut().remove(id);
        self.inner.destroyed.borrow_mut().insert(id.clone());
        let dropped = self.inner.tree_callbacks.borrow_mut().remove(id);
        drop(dropped);
    }

    fn is_destroyed(&self, id: &TreeId) -> bool {
        self.inner.destroyed.borrow().contains(id)
    }

    /// Lifecycle state of `id`.
    pub fn tree_state(&self, id: &TreeId) -> TreeState {
        if let Some(tree) = self.get_tree(id) {
            tree.state()
        } else if self.is_destroyed(id) {
            TreeState::Destroyed
        } else {
            TreeState::Unknown
        }
    }

    /// Run `callback` once the tree `id` has loaded; immediately if it
    /// already has.
    pub fn store_tree_callback(&self, id: &TreeId, callback: TreeCallback) {
        if let Some(tree) = self.get_tree(id)
            && tree.state() == TreeState::Loaded
        {
            callback(&tree);
            return;
        }
        if self.is_destroyed(id) {
            trace!(tree = %id, "dropping callback for destroyed tree");
            return;
        }
        self.inner
            .tree_callbacks
            .borrow_mut()
            .entry(id.clone())
            .or_default()
            .push(callback);
    }

    /// Whether callbacks are waiting for the tree `id` to load.
    pub(crate) fn has_tree_callbacks(&self, id: &TreeId) -> bool {
        self.inner.tree_callbacks.borrow().contains_key(id)
    }

    fn mark_loaded(&self, tree: &Tree) {
        tree.set_state(TreeState::Loaded);
        let waiting = self.inner.tree_callbacks.borrow_mut().remove(tree.id());
        for callback in waiting.into_iter().flatten() {
            callback(tree);
        }
    }

    /// Register a tree change observer.
    ///
    /// Registering an observer again replaces its earlier registration.
    pub fn add_tree_change_observer(
        &self,
        filter: TreeChangeObserverFilter,
        observer: &TreeChangeObserver,
    ) -> ObserverId {
        let (id, replaced) = self.inner.observers.borrow_mut().add(filter, observer);
        if let Some(old) = replaced {
            self.inner.bridge.remove_tree_change_observer(old);
        }
        self.inner.bridge.add_tree_change_observer(id, filter);
        id
    }

    /// Remove a tree change observer. Returns whether it was registered.
    pub fn remove_tree_change_observer(&self, observer: &TreeChangeObserver) -> bool {
        let removed = self.inner.observers.borrow_mut().remove(observer);
        match removed {
            Some(id) => {
                self.inner.bridge.remove_tree_change_observer(id);
                true
            }
            None => false,
        }
    }

    /// Select from `anchor` to `focus` in a document tree.
    ///
    /// Both endpoints must be in the same tree, and that tree must not be the
    /// desktop; use [`Node::set_selection`] there.
    pub fn set_document_selection(
        &self,
        anchor: &Node,
        anchor_offset: i32,
        focus: &Node,
        focus_offset: i32,
    ) -> Result<(), AutomationError> {
        if anchor.tree_id() != focus.tree_id() {
            return Err(AutomationError::SelectionAcrossTrees);
        }
        if self.inner.desktop_id.borrow().as_ref() == Some(anchor.tree_id()) {
            return Err(AutomationError::DesktopSelection);
        }
        let (Some(anchor_node), Some(focus_node)) = (anchor.id(), focus.id()) else {
            return Ok(());
        };
        anchor.perform_action(
            Action::SetSelection {
                anchor_node,
                anchor_offset,
                focus_node,
                focus_offset,
            },
            None,
        )
    }

    /// Forget every tree and pending tree callback.
    ///
    /// Trees are destroyed locally; the host is not told. Observers stay
    /// registered.
    pub fn reset(&self) {
        debug!("resetting session");
        let trees: Vec<Tree> = self
            .inner
            .trees
            .borrow_mut()
            .drain()
            .map(|(_, tree)| tree)
            .collect();
        for tree in &trees {
            tree.destroy();
        }
        self.inner.destroyed.borrow_mut().clear();
        let dropped = core::mem::take(&mut *self.inner.tree_callbacks.borrow_mut());
        drop(dropped);
        *self.inner.desktop_id.borrow_mut() = None;
    }

    /// Stop automation on the host and [reset](Session::reset).
    pub fn disable(&self) {
        self.inner.bridge.disable();
        self.reset();
    }

    /// Number of live trees.
    pub fn tree_count(&self) -> usize {
        self.inner.trees.borrow().len()
    }

    /// Deliver a notification from the host.
    pub fn handle(&self, notification: Notification) {
        if let Some(id) = notification.tree_id()
            && self.is_destroyed(id)
            && !matches!(notification, Notification::TreeDestroyed { .. })
        {
            trace!(tree = %id, "ignoring notification for destroyed tree");
            return;
        }
        match notification {
            Notification::AccessibilityEvent(params) => self.on_accessibility_event(&params),
            Notification::TreeChange {
                tree_id,
                node_id,
                change_type,
            } => self.on_tree_change(&tree_id, node_id, change_type),
            Notification::NodesRemoved { tree_id, node_ids } => {
                if let Some(tree) = self.get_tree(&tree_id) {
                    for id in node_ids {
                        tree.remove(id);
                    }
                }
            }
            Notification::ChildTreeId { tree_id } => self.on_child_tree_id(&tree_id),
            Notification::TreeDestroyed { tree_id } => {
                match self.get_tree(&tree_id) {
                    Some(tree) => tree.destroy(),
                    None => warn!(tree = %tree_id, "no tree to destroy"),
                }
                self.inner.bridge.destroy_tree(&tree_id);
            }
            Notification::SerializationError { tree_id } => {
                debug!(tree = %tree_id, "re-requesting tree after serialization error");
                self.inner.bridge.enable_child_tree(&tree_id);
            }
            Notification::ActionResult {
                tree_id,
                request_id,
                result,
            } => {
                if let Some(tree) = self.get_tree(&tree_id) {
                    tree.on_action_result(request_id, ActionResult::Completed(result));
                }
            }
            Notification::TextLocationResult(params) => {
                if let Some(tree) = self.get_tree(&params.tree_id) {
                    tree.on_text_location_result(&params);
                }
            }
            Notification::AllListenersRemoved => {
                if self.inner.desktop_id.borrow().is_some() {
                    self.reset();
                }
            }
        }
    }

    fn on_accessibility_event(&self, params: &EventParams) {
        let tree = self.get_or_create_tree(&params.tree_id);
        tree.on_accessibility_event(params);
        if tree.is_destroyed() {
            return;
        }
        let is_desktop = self.inner.desktop_id.borrow().as_ref() == Some(tree.id());
        let is_placeholder = !is_desktop
            && tree.doc_url().is_none_or(|url| url.is_empty())
            && tree.root().children().is_empty();
        if is_placeholder {
            if tree.state() != TreeState::Loaded {
                tree.set_state(TreeState::Placeholder);
            }
            return;
        }
        self.mark_loaded(&tree);
    }

    fn on_tree_change(&self, tree_id: &TreeId, node_id: NodeId, change_type: TreeChangeType) {
        let tree = self.get_or_create_tree(tree_id);
        let Some(target) = tree.get(node_id) else {
            return;
        };
        let change = TreeChange {
            target,
            change_type,
        };
        let registrations = self.inner.observers.borrow().snapshot();
        for registration in registrations {
            if !accepts(registration.filter, &change.target) {
                continue;
            }
            if let Err(err) = (registration.observer)(&change) {
                warn!(
                    observer = registration.id.0,
                    error = %err,
                    "error in tree change observer"
                );
            }
        }
    }

    fn on_child_tree_id(&self, tree_id: &TreeId) {
        if self.get_tree(tree_id).is_some() || self.has_tree_callbacks(tree_id) {
            return;
        }
        self.store_tree_callback(
            tree_id,
            Box::new(|tree: &Tree| {
                let root = tree.root();
                root.dispatch_event(EventType::LoadComplete, EventFrom::Page);
                if let Some(host) = root.parent() {
                    host.dispatch_event(EventType::ChildrenChanged, EventFrom::Page);
                }
            }),
        );
        self.inner.bridge.enable_child_tree(tree_id);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.inner.config)
            .field("trees", &self.inner.trees.borrow().len())
            .field("destroyed", &self.inner.destroyed.borrow().len())
            .field("observers", &*self.inner.observers.borrow())
            .field("desktop_id", &*self.inner.desktop_id.borrow())
            .finish_non_exhaustive()
    }
}
