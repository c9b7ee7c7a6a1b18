// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree change observers.

use std::fmt;
use std::rc::Rc;

use crate::event::ListenerResult;
use crate::ids::ObserverId;
use crate::node::Node;
use crate::values::{TreeChangeObserverFilter, TreeChangeType};

/// A structural change reported by the host.
#[derive(Clone, Debug)]
pub struct TreeChange {
    /// Node the change happened on.
    pub target: Node,
    /// What happened.
    pub change_type: TreeChangeType,
}

/// A tree change observer. Identity (the `Rc` allocation) distinguishes
/// observers.
pub type TreeChangeObserver = Rc<dyn Fn(&TreeChange) -> ListenerResult>;

/// Wrap a closure as a [`TreeChangeObserver`].
pub fn observer(f: impl Fn(&TreeChange) -> ListenerResult + 'static) -> TreeChangeObserver {
    Rc::new(f)
}

#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) id: ObserverId,
    pub(crate) filter: TreeChangeObserverFilter,
    pub(crate) observer: TreeChangeObserver,
}

/// Registered observers in registration order.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u32,
    entries: Vec<Registration>,
}

impl ObserverRegistry {
    /// Register `observer`, returning its new id and the id of the
    /// registration it replaced, if any.
    pub(crate) fn add(
        &mut self,
        filter: TreeChangeObserverFilter,
        observer: &TreeChangeObserver,
    ) -> (ObserverId, Option<ObserverId>) {
        let replaced = self.remove(observer);
        self.next_id = self.next_id.wrapping_add(1);
        let id = ObserverId(self.next_id);
        self.entries.push(Registration {
            id,
            filter,
            observer: observer.clone(),
        });
        (id, replaced)
    }

    pub(crate) fn remove(&mut self, observer: &TreeChangeObserver) -> Option<ObserverId> {
        let index = self
            .entries
            .iter()
            .position(|r| Rc::ptr_eq(&r.observer, observer))?;
        Some(self.entries.remove(index).id)
    }

    pub(crate) fn snapshot(&self) -> Vec<Registration> {
        self.entries.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("next_id", &self.next_id)
            .field("registered", &self.entries.len())
            .finish()
    }
}

/// Whether an observer registered with `filter` wants a change on `target`.
pub(crate) fn accepts(filter: TreeChangeObserverFilter, target: &Node) -> bool {
    let non_empty = |s: Option<String>| s.is_some_and(|s| !s.is_empty());
    match filter {
        TreeChangeObserverFilter::NoTreeChanges => false,
        TreeChangeObserverFilter::LiveRegionTreeChanges => {
            non_empty(target.container_live_status()) || non_empty(target.live_status())
        }
        TreeChangeObserverFilter::TextMarkerChanges => target
            .marker_types()
            .is_some_and(|markers| !markers.is_empty()),
        TreeChangeObserverFilter::AllTreeChanges => true,
    }
}
