// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Predicate search over descendants.
//!
//! [`FindParams`] is built like a query filter: start from
//! [`FindParams::new`] and chain constraints. A node matches when every
//! constraint holds. Empty params match nothing.
//!
//! ```no_run
//! # use understory_automation::{FindParams, Node, Role, State, StringAttribute};
//! # use regex::Regex;
//! # fn demo(root: &Node) -> Result<(), regex::Error> {
//! let params = FindParams::new()
//!     .role(Role::Button)
//!     .state(State::FOCUSABLE, true)
//!     .attribute_matching(StringAttribute::ClassName, Regex::new("^Toolbar")?);
//! let first = root.find(&params);
//! let all = root.find_all(&params);
//! # let _ = (first, all);
//! # Ok(())
//! # }
//! ```

use regex::Regex;

use crate::attributes::{Attribute, AttributeValue};
use crate::node::Node;
use crate::values::{Role, State};

/// How an attribute value is compared.
#[derive(Clone, Debug)]
pub enum AttributeMatch {
    /// The value must equal this one.
    Equals(AttributeValue),
    /// The value must be a string matching this pattern.
    Pattern(Regex),
}

impl AttributeMatch {
    fn matches(&self, value: Option<&AttributeValue>) -> bool {
        match (self, value) {
            (Self::Equals(expected), Some(actual)) => expected == actual,
            (Self::Pattern(pattern), Some(AttributeValue::String(s))) => pattern.is_match(s),
            _ => false,
        }
    }
}

/// Constraints for [`Node::find`], [`Node::find_all`], and [`Node::matches`].
#[derive(Clone, Debug, Default)]
pub struct FindParams {
    role: Option<Role>,
    state: Vec<(State, bool)>,
    attributes: Vec<(Attribute, AttributeMatch)>,
}

impl FindParams {
    /// Params with no constraints. These match nothing until one is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `role`.
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Require each flag in `flags` to be set (`present`) or clear.
    pub fn state(mut self, flags: State, present: bool) -> Self {
        self.state.push((flags, present));
        self
    }

    /// Require `attr` to equal `value`.
    pub fn attribute(
        mut self,
        attr: impl Into<Attribute>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes
            .push((attr.into(), AttributeMatch::Equals(value.into())));
        self
    }

    /// Require `attr` to be a string matching `pattern`.
    pub fn attribute_matching(mut self, attr: impl Into<Attribute>, pattern: Regex) -> Self {
        self.attributes
            .push((attr.into(), AttributeMatch::Pattern(pattern)));
        self
    }

    /// Whether no constraint was added.
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.state.is_empty() && self.attributes.is_empty()
    }
}

impl Node {
    /// Whether this node satisfies `params`.
    pub fn matches(&self, params: &FindParams) -> bool {
        if params.is_empty() {
            return false;
        }
        if let Some(role) = params.role
            && self.role() != Some(role)
        {
            return false;
        }
        if !params.state.is_empty() {
            let state = self.state().unwrap_or_default();
            for &(flags, present) in &params.state {
                let ok = if present {
                    state.contains(flags)
                } else {
                    !state.intersects(flags)
                };
                if !ok {
                    return false;
                }
            }
        }
        params
            .attributes
            .iter()
            .all(|(attr, expected)| expected.matches(self.attribute(*attr).as_ref()))
    }

    /// First descendant, in pre-order, that satisfies `params`.
    pub fn find(&self, params: &FindParams) -> Option<Self> {
        let mut found = None;
        self.for_descendants(|node| {
            if node.matches(params) {
                found = Some(node.clone());
                return false;
            }
            true
        });
        found
    }

    /// Every descendant, in pre-order, that satisfies `params`.
    pub fn find_all(&self, params: &FindParams) -> Vec<Self> {
        let mut found = Vec::new();
        self.for_descendants(|node| {
            if node.matches(params) {
                found.push(node.clone());
            }
            true
        });
        found
    }

    /// Visit descendants in pre-order until `visit` returns `false`.
    fn for_descendants(&self, mut visit: impl FnMut(&Self) -> bool) {
        let mut stack: Vec<Self> = self.children().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if !visit(&node) {
                return;
            }
            stack.extend(node.children().into_iter().rev());
        }
    }
}
