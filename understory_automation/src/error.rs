// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced to callers.
//!
//! Only programmer errors are reported this way. Stale nodes and trees answer
//! `None` or empty results instead, and malformed host payloads are logged.

use thiserror::Error;

use crate::action::ActionType;
use crate::ids::NodeId;

/// Error returned by operations that cannot proceed as asked.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AutomationError {
    /// The session was configured without permission to interact.
    #[error("{action} requires interaction to be permitted")]
    InteractNotPermitted {
        /// Action that was refused.
        action: ActionType,
    },
    /// The node does not list the action among its standard actions.
    #[error("inapplicable action for node {node}: {action}")]
    UnsupportedAction {
        /// Action that was refused.
        action: ActionType,
        /// Node it was issued on.
        node: NodeId,
    },
    /// Document selection endpoints live in different trees.
    #[error("selection anchor and focus must be in the same tree")]
    SelectionAcrossTrees,
    /// Document selection was requested on the desktop tree.
    #[error("use Node::set_selection to set the selection in the desktop tree")]
    DesktopSelection,
}
