// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

use understory_propagation::router::DEFAULT_MAX_DEPTH;

/// Knobs shared by every tree of a [`Session`](crate::Session).
///
/// ```
/// use understory_automation::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_interact_permitted(false)
///     .with_max_embedded_search_depth(8);
/// assert!(!config.interact_permitted);
/// assert_eq!(config.embedded_surface_class_prefix, "ExoSurface");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Whether actions may be performed at all.
    pub interact_permitted: bool,
    /// Class name prefix of a window that hosts an embedded application's
    /// surface. Hit tests landing on such a window are re-targeted.
    pub embedded_surface_class_prefix: String,
    /// Class name prefix of the shell wrapping an embedded surface.
    pub embedded_shell_class_prefix: String,
    /// Depth bound of the search for an embedded application node below a
    /// re-targeted hit test result.
    pub max_embedded_search_depth: usize,
    /// Bound on ancestor walks, including event propagation paths.
    pub max_ancestor_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interact_permitted: true,
            embedded_surface_class_prefix: "ExoSurface".to_owned(),
            embedded_shell_class_prefix: "ExoShellSurface".to_owned(),
            max_embedded_search_depth: 32,
            max_ancestor_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SessionConfig {
    /// Set whether actions may be performed.
    pub fn with_interact_permitted(mut self, permitted: bool) -> Self {
        self.interact_permitted = permitted;
        self
    }

    /// Set the embedded surface class name prefix.
    pub fn with_embedded_surface_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.embedded_surface_class_prefix = prefix.into();
        self
    }

    /// Set the embedded shell class name prefix.
    pub fn with_embedded_shell_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.embedded_shell_class_prefix = prefix.into();
        self
    }

    /// Set the embedded application search depth.
    pub fn with_max_embedded_search_depth(mut self, depth: usize) -> Self {
        self.max_embedded_search_depth = depth;
        self
    }

    /// Set the ancestor walk bound.
    pub fn with_max_ancestor_depth(mut self, depth: usize) -> Self {
        self.max_ancestor_depth = depth;
        self
    }
}
