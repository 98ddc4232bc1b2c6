//! Theme System for blueprint-tui.
//!
//! The interpreter consumes at most one piece of theming: the stacking
//! (z-index) cascade. A host may supply a [`Theme`] with named layer
//! overrides; absent keys fall back to the fixed default scale in
//! [`layers`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod layers;

pub use layers::{
    default_z_index, is_valid_z_index, layer_names, z_index, z_index_relative, DEFAULT_LAYERS,
    MAX_Z_INDEX, MIN_Z_INDEX,
};

// =============================================================================
// Theme
// =============================================================================

/// Optional theme overrides consumed by the interpreter.
///
/// Only the stacking cascade is interpreted here; visual token values
/// (colors, spacing, typography) belong to the component catalogue and
/// stay outside this crate.
///
/// # Example
///
/// ```
/// use blueprint_tui::theme::{Theme, z_index};
///
/// let theme: Theme = serde_json::from_str(r#"{ "zIndices": { "tooltip": 999 } }"#).unwrap();
/// assert_eq!(z_index(Some(&theme), "tooltip"), 999);
/// assert_eq!(z_index(Some(&theme), "modal"), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Theme {
    /// Named stacking-layer overrides. Overrides may violate the default
    /// scale's ordering; that is accepted caller risk, not validated.
    #[serde(default, rename = "zIndices", skip_serializing_if = "BTreeMap::is_empty")]
    pub z_indices: BTreeMap<String, i32>,
}

impl Theme {
    /// Create an empty theme (every lookup falls back to the default scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a stacking-layer override.
    pub fn with_z_index(mut self, layer: impl Into<String>, value: i32) -> Self {
        self.z_indices.insert(layer.into(), value);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_round_trip() {
        let theme = Theme::new().with_z_index("modal", 1200);
        let json = serde_json::to_string(&theme).unwrap();
        assert_eq!(json, r#"{"zIndices":{"modal":1200}}"#);
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, theme);
    }

    #[test]
    fn test_empty_theme_serializes_empty() {
        let json = serde_json::to_string(&Theme::new()).unwrap();
        assert_eq!(json, "{}");
    }
}
