//! Stacking layers - the cascading z-index lookup.
//!
//! Semantic layer names resolve to numeric stacking values: a theme
//! override wins, then the fixed default scale, then 0 for unknown
//! names. The default scale's relative ordering is a contract
//! (`hide < base < ... < tooltip < dev`); custom overrides may break it
//! at the caller's own risk.

use super::Theme;

// =============================================================================
// Default Scale
// =============================================================================

/// The fixed default stacking scale, lowest layer first.
pub const DEFAULT_LAYERS: [(&str, i32); 12] = [
    ("hide", -1),
    ("base", 0),
    ("content", 1),
    ("dropdown", 10),
    ("sticky", 20),
    ("fixed", 30),
    ("overlay", 40),
    ("modal", 50),
    ("popover", 60),
    ("toast", 70),
    ("tooltip", 80),
    ("dev", 90),
];

/// Advisory lower bound for sane stacking values.
pub const MIN_Z_INDEX: i32 = -999;

/// Advisory upper bound for sane stacking values.
pub const MAX_Z_INDEX: i32 = 9999;

/// Look up a layer in the default scale.
pub fn default_z_index(layer: &str) -> Option<i32> {
    DEFAULT_LAYERS
        .iter()
        .find(|(name, _)| *name == layer)
        .map(|(_, value)| *value)
}

/// Names of the default layers, lowest first.
pub fn layer_names() -> impl Iterator<Item = &'static str> {
    DEFAULT_LAYERS.iter().map(|(name, _)| *name)
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve a layer name to its effective stacking value.
///
/// Lookup order: theme override, default scale, 0.
pub fn z_index(theme: Option<&Theme>, layer: &str) -> i32 {
    if let Some(theme) = theme {
        if let Some(value) = theme.z_indices.get(layer) {
            return *value;
        }
    }
    default_z_index(layer).unwrap_or(0)
}

/// Resolve a layer name and offset the result.
///
/// Useful for stacking several surfaces within one semantic layer
/// (e.g. `modal + 1` for a modal's own tooltip). Out-of-range results
/// are logged but still returned; the range check is advisory.
pub fn z_index_relative(theme: Option<&Theme>, base_layer: &str, offset: i32) -> i32 {
    let value = z_index(theme, base_layer) + offset;
    if !is_valid_z_index(value) {
        tracing::warn!(layer = base_layer, offset, value, "z-index outside sane range");
    }
    value
}

/// Check a stacking value against the advisory sane range.
///
/// Values outside `[-999, 9999]` usually indicate a runaway stacking
/// context. Callers may ignore this; nothing is enforced at write time.
pub fn is_valid_z_index(value: i32) -> bool {
    (MIN_Z_INDEX..=MAX_Z_INDEX).contains(&value)
}

// =============================================================================
// Tests
// =============================================================================
