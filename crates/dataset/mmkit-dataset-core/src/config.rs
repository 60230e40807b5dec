//! Core configuration for mmkit-dataset-core.

use serde::{Deserialize, Serialize};

/// Tunables shared by calculation and persistence.
/// Keep this minimal; per-dataset settings live on the definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Margin trimmed from a non-searchable sequence entry where it abuts a searchable one.
    pub stitch_margin: f32,
    /// File extension of persisted dataset records (without the dot).
    pub asset_extension: String,
    /// Put the actor back where it stood once a calculation batch ends.
    pub restore_actor_pose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stitch_margin: 0.1,
            asset_extension: "asset".to_string(),
            restore_actor_pose: true,
        }
    }
}
