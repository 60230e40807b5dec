//! User-authored dataset definition and its JSON form.

use std::path::PathBuf;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::bone_mask::BoneMask;
use crate::error::{DatasetError, Result};
use crate::source::{AnimationClip, AnimationsSequence, BlendTreeInfo};

/// Everything a calculation batch reads: sources, bone selection, sampling settings
/// and the last used destination folder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetDefinition {
    /// Single clips; empty slots are skipped at calculation time.
    pub clips: Vec<Option<AnimationClip>>,
    pub blend_trees: Vec<BlendTreeInfo>,
    pub sequences: Vec<AnimationsSequence>,
    pub bone_mask: BoneMask,
    /// Per-bone feature weights keyed by bone path.
    pub bone_weights: HashMap<String, f32>,
    pub poses_per_second: f32,
    /// Trajectory sample offsets in seconds (negative = past).
    pub trajectory_step_times: Vec<f32>,
    pub blend_to_yourself: bool,
    pub find_in_yourself: bool,
    pub cut_time_from_start: f32,
    pub cut_time_to_end: f32,
    pub save_data_path: Option<PathBuf>,
}

impl Default for DatasetDefinition {
    fn default() -> Self {
        Self {
            clips: Vec::new(),
            blend_trees: Vec::new(),
            sequences: Vec::new(),
            bone_mask: BoneMask::default(),
            bone_weights: HashMap::new(),
            poses_per_second: 30.0,
            trajectory_step_times: Vec::new(),
            blend_to_yourself: false,
            find_in_yourself: true,
            cut_time_from_start: 0.0,
            cut_time_to_end: 0.0,
            save_data_path: None,
        }
    }
}

impl DatasetDefinition {
    /// Parse and validate a JSON definition.
    pub fn from_json(s: &str) -> Result<Self> {
        let definition: DatasetDefinition = serde_json::from_str(s)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check definition-wide settings. Individual blend trees and sequences are
    /// validated per item when a batch runs.
    pub fn validate(&self) -> Result<()> {
        if !(self.poses_per_second.is_finite() && self.poses_per_second > 0.0) {
            return Err(DatasetError::invalid(format!(
                "poses_per_second must be positive, got {}",
                self.poses_per_second
            )));
        }
        if self.trajectory_step_times.iter().any(|t| !t.is_finite()) {
            return Err(DatasetError::invalid(
                "trajectory_step_times must be finite",
            ));
        }
        for (name, value) in [
            ("cut_time_from_start", self.cut_time_from_start),
            ("cut_time_to_end", self.cut_time_to_end),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DatasetError::invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        for clip in self.clips.iter().flatten() {
            if !(clip.length.is_finite() && clip.length >= 0.0) {
                return Err(DatasetError::invalid(format!(
                    "clip '{}' has invalid length {}",
                    clip.name, clip.length
                )));
            }
        }
        Ok(())
    }

    /// Sort trajectory offsets ascending in place.
    pub fn sort_trajectory_offsets(&mut self) {
        self.trajectory_step_times.sort_by(f32::total_cmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_fills_defaults() {
        let def = DatasetDefinition::from_json(r#"{ "clips": [ { "name": "Idle", "length": 1.5 }, null ] }"#)
            .unwrap();
        assert_eq!(def.clips.len(), 2);
        assert!(def.clips[1].is_none());
        assert_eq!(def.poses_per_second, 30.0);
        assert!(def.save_data_path.is_none());
    }

    #[test]
    fn rejects_negative_trims() {
        let err = DatasetDefinition::from_json(r#"{ "cut_time_to_end": -0.5 }"#).unwrap_err();
        assert!(err.to_string().contains("cut_time_to_end"));
    }

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(DatasetDefinition::from_json(r#"{ "poses_per_second": 0 }"#).is_err());
    }

    #[test]
    fn sorts_offsets() {
        let mut def = DatasetDefinition {
            trajectory_step_times: vec![1.0, -0.5, 0.25],
            ..Default::default()
        };
        def.sort_trajectory_offsets();
        assert_eq!(def.trajectory_step_times, vec![-0.5, 0.25, 1.0]);
    }

    #[test]
    fn json_round_trip_keeps_mask_order() {
        let json = r#"{
            "bone_mask": [
                { "path": "", "active": true },
                { "path": "Hips/Spine", "active": false },
                { "path": "Hips" }
            ],
            "bone_weights": { "Hips": 2.0 }
        }"#;
        let def = DatasetDefinition::from_json(json).unwrap();
        assert_eq!(def.bone_mask.entries.len(), 3);
        assert!(def.bone_mask.entries[2].active);
        let again = DatasetDefinition::from_json(&def.to_json_pretty().unwrap()).unwrap();
        assert_eq!(again, def);
    }
}
