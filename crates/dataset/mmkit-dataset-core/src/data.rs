//! Motion-matching dataset model (the persisted output).

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// One sampled pose. The value layout is defined by the feature extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Sample time on the dataset timeline.
    pub time: f32,
    pub values: Vec<f32>,
}

/// Time range on the dataset timeline where pose search must not land.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExclusionInterval {
    pub start: f32,
    pub end: f32,
}

impl ExclusionInterval {
    /// Build an interval with both bounds clamped into `[0, length]`.
    pub fn clamped(start: f32, end: f32, length: f32) -> Self {
        let length = length.max(0.0);
        Self {
            start: start.clamp(0.0, length),
            end: end.clamp(0.0, length),
        }
    }

    #[inline]
    pub fn contains(&self, time: f32) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Named marker on the dataset timeline (e.g. a foot plant).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub name: String,
    pub time: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionMatchingDataset {
    /// Storage identity; kept across merges.
    pub id: AssetId,
    pub name: String,
    /// Timeline length in seconds.
    pub length: f32,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub sample_rate: f32,
    /// Raw source weights (blend trees only), as authored.
    #[serde(default)]
    pub clip_weights: Vec<f32>,
    #[serde(default)]
    pub features: Vec<FeatureRecord>,
    #[serde(default)]
    pub exclusion_intervals: Vec<ExclusionInterval>,
    #[serde(default)]
    pub contact_points: Vec<ContactPoint>,
}

impl MotionMatchingDataset {
    pub fn new(name: &str, length: f32) -> Self {
        Self {
            id: AssetId::new(),
            name: name.to_string(),
            length,
            looping: false,
            sample_rate: 0.0,
            clip_weights: Vec::new(),
            features: Vec::new(),
            exclusion_intervals: Vec::new(),
            contact_points: Vec::new(),
        }
    }

    /// Append an exclusion interval clamped to this dataset's length.
    pub fn exclude(&mut self, start: f32, end: f32) {
        self.exclusion_intervals
            .push(ExclusionInterval::clamped(start, end, self.length));
    }

    /// True if pose search may select a frame at `time`.
    pub fn is_searchable_at(&self, time: f32) -> bool {
        !self.exclusion_intervals.iter().any(|i| i.contains(time))
    }

    /// Overwrite every computed field from `other`, keeping this record's identity
    /// and its contact points.
    pub fn update_from_other(&mut self, other: MotionMatchingDataset) {
        let MotionMatchingDataset {
            id: _,
            name,
            length,
            looping,
            sample_rate,
            clip_weights,
            features,
            exclusion_intervals,
            contact_points: _,
        } = other;
        self.name = name;
        self.length = length;
        self.looping = looping;
        self.sample_rate = sample_rate;
        self.clip_weights = clip_weights;
        self.features = features;
        self.exclusion_intervals = exclusion_intervals;
    }

    /// Compare the fields a recalculation produces, ignoring identity and contact points.
    pub fn same_computed_fields(&self, other: &MotionMatchingDataset) -> bool {
        self.name == other.name
            && self.length == other.length
            && self.looping == other.looping
            && self.clip_weights == other.clip_weights
            && self.features == other.features
            && self.exclusion_intervals == other.exclusion_intervals
    }
}
