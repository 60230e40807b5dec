//! Host capabilities consumed by the calculator: pose feature extraction and
//! contact point recalculation.

use hashbrown::HashMap;

use crate::actor::Actor;
use crate::data::{ContactPoint, MotionMatchingDataset};
use crate::error::Result;
use crate::graph::PlaybackGraph;
use crate::ids::BoneId;
use crate::source::{AnimationClip, AnimationsSequence};

/// The source being sampled, with weights already resolved for this dataset.
#[derive(Clone, Copy, Debug)]
pub enum SourceRef<'a> {
    Clip(&'a AnimationClip),
    BlendTree {
        clips: &'a [&'a AnimationClip],
        weights: &'a [f32],
    },
    Sequence(&'a AnimationsSequence),
}

impl SourceRef<'_> {
    /// Length of the timeline the extractor is expected to cover.
    pub fn length(&self) -> f32 {
        match self {
            SourceRef::Clip(clip) => clip.length,
            SourceRef::BlendTree { clips, .. } => {
                clips.iter().map(|c| c.length).fold(0.0, f32::max)
            }
            SourceRef::Sequence(seq) => seq.length(),
        }
    }
}

/// Everything the extractor needs besides the graph and the actor.
#[derive(Clone, Copy, Debug)]
pub struct ExtractRequest<'a> {
    /// Output dataset name.
    pub name: &'a str,
    pub source: SourceRef<'a>,
    pub bones: &'a [BoneId],
    pub bone_weights: &'a HashMap<String, f32>,
    /// Poses sampled per second.
    pub sample_rate: f32,
    /// Trajectory sample offsets, sorted ascending.
    pub trajectory_offsets: &'a [f32],
    pub looping: bool,
    pub blend_to_yourself: bool,
    pub find_in_yourself: bool,
}

/// Samples a prepared playback graph into pose feature records.
///
/// The graph arrives with its mixer topology built for `request.source`. Implementations
/// must be deterministic for identical inputs.
pub trait PoseFeatureExtractor {
    fn extract(
        &mut self,
        request: &ExtractRequest<'_>,
        graph: &mut dyn PlaybackGraph,
        actor: &mut Actor,
    ) -> Result<MotionMatchingDataset>;
}

/// Re-times existing contact points against a freshly computed dataset.
pub trait ContactPointRecalculator {
    fn recalculate(
        &mut self,
        dataset: &MotionMatchingDataset,
        points: &[ContactPoint],
        graph: &mut dyn PlaybackGraph,
        actor: &mut Actor,
    ) -> Result<Vec<ContactPoint>>;
}
