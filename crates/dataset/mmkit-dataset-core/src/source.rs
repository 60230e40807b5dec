//! Authored animation sources: single clips, blend trees and stitched sequences.

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::exclusion::StitchSegment;
use crate::graph::{wrap_time, PlaybackGraph};

/// A named continuous pose source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    /// Duration in seconds.
    pub length: f32,
    #[serde(default)]
    pub looping: bool,
    /// Average root velocity (units per second) the clip applies to its actor.
    #[serde(default)]
    pub root_velocity: [f32; 3],
}

impl AnimationClip {
    pub fn new(name: &str, length: f32) -> Self {
        Self {
            name: name.to_string(),
            length,
            looping: false,
            root_velocity: [0.0; 3],
        }
    }
}

/// Weighted combination of two or more clips.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendTreeInfo {
    pub name: String,
    pub clips: Vec<Option<AnimationClip>>,
    /// Raw authored weights, one per clip. Normalized only at playback.
    pub clip_weights: Vec<f32>,
    /// Emit `spaces` evenly spaced two-clip blends instead of one fixed blend.
    pub use_spaces: bool,
    pub spaces: u32,
    pub blend_to_yourself: bool,
    pub find_in_yourself: bool,
}

impl BlendTreeInfo {
    pub fn is_valid(&self) -> bool {
        self.clips.len() >= 2
            && self.clips.iter().all(Option::is_some)
            && self.clip_weights.len() == self.clips.len()
    }

    /// Present clips in authoring order.
    pub fn resolved_clips(&self) -> Vec<&AnimationClip> {
        self.clips.iter().flatten().collect()
    }

    /// Playable length of the blend: the longest clip.
    pub fn length(&self) -> f32 {
        self.clips
            .iter()
            .flatten()
            .map(|c| c.length)
            .fold(0.0, f32::max)
    }

    /// Connect every clip to the mixer with the given weights.
    pub fn create_graph_for(&self, graph: &mut dyn PlaybackGraph, weights: &[f32]) {
        for (clip, weight) in self.clips.iter().flatten().zip(weights) {
            graph.add_mixer_input(clip, *weight);
        }
    }
}

/// One stitched sub-clip of a sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceEntry {
    pub clip: Option<AnimationClip>,
    /// Selected `[start, end]` range in clip-local seconds.
    pub range: [f32; 2],
    /// Whether pose search may land inside this entry.
    #[serde(default = "default_searchable")]
    pub searchable: bool,
}

fn default_searchable() -> bool {
    true
}

impl SequenceEntry {
    #[inline]
    pub fn duration(&self) -> f32 {
        (self.range[1] - self.range[0]).max(0.0)
    }
}

/// Ordered list of sub-clips played back to back.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationsSequence {
    pub name: String,
    pub entries: Vec<SequenceEntry>,
    pub blend_to_yourself: bool,
    pub find_in_yourself: bool,
    /// Playback cursor on the concatenated timeline.
    #[serde(skip)]
    pub cursor: f32,
}

impl AnimationsSequence {
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|e| e.clip.is_some() && e.range[0] >= 0.0 && e.range[1] >= e.range[0])
    }

    /// Total length of the concatenated timeline.
    pub fn length(&self) -> f32 {
        self.entries.iter().map(SequenceEntry::duration).sum()
    }

    /// Layout consumed by the stitch-interval builder.
    pub fn stitch_segments(&self) -> Vec<StitchSegment> {
        self.entries
            .iter()
            .map(|e| StitchSegment {
                duration: e.duration(),
                searchable: e.searchable,
            })
            .collect()
    }

    /// Entry index and clip-local time at a point on the concatenated timeline.
    pub fn entry_at(&self, time: f32) -> Option<(usize, f32)> {
        let mut start = 0.0;
        let last = self.entries.len().checked_sub(1)?;
        for (idx, entry) in self.entries.iter().enumerate() {
            let end = start + entry.duration();
            if time < end || idx == last {
                let local = (time - start).clamp(0.0, entry.duration());
                return Some((idx, entry.range[0] + local));
            }
            start = end;
        }
        None
    }

    /// Connect one mixer input per entry and activate the entry under `time`.
    /// Does not move the cursor.
    pub fn bind_to_graph(&self, time: f32, graph: &mut dyn PlaybackGraph) {
        for entry in &self.entries {
            if let Some(clip) = &entry.clip {
                graph.add_mixer_input(clip, 0.0);
            }
        }
        self.apply_cursor(time, graph);
    }

    /// Move the cursor to `time` and build the sequence topology on `graph`.
    pub fn create_animations_in_time(&mut self, time: f32, graph: &mut dyn PlaybackGraph) {
        self.cursor = wrap_time(time, self.length());
        self.bind_to_graph(self.cursor, graph);
    }

    /// Advance the cursor by `delta_time` (wrapping) and resync the mixer.
    pub fn update(&mut self, graph: &mut dyn PlaybackGraph, delta_time: f32) {
        self.cursor = wrap_time(self.cursor + delta_time, self.length());
        self.apply_cursor(self.cursor, graph);
    }

    fn apply_cursor(&self, time: f32, graph: &mut dyn PlaybackGraph) {
        if graph.mixer_input_count() != self.entries.len() {
            return;
        }
        let active = self.entry_at(time);
        for idx in 0..self.entries.len() {
            match active {
                Some((a, local)) if a == idx => {
                    graph.set_mixer_input_weight(idx, 1.0);
                    graph.set_mixer_input_time(idx, local);
                }
                _ => graph.set_mixer_input_weight(idx, 0.0),
            }
        }
    }
}

/// Scale weights so they sum to one. A non-positive or non-finite sum is rejected.
pub fn normalized_weights(weights: &[f32]) -> Result<Vec<f32>> {
    let sum: f32 = weights.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return Err(DatasetError::InvalidWeights { sum });
    }
    Ok(weights.iter().map(|w| w / sum).collect())
}
