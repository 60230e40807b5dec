//! Dataset calculation per source kind.
//!
//! The calculator owns sequencing only: it builds the mixer topology for a source,
//! hands the prepared graph to the [`PoseFeatureExtractor`], names the result and
//! attaches exclusion intervals. Numeric feature extraction stays with the host.

use hashbrown::HashMap;

use crate::actor::Actor;
use crate::config::Config;
use crate::data::MotionMatchingDataset;
use crate::definition::DatasetDefinition;
use crate::error::{DatasetError, Result};
use crate::exclusion::{stitch_intervals, trim_intervals};
use crate::extractor::{ExtractRequest, PoseFeatureExtractor, SourceRef};
use crate::graph::PlaybackGraph;
use crate::ids::BoneId;
use crate::source::{normalized_weights, AnimationClip, AnimationsSequence, BlendTreeInfo};

/// Definition-level settings shared by every item of a batch.
#[derive(Clone, Debug)]
pub struct CalcSettings<'a> {
    pub bones: &'a [BoneId],
    pub bone_weights: &'a HashMap<String, f32>,
    pub sample_rate: f32,
    /// Always sorted ascending.
    trajectory_offsets: Vec<f32>,
    /// Self-blend / self-search flags for single clips.
    pub blend_to_yourself: bool,
    pub find_in_yourself: bool,
    pub cut_time_from_start: f32,
    pub cut_time_to_end: f32,
    pub stitch_margin: f32,
}

impl<'a> CalcSettings<'a> {
    pub fn from_definition(
        definition: &'a DatasetDefinition,
        bones: &'a [BoneId],
        config: &Config,
    ) -> Self {
        let mut trajectory_offsets = definition.trajectory_step_times.clone();
        trajectory_offsets.sort_by(f32::total_cmp);
        Self {
            bones,
            bone_weights: &definition.bone_weights,
            sample_rate: definition.poses_per_second,
            trajectory_offsets,
            blend_to_yourself: definition.blend_to_yourself,
            find_in_yourself: definition.find_in_yourself,
            cut_time_from_start: definition.cut_time_from_start,
            cut_time_to_end: definition.cut_time_to_end,
            stitch_margin: config.stitch_margin,
        }
    }

    pub fn trajectory_offsets(&self) -> &[f32] {
        &self.trajectory_offsets
    }
}

/// Blend factors `i / (spaces + 1)` for `i = 1..=spaces`.
pub fn blend_space_factors(spaces: u32) -> Vec<f32> {
    let denom = spaces as f32 + 1.0;
    (1..=spaces).map(|i| i as f32 / denom).collect()
}

/// Runs the extractor with the actor pose saved and restored around it, then stamps
/// the derived name and loop flag onto the result.
fn run_extractor(
    extractor: &mut dyn PoseFeatureExtractor,
    request: &ExtractRequest<'_>,
    graph: &mut dyn PlaybackGraph,
    actor: &mut Actor,
) -> Result<MotionMatchingDataset> {
    let pose = actor.root;
    let result = extractor.extract(request, graph, actor);
    actor.root = pose;
    let mut dataset = result?;
    dataset.name = request.name.to_string();
    dataset.looping = request.looping;
    Ok(dataset)
}

pub struct DatasetCalculator<'a> {
    extractor: &'a mut dyn PoseFeatureExtractor,
    settings: CalcSettings<'a>,
}

impl<'a> DatasetCalculator<'a> {
    pub fn new(extractor: &'a mut dyn PoseFeatureExtractor, settings: CalcSettings<'a>) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    pub fn settings(&self) -> &CalcSettings<'a> {
        &self.settings
    }

    /// One dataset for a single clip, with start/end trims excluded.
    pub fn compute_from_clip(
        &mut self,
        clip: &AnimationClip,
        actor: &mut Actor,
        graph: &mut dyn PlaybackGraph,
    ) -> Result<MotionMatchingDataset> {
        let s = &self.settings;
        graph.clear_mixer_inputs();
        graph.add_mixer_input(clip, 1.0);

        let request = ExtractRequest {
            name: &clip.name,
            source: SourceRef::Clip(clip),
            bones: s.bones,
            bone_weights: s.bone_weights,
            sample_rate: s.sample_rate,
            trajectory_offsets: &s.trajectory_offsets,
            looping: clip.looping,
            blend_to_yourself: s.blend_to_yourself,
            find_in_yourself: s.find_in_yourself,
        };
        let mut dataset = run_extractor(&mut *self.extractor, &request, graph, actor)?;

        let trims = trim_intervals(dataset.length, s.cut_time_from_start, s.cut_time_to_end);
        dataset.exclusion_intervals.extend(trims);
        Ok(dataset)
    }

    /// Datasets for a blend tree: one per blend space when spacing two clips,
    /// otherwise a single dataset with the authored weights.
    pub fn compute_from_blend_tree(
        &mut self,
        info: &BlendTreeInfo,
        actor: &mut Actor,
        graph: &mut dyn PlaybackGraph,
    ) -> Result<Vec<MotionMatchingDataset>> {
        if !info.is_valid() {
            return Err(DatasetError::invalid(format!(
                "blend tree '{}' needs two or more clips with one weight each",
                info.name
            )));
        }
        let clips = info.resolved_clips();
        let variants: Vec<(String, Vec<f32>)> = if info.use_spaces && clips.len() == 2 {
            blend_space_factors(info.spaces)
                .into_iter()
                .map(|f| (format!("{}{}", info.name, f), vec![f, 1.0 - f]))
                .collect()
        } else {
            vec![(info.name.clone(), info.clip_weights.clone())]
        };

        let s = &self.settings;
        let mut out = Vec::with_capacity(variants.len());
        for (name, weights) in &variants {
            let mixer_weights = normalized_weights(weights)?;
            graph.clear_mixer_inputs();
            info.create_graph_for(graph, &mixer_weights);

            let request = ExtractRequest {
                name,
                source: SourceRef::BlendTree {
                    clips: &clips,
                    weights,
                },
                bones: s.bones,
                bone_weights: s.bone_weights,
                sample_rate: s.sample_rate,
                trajectory_offsets: &s.trajectory_offsets,
                looping: false,
                blend_to_yourself: info.blend_to_yourself,
                find_in_yourself: info.find_in_yourself,
            };
            let mut dataset = run_extractor(&mut *self.extractor, &request, graph, actor)?;
            dataset.clip_weights = weights.clone();
            out.push(dataset);
        }
        Ok(out)
    }

    /// One dataset over the concatenated sequence timeline, with non-searchable
    /// entries excluded.
    pub fn compute_from_sequence(
        &mut self,
        seq: &AnimationsSequence,
        actor: &mut Actor,
        graph: &mut dyn PlaybackGraph,
    ) -> Result<MotionMatchingDataset> {
        if !seq.is_valid() {
            return Err(DatasetError::invalid(format!(
                "sequence '{}' has no entries or an entry without a clip",
                seq.name
            )));
        }
        let s = &self.settings;
        graph.clear_mixer_inputs();
        seq.bind_to_graph(0.0, graph);

        let request = ExtractRequest {
            name: &seq.name,
            source: SourceRef::Sequence(seq),
            bones: s.bones,
            bone_weights: s.bone_weights,
            sample_rate: s.sample_rate,
            trajectory_offsets: &s.trajectory_offsets,
            looping: true,
            blend_to_yourself: seq.blend_to_yourself,
            find_in_yourself: seq.find_in_yourself,
        };
        let mut dataset = run_extractor(&mut *self.extractor, &request, graph, actor)?;

        for interval in stitch_intervals(&seq.stitch_segments(), s.stitch_margin) {
            dataset.exclude(interval.start, interval.end);
        }
        Ok(dataset)
    }
}

/// The three source kinds behind one `compute` entry point.
#[derive(Clone, Copy, Debug)]
pub enum SourceKind<'a> {
    Clip(&'a AnimationClip),
    BlendTree(&'a BlendTreeInfo),
    Sequence(&'a AnimationsSequence),
}

impl SourceKind<'_> {
    pub fn name(&self) -> &str {
        match self {
            SourceKind::Clip(c) => &c.name,
            SourceKind::BlendTree(b) => &b.name,
            SourceKind::Sequence(s) => &s.name,
        }
    }

    /// Structural validity; invalid blend trees and sequences are skipped by batches.
    pub fn is_valid(&self) -> bool {
        match self {
            SourceKind::Clip(_) => true,
            SourceKind::BlendTree(b) => b.is_valid(),
            SourceKind::Sequence(s) => s.is_valid(),
        }
    }

    pub fn compute(
        &self,
        calc: &mut DatasetCalculator<'_>,
        actor: &mut Actor,
        graph: &mut dyn PlaybackGraph,
    ) -> Result<Vec<MotionMatchingDataset>> {
        match self {
            SourceKind::Clip(c) => calc.compute_from_clip(c, actor, graph).map(|d| vec![d]),
            SourceKind::BlendTree(b) => calc.compute_from_blend_tree(b, actor, graph),
            SourceKind::Sequence(s) => calc.compute_from_sequence(s, actor, graph).map(|d| vec![d]),
        }
    }
}
