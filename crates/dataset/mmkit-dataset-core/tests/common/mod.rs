#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mmkit_dataset::{
    Actor, ContactPoint, ContactPointRecalculator, DatasetError, ExtractRequest, FeatureRecord,
    MotionMatchingDataset, PlaybackGraph, PoseFeatureExtractor, Result,
};

/// Steps the prepared graph at the requested sample rate and records the actor root
/// position plus the tracked bone count for every sample.
#[derive(Debug, Default)]
pub struct SteppingExtractor {
    /// `(dataset name, mixer input count)` per call.
    pub calls: Vec<(String, usize)>,
    /// Names of datasets that fail extraction.
    pub fail_on: Vec<String>,
}

impl PoseFeatureExtractor for SteppingExtractor {
    fn extract(
        &mut self,
        request: &ExtractRequest<'_>,
        graph: &mut dyn PlaybackGraph,
        actor: &mut Actor,
    ) -> Result<MotionMatchingDataset> {
        self.calls
            .push((request.name.to_string(), graph.mixer_input_count()));
        if self.fail_on.iter().any(|n| n == request.name) {
            return Err(DatasetError::Extraction {
                name: request.name.to_string(),
                reason: "forced failure".into(),
            });
        }
        let length = request.source.length();
        let dt = 1.0 / request.sample_rate;
        let samples = (length * request.sample_rate).floor() as usize + 1;
        let mut dataset = MotionMatchingDataset::new(request.name, length);
        dataset.sample_rate = request.sample_rate;
        for i in 0..samples {
            let p = actor.root.position;
            dataset.features.push(FeatureRecord {
                time: i as f32 * dt,
                values: vec![p[0], p[1], p[2], request.bones.len() as f32],
            });
            graph.evaluate(actor, dt);
        }
        Ok(dataset)
    }
}

/// Clamps every point into the new dataset length.
#[derive(Debug, Default)]
pub struct ClampingRecalculator {
    pub calls: usize,
}

impl ContactPointRecalculator for ClampingRecalculator {
    fn recalculate(
        &mut self,
        dataset: &MotionMatchingDataset,
        points: &[ContactPoint],
        _graph: &mut dyn PlaybackGraph,
        _actor: &mut Actor,
    ) -> Result<Vec<ContactPoint>> {
        self.calls += 1;
        Ok(points
            .iter()
            .map(|p| ContactPoint {
                name: p.name.clone(),
                time: p.time.min(dataset.length),
            })
            .collect())
    }
}

/// Picker that always answers `folder` and remembers the starting folder it was offered.
pub struct FixedPicker {
    pub folder: Option<PathBuf>,
    pub offered: Vec<Option<PathBuf>>,
}

impl FixedPicker {
    pub fn new(folder: &str) -> Self {
        Self {
            folder: Some(PathBuf::from(folder)),
            offered: Vec::new(),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            folder: None,
            offered: Vec::new(),
        }
    }
}

impl mmkit_dataset::FolderPicker for FixedPicker {
    fn pick_folder(&mut self, start: Option<&Path>) -> Option<PathBuf> {
        self.offered.push(start.map(Path::to_path_buf));
        self.folder.clone()
    }
}

pub fn biped() -> Actor {
    mmkit_test_fixtures::actors::load("biped").expect("biped fixture")
}
