//! Calculation batches: every selected source group of a definition, computed and
//! persisted in one synchronous pass.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::actor::Actor;
use crate::calculator::{CalcSettings, DatasetCalculator, SourceKind};
use crate::config::Config;
use crate::definition::DatasetDefinition;
use crate::error::{DatasetError, ErrorKind, Result};
use crate::extractor::{ContactPointRecalculator, PoseFeatureExtractor};
use crate::graph::{GraphSlot, PlaybackGraph};
use crate::merge::{asset_path, persist_dataset, MergeOutcome};
use crate::store::AssetStore;

/// Which source groups a batch computes. Groups always run clips → blend trees → sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceGroups {
    pub clips: bool,
    pub blend_trees: bool,
    pub sequences: bool,
}

impl SourceGroups {
    pub const ALL: SourceGroups = SourceGroups {
        clips: true,
        blend_trees: true,
        sequences: true,
    };
    pub const CLIPS: SourceGroups = SourceGroups {
        clips: true,
        blend_trees: false,
        sequences: false,
    };
    pub const BLEND_TREES: SourceGroups = SourceGroups {
        clips: false,
        blend_trees: true,
        sequences: false,
    };
    pub const SEQUENCES: SourceGroups = SourceGroups {
        clips: false,
        blend_trees: false,
        sequences: true,
    };
}

impl Default for SourceGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Asks the user for a destination folder. `None` declines the whole batch.
pub trait FolderPicker {
    fn pick_folder(&mut self, start: Option<&Path>) -> Option<PathBuf>;
}

impl<F> FolderPicker for F
where
    F: FnMut(Option<&Path>) -> Option<PathBuf>,
{
    fn pick_folder(&mut self, start: Option<&Path>) -> Option<PathBuf> {
        self(start)
    }
}

/// Host services a batch writes through.
pub struct Collaborators<'a> {
    pub extractor: &'a mut dyn PoseFeatureExtractor,
    pub recalculator: &'a mut dyn ContactPointRecalculator,
    pub store: &'a mut dyn AssetStore,
}

/// A source or dataset the batch could not process.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedItem {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub folder: PathBuf,
    pub created: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
    pub skipped: Vec<SkippedItem>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

struct BatchRun<'r, 'a> {
    calc: DatasetCalculator<'a>,
    recalculator: &'r mut dyn ContactPointRecalculator,
    store: &'r mut dyn AssetStore,
    folder: &'r Path,
    config: &'r Config,
    /// Mask paths that did not resolve; every item is refused while non-empty.
    missing_bones: Vec<String>,
    report: BatchReport,
}

impl BatchRun<'_, '_> {
    fn process(&mut self, source: SourceKind<'_>, graph: &mut dyn PlaybackGraph, actor: &mut Actor) {
        if !source.is_valid() {
            debug!("skipping invalid source '{}'", source.name());
            return;
        }
        if !self.missing_bones.is_empty() {
            let path = self.missing_bones.join(", ");
            self.skip(source.name(), DatasetError::BoneNotFound { path });
            return;
        }
        let datasets = match source.compute(&mut self.calc, actor, graph) {
            Ok(datasets) => datasets,
            Err(err) => {
                self.skip(source.name(), err);
                return;
            }
        };
        for dataset in datasets {
            let name = dataset.name.clone();
            let path = asset_path(self.folder, &name, self.config);
            let outcome = persist_dataset(
                &mut *self.store,
                &path,
                dataset,
                &mut *self.recalculator,
                graph,
                actor,
            );
            match outcome {
                Ok(MergeOutcome::Created) => self.report.created.push(path),
                Ok(MergeOutcome::Updated) => self.report.updated.push(path),
                Err(err) => self.skip(&name, err),
            }
        }
    }

    fn skip(&mut self, name: &str, err: DatasetError) {
        warn!("skipping '{name}': {err}");
        self.report.skipped.push(SkippedItem {
            name: name.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        });
    }
}

/// Compute and persist every source in the selected groups.
///
/// Nothing is written unless `picker` returns a folder; declining yields
/// [`DatasetError::UserCancelled`]. Any live graph in `slot` is released first and a
/// fresh calculation graph is acquired; it is released again when the batch ends.
/// Per-item failures are collected in the report and never abort the batch. While a
/// bone mask path does not resolve, every source is reported as
/// [`DatasetError::BoneNotFound`] and nothing is persisted for it.
pub fn run_batch<G: PlaybackGraph + Default>(
    definition: &mut DatasetDefinition,
    actor: &mut Actor,
    slot: &mut GraphSlot<G>,
    groups: SourceGroups,
    picker: &mut dyn FolderPicker,
    collaborators: Collaborators<'_>,
    config: &Config,
) -> Result<BatchReport> {
    slot.release();
    definition.sort_trajectory_offsets();
    definition.validate()?;

    let folder = picker
        .pick_folder(definition.save_data_path.as_deref())
        .filter(|f| !f.as_os_str().is_empty())
        .ok_or(DatasetError::UserCancelled)?;
    definition.save_data_path = Some(folder.clone());

    let saved_pose = actor.root;
    let graph = slot.acquire(actor)?;

    let resolution = definition.bone_mask.resolve_lenient(actor);
    let Collaborators {
        extractor,
        recalculator,
        store,
    } = collaborators;
    let definition: &DatasetDefinition = definition;
    let settings = CalcSettings::from_definition(definition, &resolution.bones, config);
    let mut run = BatchRun {
        calc: DatasetCalculator::new(extractor, settings),
        recalculator,
        store,
        folder: &folder,
        config,
        missing_bones: resolution.missing,
        report: BatchReport {
            folder: folder.clone(),
            ..Default::default()
        },
    };

    if groups.clips {
        for (idx, entry) in definition.clips.iter().enumerate() {
            match entry {
                Some(clip) => run.process(SourceKind::Clip(clip), graph, actor),
                None => warn!("clip slot {idx} is empty"),
            }
        }
        graph.clear_mixer_inputs();
        info!("calculation of clips completed");
    }

    if groups.blend_trees {
        for tree in &definition.blend_trees {
            run.process(SourceKind::BlendTree(tree), graph, actor);
        }
        graph.clear_mixer_inputs();
        info!("calculation of blend trees completed");
    }

    if groups.sequences {
        for seq in &definition.sequences {
            run.process(SourceKind::Sequence(seq), graph, actor);
        }
        graph.clear_mixer_inputs();
        info!("calculation of sequences completed");
    }

    let report = run.report;
    slot.release();
    if config.restore_actor_pose {
        actor.root = saved_pose;
    }
    info!(
        "batch into {}: {} created, {} updated, {} skipped",
        report.folder.display(),
        report.created.len(),
        report.updated.len(),
        report.skipped.len()
    );
    Ok(report)
}
