//! Create-or-merge persistence of computed datasets.

use std::path::{Path, PathBuf};

use log::debug;

use crate::actor::Actor;
use crate::config::Config;
use crate::data::MotionMatchingDataset;
use crate::error::{DatasetError, Result};
use crate::extractor::ContactPointRecalculator;
use crate::graph::PlaybackGraph;
use crate::store::{AssetStore, StoredRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Updated,
}

/// Destination of a dataset named `name` inside `folder`.
pub fn asset_path(folder: &Path, name: &str, config: &Config) -> PathBuf {
    folder.join(format!("{name}.{}", config.asset_extension))
}

/// Persist `computed` at `path`.
///
/// A new record is created when the path is free. Otherwise the stored dataset takes
/// every computed field from `computed` but keeps its identity; contact points it
/// already had are re-timed against the new timeline, and an empty list stays empty.
pub fn persist_dataset(
    store: &mut dyn AssetStore,
    path: &Path,
    computed: MotionMatchingDataset,
    recalculator: &mut dyn ContactPointRecalculator,
    graph: &mut dyn PlaybackGraph,
    actor: &mut Actor,
) -> Result<MergeOutcome> {
    match store.load(path)? {
        None => {
            store.create(path, StoredRecord::Dataset(computed))?;
            debug!("created dataset at {}", path.display());
            Ok(MergeOutcome::Created)
        }
        Some(StoredRecord::Dataset(mut existing)) => {
            existing.update_from_other(computed);
            if !existing.contact_points.is_empty() {
                let previous = std::mem::take(&mut existing.contact_points);
                existing.contact_points =
                    recalculator.recalculate(&existing, &previous, graph, actor)?;
            }
            store.update(path, StoredRecord::Dataset(existing))?;
            debug!("merged dataset into {}", path.display());
            Ok(MergeOutcome::Updated)
        }
        Some(other) => Err(DatasetError::TypeMismatch {
            path: path.to_path_buf(),
            found: other.type_name().to_string(),
        }),
    }
}
