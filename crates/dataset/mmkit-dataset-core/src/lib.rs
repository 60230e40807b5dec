//! mmkit dataset core (engine-agnostic)
//!
//! Turns authored animation sources (clips, blend trees, stitched sequences) into
//! motion-matching datasets, persists them with a create-or-merge policy, and drives
//! an interactive preview of the same sources.
//!
//! Feature extraction, contact-point timing and skeletal playback are host capabilities
//! and enter the crate through the traits in [`extractor`] and [`graph`].

pub mod actor;
pub mod batch;
pub mod bone_mask;
pub mod calculator;
pub mod config;
pub mod data;
pub mod definition;
pub mod error;
pub mod exclusion;
pub mod extractor;
pub mod graph;
pub mod ids;
pub mod merge;
pub mod preview;
pub mod session;
pub mod source;
pub mod store;

// Re-exports for hosts
pub use actor::{Actor, Bone, RootPose};
pub use batch::{run_batch, BatchReport, Collaborators, FolderPicker, SkippedItem, SourceGroups};
pub use bone_mask::{BoneMask, MaskEntry, MaskResolution};
pub use calculator::{blend_space_factors, CalcSettings, DatasetCalculator, SourceKind};
pub use config::Config;
pub use data::{ContactPoint, ExclusionInterval, FeatureRecord, MotionMatchingDataset};
pub use definition::DatasetDefinition;
pub use error::{DatasetError, ErrorKind, Result};
pub use exclusion::{stitch_intervals, trim_intervals, StitchSegment};
pub use extractor::{ContactPointRecalculator, ExtractRequest, PoseFeatureExtractor, SourceRef};
pub use graph::{GraphSlot, MixerGraph, PlaybackGraph};
pub use ids::{AssetId, BoneId};
pub use merge::{asset_path, persist_dataset, MergeOutcome};
pub use preview::{Clock, ManualClock, PreviewSession, PreviewState, PreviewTarget, SystemClock};
pub use session::EditorSession;
pub use source::{normalized_weights, AnimationClip, AnimationsSequence, BlendTreeInfo, SequenceEntry};
pub use store::{AssetStore, FsAssetStore, MemoryAssetStore, StoredRecord};
