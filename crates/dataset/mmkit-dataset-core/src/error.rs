//! Error types for dataset calculation, persistence and preview.

use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Coarse classification of a [`DatasetError`], stable for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UserCancelled,
    BoneNotFound,
    TypeMismatch,
    InvalidWeights,
    InvalidDefinition,
    Graph,
    Extraction,
    Store,
    Serialization,
    Io,
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum DatasetError {
    /// The destination folder selection was declined; nothing was written.
    #[error("calculation cancelled: no destination folder selected")]
    UserCancelled,

    /// A bone mask path did not resolve against the actor skeleton.
    #[error("bone not found: '{path}'")]
    BoneNotFound { path: String },

    /// The record stored at the destination is not a motion-matching dataset.
    #[error("record at {path} is a {found}, expected a motion-matching dataset")]
    TypeMismatch { path: PathBuf, found: String },

    /// Blend weights cannot be normalized.
    #[error("invalid blend weights: sum is {sum}")]
    InvalidWeights { sum: f32 },

    /// A definition, source or actor fails structural validation.
    #[error("invalid definition: {reason}")]
    InvalidDefinition { reason: String },

    /// The playback graph could not be initialized or driven.
    #[error("playback graph error: {reason}")]
    Graph { reason: String },

    /// The pose feature extractor or contact point recalculator failed.
    #[error("feature extraction failed for '{name}': {reason}")]
    Extraction { name: String, reason: String },

    /// The asset store rejected an operation.
    #[error("asset store error at {path}: {reason}")]
    Store { path: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatasetError::UserCancelled => ErrorKind::UserCancelled,
            DatasetError::BoneNotFound { .. } => ErrorKind::BoneNotFound,
            DatasetError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            DatasetError::InvalidWeights { .. } => ErrorKind::InvalidWeights,
            DatasetError::InvalidDefinition { .. } => ErrorKind::InvalidDefinition,
            DatasetError::Graph { .. } => ErrorKind::Graph,
            DatasetError::Extraction { .. } => ErrorKind::Extraction,
            DatasetError::Store { .. } => ErrorKind::Store,
            DatasetError::Serialization(_) => ErrorKind::Serialization,
            DatasetError::Io(_) => ErrorKind::Io,
        }
    }

    /// Build a [`DatasetError::InvalidDefinition`] value.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            reason: reason.into(),
        }
    }

    /// Build a [`DatasetError::Graph`] value.
    pub fn graph(reason: impl Into<String>) -> Self {
        Self::Graph {
            reason: reason.into(),
        }
    }

    /// Build a [`DatasetError::Store`] value.
    pub fn store(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Store {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
