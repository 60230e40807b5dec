//! Persistence of dataset records.
//!
//! Records are addressed by their destination path (`<folder>/<name>.<ext>`). Two stores
//! ship with the crate: an in-memory map and a directory of JSON files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::MotionMatchingDataset;
use crate::error::{DatasetError, Result};

/// A persisted record. Stores may hold assets of other kinds at a dataset's path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredRecord {
    Dataset(MotionMatchingDataset),
    Foreign { type_name: String },
}

impl StoredRecord {
    pub fn type_name(&self) -> &str {
        match self {
            StoredRecord::Dataset(_) => "motion_matching_dataset",
            StoredRecord::Foreign { type_name } => type_name,
        }
    }
}

pub trait AssetStore {
    /// The record at `path`, if any.
    fn load(&self, path: &Path) -> Result<Option<StoredRecord>>;
    /// Persist a new record. Fails if one already exists.
    fn create(&mut self, path: &Path, record: StoredRecord) -> Result<()>;
    /// Replace an existing record. Fails if none exists.
    fn update(&mut self, path: &Path, record: StoredRecord) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    records: HashMap<PathBuf, StoredRecord>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&StoredRecord> {
        self.records.get(path)
    }

    pub fn dataset(&self, path: &Path) -> Option<&MotionMatchingDataset> {
        match self.records.get(path)? {
            StoredRecord::Dataset(d) => Some(d),
            StoredRecord::Foreign { .. } => None,
        }
    }

    /// Put a record in place directly, bypassing create/update checks.
    pub fn insert(&mut self, path: impl Into<PathBuf>, record: StoredRecord) {
        self.records.insert(path.into(), record);
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.records.keys().map(PathBuf::as_path)
    }
}

impl AssetStore for MemoryAssetStore {
    fn load(&self, path: &Path) -> Result<Option<StoredRecord>> {
        Ok(self.records.get(path).cloned())
    }

    fn create(&mut self, path: &Path, record: StoredRecord) -> Result<()> {
        if self.records.contains_key(path) {
            return Err(DatasetError::store(path, "record already exists"));
        }
        self.records.insert(path.to_path_buf(), record);
        Ok(())
    }

    fn update(&mut self, path: &Path, record: StoredRecord) -> Result<()> {
        match self.records.get_mut(path) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(DatasetError::store(path, "no record to update")),
        }
    }
}

/// Decode a file found at a record path.
///
/// Only a `"kind": "dataset"` document is decoded strictly. Anything else (another
/// asset's JSON, a non-JSON file) is reported as a foreign record named after its
/// `kind` or `type` field, or `"unknown"`.
fn classify(bytes: &[u8]) -> Result<StoredRecord> {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) else {
        return Ok(StoredRecord::Foreign {
            type_name: "unknown".to_string(),
        });
    };
    let field = |key: &str| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
    };
    let type_name = match field("kind").as_deref() {
        Some("dataset") => return Ok(serde_json::from_value(value)?),
        Some("foreign") => field("type_name"),
        Some(kind) => Some(kind.to_string()),
        None => field("type"),
    };
    Ok(StoredRecord::Foreign {
        type_name: type_name.unwrap_or_else(|| "unknown".to_string()),
    })
}

/// One pretty-printed JSON file per record, rooted at a directory.
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn write(&self, path: &Path, record: &StoredRecord, create_new: bool) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(record)?;
        let mut options = fs::OpenOptions::new();
        options.write(true);
        if create_new {
            options.create_new(true);
        } else {
            options.truncate(true);
        }
        let mut file = options.open(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => DatasetError::store(path, "record already exists"),
            std::io::ErrorKind::NotFound => DatasetError::store(path, "no record to update"),
            _ => DatasetError::Io(e),
        })?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}

impl AssetStore for FsAssetStore {
    fn load(&self, path: &Path) -> Result<Option<StoredRecord>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&full)?;
        Ok(Some(classify(&bytes)?))
    }

    fn create(&mut self, path: &Path, record: StoredRecord) -> Result<()> {
        self.write(path, &record, true)
    }

    fn update(&mut self, path: &Path, record: StoredRecord) -> Result<()> {
        self.write(path, &record, false)
    }
}
