//! Shared JSON fixtures for workspace tests and benches.
//!
//! `fixtures/manifest.json` maps fixture names to files relative to the `fixtures/`
//! directory at the workspace root.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    definitions: BTreeMap<String, String>,
    actors: BTreeMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

/// One named group of fixtures in the manifest.
struct Group {
    kind: &'static str,
    entries: &'static BTreeMap<String, String>,
}

impl Group {
    fn rel(&self, name: &str) -> Result<&'static str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.kind))
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        Ok(fixtures_root().join(self.rel(name)?))
    }

    fn json(&self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read {} fixture at {}", self.kind, path.display()))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.json(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} fixture '{name}'", self.kind))
    }
}

/// Dataset definitions (`DatasetDefinition` JSON).
pub mod definitions {
    use super::*;

    fn group() -> Group {
        Group {
            kind: "definition",
            entries: &MANIFEST.definitions,
        }
    }

    pub fn keys() -> Vec<String> {
        group().keys()
    }

    pub fn json(name: &str) -> Result<String> {
        group().json(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        group().load(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        group().path(name)
    }
}

/// Actor skeletons (`Actor` JSON).
pub mod actors {
    use super::*;

    fn group() -> Group {
        Group {
            kind: "actor",
            entries: &MANIFEST.actors,
        }
    }

    pub fn keys() -> Vec<String> {
        group().keys()
    }

    pub fn json(name: &str) -> Result<String> {
        group().json(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        group().load(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        group().path(name)
    }
}
