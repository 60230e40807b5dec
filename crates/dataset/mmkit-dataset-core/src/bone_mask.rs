//! Bone mask definition and resolution against an actor skeleton.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::error::{DatasetError, Result};
use crate::ids::BoneId;

/// One mask row: a bone path relative to the actor root and whether it is tracked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskEntry {
    pub path: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Ordered mask definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneMask {
    pub entries: Vec<MaskEntry>,
}

/// Result of a lenient resolution: bones that resolved plus paths that did not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaskResolution {
    pub bones: Vec<BoneId>,
    pub missing: Vec<String>,
}

impl BoneMask {
    pub fn new(entries: Vec<MaskEntry>) -> Self {
        Self { entries }
    }

    /// Resolve active entries in definition order, excluding the actor root.
    /// Fails on the first path that does not exist on the skeleton.
    pub fn resolve(&self, actor: &Actor) -> Result<Vec<BoneId>> {
        let resolution = self.resolve_lenient(actor);
        match resolution.missing.into_iter().next() {
            Some(path) => Err(DatasetError::BoneNotFound { path }),
            None => Ok(resolution.bones),
        }
    }

    /// Like [`resolve`](Self::resolve) but keeps going past unknown paths and
    /// reports them in [`MaskResolution::missing`].
    pub fn resolve_lenient(&self, actor: &Actor) -> MaskResolution {
        let mut out = MaskResolution::default();
        for entry in self.entries.iter().filter(|e| e.active) {
            match actor.find(&entry.path) {
                Some(id) => out.bones.push(id),
                None => {
                    warn!("bone mask path '{}' not found on '{}'", entry.path, actor.name);
                    out.missing.push(entry.path.clone());
                }
            }
        }
        // The root drives trajectory, never pose features.
        let root = actor.root_id();
        out.bones.retain(|id| *id != root);
        out
    }
}
