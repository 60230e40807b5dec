//! Actor skeleton: root pose plus a flat bone hierarchy addressable by path.

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::ids::BoneId;

/// Root transform of an actor. Rotation is a quaternion stored as `[x, y, z, w]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootPose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

impl Default for RootPose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// One bone. `parent` indexes into [`Actor::bones`]; only the root has none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<u32>,
}

/// A skeleton instance. `bones[0]` is the root and carries the actor's own name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    #[serde(default)]
    pub root: RootPose,
    pub bones: Vec<Bone>,
}

impl Actor {
    /// Create an actor with only a root bone.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: RootPose::default(),
            bones: vec![Bone {
                name: name.to_string(),
                parent: None,
            }],
        }
    }

    /// Append a bone under `parent` and return its id.
    pub fn add_bone(&mut self, name: &str, parent: BoneId) -> BoneId {
        let id = BoneId(self.bones.len() as u32);
        self.bones.push(Bone {
            name: name.to_string(),
            parent: Some(parent.0),
        });
        id
    }

    #[inline]
    pub fn root_id(&self) -> BoneId {
        BoneId::ROOT
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.index())
    }

    /// Resolve a slash-separated path relative to the root.
    /// The empty path resolves to the root itself.
    pub fn find(&self, path: &str) -> Option<BoneId> {
        let mut current = self.root_id();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let next = self.bones.iter().enumerate().find_map(|(idx, bone)| {
                (bone.parent == Some(current.0) && bone.name == segment)
                    .then_some(BoneId(idx as u32))
            })?;
            current = next;
        }
        Some(current)
    }

    /// Full path of a bone relative to the root ("" for the root).
    pub fn path_of(&self, id: BoneId) -> Option<String> {
        let mut segments = Vec::new();
        let mut cursor = self.bone(id)?;
        while let Some(parent) = cursor.parent {
            segments.push(cursor.name.as_str());
            cursor = self.bones.get(parent as usize)?;
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// Check the root sits at index 0 and every parent precedes its child.
    pub fn validate(&self) -> Result<()> {
        let root = self
            .bones
            .first()
            .ok_or_else(|| DatasetError::invalid(format!("actor '{}' has no bones", self.name)))?;
        if root.parent.is_some() {
            return Err(DatasetError::invalid(format!(
                "actor '{}' root bone must not have a parent",
                self.name
            )));
        }
        for (idx, bone) in self.bones.iter().enumerate().skip(1) {
            match bone.parent {
                Some(p) if (p as usize) < idx => {}
                _ => {
                    return Err(DatasetError::invalid(format!(
                        "bone '{}' must reference an earlier parent",
                        bone.name
                    )))
                }
            }
        }
        Ok(())
    }
}
