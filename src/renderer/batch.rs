// renderer/batch.rs
use std::collections::BTreeMap;
use std::ops::Range;

use crate::scene::SceneObject;

/// Objects sharing one mesh shape, drawn with a single instanced call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub hash: u64,
    /// Indices into the scene's object list, in insertion order. The first
    /// member is the representative whose meshes and material are drawn.
    pub members: Vec<usize>,
    /// Offset of the first member's matrices in the instance arena.
    pub first_instance: u32,
}

impl Batch {
    pub fn representative(&self) -> usize {
        self.members[0]
    }

    pub fn instances(&self) -> Range<u32> {
        self.first_instance..self.first_instance + self.members.len() as u32
    }
}

/// One frame's partition of a scene: batches in ascending hash order plus
/// at most one skybox. Rebuilt from scratch every frame.
#[derive(Debug, Default)]
pub struct BatchSet {
    batches: Vec<Batch>,
    skybox: Option<usize>,
}

impl BatchSet {
    pub fn from_objects(objects: &[SceneObject]) -> Self {
        let mut grouped: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        let mut skybox = None;

        for (index, object) in objects.iter().enumerate() {
            if object.is_skybox() {
                if let Some(previous) = skybox.replace(index) {
                    log::warn!(
                        "Scene has more than one skybox; object {} replaces object {}",
                        index,
                        previous
                    );
                }
                continue;
            }
            grouped.entry(object.hash()).or_default().push(index);
        }

        let mut offset = 0u32;
        let batches = grouped
            .into_iter()
            .map(|(hash, members)| {
                let batch = Batch {
                    hash,
                    first_instance: offset,
                    members,
                };
                offset += batch.members.len() as u32;
                batch
            })
            .collect();

        Self { batches, skybox }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    pub fn skybox(&self) -> Option<usize> {
        self.skybox
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Objects drawn through batches; the skybox is not counted.
    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(|b| b.members.len()).sum()
    }
}
