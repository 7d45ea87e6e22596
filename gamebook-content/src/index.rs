//! Scene index construction and the always-reachable seed.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::{Manifest, SceneIndexEntry};
use crate::{SceneId, SceneRefs};

/// Declared scenes keyed by their entry `id`.
pub type SceneIndex = BTreeMap<SceneId, SceneIndexEntry>;

/// A scene index entry whose map key differs from its own `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMismatch {
    pub key: String,
    pub id: String,
}

/// Two index keys whose entries declare the same scene id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateDeclaration {
    pub id: SceneId,
    /// Key whose entry ends up in the index.
    pub kept_key: String,
    pub dropped_key: String,
}

/// Output of [`build`]: the index plus the references every run starts from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexSeed {
    pub scene_index: SceneIndex,
    /// Starting scene and ending targets; reachable without any link.
    pub seeded: SceneRefs,
    pub key_mismatches: Vec<KeyMismatch>,
    pub duplicate_ids: Vec<DuplicateDeclaration>,
}

/// Build the scene index from `manifest` and seed the referenced set.
///
/// Entries are keyed by their own `id`, falling back to the map key when the
/// entry omits it. Mismatched keys are recorded, never corrected. When several
/// keys declare the same id, the entry whose key equals the id wins, otherwise
/// the first key in order; every collision is recorded. Missing manifest
/// fields contribute nothing.
#[must_use]
pub fn build(manifest: &Manifest) -> IndexSeed {
    let mut seed = IndexSeed::default();
    let mut declared_by: BTreeMap<SceneId, &str> = BTreeMap::new();

    for (key, entry) in &manifest.scene_index {
        let id = if entry.id.is_empty() {
            key.clone()
        } else {
            entry.id.clone()
        };
        if id != *key {
            seed.key_mismatches.push(KeyMismatch {
                key: key.clone(),
                id: id.clone(),
            });
        }
        if let Some(&previous) = declared_by.get(&id) {
            let replaces = *key == id;
            let (kept_key, dropped_key) = if replaces {
                (key.as_str(), previous)
            } else {
                (previous, key.as_str())
            };
            seed.duplicate_ids.push(DuplicateDeclaration {
                id: id.clone(),
                kept_key: kept_key.to_string(),
                dropped_key: dropped_key.to_string(),
            });
            if !replaces {
                continue;
            }
        }
        declared_by.insert(id.clone(), key);

        let mut entry = entry.clone();
        entry.id.clone_from(&id);
        seed.scene_index.insert(id, entry);
    }

    if let Some(start) = &manifest.starting_scene {
        seed.seeded.insert(start.clone());
    }
    seed.seeded.extend(
        manifest
            .endings
            .iter()
            .filter_map(|ending| ending.scene_id.clone()),
    );

    log::debug!(
        "scene index built: {} declared, {} seeded, {} key mismatches, {} duplicate ids",
        seed.scene_index.len(),
        seed.seeded.len(),
        seed.key_mismatches.len(),
        seed.duplicate_ids.len()
    );
    seed
}
