//! Lightweight checks for content loaded by a running game.
//!
//! These reuse the reference collector but test against an id set the caller
//! already holds, instead of analysing the whole corpus.
use serde::Serialize;

use crate::data::{Manifest, Scene};
use crate::{SceneRefs, index, references};

/// Outcome of a runtime check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl RuntimeCheck {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check that a manifest can drive a play session.
#[must_use]
pub fn validate_manifest(manifest: &Manifest) -> RuntimeCheck {
    let mut errors = Vec::new();
    let seed = index::build(manifest);

    if seed.scene_index.is_empty() {
        errors.push("Manifest declares no scenes".to_string());
    }

    match manifest.starting_scene.as_deref() {
        None | Some("") => errors.push("Manifest has no startingScene".to_string()),
        Some(start) if !seed.scene_index.contains_key(start) => errors.push(format!(
            "Starting scene '{start}' is not declared in the scene index"
        )),
        Some(_) => {}
    }

    for (position, ending) in manifest.endings.iter().enumerate() {
        if let Some(target) = &ending.scene_id
            && !seed.scene_index.contains_key(target)
        {
            let label = ending
                .id
                .clone()
                .unwrap_or_else(|| format!("#{position}"));
            errors.push(format!(
                "Ending '{label}' targets undeclared scene '{target}'"
            ));
        }
    }

    for mismatch in &seed.key_mismatches {
        errors.push(format!(
            "Scene index key '{}' does not match entry id '{}'",
            mismatch.key, mismatch.id
        ));
    }

    for duplicate in &seed.duplicate_ids {
        errors.push(format!(
            "Scene '{}' is declared under both '{}' and '{}'",
            duplicate.id, duplicate.kept_key, duplicate.dropped_key
        ));
    }

    RuntimeCheck::from_errors(errors)
}

/// Check that every scene `scene` points at is in `known_scene_ids`.
#[must_use]
pub fn validate_scene(scene: &Scene, known_scene_ids: &SceneRefs) -> RuntimeCheck {
    let mut errors = Vec::new();

    if scene.id.trim().is_empty() {
        errors.push("Scene has an empty id".to_string());
    }

    for target in references::collect(scene) {
        if !known_scene_ids.contains(&target) {
            errors.push(format!(
                "Scene '{}' references unknown scene '{target}'",
                scene.id
            ));
        }
    }

    RuntimeCheck::from_errors(errors)
}
