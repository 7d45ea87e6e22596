//! Outbound scene references of a single scene.
use crate::data::Scene;
use crate::{SceneRefs, conditions, effects};

/// Collect every scene identifier that `scene` can transition to or mentions.
///
/// Covers the scene's own effects plus, for each choice, its `to` target, its
/// condition tree and its effects.
#[must_use]
pub fn collect(scene: &Scene) -> SceneRefs {
    let mut refs = SceneRefs::new();
    effects::extract_scene_refs(scene.effects.as_ref(), &mut refs);

    for choice in scene.choices() {
        if let Some(target) = &choice.to {
            refs.insert(target.clone());
        }
        conditions::extract_scene_refs(choice.conditions.as_ref(), &mut refs);
        effects::extract_scene_refs(choice.effects.as_ref(), &mut refs);
    }

    refs
}
