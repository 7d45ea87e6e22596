use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::conditions::ConditionSet;
use crate::effects::EffectList;

/// Conversion from raw JSON that degrades to a fallback value instead of failing.
///
/// Condition and effect trees use this so that a malformed or newer node never
/// prevents the rest of a scene from being analysed.
pub trait FromLenientJson {
    fn from_lenient_json(value: &Value) -> Self;
}

/// A field that may hold either a single node or a sequence of nodes.
///
/// A single object becomes a one-element list; any value that is neither an
/// object nor an array becomes an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOrMany<T>(Vec<T>);

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: FromLenientJson> OneOrMany<T> {
    #[must_use]
    pub fn from_lenient_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self(items.iter().map(T::from_lenient_json).collect()),
            Value::Object(_) => Self(vec![T::from_lenient_json(value)]),
            _ => Self(Vec::new()),
        }
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de, T: FromLenientJson> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_lenient_json(&value))
    }
}

/// Deserialize a typed leaf payload, or `None` when the shape does not fit.
pub(crate) fn leaf_payload<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

/// Read the `type` discriminator of a tagged node.
pub(crate) fn node_kind(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

/// A string field, or `None` when absent or of another type.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A one-or-many field; `null` counts as absent.
fn set_field<T: FromLenientJson>(value: &Value, key: &str) -> Option<OneOrMany<T>> {
    value
        .get(key)
        .filter(|field| !field.is_null())
        .map(OneOrMany::from_lenient_json)
}

/// Implements `Deserialize` through [`FromLenientJson`], so a wrongly typed
/// field only drops itself instead of rejecting the whole document.
macro_rules! lenient_deserialize {
    ($($ty:ty),+) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    let value = Value::deserialize(deserializer)?;
                    Ok(Self::from_lenient_json(&value))
                }
            }
        )+
    };
}

lenient_deserialize!(Ending, SceneIndexEntry, Manifest, Choice);

/// An ending declared by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ending {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<String>,
}

impl FromLenientJson for Ending {
    fn from_lenient_json(value: &Value) -> Self {
        Self {
            id: string_field(value, "id"),
            title: string_field(value, "title"),
            scene_id: string_field(value, "sceneId"),
        }
    }
}

/// One declared entry of the manifest's scene index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SceneIndexEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author assertion that nothing links here on purpose (debug or
    /// externally triggered scenes). Suppresses unreachable warnings.
    pub unreachable: bool,
}

impl FromLenientJson for SceneIndexEntry {
    fn from_lenient_json(value: &Value) -> Self {
        Self {
            id: string_field(value, "id").unwrap_or_default(),
            title: string_field(value, "title"),
            unreachable: value
                .get("unreachable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// The content manifest (`manifest.json`)
///
/// Every field is read independently: a malformed ending or index entry
/// keeps its neighbours, and a missing field contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub starting_scene: Option<String>,
    pub endings: Vec<Ending>,
    pub scene_index: BTreeMap<String, SceneIndexEntry>,
}

impl FromLenientJson for Manifest {
    fn from_lenient_json(value: &Value) -> Self {
        let endings = value
            .get("endings")
            .and_then(Value::as_array)
            .map(|endings| endings.iter().map(Ending::from_lenient_json).collect())
            .unwrap_or_default();
        let scene_index = value
            .get("sceneIndex")
            .and_then(Value::as_object)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, entry)| (key.clone(), SceneIndexEntry::from_lenient_json(entry)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: string_field(value, "title"),
            starting_scene: string_field(value, "startingScene"),
            endings,
            scene_index,
        }
    }
}

impl Manifest {
    /// Load a manifest from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error only if the text is not valid JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A player-facing option within a scene
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Choice {
    pub text: Option<String>,
    pub to: Option<String>,
    pub conditions: Option<ConditionSet>,
    pub effects: Option<EffectList>,
}

impl FromLenientJson for Choice {
    fn from_lenient_json(value: &Value) -> Self {
        Self {
            text: string_field(value, "text"),
            to: string_field(value, "to"),
            conditions: set_field(value, "conditions"),
            effects: set_field(value, "effects"),
        }
    }
}

/// One narrative unit (`scenes/<id>.json`)
///
/// Only `id` is mandatory. Other fields with the wrong type read as absent,
/// so the rest of the scene still contributes its references.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: String,
    pub title: Option<String>,
    pub effects: Option<EffectList>,
    pub choices: Option<Vec<Choice>>,
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let id = string_field(&value, "id")
            .ok_or_else(|| D::Error::custom("scene requires a string `id`"))?;
        let choices = value
            .get("choices")
            .and_then(Value::as_array)
            .map(|choices| choices.iter().map(Choice::from_lenient_json).collect());

        Ok(Self {
            id,
            title: string_field(&value, "title"),
            effects: set_field(&value, "effects"),
            choices,
        })
    }
}

impl Scene {
    /// Load a scene from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an object with a string `id`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Choices of the scene, empty when none are authored.
    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        self.choices.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::Condition;
    use crate::effects::Effect;

    #[test]
    fn manifest_from_json_reads_camel_case_fields() {
        let json = r#"{
            "startingScene": "sc_1",
            "endings": [{ "id": "good", "sceneId": "sc_end" }, { "id": "silent" }],
            "sceneIndex": {
                "sc_1": { "id": "sc_1" },
                "sc_debug": { "id": "sc_debug", "unreachable": true }
            }
        }"#;

        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.starting_scene.as_deref(), Some("sc_1"));
        assert_eq!(manifest.endings.len(), 2);
        assert_eq!(manifest.endings[0].scene_id.as_deref(), Some("sc_end"));
        assert!(manifest.endings[1].scene_id.is_none());
        assert!(manifest.scene_index["sc_debug"].unreachable);
        assert!(!manifest.scene_index["sc_1"].unreachable);
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = Manifest::from_json("{}").unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn scene_accepts_single_effect_and_condition_objects() {
        let json = r#"{
            "id": "sc_1",
            "effects": { "type": "setFlag", "flag": "visited_gate" },
            "choices": [
                {
                    "text": "Open the gate",
                    "to": "sc_2",
                    "conditions": { "type": "flag", "flag": "has_key" },
                    "effects": [{ "type": "goto", "sceneId": "sc_3" }]
                }
            ]
        }"#;

        let scene = Scene::from_json(json).unwrap();
        let effects = scene.effects.as_ref().unwrap();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects.iter().next(), Some(Effect::SetFlag(_))));

        let choice = &scene.choices()[0];
        assert_eq!(choice.to.as_deref(), Some("sc_2"));
        let conditions = choice.conditions.as_ref().unwrap();
        assert!(matches!(conditions.iter().next(), Some(Condition::Flag(_))));
    }

    #[test]
    fn scene_tolerates_scalar_condition_and_effect_fields() {
        let json = r#"{
            "id": "sc_1",
            "effects": 7,
            "choices": [{ "conditions": "always", "effects": null }]
        }"#;

        let scene = Scene::from_json(json).unwrap();
        assert!(scene.effects.as_ref().unwrap().is_empty());
        assert!(scene.choices()[0].conditions.as_ref().unwrap().is_empty());
        assert!(scene.choices()[0].effects.is_none());
    }

    #[test]
    fn scene_without_choices_has_empty_slice() {
        let scene = Scene::from_json(r#"{ "id": "sc_end" }"#).unwrap();
        assert!(scene.choices().is_empty());
    }

    #[test]
    fn scene_without_id_is_rejected() {
        assert!(Scene::from_json(r#"{ "choices": [] }"#).is_err());
        assert!(Scene::from_json(r#"{ "id": 4 }"#).is_err());
    }

    #[test]
    fn mistyped_scene_fields_drop_only_themselves() {
        let json = r#"{
            "id": "sc_1",
            "title": 3,
            "effects": { "type": "goto", "sceneId": "sc_3" },
            "choices": [
                { "text": false, "to": 7 },
                { "to": "sc_2" }
            ]
        }"#;

        let scene = Scene::from_json(json).unwrap();
        assert!(scene.title.is_none());
        assert_eq!(scene.choices().len(), 2);
        assert!(scene.choices()[0].to.is_none());
        assert!(scene.choices()[0].text.is_none());
        assert_eq!(scene.choices()[1].to.as_deref(), Some("sc_2"));
        assert_eq!(scene.effects.unwrap().len(), 1);
    }

    #[test]
    fn malformed_index_entry_keeps_the_rest_of_the_manifest() {
        let json = r#"{
            "startingScene": "sc_1",
            "endings": [{ "id": "win", "sceneId": 9 }, { "id": "home", "sceneId": "sc_home" }],
            "sceneIndex": {
                "sc_1": { "id": "sc_1" },
                "sc_odd": { "id": "sc_odd", "unreachable": "yes" },
                "sc_home": { "id": "sc_home" }
            }
        }"#;

        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.starting_scene.as_deref(), Some("sc_1"));
        assert_eq!(manifest.scene_index.len(), 3);
        assert!(!manifest.scene_index["sc_odd"].unreachable);
        assert!(manifest.endings[0].scene_id.is_none());
        assert_eq!(manifest.endings[1].scene_id.as_deref(), Some("sc_home"));
    }

    #[test]
    fn non_object_manifest_reads_as_empty() {
        assert_eq!(Manifest::from_json("[1, 2]").unwrap(), Manifest::default());
    }
}
