//! Effects applied on scene entry or choice selection.
use serde::Deserialize;
use serde_json::Value;

use crate::SceneRefs;
use crate::data::{FromLenientJson, OneOrMany, leaf_payload, node_kind};

/// One effect node or a sequence of them.
pub type EffectList = OneOrMany<Effect>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoEffect {
    #[serde(default)]
    pub scene_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagEffect {
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEffect {
    pub item_id: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEffect {
    pub stat: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionEffect {
    pub faction: String,
    pub delta: i64,
}

/// A state mutation, tagged by its `type` field.
///
/// Only [`Effect::Goto`] moves the player to another scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Goto(GotoEffect),
    SetFlag(FlagEffect),
    ClearFlag(FlagEffect),
    AddItem(ItemEffect),
    RemoveItem(ItemEffect),
    ModifyStat(StatEffect),
    ModifyFaction(FactionEffect),
    /// Unknown kind or a payload that does not fit its kind.
    Other { kind: Option<String> },
}

impl Effect {
    /// The `type` tag this effect was read from.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Goto(_) => "goto",
            Self::SetFlag(_) => "setFlag",
            Self::ClearFlag(_) => "clearFlag",
            Self::AddItem(_) => "addItem",
            Self::RemoveItem(_) => "removeItem",
            Self::ModifyStat(_) => "modifyStat",
            Self::ModifyFaction(_) => "modifyFaction",
            Self::Other { kind } => kind.as_deref().unwrap_or("unknown"),
        }
    }

    /// Target scene of a transition, if this effect is one.
    #[must_use]
    pub fn target_scene(&self) -> Option<&str> {
        match self {
            Self::Goto(goto) => goto.scene_id.as_deref(),
            Self::SetFlag(_)
            | Self::ClearFlag(_)
            | Self::AddItem(_)
            | Self::RemoveItem(_)
            | Self::ModifyStat(_)
            | Self::ModifyFaction(_)
            | Self::Other { .. } => None,
        }
    }
}

impl FromLenientJson for Effect {
    fn from_lenient_json(value: &Value) -> Self {
        let kind = node_kind(value);
        let parsed = match kind {
            Some("goto") => leaf_payload(value).map(Self::Goto),
            Some("setFlag") => leaf_payload(value).map(Self::SetFlag),
            Some("clearFlag") => leaf_payload(value).map(Self::ClearFlag),
            Some("addItem") => leaf_payload(value).map(Self::AddItem),
            Some("removeItem") => leaf_payload(value).map(Self::RemoveItem),
            Some("modifyStat") => leaf_payload(value).map(Self::ModifyStat),
            Some("modifyFaction") => leaf_payload(value).map(Self::ModifyFaction),
            _ => None,
        };
        parsed.unwrap_or_else(|| Self::Other {
            kind: kind.map(str::to_string),
        })
    }
}

const fn default_count() -> u32 {
    1
}

/// Accumulate the scene identifiers targeted by `effects`.
///
/// A single effect is treated as a one-element list and absent input is a
/// no-op. Only `goto` effects that name a `sceneId` contribute.
pub fn extract_scene_refs<'a>(
    effects: Option<&EffectList>,
    refs: &'a mut SceneRefs,
) -> &'a mut SceneRefs {
    let Some(effects) = effects else {
        return refs;
    };
    refs.extend(
        effects
            .iter()
            .filter_map(Effect::target_scene)
            .map(str::to_string),
    );
    refs
}
