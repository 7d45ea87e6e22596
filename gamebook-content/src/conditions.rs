//! Condition trees and the scene-reference walker over them.
//!
//! Conditions gate choice visibility. Logical nodes (`and`, `or`, `not`) wrap a
//! nested condition set; every other node is a leaf check against game state.
//! No leaf kind carries a scene reference today, but the walker visits every
//! logical branch so that a reference-carrying leaf only needs a new match arm.

use serde::Deserialize;
use serde_json::Value;

use crate::SceneRefs;
use crate::data::{FromLenientJson, OneOrMany, leaf_payload, node_kind};

/// One condition node or a sequence of them.
pub type ConditionSet = OneOrMany<Condition>;

/// Comparison operator used by numeric checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    #[default]
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagCheck {
    pub flag: String,
    #[serde(default = "default_true")]
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCheck {
    pub item_id: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCheck {
    pub stat: String,
    #[serde(default)]
    pub op: Comparison,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionCheck {
    pub faction: String,
    #[serde(default)]
    pub op: Comparison,
    pub value: i64,
}

/// A node of a condition tree, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    And(ConditionSet),
    Or(ConditionSet),
    Not(ConditionSet),
    Flag(FlagCheck),
    Item(ItemCheck),
    Stat(StatCheck),
    Faction(FactionCheck),
    /// Unknown kind or a payload that does not fit its kind.
    Other { kind: Option<String> },
}

impl Condition {
    /// The `type` tag this node was read from.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::And(_) => "and",
            Self::Or(_) => "or",
            Self::Not(_) => "not",
            Self::Flag(_) => "flag",
            Self::Item(_) => "item",
            Self::Stat(_) => "stat",
            Self::Faction(_) => "faction",
            Self::Other { kind } => kind.as_deref().unwrap_or("unknown"),
        }
    }

    /// Add every scene referenced by this node and its descendants.
    pub fn collect_scene_refs(&self, refs: &mut SceneRefs) {
        match self {
            Self::And(nested) | Self::Or(nested) | Self::Not(nested) => {
                extract_scene_refs(Some(nested), refs);
            }
            Self::Flag(_)
            | Self::Item(_)
            | Self::Stat(_)
            | Self::Faction(_)
            | Self::Other { .. } => {}
        }
    }
}

impl FromLenientJson for Condition {
    fn from_lenient_json(value: &Value) -> Self {
        let kind = node_kind(value);
        let parsed = match kind {
            Some("and") => Some(Self::And(nested_conditions(value))),
            Some("or") => Some(Self::Or(nested_conditions(value))),
            Some("not") => Some(Self::Not(nested_conditions(value))),
            Some("flag") => leaf_payload(value).map(Self::Flag),
            Some("item") => leaf_payload(value).map(Self::Item),
            Some("stat") => leaf_payload(value).map(Self::Stat),
            Some("faction") => leaf_payload(value).map(Self::Faction),
            _ => None,
        };
        parsed.unwrap_or_else(|| Self::Other {
            kind: kind.map(str::to_string),
        })
    }
}

fn nested_conditions(value: &Value) -> ConditionSet {
    value
        .get("conditions")
        .map(ConditionSet::from_lenient_json)
        .unwrap_or_default()
}

const fn default_true() -> bool {
    true
}

const fn default_count() -> u32 {
    1
}

/// Accumulate the scene identifiers referenced anywhere inside `conditions`.
///
/// Absent input leaves the accumulator untouched. Unknown node kinds are
/// skipped, never reported.
pub fn extract_scene_refs<'a>(
    conditions: Option<&ConditionSet>,
    refs: &'a mut SceneRefs,
) -> &'a mut SceneRefs {
    let Some(conditions) = conditions else {
        return refs;
    };
    for condition in conditions {
        condition.collect_scene_refs(refs);
    }
    refs
}
