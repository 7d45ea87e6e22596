//! Reachability and consistency partitions over the scene reference graph.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::index::SceneIndex;
use crate::{SceneId, SceneRefs};

/// Result of diffing the referenced set against declared and loaded scenes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Seeded scenes plus every scene some content points at.
    pub referenced: SceneRefs,
    /// Referenced but neither declared in the index nor loaded from disk.
    pub missing: SceneRefs,
    /// Declared, never referenced and not marked `unreachable`.
    pub unreachable: SceneRefs,
}

impl Analysis {
    /// Missing targets are hard errors.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Partition the scene graph into missing and unreachable scenes.
///
/// A reference resolves when either the manifest declares it or a scene file
/// with that id was loaded. Entries flagged `unreachable` are never reported
/// as unreachable, whatever their reference count.
pub fn analyze<'r, V>(
    scene_index: &SceneIndex,
    loaded_scenes: &BTreeMap<SceneId, V>,
    per_scene_refs: impl IntoIterator<Item = &'r SceneRefs>,
    seeded: &SceneRefs,
) -> Analysis {
    let mut referenced = seeded.clone();
    for refs in per_scene_refs {
        referenced.extend(refs.iter().cloned());
    }

    let missing: SceneRefs = referenced
        .iter()
        .filter(|id| !scene_index.contains_key(*id) && !loaded_scenes.contains_key(*id))
        .cloned()
        .collect();

    let unreachable: SceneRefs = scene_index
        .iter()
        .filter(|(id, entry)| !entry.unreachable && !referenced.contains(*id))
        .map(|(id, _)| id.clone())
        .collect();

    log::debug!(
        "reference analysis: {} referenced, {} missing, {} unreachable",
        referenced.len(),
        missing.len(),
        unreachable.len()
    );

    Analysis {
        referenced,
        missing,
        unreachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SceneIndexEntry;

    fn refs(ids: &[&str]) -> SceneRefs {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    fn index(entries: &[(&str, bool)]) -> SceneIndex {
        entries
            .iter()
            .map(|(id, unreachable)| {
                (
                    (*id).to_string(),
                    SceneIndexEntry {
                        id: (*id).to_string(),
                        title: None,
                        unreachable: *unreachable,
                    },
                )
            })
            .collect()
    }

    fn loaded(ids: &[&str]) -> BTreeMap<SceneId, ()> {
        ids.iter().map(|id| ((*id).to_string(), ())).collect()
    }

    #[test]
    fn linked_corpus_is_consistent_and_fully_reachable() {
        let declared = index(&[("sc_1", false), ("sc_2", false)]);
        let scene_refs = [refs(&["sc_2"]), refs(&[])];
        let analysis = analyze(
            &declared,
            &loaded(&["sc_1", "sc_2"]),
            &scene_refs,
            &refs(&["sc_1"]),
        );
        assert!(analysis.missing.is_empty());
        assert!(analysis.unreachable.is_empty());
        assert!(analysis.is_consistent());
        assert_eq!(analysis.referenced, refs(&["sc_1", "sc_2"]));
    }

    #[test]
    fn unreferenced_declared_scene_is_unreachable() {
        let declared = index(&[("sc_1", false), ("sc_2", false), ("sc_3", false)]);
        let scene_refs = [refs(&["sc_2"])];
        let analysis = analyze(&declared, &loaded(&[]), &scene_refs, &refs(&["sc_1"]));
        assert_eq!(analysis.unreachable, refs(&["sc_3"]));
        assert!(analysis.is_consistent());
    }

    #[test]
    fn unreachable_flag_suppresses_warning_even_when_referenced() {
        let declared = index(&[("sc_1", false), ("sc_debug", true), ("sc_hidden", true)]);
        let scene_refs = [refs(&["sc_debug"])];
        let analysis = analyze(&declared, &loaded(&[]), &scene_refs, &refs(&["sc_1"]));
        assert!(analysis.unreachable.is_empty());
    }

    #[test]
    fn reference_resolved_by_index_or_loaded_file_is_not_missing() {
        let declared = index(&[("sc_1", false), ("sc_declared_only", false)]);
        let scene_refs = [refs(&["sc_declared_only", "sc_file_only", "sc_missing"])];
        let analysis = analyze(
            &declared,
            &loaded(&["sc_1", "sc_file_only"]),
            &scene_refs,
            &refs(&["sc_1"]),
        );
        assert_eq!(analysis.missing, refs(&["sc_missing"]));
        assert!(!analysis.is_consistent());
    }

    #[test]
    fn seeded_scenes_are_always_referenced() {
        let declared = index(&[("sc_start", false), ("sc_end", false)]);
        let analysis = analyze(
            &declared,
            &loaded(&[]),
            std::iter::empty(),
            &refs(&["sc_start", "sc_end"]),
        );
        assert!(analysis.referenced.contains("sc_start"));
        assert!(analysis.referenced.contains("sc_end"));
        assert!(analysis.unreachable.is_empty());
    }

    #[test]
    fn missing_and_unreachable_never_overlap() {
        let declared = index(&[("a", false), ("b", false)]);
        let scene_refs = [refs(&["c", "a"])];
        let analysis = analyze(&declared, &loaded(&[]), &scene_refs, &refs(&[]));
        assert_eq!(analysis.missing, refs(&["c"]));
        assert_eq!(analysis.unreachable, refs(&["b"]));
        assert!(analysis.missing.is_disjoint(&analysis.unreachable));
    }

    #[test]
    fn self_reference_alone_counts_as_referenced() {
        let declared = index(&[("sc_loop", false)]);
        let scene_refs = [refs(&["sc_loop"])];
        let analysis = analyze(&declared, &loaded(&["sc_loop"]), &scene_refs, &refs(&[]));
        assert!(analysis.unreachable.is_empty());
        assert!(analysis.missing.is_empty());
    }
}
