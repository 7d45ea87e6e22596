//! Validation report and the accumulator that builds it.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SceneRefs;
use crate::analysis::Analysis;
use crate::error::ContentError;
use crate::index::{IndexSeed, SceneIndex};
use crate::schema::SchemaViolation;

/// Whether warnings count against a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarningPolicy {
    /// Warnings are reported but never fail the run.
    #[default]
    Allow,
    /// Any warning fails the run.
    Fail,
}

/// Final outcome of one validation run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub file_count: usize,
    pub scene_index: SceneIndex,
    pub referenced_scenes: SceneRefs,
    pub missing_scenes: SceneRefs,
    pub unreachable_scenes: SceneRefs,
}

impl ValidationResult {
    /// Outcome once the caller's warning policy is applied.
    #[must_use]
    pub fn passes_with(&self, policy: WarningPolicy) -> bool {
        match policy {
            WarningPolicy::Allow => self.passed,
            WarningPolicy::Fail => self.passed && self.warnings.is_empty(),
        }
    }
}

/// Accumulator threaded through a validation run.
///
/// Errors and warnings are append-only; [`ReportBuilder::finish`] consumes the
/// builder so no partial result escapes.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    errors: Vec<String>,
    warnings: Vec<String>,
    file_count: usize,
    scene_index: SceneIndex,
    analysis: Analysis,
}

impl ReportBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one scene, items or stats file as validated.
    pub fn count_file(&mut self) {
        self.file_count += 1;
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record every schema violation of one document.
    pub fn schema_violations(&mut self, file: &Path, violations: &[SchemaViolation]) {
        for violation in violations {
            self.error(format!("{}: {violation}", file.display()));
        }
    }

    /// Record a file that could not be read or parsed.
    pub fn load_error(&mut self, error: &ContentError) {
        log::warn!("skipping file: {error}");
        self.error(error.to_string());
    }

    /// Take over the scene index, flagging entries whose key differs from their
    /// id and ids declared under more than one key.
    pub fn scene_index(&mut self, seed: &IndexSeed) {
        for mismatch in &seed.key_mismatches {
            self.warning(format!(
                "Scene index key '{}' does not match its entry id '{}'; the entry id is used",
                mismatch.key, mismatch.id
            ));
        }
        for duplicate in &seed.duplicate_ids {
            self.warning(format!(
                "Scene index keys '{}' and '{}' both declare scene '{}'; only '{}' is used",
                duplicate.kept_key, duplicate.dropped_key, duplicate.id, duplicate.kept_key
            ));
        }
        self.scene_index.clone_from(&seed.scene_index);
    }

    /// Record the reachability partitions: one aggregate error for missing
    /// targets, one aggregate warning for unreachable scenes.
    pub fn analysis(&mut self, analysis: Analysis) {
        if !analysis.is_consistent() {
            self.error(format!(
                "Missing scene references: {} (not declared in the scene index and no scene file found)",
                join_ids(&analysis.missing)
            ));
        }
        if !analysis.unreachable.is_empty() {
            self.warning(format!(
                "Unreachable scenes: {} (declared but never referenced; set \"unreachable\": true if intentional)",
                join_ids(&analysis.unreachable)
            ));
        }
        self.analysis = analysis;
    }

    #[must_use]
    pub fn finish(self) -> ValidationResult {
        ValidationResult {
            passed: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            file_count: self.file_count,
            scene_index: self.scene_index,
            referenced_scenes: self.analysis.referenced,
            missing_scenes: self.analysis.missing,
            unreachable_scenes: self.analysis.unreachable,
        }
    }
}

fn join_ids(ids: &SceneRefs) -> String {
    ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
