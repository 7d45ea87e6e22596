//! Gamebook Content Analysis
//!
//! Static integrity checks for branching-narrative content: a manifest, one
//! document per scene, plus item and stat tables. This crate never runs game
//! logic; it walks the authored condition and effect trees, builds the scene
//! reference graph and reports missing targets and unreachable scenes.
//!
//! ## Pipeline
//!
//! - **index**: builds the scene index from the manifest and seeds the
//!   always-reachable set
//! - **references**: collects outbound scene references per scene, using the
//!   condition and effect walkers
//! - **analysis**: diffs the referenced set against the index and the loaded
//!   scene files
//! - **report**: accumulates errors and warnings into a [`ValidationResult`]
//! - **validate**: drives the whole run over a content directory

pub mod analysis;
pub mod conditions;
pub mod data;
pub mod effects;
pub mod error;
pub mod index;
pub mod load;
pub mod references;
pub mod report;
pub mod runtime;
pub mod schema;
pub mod validate;

// Re-export commonly used types
pub use analysis::{Analysis, analyze};
pub use conditions::{Comparison, Condition, ConditionSet};
pub use data::{Choice, Ending, Manifest, OneOrMany, Scene, SceneIndexEntry};
pub use effects::{Effect, EffectList};
pub use error::ContentError;
pub use index::{DuplicateDeclaration, IndexSeed, KeyMismatch, SceneIndex};
pub use report::{ReportBuilder, ValidationResult, WarningPolicy};
pub use runtime::{RuntimeCheck, validate_manifest, validate_scene};
pub use schema::{DocumentKind, SchemaSet, SchemaViolation};
pub use validate::{ValidationOptions, validate_content};

/// Identifier of a scene, as written in manifests and scene documents.
pub type SceneId = String;

/// Ordered set of scene identifiers. Ordering keeps reports stable between runs.
pub type SceneRefs = std::collections::BTreeSet<SceneId>;
