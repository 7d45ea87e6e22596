//! Whole-corpus validation of a content directory.
//!
//! Stages run in order: schema set, manifest, scene index, scene files,
//! item and stat tables, reference analysis. Every stage after the manifest
//! records its problems in the report and keeps going.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::data::{FromLenientJson, Manifest, Scene};
use crate::error::ContentError;
use crate::report::{ReportBuilder, ValidationResult};
use crate::schema::{DocumentKind, SchemaSet};
use crate::{SceneId, SceneRefs, analysis, index, load, references};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SCENES_DIR: &str = "scenes";
pub const ITEMS_FILE: &str = "items.json";
pub const STATS_FILE: &str = "stats.json";

/// Where to find the content and, optionally, the schemas to check it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub content_path: PathBuf,
    /// Directory holding replacement schema documents; the bundled schemas
    /// are used when absent.
    pub schema_dir: Option<PathBuf>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            content_path: PathBuf::from("./content"),
            schema_dir: None,
        }
    }
}

impl ValidationOptions {
    #[must_use]
    pub fn new(content_path: impl Into<PathBuf>) -> Self {
        Self {
            content_path: content_path.into(),
            schema_dir: None,
        }
    }

    #[must_use]
    pub fn with_schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = Some(dir.into());
        self
    }
}

/// Scene files that loaded successfully, keyed by scene id.
type LoadedScenes = BTreeMap<SceneId, PathBuf>;

/// Validate every document under `options.content_path`.
///
/// # Errors
///
/// Fails only when the schema set or the manifest cannot be loaded. All other
/// problems are collected into the returned [`ValidationResult`].
pub async fn validate_content(
    options: &ValidationOptions,
) -> Result<ValidationResult, ContentError> {
    let schemas = match &options.schema_dir {
        Some(dir) => SchemaSet::load_dir(dir).await?,
        None => SchemaSet::embedded()?,
    };
    let root = options.content_path.as_path();
    let mut report = ReportBuilder::new();

    let manifest_path = root.join(MANIFEST_FILE);
    let manifest_doc = load::read_json(&manifest_path).await?;
    report.schema_violations(
        &manifest_path,
        &schemas.check(DocumentKind::Manifest, &manifest_doc),
    );
    let manifest = Manifest::from_lenient_json(&manifest_doc);

    let seed = index::build(&manifest);
    report.scene_index(&seed);

    let (loaded, per_scene_refs) = load_scenes(root, &schemas, &mut report).await;

    for (file, kind) in [
        (ITEMS_FILE, DocumentKind::Items),
        (STATS_FILE, DocumentKind::Stats),
    ] {
        check_optional_table(&root.join(file), kind, &schemas, &mut report).await;
    }

    let analysis = analysis::analyze(
        &seed.scene_index,
        &loaded,
        &per_scene_refs,
        &seed.seeded,
    );
    if !analysis.is_consistent() {
        log::debug!("{} referenced scenes do not resolve", analysis.missing.len());
    }
    report.analysis(analysis);

    let result = report.finish();
    log::debug!(
        "validated {} files under {}: passed={}",
        result.file_count,
        root.display(),
        result.passed
    );
    Ok(result)
}

async fn load_scenes(
    root: &Path,
    schemas: &SchemaSet,
    report: &mut ReportBuilder,
) -> (LoadedScenes, Vec<SceneRefs>) {
    let mut loaded = LoadedScenes::new();
    let mut per_scene_refs = Vec::new();

    let scenes_dir = root.join(SCENES_DIR);
    let files = match load::json_files(&scenes_dir).await {
        Ok(files) => files,
        Err(err) => {
            report.load_error(&err);
            return (loaded, per_scene_refs);
        }
    };

    for path in files {
        report.count_file();
        let doc = match load::read_json(&path).await {
            Ok(doc) => doc,
            Err(err) => {
                report.load_error(&err);
                continue;
            }
        };
        report.schema_violations(&path, &schemas.check(DocumentKind::Scene, &doc));

        let scene: Scene = match typed(&path, DocumentKind::Scene, &doc) {
            Ok(scene) => scene,
            Err(err) => {
                report.load_error(&err);
                continue;
            }
        };

        if let Some(first) = loaded.get(&scene.id) {
            report.error(format!(
                "Duplicate scene id '{}' in {} (already defined in {})",
                scene.id,
                path.display(),
                first.display()
            ));
            continue;
        }

        let refs = references::collect(&scene);
        log::debug!("scene {} references {} scenes", scene.id, refs.len());
        per_scene_refs.push(refs);
        loaded.insert(scene.id, path);
    }

    (loaded, per_scene_refs)
}

async fn check_optional_table(
    path: &Path,
    kind: DocumentKind,
    schemas: &SchemaSet,
    report: &mut ReportBuilder,
) {
    if !load::exists(path).await {
        log::debug!("no {kind} table at {}", path.display());
        return;
    }
    report.count_file();
    match load::read_json(path).await {
        Ok(doc) => report.schema_violations(path, &schemas.check(kind, &doc)),
        Err(err) => report.load_error(&err),
    }
}

/// Read a typed document; fields of the wrong type are dropped, so this only
/// fails when a mandatory field is unusable.
fn typed<T: DeserializeOwned>(
    path: &Path,
    kind: DocumentKind,
    doc: &Value,
) -> Result<T, ContentError> {
    T::deserialize(doc).map_err(|source| ContentError::Shape {
        path: path.to_path_buf(),
        kind,
        source,
    })
}
