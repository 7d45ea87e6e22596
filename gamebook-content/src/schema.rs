//! Structural validation of content documents against JSON Schema.
//!
//! Four schemas ship with the crate (`schemas/*.schema.json`); a content
//! project may supply its own directory holding the same file names instead.
use std::fmt;
use std::path::Path;

use jsonschema::{Draft, Validator};
use serde::Serialize;
use serde_json::Value;

use crate::error::ContentError;
use crate::load;

const MANIFEST_SCHEMA: &str = include_str!("../schemas/manifest.schema.json");
const SCENE_SCHEMA: &str = include_str!("../schemas/scene.schema.json");
const ITEMS_SCHEMA: &str = include_str!("../schemas/items.schema.json");
const STATS_SCHEMA: &str = include_str!("../schemas/stats.schema.json");

/// The kinds of content document that carry a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Manifest,
    Scene,
    Items,
    Stats,
}

impl DocumentKind {
    /// File name of this kind's schema inside a schema directory.
    #[must_use]
    pub const fn schema_file(self) -> &'static str {
        match self {
            Self::Manifest => "manifest.schema.json",
            Self::Scene => "scene.schema.json",
            Self::Items => "items.schema.json",
            Self::Stats => "stats.schema.json",
        }
    }

    const fn embedded_source(self) -> &'static str {
        match self {
            Self::Manifest => MANIFEST_SCHEMA,
            Self::Scene => SCENE_SCHEMA,
            Self::Items => ITEMS_SCHEMA,
            Self::Stats => STATS_SCHEMA,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest => write!(f, "manifest"),
            Self::Scene => write!(f, "scene"),
            Self::Items => write!(f, "items"),
            Self::Stats => write!(f, "stats"),
        }
    }
}

/// One structural problem inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    /// JSON pointer to the offending value; empty for the document root.
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{path}: {}", self.message)
    }
}

/// Compiled validators for every [`DocumentKind`].
pub struct SchemaSet {
    manifest: Validator,
    scene: Validator,
    items: Validator,
    stats: Validator,
}

impl fmt::Debug for SchemaSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSet").finish_non_exhaustive()
    }
}

impl SchemaSet {
    /// Compile the schemas bundled with this crate.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled schema fails to compile.
    pub fn embedded() -> Result<Self, ContentError> {
        let compile_embedded = |kind: DocumentKind| {
            let schema: Value = serde_json::from_str(kind.embedded_source()).map_err(|source| {
                ContentError::Json {
                    path: Path::new("schemas").join(kind.schema_file()),
                    source,
                }
            })?;
            compile(kind, &schema)
        };
        Ok(Self {
            manifest: compile_embedded(DocumentKind::Manifest)?,
            scene: compile_embedded(DocumentKind::Scene)?,
            items: compile_embedded(DocumentKind::Items)?,
            stats: compile_embedded(DocumentKind::Stats)?,
        })
    }

    /// Read and compile the four schema documents found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any schema file is missing, is not JSON, or does
    /// not compile.
    pub async fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        let set = Self {
            manifest: load_compiled(dir, DocumentKind::Manifest).await?,
            scene: load_compiled(dir, DocumentKind::Scene).await?,
            items: load_compiled(dir, DocumentKind::Items).await?,
            stats: load_compiled(dir, DocumentKind::Stats).await?,
        };
        log::debug!("compiled schema set from {}", dir.display());
        Ok(set)
    }

    const fn validator(&self, kind: DocumentKind) -> &Validator {
        match kind {
            DocumentKind::Manifest => &self.manifest,
            DocumentKind::Scene => &self.scene,
            DocumentKind::Items => &self.items,
            DocumentKind::Stats => &self.stats,
        }
    }

    /// Every violation of `doc` against the schema for `kind`.
    #[must_use]
    pub fn check(&self, kind: DocumentKind, doc: &Value) -> Vec<SchemaViolation> {
        self.validator(kind)
            .iter_errors(doc)
            .map(|error| SchemaViolation {
                instance_path: error.instance_path().to_string(),
                message: error.to_string(),
            })
            .collect()
    }
}

async fn load_compiled(dir: &Path, kind: DocumentKind) -> Result<Validator, ContentError> {
    let schema = load::read_json(&dir.join(kind.schema_file())).await?;
    compile(kind, &schema)
}

fn compile(kind: DocumentKind, schema: &Value) -> Result<Validator, ContentError> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| ContentError::SchemaCompile {
            kind,
            message: err.to_string(),
        })
}
