use std::path::PathBuf;

use thiserror::Error;

use crate::schema::DocumentKind;

/// Errors raised while loading content or preparing the schema set.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} does not describe a {kind}: {source}", .path.display())]
    Shape {
        path: PathBuf,
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to compile {kind} schema: {message}")]
    SchemaCompile { kind: DocumentKind, message: String },
}

impl ContentError {
    /// Returns true when the error means the file does not exist at all.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
