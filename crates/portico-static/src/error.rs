//! Build errors.

use std::path::PathBuf;

/// Errors that can occur during a build.
///
/// Every variant is fatal: the orchestrator stops at the first one and the
/// output directory is left as it was at that point.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Template not found: {name} (searched {})", display_paths(.searched))]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to render template {name}: {message}")]
    Template { name: String, message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to reset output directory {0}: it contains the project root")]
    UnsafeOutput(PathBuf),

    #[error("Invalid exclude pattern: {0}")]
    Pattern(String),
}

impl BuildError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no template roots".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
