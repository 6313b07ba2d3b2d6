//! Error types for content loading.

use std::path::PathBuf;

/// Errors that can occur while turning one source file into a document.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Malformed frontmatter - missing closing ---")]
    MalformedFrontmatter,

    #[error("Invalid metadata format in frontmatter: {0}")]
    InvalidMetadataFormat(#[source] serde_json::Error),

    #[error("Failed to render markdown: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`ContentError`] tagged with the file that caused it.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load {}: {source}", path.display())]
pub struct LoadError {
    /// Source file (or directory, for discovery failures)
    pub path: PathBuf,

    /// Underlying failure
    pub source: ContentError,
}

impl LoadError {
    pub(crate) fn new(path: impl Into<PathBuf>, source: impl Into<ContentError>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}
