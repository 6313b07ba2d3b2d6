//! Discovering and ordering every document under a content root.

use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::document::{Document, DocumentLoader};
use crate::error::LoadError;

/// All documents of one build, newest first.
///
/// Documents sharing a date keep the order they were discovered in, which is
/// ascending path order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Build a corpus from loaded documents, sorting them by date descending.
    pub fn new(mut documents: Vec<Document>) -> Self {
        documents.sort_by(|a, b| b.date.cmp(&a.date));
        Self { documents }
    }

    /// Documents in order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no documents were found.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Distinct tags, sorted, each with its documents in corpus order.
    pub fn tags(&self) -> BTreeMap<&str, Vec<&Document>> {
        let mut tags: BTreeMap<&str, Vec<&Document>> = BTreeMap::new();

        for doc in &self.documents {
            for tag in &doc.tags {
                let entry = tags.entry(tag.as_str()).or_default();
                // A tag listed twice on one document still lists it once.
                if !entry.iter().any(|d| std::ptr::eq(*d, doc)) {
                    entry.push(doc);
                }
            }
        }

        tags
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Loads every `.md` file below a directory.
#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    loader: DocumentLoader,
}

impl CorpusLoader {
    /// Create a corpus loader around a document loader.
    pub fn new(loader: DocumentLoader) -> Self {
        Self { loader }
    }

    /// Load and order every document under `root`.
    ///
    /// Fails on the first file that cannot be loaded; no partial corpus is
    /// returned.
    pub fn load(&self, root: &Path) -> Result<Corpus, LoadError> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                LoadError::new(path, std::io::Error::from(e))
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) {
                continue;
            }

            documents.push(self.loader.load(path)?);
        }

        tracing::info!("Loaded {} documents from {}", documents.len(), root.display());

        Ok(Corpus::new(documents))
    }
}

fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".md"))
}
