//! Loading a single Markdown file into a [`Document`].

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::LoadError;
use crate::frontmatter::parse_frontmatter;
use crate::highlight::CodeBlockRenderer;
use crate::markdown::{MarkdownRenderer, TocEntry};

/// Words per minute used for the reading time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// A fully rendered document, ready for templating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Title from frontmatter
    pub title: String,

    /// Publication date from frontmatter
    pub date: DateTime<Utc>,

    /// Tags from frontmatter
    pub tags: Vec<String>,

    /// Summary from frontmatter
    pub summary: String,

    /// Rendered HTML body (trusted, not escaped by templates)
    pub content: String,

    /// Site-relative URL, always `/{slug}/`
    pub url: String,

    /// Estimated reading time in minutes (at least 1)
    pub reading_time: usize,

    /// Source file name without the `.md` extension
    pub slug: String,

    /// Headings of the rendered body
    pub toc: Vec<TocEntry>,
}

/// Loads documents from disk.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    renderer: MarkdownRenderer,
}

impl DocumentLoader {
    /// Create a loader that highlights code with the bundled grammars.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with a custom fenced code block renderer.
    pub fn with_code_blocks(code_blocks: Arc<dyn CodeBlockRenderer>) -> Self {
        Self {
            renderer: MarkdownRenderer::new(code_blocks),
        }
    }

    /// Load and render one Markdown file.
    pub fn load(&self, path: &Path) -> Result<Document, LoadError> {
        let source = fs::read_to_string(path).map_err(|e| LoadError::new(path, e))?;

        let (frontmatter, body) = parse_frontmatter(&source).map_err(|e| LoadError::new(path, e))?;
        let rendered = self.renderer.render(body).map_err(|e| LoadError::new(path, e))?;

        let slug = slug_for(path);
        tracing::debug!("Loaded {} as /{}/", path.display(), slug);

        Ok(Document {
            title: frontmatter.title,
            date: frontmatter.date,
            tags: frontmatter.tags,
            summary: frontmatter.summary,
            content: rendered.html,
            url: format!("/{}/", slug),
            reading_time: reading_time(body),
            slug,
            toc: rendered.toc,
        })
    }
}

/// File name with a trailing `.md` removed; directories play no part.
pub fn slug_for(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    name.strip_suffix(".md").unwrap_or(&*name).to_string()
}

/// Minutes needed to read `body`, counting whitespace-separated runs as words.
///
/// Markdown syntax is counted as part of the words it touches.
pub fn reading_time(body: &str) -> usize {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentError;
    use crate::highlight::PlainCodeBlocks;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn reading_time_rounds_up_with_floor_of_one() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("word"), 1);
        assert_eq!(reading_time(&"w ".repeat(200)), 1);
        assert_eq!(reading_time(&"w ".repeat(201)), 2);
        assert_eq!(reading_time(&"w\n".repeat(400)), 2);
        assert_eq!(reading_time(&"w\t".repeat(401)), 3);
    }

    #[test]
    fn markdown_syntax_counts_as_words() {
        assert_eq!("## **bold** - [link](x)".split_whitespace().count(), 4);
    }

    #[test]
    fn slug_ignores_directories() {
        assert_eq!(slug_for(Path::new("my-post.md")), "my-post");
        assert_eq!(slug_for(Path::new("posts/2024/deep/my-post.md")), "my-post");
        assert_eq!(slug_for(Path::new("notes.v2.md")), "notes.v2");
    }

    #[test]
    fn loads_complete_document() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("2024").join("march");
        fs::create_dir_all(&nested).unwrap();
        let path = nested.join("my-post.md");
        fs::write(
            &path,
            "---\n{\"title\": \"My Post\", \"date\": \"2024-03-01T00:00:00Z\", \"tags\": [\"rust\"], \"summary\": \"Hi\"}\n---\n# Heading\n\nSome words here.\n",
        )
        .unwrap();

        let doc = DocumentLoader::new().load(&path).unwrap();

        assert_eq!(doc.title, "My Post");
        assert_eq!(doc.tags, vec!["rust".to_string()]);
        assert_eq!(doc.summary, "Hi");
        assert_eq!(doc.slug, "my-post");
        assert_eq!(doc.url, "/my-post/");
        assert_eq!(doc.reading_time, 1);
        assert_eq!(
            doc.content,
            "<h1 id=\"heading\">Heading</h1>\n<p>Some words here.</p>\n"
        );
        assert_eq!(doc.toc.len(), 1);
    }

    #[test]
    fn loads_document_without_frontmatter() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bare.md");
        fs::write(&path, "Just text.").unwrap();

        let doc = DocumentLoader::with_code_blocks(Arc::new(PlainCodeBlocks))
            .load(&path)
            .unwrap();

        assert_eq!(doc.title, "");
        assert_eq!(doc.date, DateTime::<Utc>::default());
        assert_eq!(doc.content, "<p>Just text.</p>\n");
    }

    #[test]
    fn reading_time_uses_raw_body_only() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("long.md");
        let body = "word ".repeat(400);
        fs::write(&path, format!("---\n{{\"summary\": \"{}\"}}\n---\n{}", "x ".repeat(500), body))
            .unwrap();

        let doc = DocumentLoader::new().load(&path).unwrap();

        assert_eq!(doc.reading_time, 2);
    }

    #[test]
    fn errors_carry_the_file_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.md");
        fs::write(&path, "---\n{\"title\": \"never closed\"}\n").unwrap();

        let err = DocumentLoader::new().load(&path).unwrap_err();

        assert_eq!(err.path, path);
        assert!(matches!(err.source, ContentError::MalformedFrontmatter));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = PathBuf::from("/definitely/not/here.md");

        let err = DocumentLoader::new().load(&path).unwrap_err();

        assert!(matches!(err.source, ContentError::Io(_)));
    }

    #[test]
    fn loading_twice_is_identical() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("stable.md");
        fs::write(
            &path,
            "# Same\n\n# Same\n\n```rust\nfn main() { let x = 1 < 2; }\n```\n",
        )
        .unwrap();

        let loader = DocumentLoader::new();

        assert_eq!(loader.load(&path).unwrap(), loader.load(&path).unwrap());
    }
}
