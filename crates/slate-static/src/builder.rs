//! Static site builder.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use slate_content::{
    CodeBlockRenderer, Corpus, CorpusLoader, Document, DocumentLoader, HighlightError,
    Highlighter, LoadError, PlainCodeBlocks,
};

use crate::assets::AssetPipeline;
use crate::templates::{tag_url, Context, Pagination, TagSummary, TemplateEngine};

/// Site metadata exposed to every template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteMeta {
    /// Site title
    pub title: String,
    /// Site description
    pub description: String,
    /// Author name
    pub author: String,
    /// Absolute base URL (used for the sitemap), e.g. `https://example.com`
    pub url: String,
}

/// Social profile handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SocialLinks {
    /// Twitter handle
    pub twitter: String,
    /// GitHub user name
    pub github: String,
}

/// Code highlighting settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightConfig {
    /// Highlight fenced code blocks (plain escaped output otherwise)
    pub enabled: bool,
    /// Theme for the default (light) stylesheet
    pub light_theme: String,
    /// Theme used under `prefers-color-scheme: dark`
    pub dark_theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory containing the Markdown posts
    pub content_dir: PathBuf,

    /// Directory copied verbatim into the output
    pub static_dir: PathBuf,

    /// Directory with template overrides
    pub templates_dir: Option<PathBuf>,

    /// Output directory
    pub output_dir: PathBuf,

    /// Site metadata
    pub site: SiteMeta,

    /// Social links
    pub social: SocialLinks,

    /// Posts per index page
    pub posts_per_page: usize,

    /// Minify generated CSS
    pub minify: bool,

    /// Highlighting settings
    pub highlight: HighlightConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/posts"),
            static_dir: PathBuf::from("static"),
            templates_dir: None,
            output_dir: PathBuf::from("public"),
            site: SiteMeta::default(),
            social: SocialLinks::default(),
            posts_per_page: 10,
            minify: true,
            highlight: HighlightConfig::default(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of posts rendered
    pub posts: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    ContentError(#[from] LoadError),

    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to render template: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    HighlightError(#[from] HighlightError),

    #[error("Failed to process asset: {0}")]
    AssetError(String),
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    loader: CorpusLoader,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let code_blocks: Arc<dyn CodeBlockRenderer> = if config.highlight.enabled {
            Arc::new(Highlighter::new())
        } else {
            Arc::new(PlainCodeBlocks)
        };

        let templates = TemplateEngine::new(config.templates_dir.as_deref())?;

        Ok(Self {
            loader: CorpusLoader::new(DocumentLoader::with_code_blocks(code_blocks)),
            templates,
            config,
        })
    }

    /// Build the static site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let out = &self.config.output_dir;

        fs::create_dir_all(out).map_err(|e| write_error(out, e))?;

        self.copy_static()?;

        let corpus = self.loader.load(&self.config.content_dir)?;

        let unique = unique_posts(&corpus);
        let mut pages = self.build_index(&unique)?;

        // Post pages are independent of each other
        let posts: Vec<Result<(), BuildError>> = unique
            .par_iter()
            .map(|doc| self.build_post(doc))
            .collect();
        for result in posts {
            result?;
        }
        pages += unique.len();

        pages += self.build_tags(&corpus, &unique)?;

        self.generate_assets()?;
        self.generate_sitemap(&unique)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages,
            posts: corpus.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: out.clone(),
        })
    }

    /// Copy the static directory into the output, preserving layout.
    fn copy_static(&self) -> Result<(), BuildError> {
        let static_dir = &self.config.static_dir;

        if !static_dir.is_dir() {
            tracing::warn!("Static directory not found: {}", static_dir.display());
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(static_dir).to_path_buf();
                BuildError::ReadError {
                    path,
                    source: e.into(),
                }
            })?;

            let relative = entry.path().strip_prefix(static_dir).unwrap_or(entry.path());
            let dest = self.config.output_dir.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| write_error(&dest, e))?;
            } else {
                fs::copy(entry.path(), &dest).map_err(|e| write_error(&dest, e))?;
                copied += 1;
            }
        }

        tracing::debug!("Copied {} static files from {}", copied, static_dir.display());
        Ok(())
    }

    /// Render the paginated post index; returns the number of pages written.
    fn build_index(&self, posts: &[&Document]) -> Result<usize, BuildError> {
        let per_page = self.config.posts_per_page.max(1);
        let chunks: Vec<&[&Document]> = if posts.is_empty() {
            vec![posts]
        } else {
            posts.chunks(per_page).collect()
        };
        let total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            let current = i + 1;
            let mut ctx = self.context();
            ctx.posts = chunk.to_vec();
            ctx.pagination = Some(Pagination {
                current,
                total,
                prev_url: (current > 1).then(|| page_url(current - 1)),
                next_url: (current < total).then(|| page_url(current + 1)),
            });
            if current > 1 {
                ctx.title = format!("Page {}", current);
            }

            let html = self.templates.render_page("index.html", &ctx)?;
            self.write_page(&page_url(current), &html)?;
        }

        Ok(total)
    }

    /// Render the detail page of one post.
    fn build_post(&self, doc: &Document) -> Result<(), BuildError> {
        let mut ctx = self.context();
        ctx.title = doc.title.clone();
        if !doc.summary.is_empty() {
            ctx.description = doc.summary.clone();
        }
        ctx.post = Some(doc);

        let html = self.templates.render_page("post.html", &ctx)?;
        self.write_page(&doc.url, &html)
    }

    /// Render the tag overview and one page per tag; returns pages written.
    fn build_tags(&self, corpus: &Corpus, posts: &[&Document]) -> Result<usize, BuildError> {
        let published: HashSet<*const Document> =
            posts.iter().map(|d| *d as *const Document).collect();

        // Tags whose slugs collide share a page, named after the first one seen
        let mut by_url: BTreeMap<String, (&str, Vec<&Document>)> = BTreeMap::new();
        for (tag, docs) in corpus.tags() {
            for doc in docs {
                if !published.contains(&(doc as *const Document)) {
                    continue;
                }
                let (_, listed) = by_url.entry(tag_url(tag)).or_insert_with(|| (tag, Vec::new()));
                if !listed.iter().any(|d| std::ptr::eq(*d, doc)) {
                    listed.push(doc);
                }
            }
        }

        let mut summaries = Vec::with_capacity(by_url.len());
        for (url, (name, mut docs)) in by_url {
            docs.sort_by(|a, b| b.date.cmp(&a.date));

            let mut ctx = self.context();
            ctx.title = format!("Tag: {}", name);
            ctx.tag = Some(name);
            ctx.posts = docs;

            let html = self.templates.render_page("tag.html", &ctx)?;
            self.write_page(&url, &html)?;

            summaries.push(TagSummary {
                name: name.to_string(),
                url,
                count: ctx.posts.len(),
            });
        }

        let pages = summaries.len() + 1;
        let mut ctx = self.context();
        ctx.title = "Tags".to_string();
        ctx.tags = summaries;

        let html = self.templates.render_page("tags.html", &ctx)?;
        self.write_page("/tags/", &html)?;

        Ok(pages)
    }

    /// Generate stylesheets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let css_dir = self.config.output_dir.join("css");
        fs::create_dir_all(&css_dir).map_err(|e| write_error(&css_dir, e))?;

        let highlight = &self.config.highlight;
        let stylesheets = [
            ("main.css", AssetPipeline::generate_css()),
            (
                "highlight.css",
                AssetPipeline::highlight_css(&highlight.light_theme, &highlight.dark_theme)?,
            ),
        ];

        for (name, css) in stylesheets {
            let css = if self.config.minify {
                AssetPipeline::minify_css(&css).map_err(BuildError::AssetError)?
            } else {
                css
            };
            let path = css_dir.join(name);
            fs::write(&path, css).map_err(|e| write_error(&path, e))?;
        }

        Ok(())
    }

    /// Generate sitemap.xml and robots.txt when the site URL is known.
    fn generate_sitemap(&self, posts: &[&Document]) -> Result<(), BuildError> {
        let base = self.config.site.url.trim_end_matches('/');
        if base.is_empty() {
            tracing::debug!("No site url configured, skipping sitemap");
            return Ok(());
        }
        if base.chars().any(char::is_control) {
            tracing::warn!("Site url contains control characters, skipping sitemap");
            return Ok(());
        }

        let mut urls = vec![format!(
            "  <url>\n    <loc>{}</loc>\n  </url>",
            escape_xml(&format!("{}/", base))
        )];
        urls.extend(posts.iter().map(|doc| {
            format!(
                "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>",
                escape_xml(&format!("{}{}", base, doc.url)),
                doc.date.format("%Y-%m-%d")
            )
        }));

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>
"#,
            urls.join("\n")
        );

        let path = self.config.output_dir.join("sitemap.xml");
        fs::write(&path, sitemap).map_err(|e| write_error(&path, e))?;

        let robots = format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n", base);
        let path = self.config.output_dir.join("robots.txt");
        fs::write(&path, robots).map_err(|e| write_error(&path, e))?;

        Ok(())
    }

    fn context(&self) -> Context<'_> {
        Context::new(&self.config.site, &self.config.social)
    }

    /// Write `html` as the index file of the site-relative `url`.
    fn write_page(&self, url: &str, html: &str) -> Result<(), BuildError> {
        let dir = self.config.output_dir.join(url.trim_matches('/'));
        fs::create_dir_all(&dir).map_err(|e| write_error(&dir, e))?;

        let path = dir.join("index.html");
        fs::write(&path, html).map_err(|e| write_error(&path, e))?;
        tracing::debug!("Wrote {}", path.display());

        Ok(())
    }
}

/// URL of the n-th (1-based) index page.
fn page_url(n: usize) -> String {
    if n == 1 {
        "/".to_string()
    } else {
        format!("/page/{}/", n)
    }
}

/// Top-level directories the builder writes itself.
const RESERVED_SLUGS: [&str; 3] = ["page", "tags", "css"];

/// Posts that get a page of their own: the newest post wins a shared slug.
fn unique_posts(corpus: &Corpus) -> Vec<&Document> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(corpus.len());
    for doc in corpus {
        if RESERVED_SLUGS.contains(&doc.slug.as_str()) {
            tracing::warn!(
                "Skipping {}: slug '{}' is used by generated pages",
                doc.title,
                doc.slug
            );
            continue;
        }
        if !seen.insert(doc.slug.as_str()) {
            tracing::warn!("Skipping {}: slug '{}' is already taken", doc.title, doc.slug);
            continue;
        }
        unique.push(doc);
    }
    unique
}

/// Escape text for XML element content and attributes.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn write_error(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::WriteError {
        path: path.to_path_buf(),
        source,
    }
}
