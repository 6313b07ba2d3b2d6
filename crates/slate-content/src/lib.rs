//! Markdown content pipeline for slate.
//!
//! This crate turns a directory of Markdown files with JSON frontmatter into
//! an ordered corpus of rendered documents: frontmatter extraction, Markdown
//! rendering with class-based syntax highlighting for fenced code, and the
//! derived fields (slug, URL, reading time) templates need.

pub mod corpus;
pub mod document;
pub mod error;
pub mod frontmatter;
pub mod highlight;
pub mod markdown;

pub use corpus::{Corpus, CorpusLoader};
pub use document::{reading_time, slug_for, Document, DocumentLoader};
pub use error::{ContentError, LoadError};
pub use frontmatter::{parse_frontmatter, Frontmatter};
pub use highlight::{
    plain_code_block, CodeBlockRenderer, HighlightError, Highlighter, PlainCodeBlocks, CLASS_STYLE,
};
pub use markdown::{slugify, MarkdownRenderer, Rendered, TocEntry};
