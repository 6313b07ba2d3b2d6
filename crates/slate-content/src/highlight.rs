//! Syntax highlighting for fenced code blocks.
//!
//! Highlighted output carries CSS classes rather than inline colors, so the
//! look of every code block is decided by a stylesheet generated from the same
//! class scheme (see [`Highlighter::stylesheet`]).

use std::sync::LazyLock;

use pulldown_cmark_escape::{escape_html, FmtWriter};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// Class scheme shared by rendered content and generated stylesheets.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Process-wide grammars and themes, loaded on first use and never mutated.
static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::load);

struct Registry {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Registry {
    fn load() -> Self {
        tracing::debug!("Loading syntax highlighting registry");
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }
}

/// Renders a fenced code block to HTML.
///
/// Implementations must always return renderable HTML; a failure to do
/// anything clever degrades to [`plain_code_block`].
pub trait CodeBlockRenderer: Send + Sync {
    /// Render `code` declared with `language` (empty when the fence has no tag).
    fn render_code_block(&self, language: &str, code: &str) -> String;
}

/// Errors produced while generating highlighting stylesheets.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("Unknown highlight theme: {0}")]
    UnknownTheme(String),

    #[error("Failed to generate CSS for theme {theme}: {message}")]
    Css { theme: String, message: String },
}

/// Class-based syntax highlighter backed by syntect's bundled grammars.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlighter;

impl Highlighter {
    /// Create a highlighter using the process-wide registry.
    pub fn new() -> Self {
        Self
    }

    /// Generate CSS for the highlighting class scheme from a bundled theme.
    pub fn stylesheet(&self, theme: &str) -> Result<String, HighlightError> {
        let theme_data = REGISTRY
            .themes
            .themes
            .get(theme)
            .ok_or_else(|| HighlightError::UnknownTheme(theme.to_string()))?;

        css_for_theme_with_class_style(theme_data, CLASS_STYLE).map_err(|e| HighlightError::Css {
            theme: theme.to_string(),
            message: e.to_string(),
        })
    }

    /// Tokenize `code` and emit the classed spans, or `None` on any failure.
    fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = REGISTRY.syntaxes.find_syntax_by_token(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &REGISTRY.syntaxes, CLASS_STYLE);

        for line in LinesWithEndings::from(code) {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::warn!("Highlighting {} failed, using plain output: {}", language, e);
                return None;
            }
        }

        // `hl-code` carries the theme's base foreground and background
        Some(format!(
            "<pre class=\"highlight hl-code\"><code class=\"language-{}\">{}</code></pre>\n",
            escape(language),
            generator.finalize()
        ))
    }
}

impl CodeBlockRenderer for Highlighter {
    fn render_code_block(&self, language: &str, code: &str) -> String {
        if language.is_empty() {
            return plain_code_block(language, code);
        }

        self.highlight(language, code)
            .unwrap_or_else(|| plain_code_block(language, code))
    }
}

/// Code block renderer that never highlights.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodeBlocks;

impl CodeBlockRenderer for PlainCodeBlocks {
    fn render_code_block(&self, language: &str, code: &str) -> String {
        plain_code_block(language, code)
    }
}

/// Escaped `<pre><code>` block, tagged with `language-{lang}` when a language is given.
pub fn plain_code_block(language: &str, code: &str) -> String {
    if language.is_empty() {
        format!("<pre><code>{}</code></pre>\n", escape(code))
    } else {
        format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            escape(language),
            escape(code)
        )
    }
}

/// HTML-escape `text` for element content and quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail
    let _ = escape_html(FmtWriter(&mut out), text);
    out
}
