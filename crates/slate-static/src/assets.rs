//! Stylesheet generation and processing.

use slate_content::{HighlightError, Highlighter};

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main site stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the code highlighting stylesheet.
    ///
    /// `light` styles the page by default; `dark` applies under
    /// `prefers-color-scheme: dark`. Both target the same class names, so
    /// rendered posts never need to change when themes do.
    pub fn highlight_css(light: &str, dark: &str) -> Result<String, HighlightError> {
        let highlighter = Highlighter::new();
        let light_css = highlighter.stylesheet(light)?;
        let dark_css = highlighter.stylesheet(dark)?;

        let mut css = String::with_capacity(light_css.len() + dark_css.len() + 128);
        css.push_str(&light_css);
        css.push_str("\n/* Dark theme syntax highlighting */\n");
        css.push_str("@media (prefers-color-scheme: dark) {\n");
        for line in dark_css.lines().filter(|l| !l.trim().is_empty()) {
            css.push_str("  ");
            css.push_str(line);
            css.push('\n');
        }
        css.push_str("}\n");

        Ok(css)
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* slate default theme */

:root {
  --content-width: 720px;
  --background: #ffffff;
  --foreground: #2e3440;
  --muted: #6b7280;
  --accent: #5e81ac;
  --border: #e5e7eb;
  --code-background: #f6f8fa;
}

@media (prefers-color-scheme: dark) {
  :root {
    --background: #1f232a;
    --foreground: #e5e9f0;
    --muted: #9ca3af;
    --accent: #88c0d0;
    --border: #3b4252;
    --code-background: #2b303b;
  }
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.7;
}

a {
  color: var(--accent);
}

.site-header,
.main,
.site-footer {
  max-width: var(--content-width);
  margin: 0 auto;
  padding: 1.5rem 1rem;
}

.site-header {
  display: flex;
  justify-content: space-between;
  align-items: baseline;
  border-bottom: 1px solid var(--border);
}

.site-title {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.site-nav a {
  margin-left: 1rem;
  text-decoration: none;
}

.site-footer {
  color: var(--muted);
  font-size: 0.875rem;
  border-top: 1px solid var(--border);
}

.post-list {
  list-style: none;
  padding: 0;
}

.post-item {
  margin-bottom: 2rem;
}

.post-link {
  color: inherit;
  text-decoration: none;
}

.post-link h2 {
  margin-bottom: 0.25rem;
}

.post-meta {
  color: var(--muted);
  font-size: 0.875rem;
  margin-top: 0;
}

.post-tags {
  display: flex;
  gap: 0.5rem;
  list-style: none;
  padding: 0;
}

.post-tags a {
  font-size: 0.8rem;
  padding: 0.1rem 0.5rem;
  border: 1px solid var(--border);
  border-radius: 999px;
  text-decoration: none;
}

.pagination {
  display: flex;
  justify-content: space-between;
  color: var(--muted);
}

.content img {
  max-width: 100%;
}

.content pre {
  padding: 1rem;
  border-radius: 0.375rem;
  overflow-x: auto;
  font-size: 0.875rem;
}

/* Highlighted blocks take their colors from highlight.css */
.content pre:not(.highlight) {
  background: var(--code-background);
}

.content code {
  font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
}

.content table {
  border-collapse: collapse;
}

.content th,
.content td {
  border: 1px solid var(--border);
  padding: 0.375rem 0.75rem;
}

.content blockquote {
  margin-left: 0;
  padding-left: 1rem;
  border-left: 3px solid var(--border);
  color: var(--muted);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minifies_generated_css() {
        let css = AssetPipeline::generate_css();
        let minified = AssetPipeline::minify_css(&css).unwrap();

        assert!(minified.len() < css.len());
        assert!(minified.contains(".post-list"));
    }

    #[test]
    fn main_css_leaves_highlighted_blocks_to_theme() {
        let css = AssetPipeline::generate_css();

        assert!(css.contains(".content pre:not(.highlight)"));
        assert!(!css.contains(".content pre {\n  background"));
    }

    #[test]
    fn highlight_css_wraps_dark_theme_in_media_query() {
        let css = AssetPipeline::highlight_css("InspiredGitHub", "base16-ocean.dark").unwrap();

        let media = css.find("@media (prefers-color-scheme: dark)").unwrap();
        assert!(css[..media].contains(".hl-"));
        assert!(css[media..].contains(".hl-"));
        assert!(css.trim_end().ends_with('}'));
    }

    #[test]
    fn highlight_css_minifies() {
        let css = AssetPipeline::highlight_css("InspiredGitHub", "base16-ocean.dark").unwrap();

        assert!(AssetPipeline::minify_css(&css).is_ok());
    }

    #[test]
    fn rejects_unknown_theme() {
        assert!(AssetPipeline::highlight_css("nope", "base16-ocean.dark").is_err());
    }
}
