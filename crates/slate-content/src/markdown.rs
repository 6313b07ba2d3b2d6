//! Markdown to HTML rendering.

use std::collections::HashSet;
use std::sync::Arc;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::error::ContentError;
use crate::highlight::{CodeBlockRenderer, Highlighter};

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Output of rendering one Markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Rendered HTML
    pub html: String,
    /// Headings in document order, with their anchor IDs
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with pluggable fenced code block handling.
#[derive(Clone)]
pub struct MarkdownRenderer {
    code_blocks: Arc<dyn CodeBlockRenderer>,
    options: Options,
}

impl MarkdownRenderer {
    /// Create a renderer that hands fenced code blocks to `code_blocks`.
    pub fn new(code_blocks: Arc<dyn CodeBlockRenderer>) -> Self {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;

        Self {
            code_blocks,
            options,
        }
    }

    /// Render a Markdown body to HTML.
    pub fn render(&self, body: &str) -> Result<Rendered, ContentError> {
        let mut events: Vec<Event<'_>> = Parser::new_ext(body, self.options).collect();

        let toc = assign_heading_ids(&mut events);
        let events = self.replace_code_blocks(events);

        let mut output = String::with_capacity(body.len() + body.len() / 2);
        html::write_html_fmt(&mut output, events.into_iter())
            .map_err(|e| ContentError::Render(e.to_string()))?;

        Ok(Rendered { html: output, toc })
    }

    /// Swap every fenced code block for the HTML of the injected renderer.
    fn replace_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut fence: Option<(String, String)> = None; // (language, code)

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    fence = Some((fence_language(&info).to_string(), String::new()));
                }

                Event::End(TagEnd::CodeBlock) if fence.is_some() => {
                    if let Some((language, code)) = fence.take() {
                        let html = self.code_blocks.render_code_block(&language, &code);
                        out.push(Event::Html(CowStr::from(html)));
                    }
                }

                Event::Text(text) => match fence.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => out.push(Event::Text(text)),
                },

                other => out.push(other),
            }
        }

        out
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(Arc::new(Highlighter::new()))
    }
}

impl std::fmt::Debug for MarkdownRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownRenderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Language tag of a fence: the first word of its info string.
fn fence_language(info: &str) -> &str {
    info.split_whitespace().next().unwrap_or("")
}

/// Give every heading an anchor ID and collect the table of contents.
fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut toc = Vec::new();

    // Footnote definitions are rendered with their label as `id`
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::FootnoteDefinition(label)) => Some(label.to_string()),
            _ => None,
        })
        .collect();

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { .. })) {
            continue;
        }

        let title = heading_text(&events[i + 1..]);

        if let Event::Start(Tag::Heading { level, id, .. }) = &mut events[i] {
            let base = match id.as_deref() {
                Some(explicit) if !explicit.is_empty() => explicit.to_string(),
                _ => slugify(&title),
            };
            let anchor = unique_id(base, &mut used);

            *id = Some(CowStr::from(anchor.clone()));
            toc.push(TocEntry {
                title,
                id: anchor,
                level: *level as u8,
            });
        }
    }

    toc
}

/// Plain text of a heading, up to its end tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();

    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }

    text
}

/// Reserve `base`, or `base-1`, `base-2`, ... when already taken.
fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{}-{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Convert text to a URL-safe slug.
///
/// Falls back to `heading` when nothing alphanumeric survives.
pub fn slugify(text: &str) -> String {
    let slug = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "heading".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PlainCodeBlocks;
    use pretty_assertions::assert_eq;

    fn plain() -> MarkdownRenderer {
        MarkdownRenderer::new(Arc::new(PlainCodeBlocks))
    }

    struct Marker;

    impl CodeBlockRenderer for Marker {
        fn render_code_block(&self, language: &str, code: &str) -> String {
            format!("<div data-lang=\"{}\">{}</div>", language, code.len())
        }
    }

    #[test]
    fn renders_basic_markdown() {
        let rendered = plain().render("# Hello\n\nSome *emphasis* and **strong**.\n").unwrap();

        assert_eq!(
            rendered.html,
            "<h1 id=\"hello\">Hello</h1>\n<p>Some <em>emphasis</em> and <strong>strong</strong>.</p>\n"
        );
    }

    #[test]
    fn deduplicates_heading_ids() {
        let rendered = plain()
            .render("## Setup\n\n## Setup\n\n## Setup\n\n## Setup 1\n")
            .unwrap();

        let ids: Vec<_> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1", "setup-2", "setup-1-1"]);
        assert!(rendered.html.contains("<h2 id=\"setup-2\">Setup</h2>"));
    }

    #[test]
    fn explicit_heading_ids_win() {
        let rendered = plain().render("# Intro {#start}\n\n# Start\n").unwrap();

        assert_eq!(rendered.toc[0].id, "start");
        assert_eq!(rendered.toc[0].title, "Intro");
        assert_eq!(rendered.toc[1].id, "start-1");
    }

    #[test]
    fn heading_text_includes_inline_code() {
        let rendered = plain().render("### The `render` API\n").unwrap();

        assert_eq!(
            rendered.toc,
            vec![TocEntry {
                title: "The render API".to_string(),
                id: "the-render-api".to_string(),
                level: 3,
            }]
        );
    }

    #[test]
    fn symbol_only_heading_gets_fallback_id() {
        let rendered = plain().render("# ???\n").unwrap();

        assert_eq!(rendered.toc[0].id, "heading");
    }

    #[test]
    fn delegates_fenced_blocks_to_renderer() {
        let renderer = MarkdownRenderer::new(Arc::new(Marker));
        let rendered = renderer
            .render("Intro\n\n```rust ignore\nfn main() {}\n```\n\n```\nplain\n```\n")
            .unwrap();

        assert!(rendered.html.contains("<div data-lang=\"rust\">13</div>"));
        assert!(rendered.html.contains("<div data-lang=\"\">6</div>"));
        assert!(!rendered.html.contains("<pre>"));
    }

    #[test]
    fn indented_code_uses_default_rendering() {
        let renderer = MarkdownRenderer::new(Arc::new(Marker));
        let rendered = renderer.render("Text\n\n    let x = 1;\n").unwrap();

        assert!(rendered.html.contains("<pre><code>let x = 1;\n</code></pre>"));
        assert!(!rendered.html.contains("data-lang"));
    }

    #[test]
    fn unknown_language_never_fails_render() {
        let rendered = MarkdownRenderer::default()
            .render("```klingon\nqapla <batlh> & more\n```\n")
            .unwrap();

        assert_eq!(
            rendered.html,
            "<pre><code class=\"language-klingon\">qapla &lt;batlh&gt; &amp; more\n</code></pre>\n"
        );
    }

    #[test]
    fn known_language_output_is_escaped() {
        let rendered = MarkdownRenderer::default()
            .render("```rust\nlet ok = a < b && c;\n```\n")
            .unwrap();

        assert!(rendered.html.contains("class=\"hl-"));
        assert!(!rendered.html.contains("a < b"));
        assert!(!rendered.html.contains("&& c"));
    }

    #[test]
    fn heading_ids_avoid_footnote_labels() {
        let source = "# note\n\nSee this[^note].\n\n[^note]: The footnote.\n";
        let rendered = plain().render(source).unwrap();

        assert!(rendered.html.contains("<h1 id=\"note-1\">note</h1>"));
        assert!(rendered.html.contains("class=\"footnote-definition\" id=\"note\""));
        assert_eq!(rendered.toc[0].id, "note-1");
    }

    #[test]
    fn renders_tables_and_footnotes() {
        let source = "| a | b |\n|---|---|\n| 1 | 2 |\n\nNote[^1].\n\n[^1]: The footnote.\n";
        let rendered = plain().render(source).unwrap();

        assert!(rendered.html.contains("<table>"));
        assert!(rendered.html.contains("<td>1</td>"));
        assert!(rendered.html.contains("footnote-reference"));
        assert!(rendered.html.contains("footnote-definition"));
    }

    #[test]
    fn void_elements_are_self_closed() {
        let rendered = plain().render("![alt](/img.png)\n\n---\n\nline  \nbreak\n").unwrap();

        assert!(rendered.html.contains("<img src=\"/img.png\" alt=\"alt\" />"));
        assert!(rendered.html.contains("<hr />"));
        assert!(rendered.html.contains("<br />"));
    }

    #[test]
    fn renders_nested_lists_links_and_quotes() {
        let source = "- one\n  1. inner\n- [two](https://example.com)\n\n> quoted\n";
        let rendered = plain().render(source).unwrap();

        assert!(rendered.html.contains("<ul>"));
        assert!(rendered.html.contains("<ol>"));
        assert!(rendered.html.contains("<a href=\"https://example.com\">two</a>"));
        assert!(rendered.html.contains("<blockquote>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let source = "# A\n\n# A\n\n```python\nprint('x')\n```\n";
        let renderer = MarkdownRenderer::default();

        assert_eq!(renderer.render(source).unwrap(), renderer.render(source).unwrap());
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("!!!"), "heading");
    }
}
