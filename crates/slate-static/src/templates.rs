//! Template engine for rendering site pages.

use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use minijinja::{Environment, ErrorKind};
use serde::Serialize;

use slate_content::{slugify, Document};

use crate::builder::{SiteMeta, SocialLinks};

/// Names of the templates every site can render.
pub const TEMPLATE_NAMES: [&str; 5] = ["base.html", "index.html", "post.html", "tags.html", "tag.html"];

/// Default format of the `date` filter ("March 01, 2024").
pub const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

/// Links between paginated index pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    /// 1-based page number
    pub current: usize,
    /// Total number of pages
    pub total: usize,
    /// URL of the previous page
    pub prev_url: Option<String>,
    /// URL of the next page
    pub next_url: Option<String>,
}

/// A tag with the number of posts carrying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSummary {
    /// Tag as written in frontmatter
    pub name: String,
    /// URL of the tag page
    pub url: String,
    /// Number of posts
    pub count: usize,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, Serialize)]
pub struct Context<'a> {
    /// Site metadata
    pub site: &'a SiteMeta,
    /// Social profile links
    pub social: &'a SocialLinks,
    /// Current year, for footers
    pub year: i32,
    /// Page title (empty for the home page)
    pub title: String,
    /// Page description for meta tags
    pub description: String,
    /// Posts listed on this page
    pub posts: Vec<&'a Document>,
    /// The post shown on a detail page
    pub post: Option<&'a Document>,
    /// The tag shown on a tag page
    pub tag: Option<&'a str>,
    /// All tags, for the tag overview
    pub tags: Vec<TagSummary>,
    /// Index pagination
    pub pagination: Option<Pagination>,
}

impl<'a> Context<'a> {
    /// An empty context for the given site.
    pub fn new(site: &'a SiteMeta, social: &'a SocialLinks) -> Self {
        Self {
            site,
            social,
            year: Utc::now().year(),
            title: String::new(),
            description: site.description.clone(),
            posts: Vec::new(),
            post: None,
            tag: None,
            tags: Vec::new(),
            pagination: None,
        }
    }
}

/// Template engine using minijinja.
///
/// Templates found in the site's template directory take precedence over the
/// built-in ones of the same name.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine, overriding built-ins from `templates_dir`.
    pub fn new(templates_dir: Option<&Path>) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("date", format_date);
        env.add_filter("tagslug", |tag: String| slugify(&tag));

        let overrides = templates_dir.filter(|dir| dir.is_dir());
        if let Some(dir) = overrides {
            tracing::debug!("Loading templates from {}", dir.display());
            env.set_loader(minijinja::path_loader(dir.to_path_buf()));
        }

        for (name, source) in TEMPLATE_NAMES.iter().zip(BUILTIN_TEMPLATES) {
            if overrides.is_some_and(|dir| dir.join(name).is_file()) {
                tracing::info!("Using custom template {}", name);
                continue;
            }
            env.add_template_owned(name.to_string(), source.to_string())?;
        }

        Ok(Self { env })
    }

    /// Render a page using the specified template.
    pub fn render_page(&self, template: &str, context: &Context<'_>) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}

/// URL of the page listing posts tagged `tag`.
pub fn tag_url(tag: &str) -> String {
    format!("/tags/{}/", slugify(tag))
}

/// `date` filter: format an RFC 3339 timestamp with a strftime pattern.
fn format_date(value: String, format: Option<String>) -> Result<String, minijinja::Error> {
    let date = DateTime::parse_from_rfc3339(&value).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("not a timestamp: {} ({})", value, e),
        )
    })?;

    let format = format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT);
    Ok(date.format(format).to_string())
}

const BUILTIN_TEMPLATES: [&str; 5] = [
    BASE_TEMPLATE,
    INDEX_TEMPLATE,
    POST_TEMPLATE,
    TAGS_TEMPLATE,
    TAG_TEMPLATE,
];

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title %}{{ title }} | {% endif %}{{ site.title }}</title>
  <meta name="description" content="{{ description }}">
  {% if site.author %}<meta name="author" content="{{ site.author }}">{% endif %}
  <link rel="stylesheet" href="/css/main.css">
  <link rel="stylesheet" href="/css/highlight.css">
</head>
<body>
  <header class="site-header">
    <a class="site-title" href="/">{{ site.title }}</a>
    <nav class="site-nav">
      <a href="/tags/">Tags</a>
      {% if social.github %}<a href="https://github.com/{{ social.github }}">GitHub</a>{% endif %}
      {% if social.twitter %}<a href="https://twitter.com/{{ social.twitter }}">Twitter</a>{% endif %}
    </nav>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  <footer class="site-footer">
    &copy; {{ year }} {{ site.author or site.title }}
  </footer>
</body>
</html>"##;

const INDEX_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
{% if site.description and pagination and pagination.current == 1 %}
<p class="site-description">{{ site.description }}</p>
{% endif %}
<ul class="post-list">
{% for post in posts %}
  <li class="post-item">
    <a class="post-link" href="{{ post.url }}"><h2>{{ post.title }}</h2></a>
    <p class="post-meta">
      <time datetime="{{ post.date }}">{{ post.date | date }}</time>
      &middot; {{ post.reading_time }} min read
    </p>
    {% if post.summary %}<p class="post-summary">{{ post.summary }}</p>{% endif %}
  </li>
{% endfor %}
</ul>
{% if pagination and pagination.total > 1 %}
<nav class="pagination">
  {% if pagination.prev_url %}<a rel="prev" href="{{ pagination.prev_url }}">&larr; Newer</a>{% endif %}
  <span>Page {{ pagination.current }} of {{ pagination.total }}</span>
  {% if pagination.next_url %}<a rel="next" href="{{ pagination.next_url }}">Older &rarr;</a>{% endif %}
</nav>
{% endif %}
{% endblock %}"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="post">
  <header>
    <h1>{{ post.title }}</h1>
    <p class="post-meta">
      <time datetime="{{ post.date }}">{{ post.date | date }}</time>
      &middot; {{ post.reading_time }} min read
    </p>
    {% if post.tags %}
    <ul class="post-tags">
    {% for tag in post.tags %}
      <li><a href="/tags/{{ tag | tagslug }}/">{{ tag }}</a></li>
    {% endfor %}
    </ul>
    {% endif %}
  </header>
  <div class="content">
    {{ post.content | safe }}
  </div>
</article>
{% endblock %}"##;

const TAGS_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1>Tags</h1>
<ul class="tag-list">
{% for tag in tags %}
  <li><a href="{{ tag.url }}">{{ tag.name }}</a> ({{ tag.count }})</li>
{% endfor %}
</ul>
{% endblock %}"##;

const TAG_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<h1>Posts tagged &ldquo;{{ tag }}&rdquo;</h1>
<ul class="post-list">
{% for post in posts %}
  <li class="post-item">
    <a class="post-link" href="{{ post.url }}"><h2>{{ post.title }}</h2></a>
    <p class="post-meta"><time datetime="{{ post.date }}">{{ post.date | date }}</time></p>
  </li>
{% endfor %}
</ul>
{% endblock %}"##;
