//! Create a new post.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use slate_content::slugify;

use crate::config::CONTENT_DIR;

/// Run the new command, returning the path of the created post.
pub async fn run(site_dir: &Path, title: &str, tags: Vec<String>) -> Result<PathBuf> {
    if !title.chars().any(char::is_alphanumeric) {
        bail!("Post title must contain at least one letter or digit");
    }

    let posts_dir = site_dir.join(CONTENT_DIR);
    let path = posts_dir.join(format!("{}.md", slugify(title)));
    if path.exists() {
        bail!("Post already exists: {}", path.display());
    }

    fs::create_dir_all(&posts_dir).context("Failed to create posts directory")?;
    fs::write(&path, post_source(title, tags)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Created {}", path.display());
    Ok(path)
}

fn post_source(title: &str, tags: Vec<String>) -> Result<String> {
    let frontmatter = serde_json::json!({
        "title": title,
        "date": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "tags": tags,
        "summary": "",
    });
    let frontmatter = serde_json::to_string_pretty(&frontmatter)?;

    Ok(format!("---\n{}\n---\n\nWrite your post here.\n", frontmatter))
}
