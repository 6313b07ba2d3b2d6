//! Scaffold a new site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{CONFIG_FILE, CONTENT_DIR, STATIC_DIR};

/// Run the init command.
pub async fn run(site_dir: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing slate site in {}...", site_dir.display());

    let config_path = site_dir.join(CONFIG_FILE);
    if config_path.exists() && !yes {
        tracing::warn!("{} already exists. Use --yes to overwrite.", CONFIG_FILE);
        return Ok(());
    }

    let posts_dir = site_dir.join(CONTENT_DIR);
    fs::create_dir_all(&posts_dir).context("Failed to create posts directory")?;
    fs::create_dir_all(site_dir.join(STATIC_DIR)).context("Failed to create static directory")?;

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;
    tracing::info!("Created {}", CONFIG_FILE);

    let hello = posts_dir.join("hello-world.md");
    if !hello.exists() || yes {
        fs::write(&hello, DEFAULT_POST).context("Failed to write hello-world.md")?;
        tracing::info!("Created {}/hello-world.md", CONTENT_DIR);
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'slate serve' to preview the site.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# slate configuration

[site]
title = "My Blog"
description = "Thoughts and notes"
author = ""
# Absolute URL of the deployed site; enables sitemap.xml and robots.txt
url = ""

[build]
output_dir = "public"
posts_per_page = 10
minify = true

[social]
twitter = ""
github = ""

[highlight]
enabled = true
light_theme = "InspiredGitHub"
dark_theme = "base16-ocean.dark"
"#;

const DEFAULT_POST: &str = r#"---
{
  "title": "Hello, World",
  "date": "2024-01-01",
  "tags": ["meta"],
  "summary": "The first post on this blog."
}
---

Welcome to your new blog. Posts live in `content/posts` as Markdown files
with JSON frontmatter.

## Code

Fenced code blocks are highlighted at build time:

```rust
fn main() {
    println!("Hello, world!");
}
```

Run `slate new "My Next Post"` to start writing.
"#;
