//! Site configuration (slate.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use slate_static::{BuildConfig, HighlightConfig, SiteMeta, SocialLinks};

/// Name of the config file at the site root.
pub const CONFIG_FILE: &str = "slate.toml";

/// Posts directory relative to the site root.
pub const CONTENT_DIR: &str = "content/posts";

/// Static files directory relative to the site root.
pub const STATIC_DIR: &str = "static";

/// Template overrides directory relative to the site root.
pub const TEMPLATES_DIR: &str = "templates";

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub social: SocialSection,
    #[serde(default)]
    pub highlight: HighlightSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SiteSection {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub output_dir: String,
    pub posts_per_page: usize,
    pub minify: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_dir: "public".to_string(),
            posts_per_page: 10,
            minify: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SocialSection {
    pub twitter: String,
    pub github: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightSection {
    pub enabled: bool,
    pub light_theme: String,
    pub dark_theme: String,
}

impl Default for HighlightSection {
    fn default() -> Self {
        let defaults = HighlightConfig::default();
        Self {
            enabled: defaults.enabled,
            light_theme: defaults.light_theme,
            dark_theme: defaults.dark_theme,
        }
    }
}

/// Load `slate.toml` from `site_dir`.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_config(site_dir: &Path) -> Result<ConfigFile> {
    let config_path = site_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        tracing::debug!("No {} found, using defaults", config_path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    tracing::info!("Loaded config from {}", config_path.display());

    Ok(config)
}

impl ConfigFile {
    /// Resolve into builder settings with paths rooted at `site_dir`.
    pub fn to_build_config(&self, site_dir: &Path) -> BuildConfig {
        BuildConfig {
            content_dir: site_dir.join(CONTENT_DIR),
            static_dir: site_dir.join(STATIC_DIR),
            templates_dir: Some(site_dir.join(TEMPLATES_DIR)),
            output_dir: site_dir.join(&self.build.output_dir),
            site: SiteMeta {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
                author: self.site.author.clone(),
                url: self.site.url.clone(),
            },
            social: SocialLinks {
                twitter: self.social.twitter.clone(),
                github: self.social.github.clone(),
            },
            posts_per_page: self.build.posts_per_page.max(1),
            minify: self.build.minify,
            highlight: HighlightConfig {
                enabled: self.highlight.enabled,
                light_theme: self.highlight.light_theme.clone(),
                dark_theme: self.highlight.dark_theme.clone(),
            },
        }
    }
}

/// Path of the config file for a site.
pub fn config_path(site_dir: &Path) -> PathBuf {
    site_dir.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_config_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = load_config(temp.path()).unwrap();
        let build = config.to_build_config(temp.path());

        assert_eq!(build.output_dir, temp.path().join("public"));
        assert_eq!(build.content_dir, temp.path().join("content/posts"));
        assert_eq!(build.posts_per_page, 10);
        assert!(build.minify);
        assert_eq!(build.highlight, HighlightConfig::default());
    }

    #[test]
    fn reads_partial_sections() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            r#"
[site]
title = "Field Notes"
url = "https://example.com"

[build]
posts_per_page = 5

[highlight]
enabled = false
"#,
        )
        .unwrap();

        let build = load_config(temp.path())
            .unwrap()
            .to_build_config(temp.path());

        assert_eq!(build.site.title, "Field Notes");
        assert_eq!(build.site.url, "https://example.com");
        assert_eq!(build.site.author, "");
        assert_eq!(build.posts_per_page, 5);
        assert_eq!(build.output_dir, temp.path().join("public"));
        assert!(!build.highlight.enabled);
        assert_eq!(build.highlight.light_theme, "InspiredGitHub");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "[site\ntitle = 1").unwrap();

        let err = load_config(temp.path()).unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn zero_posts_per_page_means_one() {
        let mut config = ConfigFile::default();
        config.build.posts_per_page = 0;

        assert_eq!(config.to_build_config(Path::new(".")).posts_per_page, 1);
    }
}
