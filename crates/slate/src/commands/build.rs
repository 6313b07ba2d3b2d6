//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use slate_static::StaticBuilder;

use crate::config::load_config;

/// Run the build command.
pub async fn run(site_dir: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building site in {}...", site_dir.display());

    let mut config = load_config(site_dir)?.to_build_config(site_dir);
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
    }

    let result = tokio::task::spawn_blocking(move || StaticBuilder::new(config)?.build()).await??;

    tracing::info!(
        "Built {} pages from {} posts in {}ms",
        result.pages,
        result.posts,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
