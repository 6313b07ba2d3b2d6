//! Development server command.

use std::path::Path;

use anyhow::Result;
use slate_server::{DevServer, DevServerConfig};

use crate::config::{config_path, load_config};

/// Run the dev server.
pub async fn run(site_dir: &Path, host: String, port: u16, open: bool) -> Result<()> {
    let build = load_config(site_dir)?.to_build_config(site_dir);

    let mut config = DevServerConfig::new(build);
    config.watch_paths.push(config_path(site_dir));
    config.host = host;
    config.port = port;
    config.open = open;

    DevServer::new(config).start().await?;

    Ok(())
}
