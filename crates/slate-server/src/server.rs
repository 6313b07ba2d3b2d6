//! Development server implementation.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{
    http::{header, HeaderValue},
    middleware,
    response::Response,
    Router,
};
use tower_http::services::ServeDir;

use slate_static::{BuildConfig, BuildError, BuildResult, StaticBuilder};

use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site build settings; the output directory is what gets served
    pub build: BuildConfig,

    /// Files and directories whose changes trigger a rebuild
    pub watch_paths: Vec<PathBuf>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl DevServerConfig {
    /// Serve `build`, watching its content, static and template directories.
    pub fn new(build: BuildConfig) -> Self {
        let mut watch_paths = vec![build.content_dir.clone(), build.static_dir.clone()];
        watch_paths.extend(build.templates_dir.clone());

        Self {
            build,
            watch_paths,
            ..Default::default()
        }
    }
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            watch_paths: Vec::new(),
            port: 8080,
            host: "127.0.0.1".to_string(),
            open: false,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, then serve it until the process ends.
    pub async fn start(self) -> Result<(), ServerError> {
        let result = rebuild(self.config.build.clone()).await?;
        log_build(&result);

        let (watcher, rx) = FileWatcher::new(&self.config.watch_paths)?;
        tokio::spawn(watch_loop(watcher, rx, self.config.build.clone()));

        let bind = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&bind)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind.clone(),
                source,
            })?;
        let addr: SocketAddr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr: bind, source })?;

        let url = format!("http://{}", addr);
        tracing::info!("Serving {} at {}", self.config.build.output_dir.display(), url);

        if self.config.open {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, router(&self.config.build.output_dir))
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(())
    }
}

/// Static file router over the build output with caching disabled.
fn router(output_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(output_dir))
        .layer(middleware::map_response(no_cache))
}

async fn no_cache(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}

/// Rebuild on every batch of changes. Failures are logged and the last
/// good output keeps being served.
async fn watch_loop(
    watcher: FileWatcher,
    mut rx: tokio::sync::mpsc::Receiver<WatchEvent>,
    config: BuildConfig,
) {
    // Dropping the watcher closes the channel
    let _watcher = watcher;

    while let Some(event) = rx.recv().await {
        let mut events = vec![event];
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        for event in &events {
            tracing::debug!("Changed: {}", event.path().display());
            if let WatchEvent::Config(path) = event {
                tracing::warn!(
                    "{} changed; restart the server to apply new settings",
                    path.display()
                );
            }
        }
        tracing::info!("{} file(s) changed, rebuilding...", events.len());

        match rebuild(config.clone()).await {
            Ok(result) => log_build(&result),
            Err(e) => tracing::error!("Rebuild failed: {}", e),
        }
    }
}

/// Run a full build on the blocking pool.
///
/// The builder is recreated each time so template overrides are reloaded.
async fn rebuild(config: BuildConfig) -> Result<BuildResult, ServerError> {
    let result = tokio::task::spawn_blocking(move || StaticBuilder::new(config)?.build()).await??;
    Ok(result)
}

fn log_build(result: &BuildResult) {
    tracing::info!(
        "Built {} pages from {} posts in {}ms",
        result.pages,
        result.posts,
        result.duration_ms
    );
}
