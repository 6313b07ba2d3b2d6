//! Development server for slate blogs.
//!
//! Builds the site once, serves the output directory, and rebuilds whenever
//! content, templates, static files or the config change.

pub mod server;
pub mod watcher;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
