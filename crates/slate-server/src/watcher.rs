//! File watching for rebuild-on-change.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period that closes a batch of filesystem events.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum WatchEvent {
    /// A Markdown post was created, modified or removed
    Content(PathBuf),

    /// A template changed
    Template(PathBuf),

    /// The site config changed
    Config(PathBuf),

    /// Any other file, such as a static asset
    Asset(PathBuf),
}

impl WatchEvent {
    /// The path that changed.
    pub fn path(&self) -> &Path {
        match self {
            Self::Content(p) | Self::Template(p) | Self::Config(p) | Self::Asset(p) => p,
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Create a new file watcher for the given paths.
    ///
    /// Directories are watched recursively, files on their own; paths that do
    /// not exist yet are skipped. Returns the watcher and a channel to receive
    /// events. Events stop once the watcher is dropped.
    pub fn new(
        paths: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), notify::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })?;

        for path in paths {
            if path.is_dir() {
                watcher.watch(path, RecursiveMode::Recursive)?;
            } else if path.is_file() {
                watcher.watch(path, RecursiveMode::NonRecursive)?;
            } else {
                tracing::debug!("Not watching missing path {}", path.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(first) = sync_rx.recv() {
                // Collect everything that arrives before the burst goes quiet
                let mut batch = BTreeSet::new();
                collect(&mut batch, first);
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    collect(&mut batch, event);
                }

                for event in batch {
                    if async_tx.blocking_send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

fn collect(batch: &mut BTreeSet<WatchEvent>, event: notify::Event) {
    for path in &event.paths {
        if let Some(e) = classify_event(path, &event.kind) {
            batch.insert(e);
        }
    }
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    if !matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return None;
    }

    let path = path.to_path_buf();
    let event = match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "md" => WatchEvent::Content(path),
        "html" => WatchEvent::Template(path),
        "toml" => WatchEvent::Config(path),
        _ => WatchEvent::Asset(path),
    };

    Some(event)
}
