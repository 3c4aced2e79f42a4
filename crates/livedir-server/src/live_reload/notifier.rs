//! Filesystem change notifier.
//!
//! Watches the served root and turns every filesystem event into a signal
//! for the connected clients. Events are not debounced: an editor that
//! writes a file three times reloads the page three times.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::registry::{ClientRegistry, Signal};

/// Marker that makes a change stylesheet-only.
const STYLESHEET_MARKER: &str = ".css";

/// How a change should be applied in the browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// Only stylesheets changed; swap them in place.
    Style,
    /// Anything else; reload the page.
    General,
}

impl ChangeKind {
    /// Signal broadcast for this kind of change.
    #[must_use]
    pub fn signal(self) -> Signal {
        match self {
            Self::Style => Signal::RefreshCss,
            Self::General => Signal::Reload,
        }
    }
}

/// A classified filesystem change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Changed path, relative to the watched root when possible.
    pub path: PathBuf,
    /// Classification derived from the path.
    pub kind: ChangeKind,
}

/// Watches a directory tree and broadcasts reload signals.
pub struct ChangeNotifier {
    root: PathBuf,
    ignore: Arc<[String]>,
    registry: Arc<ClientRegistry>,
    watcher: Option<RecommendedWatcher>,
}

impl ChangeNotifier {
    /// Create a notifier for `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory to watch recursively
    /// * `ignore` - Path components whose changes are dropped (e.g. `.git`)
    /// * `registry` - Clients that receive the signals
    #[must_use]
    pub fn new(root: PathBuf, ignore: Vec<String>, registry: Arc<ClientRegistry>) -> Self {
        Self {
            root,
            ignore: ignore.into(),
            registry,
            watcher: None,
        }
    }

    /// Start the file watcher.
    ///
    /// The OS watcher pushes raw events into a channel; a spawned task drains
    /// it, classifies each event and broadcasts. Must be called from within a
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the file watcher cannot be created.
    pub fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // The receiver only goes away after the watcher is dropped
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(err) => tracing::warn!(error = %err, "File watcher error"),
            }
        })?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);

        tokio::spawn(Self::pump(
            rx,
            self.root.clone(),
            Arc::clone(&self.ignore),
            Arc::clone(&self.registry),
        ));

        tracing::debug!(root = %self.root.display(), "Watching for changes");
        Ok(())
    }

    /// Stop watching. Releases the OS watch handle; safe to call twice.
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::info!("closing watcher");
        }
    }

    /// Whether the watcher is running.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Consume raw watch events until the sender side is dropped.
    pub(crate) async fn pump(
        mut rx: mpsc::UnboundedReceiver<Event>,
        root: PathBuf,
        ignore: Arc<[String]>,
        registry: Arc<ClientRegistry>,
    ) {
        while let Some(event) = rx.recv().await {
            Self::handle_event(&event, &root, &ignore, &registry);
        }
        tracing::debug!("Watch event stream closed");
    }

    /// Classify one raw event and broadcast the resulting signal.
    ///
    /// An event touching several paths still produces a single broadcast;
    /// a general change among them wins over a style change.
    fn handle_event(event: &Event, root: &Path, ignore: &[String], registry: &ClientRegistry) {
        if !Self::is_content_change(event.kind) {
            return;
        }

        let changes: Vec<ChangeEvent> = event
            .paths
            .iter()
            .filter_map(|path| Self::classify(path, root, ignore))
            .collect();

        let Some(kind) = changes
            .iter()
            .map(|change| change.kind)
            .reduce(|acc, kind| if acc == ChangeKind::Style { kind } else { acc })
        else {
            return;
        };

        for change in &changes {
            tracing::info!(
                kind = ?change.kind,
                event = ?event.kind,
                path = %change.path.display(),
                "Change detected"
            );
        }

        let signal = kind.signal();
        let delivered = registry.broadcast(signal);
        tracing::debug!(signal = signal.as_str(), clients = delivered, "Broadcast sent");
    }

    /// Events that may have changed what the server would return.
    fn is_content_change(kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        )
    }

    /// Classify a changed path. Returns `None` for ignored paths.
    pub(crate) fn classify(path: &Path, root: &Path, ignore: &[String]) -> Option<ChangeEvent> {
        let relative = path.strip_prefix(root).unwrap_or(path);

        if Self::is_ignored(relative, ignore) {
            tracing::trace!(path = %relative.display(), "Ignoring change");
            return None;
        }

        let is_style = relative
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains(STYLESHEET_MARKER));

        Some(ChangeEvent {
            path: relative.to_path_buf(),
            kind: if is_style {
                ChangeKind::Style
            } else {
                ChangeKind::General
            },
        })
    }

    /// Whether any component of `path` is on the ignore list.
    ///
    /// Components must match whole, so `.gitignore` is not covered by `.git`.
    fn is_ignored(path: &Path, ignore: &[String]) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => ignore.iter().any(|entry| name == entry.as_str()),
            _ => false,
        })
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}
