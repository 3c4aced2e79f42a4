//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::content::LIVE_RELOAD_SCRIPT;
use crate::live_reload::ClientRegistry;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory that request paths are resolved against.
    pub(crate) root_dir: PathBuf,
    /// Connected live reload clients.
    pub(crate) clients: Arc<ClientRegistry>,
    /// Whether pages get the live reload script.
    pub(crate) live_reload: bool,
}

impl AppState {
    /// Script to inject into HTML, if live reload is enabled.
    #[must_use]
    pub(crate) fn reload_script(&self) -> Option<&'static str> {
        self.live_reload.then_some(LIVE_RELOAD_SCRIPT)
    }
}
