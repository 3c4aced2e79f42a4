//! Live-reloading development file server.
//!
//! Serves a directory tree over HTTP and pushes reload signals to every open
//! page when files change:
//!
//! - HTML documents get a small client script injected before `</body>`
//! - the script connects back over a WebSocket at `/ws`
//! - a change to a `.css` file sends `refresh-css`, anything else `reload`
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use livedir_server::{ServerConfig, run_server};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = ServerConfig {
//!         root_dir: PathBuf::from("public"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (serve_path)
//!    ▲                  │
//!    │                  ├─► /…ws        ──► WebSocket ──► ClientRegistry
//!    │                  ├─► /dir/       ──► index.html or directory listing
//!    │                  ├─► /dir        ──► 301 /dir/
//!    │                  └─► /file.ext   ──► file response (+ script injection)
//!    │
//!    └──signals── ClientRegistry ◄── ChangeNotifier ◄── notify (recursive watch)
//! ```

mod app;
mod content;
mod error;
pub mod favicon;
mod handlers;
pub mod listing;
mod live_reload;
pub mod mime;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use livedir_config::{Config, DEFAULT_IGNORE, DEFAULT_PORT};
use tokio::net::TcpListener;

pub use content::{LIVE_RELOAD_SCRIPT, inject_script};
pub use error::ServerError;
pub use live_reload::{ChangeEvent, ChangeKind, ChangeNotifier, ClientId, ClientRegistry, Signal};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve and watch.
    pub root_dir: PathBuf,
    /// Enable live reload (watcher and script injection).
    pub live_reload_enabled: bool,
    /// Path components whose changes are ignored.
    pub ignore: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            root_dir: PathBuf::from("."),
            live_reload_enabled: true,
            ignore: DEFAULT_IGNORE.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            root_dir: config.root_dir.clone(),
            live_reload_enabled: config.live_reload.enabled,
            ignore: config.live_reload.ignore_list(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the root isn't a directory, the watcher can't be
/// created or the address can't be bound.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let root_dir = tokio::fs::canonicalize(&config.root_dir)
        .await
        .map_err(|_| ServerError::InvalidRoot(config.root_dir.clone()))?;
    if !tokio::fs::metadata(&root_dir).await?.is_dir() {
        return Err(ServerError::InvalidRoot(root_dir));
    }

    let clients = Arc::new(ClientRegistry::new());

    let mut notifier = if config.live_reload_enabled {
        let mut notifier =
            ChangeNotifier::new(root_dir.clone(), config.ignore.clone(), Arc::clone(&clients));
        notifier.start()?;
        Some(notifier)
    } else {
        None
    };

    let state = Arc::new(AppState {
        root_dir,
        clients,
        live_reload: config.live_reload_enabled,
    });
    let app = app::create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    let local: SocketAddr = listener.local_addr()?;
    tracing::info!(address = %local, "Server running on [ http://localhost:{} ]", local.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Stop watching before connections drain
            if let Some(notifier) = notifier.as_mut() {
                notifier.stop();
            }
        })
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_server_config_from_config() {
        let mut config = Config::default();
        config.root_dir = PathBuf::from("/site");
        config.server.port = 8000;
        config.live_reload.ignore = vec!["target".to_owned()];

        let server = ServerConfig::from(&config);

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8000);
        assert_eq!(server.root_dir, Path::new("/site"));
        assert!(server.live_reload_enabled);
        assert_eq!(server.ignore, vec![".git", "node_modules", "target"]);
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();

        assert_eq!(config.port, 3000);
        assert_eq!(config.ignore, vec![".git", "node_modules"]);
    }

    #[tokio::test]
    async fn test_run_server_rejects_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            root_dir: temp_dir.path().join("missing"),
            ..ServerConfig::default()
        };

        let result = run_server(config).await;

        assert!(matches!(result, Err(ServerError::InvalidRoot(_))));
    }

    #[tokio::test]
    async fn test_run_server_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("index.html");
        std::fs::write(&file, "").unwrap();
        let config = ServerConfig {
            root_dir: file,
            ..ServerConfig::default()
        };

        let result = run_server(config).await;

        assert!(matches!(result, Err(ServerError::InvalidRoot(_))));
    }

    #[tokio::test]
    async fn test_run_server_fails_on_bound_port() {
        let temp_dir = tempfile::tempdir().unwrap();
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ServerConfig {
            port: taken.local_addr().unwrap().port(),
            root_dir: temp_dir.path().to_path_buf(),
            live_reload_enabled: false,
            ..ServerConfig::default()
        };

        let result = run_server(config).await;

        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
