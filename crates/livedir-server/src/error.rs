//! Error types for the HTTP server.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The WebSocket handshake for the live reload endpoint was rejected.
    #[error("Failed to upgrade")]
    Upgrade,

    /// The served root is missing or isn't a directory.
    #[error("Not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// The listener could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The filesystem watcher could not be created.
    #[error("Failed to watch files: {0}")]
    Watch(#[from] notify::Error),

    /// I/O error.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    /// Every request-time failure is a 500 with the bare error text as body.
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
