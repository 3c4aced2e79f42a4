//! Request routing.
//!
//! Every request lands here. The path alone decides the outcome:
//!
//! - ends with `ws` → WebSocket upgrade for live reload (500 when disabled)
//! - ends with `/` → `index.html` from that directory, or a generated listing
//! - no extension → 301 to the same path with a trailing `/`
//! - anything else → the file under the served root
//!
//! Paths are joined onto the root without any containment check, so `..`
//! segments can reach files outside it. Fine for a local dev server; don't
//! expose it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::content;
use crate::error::ServerError;
use crate::listing;
use crate::live_reload;
use crate::mime::ContentKind;
use crate::state::AppState;

/// Path suffix that identifies the live reload endpoint.
pub(crate) const LIVE_RELOAD_MARKER: &str = "ws";

/// File served for directory paths when present.
const INDEX_FILE: &str = "index.html";

/// A file request after resolution against the served root.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RequestContext {
    /// Decoded URL path.
    pub(crate) url_path: String,
    /// Filesystem path the URL maps to.
    pub(crate) target: PathBuf,
    /// Content category from the extension.
    pub(crate) kind: ContentKind,
}

impl RequestContext {
    /// Resolve `url_path` against `root`.
    ///
    /// Returns `None` when the path has no extension, which is treated as a
    /// directory address.
    pub(crate) fn resolve(root: &Path, url_path: &str) -> Option<Self> {
        let target = resolve_path(root, url_path);
        Path::new(url_path).extension()?;
        let kind = ContentKind::from_path(&target);
        Some(Self {
            url_path: url_path.to_owned(),
            target,
            kind,
        })
    }
}

/// Handle any request.
pub(crate) async fn serve_path(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let raw_path = uri.path();

    if raw_path.ends_with(LIVE_RELOAD_MARKER) {
        if !state.live_reload {
            tracing::debug!(path = raw_path, "Live reload disabled, refusing upgrade");
            return ServerError::Upgrade.into_response();
        }
        return match upgrade {
            Ok(ws) => live_reload::upgrade(ws, Arc::clone(&state.clients)),
            Err(rejection) => {
                tracing::warn!(path = raw_path, error = %rejection, "WebSocket upgrade rejected");
                ServerError::Upgrade.into_response()
            }
        };
    }

    let mut url_path = decode_path(raw_path);

    if url_path.ends_with('/') {
        let dir = resolve_path(&state.root_dir, &url_path);
        if exists(&dir.join(INDEX_FILE)).await {
            url_path.push_str(INDEX_FILE);
        } else {
            return match listing::render(&dir, &url_path, state.reload_script()).await {
                Ok(html) => (
                    [(header::CONTENT_TYPE, HeaderValue::from_static(ContentKind::Html.mime()))],
                    html,
                )
                    .into_response(),
                Err(err) => {
                    tracing::warn!(path = %url_path, error = %err, "Failed to list directory");
                    ServerError::from(err).into_response()
                }
            };
        }
    }

    let Some(request) = RequestContext::resolve(&state.root_dir, &url_path) else {
        return redirect_to_directory(raw_path);
    };

    match content::respond(&request.target, request.kind, state.reload_script()).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(path = %request.url_path, error = %err, "Failed to serve file");
            err.into_response()
        }
    }
}

/// Permanent redirect from `path` to `path/`.
fn redirect_to_directory(path: &str) -> Response {
    let location = format!("{path}/");
    match HeaderValue::from_str(&location) {
        Ok(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Join a URL path onto the root.
fn resolve_path(root: &Path, url_path: &str) -> PathBuf {
    root.join(url_path.trim_start_matches('/'))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
