//! File responses.
//!
//! Turns a resolved file into a response: HTML gets the live reload script
//! spliced in, a missing `favicon.ico` gets a generated placeholder, and
//! everything else is streamed as-is.

use std::path::Path;

use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use crate::error::ServerError;
use crate::favicon;
use crate::mime::ContentKind;

/// Client script injected into every served HTML document.
pub const LIVE_RELOAD_SCRIPT: &str = include_str!("../assets/inject.html");

const BODY_CLOSE: &[u8] = b"</body>";

/// Name that triggers the placeholder icon when no such file exists.
const FAVICON_NAME: &str = "favicon.ico";

/// Insert `script` and a newline right before the first `</body>`.
///
/// Plain byte search, so the rest of the document is untouched. A document
/// without `</body>` comes back unchanged.
#[must_use]
pub fn inject_script(html: &[u8], script: &str) -> Vec<u8> {
    let Some(index) = html
        .windows(BODY_CLOSE.len())
        .position(|window| window == BODY_CLOSE)
    else {
        return html.to_vec();
    };

    let script = script.trim_end();
    let mut out = Vec::with_capacity(html.len() + script.len() + 1);
    out.extend_from_slice(&html[..index]);
    out.extend_from_slice(script.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(&html[index..]);
    out
}

/// Build the response for the file at `path`.
///
/// `script` is the live reload snippet, or `None` when live reload is off.
///
/// # Errors
///
/// Returns an error if the file can't be opened or read. A missing
/// `favicon.ico` is not an error.
pub async fn respond(
    path: &Path,
    kind: ContentKind,
    script: Option<&str>,
) -> Result<Response, ServerError> {
    if kind.is_markup() {
        let html = tokio::fs::read(path).await?;
        let body = match script {
            Some(script) => inject_script(&html, script),
            None => html,
        };
        return Ok(with_content_type(kind, Body::from(body)));
    }

    if is_favicon(path) && !exists(path).await {
        tracing::debug!(path = %path.display(), "Serving generated favicon");
        return Ok(with_content_type(ContentKind::Svg, Body::from(favicon::generate())));
    }

    let file = tokio::fs::File::open(path).await?;
    Ok(with_content_type(kind, Body::from_stream(ReaderStream::new(file))))
}

fn is_favicon(path: &Path) -> bool {
    path.to_string_lossy().contains(FAVICON_NAME)
}

/// Existence probe that reports unreadable paths as absent instead of failing.
async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn with_content_type(kind: ContentKind, body: Body) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(kind.mime()))],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "<script>live()</script>\n";

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response.headers()[header::CONTENT_TYPE].to_str().unwrap()
    }

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>";

        let out = inject_script(html, SCRIPT);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<html><body><p>hi</p><script>live()</script>\n</body></html>"
        );
    }

    #[test]
    fn test_inject_only_first_body_close() {
        let html = b"<body><pre>&lt;/body&gt;</pre></body>\n<!-- </body> -->";

        let out = String::from_utf8(inject_script(html, SCRIPT)).unwrap();

        assert_eq!(out.matches("<script>").count(), 1);
        assert!(out.starts_with("<body><pre>&lt;/body&gt;</pre><script>live()</script>\n</body>"));
        assert!(out.ends_with("<!-- </body> -->"));
    }

    #[test]
    fn test_inject_without_body_close_is_noop() {
        let html = b"<html><body><p>unterminated";

        assert_eq!(inject_script(html, SCRIPT), html.to_vec());
    }

    #[test]
    fn test_inject_preserves_non_utf8_bytes() {
        let html = b"<body>\xff\xfe</body>";

        let out = inject_script(html, SCRIPT);

        assert!(out.starts_with(b"<body>\xff\xfe<script>"));
        assert!(out.ends_with(b"</body>"));
    }

    #[test]
    fn test_injected_script_targets_live_reload_endpoint() {
        assert!(LIVE_RELOAD_SCRIPT.contains("/ws"));
        assert!(LIVE_RELOAD_SCRIPT.contains("\"reload\""));
        assert!(LIVE_RELOAD_SCRIPT.contains("\"refresh-css\""));
    }

    #[tokio::test]
    async fn test_respond_html_injects_script() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("index.html");
        std::fs::write(&path, "<body>hello</body>").unwrap();

        let response = respond(&path, ContentKind::Html, Some(SCRIPT)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "text/html");
        assert_eq!(
            body_string(response).await,
            "<body>hello<script>live()</script>\n</body>"
        );
    }

    #[tokio::test]
    async fn test_respond_html_without_script() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("index.html");
        std::fs::write(&path, "<body>hello</body>").unwrap();

        let response = respond(&path, ContentKind::Html, None).await.unwrap();

        assert_eq!(body_string(response).await, "<body>hello</body>");
    }

    #[tokio::test]
    async fn test_respond_streams_raw_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("site.css");
        std::fs::write(&path, "body { color: red; }</body>").unwrap();

        let response = respond(&path, ContentKind::Css, Some(SCRIPT)).await.unwrap();

        assert_eq!(content_type(&response), "text/css");
        assert_eq!(body_string(response).await, "body { color: red; }</body>");
    }

    #[tokio::test]
    async fn test_respond_unknown_extension_is_octet_stream() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("data.bin");
        std::fs::write(&path, [0_u8, 1, 2]).unwrap();

        let response = respond(&path, ContentKind::from_path(&path), None).await.unwrap();

        assert_eq!(content_type(&response), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_respond_missing_favicon_generates_svg() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("favicon.ico");

        let first = respond(&path, ContentKind::Icon, None).await.unwrap();
        assert_eq!(content_type(&first), "image/svg+xml");
        let first = body_string(first).await;
        assert!(first.contains("<circle"));

        let mut bodies = std::collections::HashSet::new();
        bodies.insert(first);
        for _ in 0..8 {
            let response = respond(&path, ContentKind::Icon, None).await.unwrap();
            bodies.insert(body_string(response).await);
        }
        assert!(bodies.len() > 1);
    }

    #[tokio::test]
    async fn test_respond_existing_favicon_is_served() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("favicon.ico");
        std::fs::write(&path, "icon-bytes").unwrap();

        let response = respond(&path, ContentKind::Icon, None).await.unwrap();

        assert_eq!(content_type(&response), "image/x-icon");
        assert_eq!(body_string(response).await, "icon-bytes");
    }

    #[tokio::test]
    async fn test_respond_missing_file_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.js");

        let result = respond(&path, ContentKind::JavaScript, None).await;

        assert!(matches!(result, Err(ServerError::Io(_))));
    }

    #[tokio::test]
    async fn test_respond_missing_html_errors() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing.html");

        let result = respond(&path, ContentKind::Html, Some(SCRIPT)).await;

        assert!(matches!(result, Err(ServerError::Io(_))));
    }
}
