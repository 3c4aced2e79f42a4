//! Extension to content type mapping.

use std::path::Path;

/// Content type for anything the table doesn't know.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Closed set of content categories the server knows how to label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    JavaScript,
    Json,
    Jpeg,
    Png,
    Gif,
    Svg,
    Icon,
    Other,
}

impl ContentKind {
    /// Look up a category by extension, with or without the leading dot.
    ///
    /// Matching is case-sensitive, so `.HTML` is [`ContentKind::Other`].
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.strip_prefix('.').unwrap_or(ext) {
            "html" => Self::Html,
            "css" => Self::Css,
            "js" | "mjs" => Self::JavaScript,
            "json" => Self::Json,
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "gif" => Self::Gif,
            "svg" => Self::Svg,
            "ico" => Self::Icon,
            _ => Self::Other,
        }
    }

    /// Category of a filesystem path, by its final extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Other, Self::from_extension)
    }

    /// The `Content-Type` header value for this category.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Css => "text/css",
            Self::JavaScript => "text/javascript",
            Self::Json => "application/json",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Icon => "image/x-icon",
            Self::Other => OCTET_STREAM,
        }
    }

    /// Whether the live reload script gets injected into this content.
    #[must_use]
    pub fn is_markup(self) -> bool {
        self == Self::Html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mime_for(path: &str) -> &'static str {
        ContentKind::from_path(Path::new(path)).mime()
    }

    const TABLE: &[(&str, &str)] = &[
        (".html", "text/html"),
        (".css", "text/css"),
        (".js", "text/javascript"),
        (".mjs", "text/javascript"),
        (".json", "application/json"),
        (".jpg", "image/jpeg"),
        (".jpeg", "image/jpeg"),
        (".png", "image/png"),
        (".gif", "image/gif"),
        (".svg", "image/svg+xml"),
        (".ico", "image/x-icon"),
    ];

    #[test]
    fn test_mime_for_known_types() {
        for (ext, mime) in TABLE {
            assert_eq!(ContentKind::from_extension(ext).mime(), *mime, "{ext}");
        }
    }

    #[test]
    fn test_extension_without_dot() {
        assert_eq!(ContentKind::from_extension("css"), ContentKind::Css);
        assert_eq!(ContentKind::from_extension(".css"), ContentKind::Css);
    }

    #[test]
    fn test_mime_for_unknown_type() {
        assert_eq!(ContentKind::from_extension(".wasm"), ContentKind::Other);
        assert_eq!(mime_for("archive.tar.zst"), OCTET_STREAM);
        assert_eq!(mime_for("Makefile"), OCTET_STREAM);
    }

    #[test]
    fn test_mime_for_path_uses_last_extension() {
        assert_eq!(mime_for("/site/app.min.js"), "text/javascript");
        assert_eq!(mime_for("/site/nested/index.html"), "text/html");
    }

    #[test]
    fn test_only_html_is_markup() {
        assert!(ContentKind::Html.is_markup());
        assert!(!ContentKind::Svg.is_markup());
        assert!(!ContentKind::Other.is_markup());
    }
}
