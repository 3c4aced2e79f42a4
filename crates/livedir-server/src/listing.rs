//! Directory listing pages.
//!
//! Renders an HTML index for directories that have no `index.html`.

use std::fmt::Write as _;
use std::path::Path;

use crate::mime::ContentKind;

const FOLDER_ICON: &str = include_str!("../assets/icons/folder.svg");
const FILE_ICON: &str = include_str!("../assets/icons/file.svg");
const PICTURE_ICON: &str = include_str!("../assets/icons/picture.svg");
const ARROW_ICON: &str = include_str!("../assets/icons/arrow.svg");

const STYLE: &str = r"
    * { font-family: system-ui; }
    :root {
      --background: ghostwhite;
      --text: black;
      --link: olivedrab;
      --line: rgb(from var(--text) r g b / 0.2);
    }
    @media (prefers-color-scheme: dark) {
      :root { --background: #101210; --text: #888a88; --link: hotpink; }
    }
    body {
      margin-top: 2rem;
      color: var(--text);
      background-color: var(--background);
      background-image: radial-gradient(var(--line) 1px, transparent 0);
      background-size: 0.5rem 0.5rem;
    }
    h1 { margin-top: 0; padding-bottom: 1rem; border-bottom: 1px solid var(--line); }
    .dir {
      max-width: 600px;
      margin: 0 auto;
      padding: 1rem;
      border: 1px solid var(--line);
      background: var(--background);
    }
    a { color: var(--text); }
    ul { list-style: none; margin: 0; padding: 0; }
    li { display: flex; align-items: center; padding: 0.33rem 0; }
    li > * { margin-right: 0.5rem; }
    li:hover, li:hover * { color: var(--link); }
";

/// One row of the listing.
#[derive(Debug, PartialEq, Eq)]
struct Entry {
    name: String,
    is_dir: bool,
}

impl Entry {
    fn icon(&self) -> &'static str {
        if self.is_dir {
            return FOLDER_ICON;
        }
        match ContentKind::from_path(Path::new(&self.name)) {
            ContentKind::Jpeg | ContentKind::Png | ContentKind::Gif => PICTURE_ICON,
            ContentKind::JavaScript | ContentKind::Css => FILE_ICON,
            _ => ARROW_ICON,
        }
    }

    fn href(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Render the listing page for `dir`, titled with the request path.
///
/// `script` is appended to the body when live reload is enabled.
///
/// # Errors
///
/// Returns an error if the directory can't be read.
pub async fn render(dir: &Path, url_path: &str, script: Option<&str>) -> std::io::Result<String> {
    let entries = read_entries(dir).await?;
    Ok(render_page(url_path, &entries, script))
}

async fn read_entries(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        // Follows symlinks; a dangling link lists as a plain file
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .is_ok_and(|meta| meta.is_dir());
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn render_page(url_path: &str, entries: &[Entry], script: Option<&str>) -> String {
    let title = escape_html(url_path);
    let mut items = String::new();
    for entry in entries {
        let _ = writeln!(
            items,
            "      <li>{}<a href=\"{}\">{}</a></li>",
            entry.icon().trim_end(),
            escape_html(&entry.href()),
            escape_html(&entry.name),
        );
    }

    format!(
        "<!DOCTYPE html>
<html>
<head>
  <meta charset=\"utf-8\">
  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
  <title>{title}</title>
  <style type=\"text/css\">{STYLE}  </style>
</head>
<body>
  <div class=\"dir\">
    <h1>{title}</h1>
    <ul class=\"contents\">
{items}    </ul>
  </div>
{script}
</body>
</html>
",
        script = script.unwrap_or_default(),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
