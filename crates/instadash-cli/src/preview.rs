//! Preview page for generated markup.
//!
//! The markup is never inlined into the page. It goes into an `<iframe srcdoc>`
//! whose sandbox allows same-origin access and nothing else, so scripts,
//! forms, popups and top-level navigation stay blocked even when the server's
//! sanitizer misses something.

use std::fs;
use std::path::Path;

use anyhow::Result;
use instadash_core::escape_html;

/// Capabilities granted to the preview frame. Must never include `allow-scripts`.
pub const PREVIEW_SANDBOX: &str = "allow-same-origin";

pub const PLACEHOLDER: &str = "Your generated dashboard will appear here";
pub const PLACEHOLDER_HINT: &str =
    "Provide JSON data and instructions, then run instadash generate";

/// Build the preview page. `None` or empty markup shows the placeholder.
pub fn render_preview(html: Option<&str>) -> String {
    let body = match html.filter(|h| !h.is_empty()) {
        Some(markup) => format!(
            concat!(
                r#"<iframe class="preview-iframe" title="Dashboard Preview" "#,
                r#"sandbox="{}" srcdoc="{}"></iframe>"#,
            ),
            PREVIEW_SANDBOX,
            escape_html(markup)
        ),
        None => format!(
            r#"<div class="preview-placeholder"><p>{}</p><p class="preview-hint">{}</p></div>"#,
            PLACEHOLDER, PLACEHOLDER_HINT
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Dashboard Preview</title>
<style>
  body {{ margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; }}
  h2 {{ margin: 16px 24px; }}
  .preview-iframe {{
    width: calc(100% - 48px); height: calc(100vh - 96px); margin: 0 24px;
    border: 1px solid #e5e7eb; border-radius: 8px; background: #fff;
  }}
  .preview-placeholder {{
    margin: 0 24px; padding: 48px; text-align: center; color: #6b7280;
    border: 2px dashed #d1d5db; border-radius: 8px;
  }}
  .preview-hint {{ font-size: 0.875rem; }}
</style>
</head>
<body>
<h2>Dashboard Preview</h2>
{}
</body>
</html>
"#,
        body
    )
}

/// Write the page, creating parent directories as needed.
pub fn write_preview(path: &Path, page: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, page)?;
    Ok(())
}

/// Open the written page in the default browser.
pub fn open_preview(path: &Path) -> Result<()> {
    open::that(path)?;
    Ok(())
}
