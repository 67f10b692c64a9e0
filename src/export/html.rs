//! HTML Export Generation
//!
//! This module wraps rendered cell HTML in a complete document with a base
//! stylesheet and the configured math typesetter, for standalone viewing.

use log::info;
use std::fs;
use std::path::Path;

use super::options::ExportOptions;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::markdown::{render_cell, CellRender};

// ─────────────────────────────────────────────────────────────────────────────
// HTML Generation
// ─────────────────────────────────────────────────────────────────────────────

/// Generate a complete HTML document around a rendered fragment.
///
/// # Arguments
///
/// * `body` - Rendered cell HTML, inserted as-is
/// * `title` - Optional document title
/// * `options` - Export options (typesetter, title heading, custom CSS)
pub fn generate_html_document(body: &str, title: Option<&str>, options: &ExportOptions) -> String {
    let doc_title = title.unwrap_or("Worksheet Cell");

    let heading = match title {
        Some(t) if options.include_title => format!("<h1>{}</h1>\n", html_escape(t)),
        _ => String::new(),
    };

    let custom_css = options.custom_css.as_deref().unwrap_or("");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="cellmark">
    <title>{title}</title>
{math_head}
    <style>
{base_css}
{custom_css}
    </style>
</head>
<body>
    <article class="worksheet-cell">
{heading}{body}
    </article>
</body>
</html>"#,
        title = html_escape(doc_title),
        math_head = options.math_renderer.head_markup(),
        base_css = BASE_CSS,
        custom_css = custom_css,
        heading = heading,
        body = body,
    )
}

/// Render a cell source file to a standalone HTML file.
///
/// The document title defaults to the source file stem. Returns the render
/// so the caller can report its diagnostics.
///
/// # Errors
///
/// - `Error::FileRead`: the source could not be read
/// - `Error::FileWrite`: the document could not be written
pub fn export_to_html_file(
    source_path: &Path,
    output_path: &Path,
    title: Option<&str>,
    settings: &Settings,
) -> Result<CellRender> {
    let source = fs::read_to_string(source_path).map_err(|e| Error::FileRead {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let title = title
        .or_else(|| source_path.file_stem().and_then(|s| s.to_str()))
        .unwrap_or("Worksheet Cell");

    let render = render_cell(&source, &settings.render, &settings.codec());
    let html = generate_html_document(&render.html, Some(title), &settings.export);

    fs::write(output_path, html).map_err(|e| Error::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    info!(
        "Exported {} to {} ({} math)",
        source_path.display(),
        output_path.display(),
        settings.export.math_renderer.label()
    );
    Ok(render)
}

// ─────────────────────────────────────────────────────────────────────────────
// CSS
// ─────────────────────────────────────────────────────────────────────────────

/// Base CSS for cell rendering (layout, typography).
const BASE_CSS: &str = r#"
body {
    margin: 0;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
    font-size: 16px;
    line-height: 1.6;
}

.worksheet-cell {
    max-width: 900px;
    margin: 0 auto;
    padding: 32px 24px;
}

.worksheet-cell p {
    margin-top: 0;
    margin-bottom: 16px;
}

.worksheet-cell code {
    font-family: 'JetBrains Mono', 'Fira Code', 'Consolas', 'Monaco', monospace;
    font-size: 0.9em;
}

.worksheet-cell pre {
    padding: 16px;
    overflow: auto;
    border-radius: 6px;
}

.worksheet-cell table {
    border-collapse: collapse;
    margin-bottom: 16px;
}

.worksheet-cell th,
.worksheet-cell td {
    padding: 6px 12px;
    border: 1px solid #d0d7de;
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Utility Functions
// ─────────────────────────────────────────────────────────────────────────────

/// HTML-escape a string.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
