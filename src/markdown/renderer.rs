//! Worksheet cell rendering
//!
//! Wraps comrak's HTML renderer with the math codec: math regions are
//! extracted, the remaining Markdown is rendered, and the regions are restored
//! into the HTML verbatim for a browser-side typesetter (KaTeX or MathJax).

use comrak::{markdown_to_html, markdown_to_html_with_plugins, Plugins};
use log::{debug, warn};
use std::fmt;

use super::options::RenderOptions;
use super::syntax::adapter_for_theme;
use crate::math::{ExtractOutcome, MathSegmentCodec, RestoreOutcome};

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// A problem noticed while rendering a cell. Rendering still produced output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDiagnostic {
    /// A `$` at this byte offset opened a region that never closed
    UnterminatedMath { offset: usize },
    /// The renderer lost placeholders; only `restored` of `expected` math
    /// regions made it into the HTML
    PlaceholderMismatch { restored: usize, expected: usize },
}

impl fmt::Display for CellDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellDiagnostic::UnterminatedMath { offset } => {
                write!(f, "unterminated math region at byte {}", offset)
            }
            CellDiagnostic::PlaceholderMismatch { restored, expected } => write!(
                f,
                "only {} of {} math regions survived rendering",
                restored, expected
            ),
        }
    }
}

/// Rendered cell HTML together with anything that went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRender {
    /// HTML fragment ready for injection into the worksheet view
    pub html: String,
    /// Number of math regions extracted from the source
    pub math_regions: usize,
    /// Non-fatal problems, in the order they were found
    pub diagnostics: Vec<CellDiagnostic>,
}

impl CellRender {
    /// Whether the render completed without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Render Markdown to HTML with the given options.
///
/// Math is not treated specially here; see [`render_cell`].
pub fn render_markdown(markdown: &str, options: &RenderOptions) -> String {
    let comrak_options = options.to_comrak_options();

    if !options.syntax_highlighting {
        return markdown_to_html(markdown, &comrak_options);
    }

    match adapter_for_theme(&options.highlight_theme) {
        Ok(adapter) => {
            let mut plugins = Plugins::default();
            plugins.render.codefence_syntax_highlighter = Some(&*adapter);
            markdown_to_html_with_plugins(markdown, &comrak_options, &plugins)
        }
        Err(e) => {
            warn!("{}. Rendering code blocks without highlighting.", e);
            markdown_to_html(markdown, &comrak_options)
        }
    }
}

/// Render a worksheet cell's Markdown-plus-math source to HTML.
///
/// Always returns HTML. Malformed math and placeholders lost by the renderer
/// are reported in [`CellRender::diagnostics`] and may leave math missing or
/// shown as plain text.
pub fn render_cell(source: &str, options: &RenderOptions, codec: &MathSegmentCodec) -> CellRender {
    let mut diagnostics = Vec::new();

    let without_autolink;
    let options = if options.autolink && codec.placeholder().contains('@') {
        debug!(
            "Autolinking disabled for this render; it would rewrite placeholder '{}'",
            codec.placeholder()
        );
        without_autolink = RenderOptions {
            autolink: false,
            ..options.clone()
        };
        &without_autolink
    } else {
        options
    };

    let extraction = match codec.extract(source) {
        ExtractOutcome::Complete(extraction) => extraction,
        ExtractOutcome::Unterminated { extraction, offset } => {
            diagnostics.push(CellDiagnostic::UnterminatedMath { offset });
            extraction
        }
    };

    let rendered = render_markdown(&extraction.text, options);

    let html = match codec.restore(&rendered, &extraction.segments) {
        RestoreOutcome::Complete(html) => html,
        RestoreOutcome::Mismatch {
            text,
            restored,
            expected,
        } => {
            diagnostics.push(CellDiagnostic::PlaceholderMismatch { restored, expected });
            text
        }
    };

    debug!(
        "Rendered cell: {} bytes of source, {} math region(s), {} diagnostic(s)",
        source.len(),
        extraction.segments.len(),
        diagnostics.len()
    );

    CellRender {
        html,
        math_regions: extraction.segments.len(),
        diagnostics,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
