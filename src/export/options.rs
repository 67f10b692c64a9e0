//! Export Options and Configuration
//!
//! This module defines the options for wrapping a rendered cell in a
//! standalone HTML document.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Math Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Browser-side typesetter that turns the restored `$...$` regions into math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MathRenderer {
    /// KaTeX with its auto-render extension. Auto-render does not honour
    /// `\$`, so escaped dollars may be typeset as math.
    Katex,
    /// MathJax 3 with TeX input and escape processing
    #[default]
    Mathjax,
    /// Leave math as plain text
    None,
}

impl MathRenderer {
    /// Get the display label for this renderer.
    pub fn label(&self) -> &'static str {
        match self {
            MathRenderer::Katex => "KaTeX",
            MathRenderer::Mathjax => "MathJax",
            MathRenderer::None => "None",
        }
    }

    /// Markup to place in the document `<head>`.
    pub fn head_markup(&self) -> &'static str {
        match self {
            MathRenderer::Katex => KATEX_HEAD,
            MathRenderer::Mathjax => MATHJAX_HEAD,
            MathRenderer::None => "",
        }
    }
}

const KATEX_HEAD: &str = r#"    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css">
    <script defer src="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.js"></script>
    <script defer src="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/contrib/auto-render.min.js"
        onload="renderMathInElement(document.body, {delimiters: [{left: '$$', right: '$$', display: true}, {left: '$', right: '$', display: false}]});"></script>"#;

// processEscapes turns the `\$` left in the HTML back into a literal dollar
const MATHJAX_HEAD: &str = r#"    <script>
        window.MathJax = {tex: {inlineMath: [['$', '$']], displayMath: [['$$', '$$']], processEscapes: true}};
    </script>
    <script defer src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js"></script>"#;

// ─────────────────────────────────────────────────────────────────────────────
// Export Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for standalone document export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Typesetter loaded by the exported page
    pub math_renderer: MathRenderer,

    /// Whether to render the document title as a heading above the cell
    pub include_title: bool,

    /// Custom CSS to append (optional)
    pub custom_css: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            math_renderer: MathRenderer::default(),
            include_title: true,
            custom_css: None,
        }
    }
}

impl ExportOptions {
    /// Set the math typesetter.
    pub fn with_math_renderer(mut self, renderer: MathRenderer) -> Self {
        self.math_renderer = renderer;
        self
    }

    /// Set custom CSS appended after the base stylesheet.
    pub fn with_custom_css(mut self, css: impl Into<String>) -> Self {
        self.custom_css = Some(css.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_renderer_default() {
        assert_eq!(MathRenderer::default(), MathRenderer::Mathjax);
    }

    #[test]
    fn test_math_renderer_label() {
        assert_eq!(MathRenderer::Katex.label(), "KaTeX");
        assert_eq!(MathRenderer::Mathjax.label(), "MathJax");
    }

    #[test]
    fn test_head_markup() {
        assert!(MathRenderer::Katex.head_markup().contains("auto-render"));
        assert!(MathRenderer::Mathjax.head_markup().contains("processEscapes: true"));
        assert!(MathRenderer::None.head_markup().is_empty());
    }

    #[test]
    fn test_export_options_serialization() {
        let options = ExportOptions::default()
            .with_math_renderer(MathRenderer::Mathjax)
            .with_custom_css("p { margin: 0; }");
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"mathjax\""));
        let deserialized: ExportOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, deserialized);
    }
}
