//! Markdown rendering module
//!
//! This module renders worksheet cell content to HTML using the comrak
//! library, a CommonMark + GFM compatible parser, with syntect highlighting
//! for fenced code blocks.
//!
//! # Features
//! - Render Markdown to an HTML fragment
//! - Math regions (`$...$`, `$$...$$`) pass through untouched
//! - Explicit, serializable render options (no global renderer state)
//! - Syntax highlighting for code blocks using syntect
//!
//! # Example
//! ```
//! use cellmark::markdown::{render_cell, RenderOptions};
//! use cellmark::math::MathSegmentCodec;
//!
//! let render = render_cell("Area: $\\pi r^2$", &RenderOptions::default(), &MathSegmentCodec::new());
//! assert_eq!(render.html, "<p>Area: $\\pi r^2$</p>\n");
//! ```

mod options;
mod renderer;
pub mod syntax;

pub use options::RenderOptions;
pub use renderer::{render_cell, render_markdown, CellDiagnostic, CellRender};
