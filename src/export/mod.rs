//! Document Export Module for cellmark
//!
//! Wraps rendered cell HTML in a standalone document that loads a math
//! typesetter, so the restored `$...$` regions display as math in a browser.
//!
//! # Architecture
//!
//! - `options.rs` - Export configuration and typesetter choice
//! - `html.rs` - HTML document generation and file export

pub mod html;
pub mod options;

pub use html::{export_to_html_file, generate_html_document};
pub use options::{ExportOptions, MathRenderer};
