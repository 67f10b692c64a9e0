//! cellmark - render worksheet cells written in Markdown with embedded math
//!
//! A cell's source is Markdown mixed with TeX math between `$` or `$$`
//! delimiters. The math is lifted out before comrak renders the Markdown and
//! put back afterwards, so a browser-side typesetter receives it untouched.
//!
//! ```
//! use cellmark::config::Settings;
//! use cellmark::markdown::render_cell;
//!
//! let settings = Settings::default();
//! let render = render_cell("$a_1 * b_1$ is *not* emphasis", &settings.render, &settings.codec());
//! assert_eq!(render.html, "<p>$a_1 * b_1$ is <em>not</em> emphasis</p>\n");
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod export;
pub mod markdown;
pub mod math;

pub use error::{Error, Result};
