//! Math notation protection for Markdown rendering
//!
//! Worksheet cells mix Markdown with TeX-style math delimited by `$...$`
//! (inline) or `$$...$$` (block). The math has to reach the browser-side
//! typesetter byte for byte, so it is lifted out before the Markdown renderer
//! runs and put back into the rendered HTML afterwards.
//!
//! # Example
//! ```
//! use cellmark::math::MathSegmentCodec;
//!
//! let codec = MathSegmentCodec::new();
//! let extraction = codec.extract("a $x^2$ b").into_extraction();
//! assert_eq!(extraction.text, "a @MATH@ b");
//!
//! let html = codec.restore("<p>a @MATH@ b</p>", &extraction.segments);
//! assert_eq!(html.text(), "<p>a $x^2$ b</p>");
//! ```

mod codec;

pub use codec::{
    is_valid_placeholder, ExtractOutcome, Extraction, MathKind, MathSegment, MathSegmentCodec,
    RestoreOutcome, UnterminatedPolicy, DEFAULT_PLACEHOLDER,
};
