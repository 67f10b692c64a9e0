//! Math segment extraction and restoration
//!
//! Markdown renderers mangle TeX: `_` and `*` become emphasis, `\\` collapses
//! to `\`, and so on. Before rendering, [`MathSegmentCodec::extract`] swaps each
//! `$...$` / `$$...$$` region for a placeholder token and remembers the original
//! text. After rendering, [`MathSegmentCodec::restore`] puts the regions back,
//! in order, where the placeholders ended up.
//!
//! Both passes are single left-to-right scans over byte offsets. `$` and `\`
//! are ASCII, so every offset produced is a valid `char` boundary.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default token substituted for each math region.
pub const DEFAULT_PLACEHOLDER: &str = "@MATH@";

/// Replacement written for an escaped dollar sign (`\$`).
///
/// The escaping backslash is doubled so the rendered HTML still carries a
/// backslash in front of the `$` for the math typesetter to honour.
const ESCAPED_DOLLAR: &str = "\\\\$";

// ─────────────────────────────────────────────────────────────────────────────
// Segment Types
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a region was opened with `$` or `$$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathKind {
    /// `$...$`
    Inline,
    /// `$$...$$`
    Block,
}

impl MathKind {
    fn from_width(width: usize) -> Self {
        if width == 2 {
            MathKind::Block
        } else {
            MathKind::Inline
        }
    }

    fn width(self) -> usize {
        match self {
            MathKind::Block => 2,
            MathKind::Inline => 1,
        }
    }
}

/// A math region removed from the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSegment {
    /// Region text including both delimiters, exactly as written
    pub raw: String,
    /// Kind decided by the opening delimiter
    pub kind: MathKind,
    /// Width of the closing delimiter, decided independently of `kind`
    pub closing: MathKind,
    /// Byte offset of the opening `$` in the source text
    pub offset: usize,
}

impl MathSegment {
    /// The region text between the delimiters.
    pub fn content(&self) -> &str {
        let open = self.kind.width();
        let close = self.closing.width();
        self.raw
            .len()
            .checked_sub(close)
            .and_then(|end| self.raw.get(open..end))
            .unwrap_or("")
    }
}

/// Stripped text and the segments taken out of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Source text with every math region replaced by the placeholder
    pub text: String,
    /// Removed regions in order of appearance
    pub segments: Vec<MathSegment>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// Result of [`MathSegmentCodec::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Every `$` was either escaped or part of a closed region.
    Complete(Extraction),
    /// A region opened at `offset` never closed. Scanning stopped there.
    Unterminated {
        extraction: Extraction,
        offset: usize,
    },
}

impl ExtractOutcome {
    /// Whether the whole input was scanned without problems.
    pub fn is_complete(&self) -> bool {
        matches!(self, ExtractOutcome::Complete(_))
    }

    /// Borrow the (possibly partial) extraction.
    pub fn extraction(&self) -> &Extraction {
        match self {
            ExtractOutcome::Complete(extraction) => extraction,
            ExtractOutcome::Unterminated { extraction, .. } => extraction,
        }
    }

    /// Take the (possibly partial) extraction.
    pub fn into_extraction(self) -> Extraction {
        match self {
            ExtractOutcome::Complete(extraction) => extraction,
            ExtractOutcome::Unterminated { extraction, .. } => extraction,
        }
    }
}

/// Result of [`MathSegmentCodec::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Every segment found its placeholder.
    Complete(String),
    /// Only `restored` of `expected` segments found a placeholder; the rest
    /// were dropped.
    Mismatch {
        text: String,
        restored: usize,
        expected: usize,
    },
}

impl RestoreOutcome {
    /// Whether every segment was reinserted.
    pub fn is_complete(&self) -> bool {
        matches!(self, RestoreOutcome::Complete(_))
    }

    /// Borrow the (possibly partial) restored text.
    pub fn text(&self) -> &str {
        match self {
            RestoreOutcome::Complete(text) => text,
            RestoreOutcome::Mismatch { text, .. } => text,
        }
    }

    /// Take the (possibly partial) restored text.
    pub fn into_text(self) -> String {
        match self {
            RestoreOutcome::Complete(text) => text,
            RestoreOutcome::Mismatch { text, .. } => text,
        }
    }
}

/// What to do with the text after an unterminated `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnterminatedPolicy {
    /// Append the unscanned tail, unterminated `$` included, verbatim
    #[default]
    PassThrough,
    /// Keep text up to the unterminated `$` and discard the rest
    Drop,
}

// ─────────────────────────────────────────────────────────────────────────────
// Codec
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts math regions ahead of Markdown rendering and restores them after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSegmentCodec {
    placeholder: String,
    unterminated: UnterminatedPolicy,
}

impl Default for MathSegmentCodec {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            unterminated: UnterminatedPolicy::default(),
        }
    }
}

impl MathSegmentCodec {
    /// Create a codec with the default placeholder and policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom placeholder token.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPlaceholder` if the token could be altered by
    /// the Markdown renderer (see [`is_valid_placeholder`]).
    pub fn with_placeholder(mut self, placeholder: &str) -> Result<Self> {
        if !is_valid_placeholder(placeholder) {
            return Err(Error::InvalidPlaceholder(placeholder.to_string()));
        }
        self.placeholder = placeholder.to_string();
        Ok(self)
    }

    /// Set the policy for unterminated regions.
    pub fn with_unterminated_policy(mut self, policy: UnterminatedPolicy) -> Self {
        self.unterminated = policy;
        self
    }

    /// The placeholder token in use.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The unterminated-region policy in use.
    pub fn unterminated_policy(&self) -> UnterminatedPolicy {
        self.unterminated
    }

    /// Replace every math region in `text` with the placeholder.
    ///
    /// Escaped dollars (`\$`) never open a region and are written out as
    /// `\\$`. A region without a closing `$` stops the scan and yields
    /// [`ExtractOutcome::Unterminated`].
    pub fn extract(&self, text: &str) -> ExtractOutcome {
        let mut stripped = String::with_capacity(text.len());
        let mut segments = Vec::new();
        let mut curr = 0;

        loop {
            let Some(start) = text[curr..].find('$').map(|i| curr + i) else {
                stripped.push_str(&text[curr..]);
                break;
            };

            if is_escaped(text, start) {
                stripped.push_str(&text[curr..start - 1]);
                stripped.push_str(ESCAPED_DOLLAR);
                curr = start + 1;
                continue;
            }

            let open_width = delimiter_width(text, start);
            let Some(close) = find_unescaped_dollar(text, start + open_width) else {
                match self.unterminated {
                    UnterminatedPolicy::PassThrough => stripped.push_str(&text[curr..]),
                    UnterminatedPolicy::Drop => stripped.push_str(&text[curr..start]),
                }
                warn!(
                    "Unterminated math region at byte {} ({} region(s) extracted before it)",
                    start,
                    segments.len()
                );
                return ExtractOutcome::Unterminated {
                    extraction: Extraction {
                        text: stripped,
                        segments,
                    },
                    offset: start,
                };
            };
            let close_width = delimiter_width(text, close);
            let end = close + close_width;

            stripped.push_str(&text[curr..start]);
            stripped.push_str(&self.placeholder);
            segments.push(MathSegment {
                raw: text[start..end].to_string(),
                kind: MathKind::from_width(open_width),
                closing: MathKind::from_width(close_width),
                offset: start,
            });
            curr = end;
        }

        debug!("Extracted {} math region(s)", segments.len());
        ExtractOutcome::Complete(Extraction {
            text: stripped,
            segments,
        })
    }

    /// Put `segments` back in place of the placeholders in `rendered`.
    ///
    /// Segments are matched to placeholder occurrences strictly in order. If
    /// the placeholders run out first, the remaining segments are dropped and
    /// [`RestoreOutcome::Mismatch`] carries what was assembled.
    pub fn restore(&self, rendered: &str, segments: &[MathSegment]) -> RestoreOutcome {
        let extra: usize = segments.iter().map(|s| s.raw.len()).sum();
        let mut output = String::with_capacity(rendered.len() + extra);
        let mut curr = 0;

        for (restored, segment) in segments.iter().enumerate() {
            let Some(at) = rendered[curr..]
                .find(self.placeholder.as_str())
                .map(|i| curr + i)
            else {
                output.push_str(&rendered[curr..]);
                warn!(
                    "Math placeholder mismatch: restored {} of {} region(s)",
                    restored,
                    segments.len()
                );
                return RestoreOutcome::Mismatch {
                    text: output,
                    restored,
                    expected: segments.len(),
                };
            };

            output.push_str(&rendered[curr..at]);
            output.push_str(&segment.raw);
            curr = at + self.placeholder.len();
        }

        output.push_str(&rendered[curr..]);
        RestoreOutcome::Complete(output)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest placeholder accepted by [`is_valid_placeholder`].
const MIN_PLACEHOLDER_LEN: usize = 4;

/// Check that a placeholder is neither Markdown syntax nor likely to occur in
/// the HTML comrak emits.
///
/// Allowed characters are ASCII alphanumerics and `@`, `%`, `:`, `-`. Anything
/// else is either math syntax (`$`), emphasis, escaping, HTML, or table markup.
/// At least one alphanumeric is required (a run of `-` is a thematic break),
/// and at least one `@` or `%` so the token cannot match a tag name,
/// attribute or ordinary word. Tokens containing `@` can still be picked up
/// by email autolinking; [`render_cell`](crate::markdown::render_cell)
/// switches autolinking off for them.
pub fn is_valid_placeholder(token: &str) -> bool {
    token.len() >= MIN_PLACEHOLDER_LEN
        && token.bytes().any(|b| b.is_ascii_alphanumeric())
        && token.bytes().any(|b| matches!(b, b'@' | b'%'))
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'@' | b'%' | b':' | b'-'))
}

fn is_escaped(text: &str, dollar: usize) -> bool {
    dollar > 0 && text.as_bytes()[dollar - 1] == b'\\'
}

/// Width of the delimiter starting at `dollar`: 2 for `$$`, else 1.
fn delimiter_width(text: &str, dollar: usize) -> usize {
    if text.as_bytes().get(dollar + 1) == Some(&b'$') {
        2
    } else {
        1
    }
}

fn find_unescaped_dollar(text: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while pos <= text.len() {
        let found = pos + text[pos..].find('$')?;
        if !is_escaped(text, found) {
            return Some(found);
        }
        pos = found + 1;
    }
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(segments: &[MathSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.raw.as_str()).collect()
    }

    fn segment(text: &str) -> MathSegment {
        MathSegment {
            raw: text.to_string(),
            kind: MathKind::Inline,
            closing: MathKind::Inline,
            offset: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Extraction
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extract_without_math_is_identity() {
        let codec = MathSegmentCodec::new();
        let outcome = codec.extract("Just *prose* with no math.");
        assert!(outcome.is_complete());

        let extraction = outcome.into_extraction();
        assert_eq!(extraction.text, "Just *prose* with no math.");
        assert!(extraction.segments.is_empty());
    }

    #[test]
    fn test_extract_empty_text() {
        let extraction = MathSegmentCodec::new().extract("").into_extraction();
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn test_extract_single_inline_region() {
        let outcome = MathSegmentCodec::new().extract("a $x^2$ b");
        assert!(outcome.is_complete());

        let extraction = outcome.into_extraction();
        assert_eq!(extraction.text, "a @MATH@ b");
        assert_eq!(raw(&extraction.segments), vec!["$x^2$"]);
        assert_eq!(extraction.segments[0].kind, MathKind::Inline);
        assert_eq!(extraction.segments[0].offset, 2);
    }

    #[test]
    fn test_extract_block_region() {
        let extraction = MathSegmentCodec::new()
            .extract("$$x^2$$")
            .into_extraction();
        assert_eq!(extraction.text, "@MATH@");
        assert_eq!(raw(&extraction.segments), vec!["$$x^2$$"]);
        assert_eq!(extraction.segments[0].kind, MathKind::Block);
    }

    #[test]
    fn test_extract_escaped_dollar_is_widened() {
        let outcome = MathSegmentCodec::new().extract("cost: \\$5");
        assert!(outcome.is_complete());

        let extraction = outcome.into_extraction();
        assert_eq!(extraction.text, "cost: \\\\$5");
        assert!(extraction.segments.is_empty());
    }

    #[test]
    fn test_extract_escaped_dollar_inside_region_does_not_close() {
        let extraction = MathSegmentCodec::new()
            .extract("$a \\$ b$ end")
            .into_extraction();
        assert_eq!(extraction.text, "@MATH@ end");
        assert_eq!(raw(&extraction.segments), vec!["$a \\$ b$"]);
    }

    #[test]
    fn test_extract_multiple_regions_in_order() {
        let extraction = MathSegmentCodec::new()
            .extract("$a$ and $b$")
            .into_extraction();
        assert_eq!(extraction.text, "@MATH@ and @MATH@");
        assert_eq!(raw(&extraction.segments), vec!["$a$", "$b$"]);
        assert_eq!(extraction.segments[1].offset, 8);
    }

    #[test]
    fn test_extract_adjacent_regions() {
        let extraction = MathSegmentCodec::new()
            .extract("$a$$$b$$")
            .into_extraction();
        // `$a$$` closes with width 2, then `$b$$` is its own region
        assert_eq!(raw(&extraction.segments), vec!["$a$$", "$b$$"]);
        assert_eq!(extraction.text, "@MATH@@MATH@");
    }

    #[test]
    fn test_extract_mismatched_delimiter_widths_accepted() {
        let extraction = MathSegmentCodec::new()
            .extract("$$x$ rest")
            .into_extraction();
        assert_eq!(raw(&extraction.segments), vec!["$$x$"]);
        assert_eq!(extraction.segments[0].kind, MathKind::Block);
        assert_eq!(extraction.text, "@MATH@ rest");
    }

    #[test]
    fn test_extract_preserves_markdown_around_math() {
        let extraction = MathSegmentCodec::new()
            .extract("**Energy**: $E = m_0 c^2$, where _m_ is mass")
            .into_extraction();
        assert_eq!(extraction.text, "**Energy**: @MATH@, where _m_ is mass");
        assert_eq!(raw(&extraction.segments), vec!["$E = m_0 c^2$"]);
    }

    #[test]
    fn test_extract_multibyte_text() {
        let extraction = MathSegmentCodec::new()
            .extract("α → $β_1$ ✓")
            .into_extraction();
        assert_eq!(extraction.text, "α → @MATH@ ✓");
        assert_eq!(raw(&extraction.segments), vec!["$β_1$"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Unterminated regions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_extract_unterminated_passes_tail_through() {
        let outcome = MathSegmentCodec::new().extract("before $unclosed");
        assert!(!outcome.is_complete());
        match outcome {
            ExtractOutcome::Unterminated { extraction, offset } => {
                assert_eq!(offset, 7);
                assert_eq!(extraction.text, "before $unclosed");
                assert!(extraction.segments.is_empty());
            }
            other => panic!("expected unterminated outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_unterminated_drop_policy() {
        let codec = MathSegmentCodec::new().with_unterminated_policy(UnterminatedPolicy::Drop);
        let outcome = codec.extract("$a$ then $oops");
        assert!(!outcome.is_complete());

        let extraction = outcome.into_extraction();
        assert_eq!(extraction.text, "@MATH@ then ");
        assert_eq!(raw(&extraction.segments), vec!["$a$"]);
    }

    #[test]
    fn test_extract_unterminated_keeps_earlier_segments() {
        let outcome = MathSegmentCodec::new().extract("$a$ then $oops");
        let extraction = outcome.extraction();
        assert_eq!(raw(&extraction.segments), vec!["$a$"]);
        assert_eq!(extraction.text, "@MATH@ then $oops");
    }

    #[test]
    fn test_extract_trailing_dollar() {
        let outcome = MathSegmentCodec::new().extract("price$");
        assert!(matches!(
            outcome,
            ExtractOutcome::Unterminated { offset: 5, .. }
        ));
    }

    #[test]
    fn test_extract_lone_double_dollar() {
        let outcome = MathSegmentCodec::new().extract("$$");
        assert!(matches!(
            outcome,
            ExtractOutcome::Unterminated { offset: 0, .. }
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Restoration
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_restore_without_segments_is_identity() {
        let outcome = MathSegmentCodec::new().restore("<p>hello</p>", &[]);
        assert_eq!(outcome, RestoreOutcome::Complete("<p>hello</p>".to_string()));
    }

    #[test]
    fn test_restore_single_segment() {
        let outcome = MathSegmentCodec::new().restore("a @MATH@ b", &[segment("$x^2$")]);
        assert!(outcome.is_complete());
        assert_eq!(outcome.text(), "a $x^2$ b");
    }

    #[test]
    fn test_restore_keeps_segment_order() {
        let segments = vec![segment("$z$"), segment("$a$")];
        let outcome = MathSegmentCodec::new().restore("<p>@MATH@ and @MATH@</p>", &segments);
        assert_eq!(outcome.into_text(), "<p>$z$ and $a$</p>");
    }

    #[test]
    fn test_restore_segment_containing_placeholder_text() {
        let segments = vec![segment("$@MATH@$"), segment("$b$")];
        let outcome = MathSegmentCodec::new().restore("@MATH@ @MATH@", &segments);
        assert_eq!(outcome.into_text(), "$@MATH@$ $b$");
    }

    #[test]
    fn test_restore_mismatch_drops_remaining_segments() {
        let segments = vec![segment("$a$"), segment("$b$"), segment("$c$")];
        let outcome = MathSegmentCodec::new().restore("<p>@MATH@ tail</p>", &segments);
        assert!(!outcome.is_complete());
        match outcome {
            RestoreOutcome::Mismatch {
                text,
                restored,
                expected,
            } => {
                assert_eq!(text, "<p>$a$ tail</p>");
                assert_eq!(restored, 1);
                assert_eq!(expected, 3);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_restore_extra_placeholders_left_in_place() {
        let outcome = MathSegmentCodec::new().restore("@MATH@ @MATH@", &[segment("$a$")]);
        assert!(outcome.is_complete());
        assert_eq!(outcome.into_text(), "$a$ @MATH@");
    }

    #[test]
    fn test_extract_then_restore_round_trip() {
        let codec = MathSegmentCodec::new();
        let source = "Let $f(x) = x_1 * x_2$.\n\n$$\\int_0^1 f$$\n\nCost \\$3.";
        let extraction = codec.extract(source).into_extraction();
        let restored = codec.restore(&extraction.text, &extraction.segments);
        assert_eq!(
            restored.into_text(),
            "Let $f(x) = x_1 * x_2$.\n\n$$\\int_0^1 f$$\n\nCost \\\\$3."
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Placeholder configuration
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_custom_placeholder() {
        let codec = MathSegmentCodec::new().with_placeholder("%%EQ%%").unwrap();
        let extraction = codec.extract("x $y$ z").into_extraction();
        assert_eq!(extraction.text, "x %%EQ%% z");
        assert_eq!(
            codec.restore(&extraction.text, &extraction.segments).into_text(),
            "x $y$ z"
        );
    }

    #[test]
    fn test_invalid_placeholders_rejected() {
        for token in [
            "", "*MATH*", "_M_", "$M$", "<m>", "a b", "---", "M\\", "p", "code", "MATH", "@M@",
            "@@@@", "%%-%%",
        ] {
            let result = MathSegmentCodec::new().with_placeholder(token);
            assert!(
                matches!(result, Err(Error::InvalidPlaceholder(_))),
                "token {:?} should be rejected",
                token
            );
        }
    }

    #[test]
    fn test_default_placeholder_is_valid() {
        assert!(is_valid_placeholder(DEFAULT_PLACEHOLDER));
    }

    #[test]
    fn test_segment_content() {
        let codec = MathSegmentCodec::new();
        let extraction = codec.extract("$x$ $$y$$ $$z$").into_extraction();
        let contents: Vec<&str> = extraction.segments.iter().map(|s| s.content()).collect();
        assert_eq!(contents, vec!["x", "y", "z"]);
        assert_eq!(extraction.segments[2].kind, MathKind::Block);
        assert_eq!(extraction.segments[2].closing, MathKind::Inline);
    }

    #[test]
    fn test_segment_content_with_escaped_dollar_before_close() {
        let extraction = MathSegmentCodec::new().extract("$\\$$").into_extraction();
        assert_eq!(raw(&extraction.segments), vec!["$\\$$"]);
        assert_eq!(extraction.segments[0].closing, MathKind::Inline);
        assert_eq!(extraction.segments[0].content(), "\\$");
    }

    #[test]
    fn test_placeholder_tokens_accepted() {
        for token in [DEFAULT_PLACEHOLDER, "%%EQ%%", "@@M1", "MATH%", "@math:1@"] {
            assert!(is_valid_placeholder(token), "token {:?} should be accepted", token);
        }
    }
}
