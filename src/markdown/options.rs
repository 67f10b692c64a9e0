//! Renderer configuration
//!
//! Every render call receives its options explicitly. Nothing about the
//! Markdown renderer is configured through process-wide state.

use comrak::Options;
use serde::{Deserialize, Serialize};

use super::syntax::DEFAULT_HIGHLIGHT_THEME;

/// Configuration options for Markdown rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Treat single newlines as hard line breaks
    pub hardbreaks: bool,
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails.
    ///
    /// Email autolinking would swallow `@`-style math placeholders, so
    /// `render_cell` turns it off whenever the placeholder contains `@`.
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Enable footnotes
    pub footnotes: bool,
    /// Pass raw HTML and dangerous URLs through instead of omitting them
    pub allow_raw_html: bool,
    /// Highlight fenced code blocks with syntect
    pub syntax_highlighting: bool,
    /// Name of a syntect theme bundled with the default theme set
    pub highlight_theme: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            hardbreaks: true,
            tables: true,
            strikethrough: true,
            autolink: false,
            tasklist: true,
            footnotes: false,
            allow_raw_html: false,
            syntax_highlighting: true,
            highlight_theme: DEFAULT_HIGHLIGHT_THEME.to_string(),
        }
    }
}

impl RenderOptions {
    /// Options with every extension and highlighting turned off.
    ///
    /// Useful for plain CommonMark output.
    pub fn commonmark() -> Self {
        Self {
            hardbreaks: false,
            tables: false,
            strikethrough: false,
            autolink: false,
            tasklist: false,
            footnotes: false,
            allow_raw_html: false,
            syntax_highlighting: false,
            highlight_theme: DEFAULT_HIGHLIGHT_THEME.to_string(),
        }
    }

    /// Convert to comrak Options.
    pub(crate) fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        // Extension options
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.footnotes = self.footnotes;

        // Render options
        options.render.hardbreaks = self.hardbreaks;
        options.render.unsafe_ = self.allow_raw_html;

        options
    }
}
