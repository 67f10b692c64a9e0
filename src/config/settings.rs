//! User settings for cellmark
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::export::ExportOptions;
use crate::markdown::syntax::{is_known_theme, DEFAULT_HIGHLIGHT_THEME};
use crate::markdown::RenderOptions;
use crate::math::{is_valid_placeholder, MathSegmentCodec, UnterminatedPolicy, DEFAULT_PLACEHOLDER};

// ─────────────────────────────────────────────────────────────────────────────
// Math Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// How math regions are shielded from the Markdown renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathOptions {
    /// Token substituted for each math region while rendering
    pub placeholder: String,
    /// What to do with the text after an unterminated `$`
    pub unterminated: UnterminatedPolicy,
}

impl Default for MathOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            unterminated: UnterminatedPolicy::default(),
        }
    }
}

impl MathOptions {
    /// Build the codec described by these options.
    ///
    /// An invalid placeholder falls back to the default with a warning; call
    /// [`Settings::sanitize`] first to avoid that.
    pub fn codec(&self) -> MathSegmentCodec {
        let codec = MathSegmentCodec::new().with_unterminated_policy(self.unterminated);
        match codec.clone().with_placeholder(&self.placeholder) {
            Ok(codec) => codec,
            Err(e) => {
                warn!("{}. Using default placeholder.", e);
                codec
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and rendering settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Markdown renderer options
    pub render: RenderOptions,

    /// Math protection options
    pub math: MathOptions,

    /// Standalone HTML export options
    pub export: ExportOptions,
}

impl Settings {
    /// Sanitize settings by resetting values the renderer cannot use.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        if !is_valid_placeholder(&self.math.placeholder) {
            warn!(
                "Math placeholder '{}' could be altered or matched in rendered HTML, using '{}'",
                self.math.placeholder, DEFAULT_PLACEHOLDER
            );
            self.math.placeholder = DEFAULT_PLACEHOLDER.to_string();
        }

        if !is_known_theme(&self.render.highlight_theme) {
            warn!(
                "Unknown highlight theme '{}', using '{}'",
                self.render.highlight_theme, DEFAULT_HIGHLIGHT_THEME
            );
            self.render.highlight_theme = DEFAULT_HIGHLIGHT_THEME.to_string();
        }

        // Empty custom CSS is the same as none
        if self
            .export
            .custom_css
            .as_deref()
            .is_some_and(|css| css.trim().is_empty())
        {
            self.export.custom_css = None;
        }
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// The math codec described by these settings.
    pub fn codec(&self) -> MathSegmentCodec {
        self.math.codec()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
