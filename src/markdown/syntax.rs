//! Syntax Highlighting Module
//!
//! Integrates syntect with comrak's code fence highlighter plugin. Loading the
//! bundled syntax and theme sets is expensive, so adapters are built once per
//! theme and shared for the life of the process.

use comrak::plugins::syntect::{SyntectAdapter, SyntectAdapterBuilder};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use syntect::highlighting::ThemeSet;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default theme name from syntect's built-in themes
pub const DEFAULT_HIGHLIGHT_THEME: &str = "InspiredGitHub";

// ─────────────────────────────────────────────────────────────────────────────
// Theme Lookup
// ─────────────────────────────────────────────────────────────────────────────

static THEME_NAMES: OnceLock<Vec<String>> = OnceLock::new();

/// Names of the themes bundled with syntect, sorted.
pub fn available_themes() -> &'static [String] {
    THEME_NAMES.get_or_init(|| {
        debug!("Loading syntect theme set");
        ThemeSet::load_defaults().themes.into_keys().collect()
    })
}

/// Whether `name` is one of the bundled syntect themes.
pub fn is_known_theme(name: &str) -> bool {
    available_themes().iter().any(|theme| theme == name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Adapter Cache
// ─────────────────────────────────────────────────────────────────────────────

static ADAPTERS: OnceLock<Mutex<HashMap<String, Arc<SyntectAdapter>>>> = OnceLock::new();

/// Get the shared comrak highlighter adapter for a theme.
///
/// # Errors
///
/// Returns `Error::UnknownHighlightTheme` if syntect has no such theme.
pub fn adapter_for_theme(theme: &str) -> Result<Arc<SyntectAdapter>> {
    if !is_known_theme(theme) {
        return Err(Error::UnknownHighlightTheme(theme.to_string()));
    }

    let cache = ADAPTERS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut adapters = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let adapter = adapters.entry(theme.to_string()).or_insert_with(|| {
        debug!("Building syntax highlighter for theme {}", theme);
        Arc::new(SyntectAdapterBuilder::new().theme(theme).build())
    });
    Ok(Arc::clone(adapter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_is_bundled() {
        assert!(is_known_theme(DEFAULT_HIGHLIGHT_THEME));
        assert!(is_known_theme("base16-ocean.dark"));
    }

    #[test]
    fn test_unknown_theme_rejected() {
        assert!(!is_known_theme("no-such-theme"));
        assert!(matches!(
            adapter_for_theme("no-such-theme"),
            Err(Error::UnknownHighlightTheme(_))
        ));
    }

    #[test]
    fn test_adapter_is_cached() {
        let first = adapter_for_theme(DEFAULT_HIGHLIGHT_THEME).unwrap();
        let second = adapter_for_theme(DEFAULT_HIGHLIGHT_THEME).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
