//! Worksheet cell state
//!
//! A cell shows rendered Markdown until the user switches it into edit mode,
//! where an external editor owns the text. Deleting a cell removes the
//! worksheet items it represents through an [`ItemStore`]; while that call is
//! in flight the cell is marked as deleting and refuses further edits.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::markdown::{render_cell, CellRender};

// ─────────────────────────────────────────────────────────────────────────────
// Cell Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a cell shows rendered output or its editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CellMode {
    /// Rendered HTML
    #[default]
    View,
    /// External editor showing the raw source
    Edit,
}

impl CellMode {
    /// Toggle between View and Edit modes.
    pub fn toggle(&self) -> Self {
        match self {
            CellMode::View => CellMode::Edit,
            CellMode::Edit => CellMode::View,
        }
    }

    /// Get a display label for the mode.
    pub fn label(&self) -> &'static str {
        match self {
            CellMode::View => "View",
            CellMode::Edit => "Edit",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Item Store
// ─────────────────────────────────────────────────────────────────────────────

/// Identifier of a worksheet item backing a cell.
pub type ItemId = u64;

/// Backend that persists worksheet item deletions.
pub trait ItemStore {
    /// Delete the given items.
    ///
    /// Implementations report refusal as `Error::DeleteFailed`.
    fn delete_items(&mut self, ids: &[ItemId]) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Worksheet Cell
// ─────────────────────────────────────────────────────────────────────────────

/// A single Markdown worksheet cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetCell {
    source: String,
    item_ids: Vec<ItemId>,
    mode: CellMode,
    deleting: bool,
}

impl WorksheetCell {
    /// Create a cell in view mode.
    pub fn new(source: impl Into<String>, item_ids: Vec<ItemId>) -> Self {
        Self {
            source: source.into(),
            item_ids,
            mode: CellMode::View,
            deleting: false,
        }
    }

    /// Raw Markdown-plus-math source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Items this cell represents.
    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn mode(&self) -> CellMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == CellMode::Edit
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Switch between view and edit mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeleteInProgress` while the cell is being deleted.
    pub fn toggle_edit(&mut self) -> Result<CellMode> {
        if self.deleting {
            return Err(Error::DeleteInProgress);
        }
        self.mode = self.mode.toggle();
        debug!("Cell mode is now {}", self.mode.label());
        Ok(self.mode)
    }

    /// Accept the editor's text and return to view mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeleteInProgress` while the cell is being deleted; the
    /// source is left unchanged.
    pub fn finish_edit(&mut self, source: impl Into<String>) -> Result<()> {
        if self.deleting {
            return Err(Error::DeleteInProgress);
        }
        self.source = source.into();
        self.mode = CellMode::View;
        Ok(())
    }

    /// Render the cell with the given settings.
    pub fn render(&self, settings: &Settings) -> CellRender {
        render_cell(&self.source, &settings.render, &settings.codec())
    }

    /// Delete the cell's items through `store`.
    ///
    /// The deleting flag stays set after success; the cell is expected to be
    /// dropped once the worksheet reloads. On failure the flag is cleared so
    /// the user can try again.
    ///
    /// # Errors
    ///
    /// - `Error::DeleteInProgress`: a deletion is already running
    /// - whatever the store returns
    pub fn delete(&mut self, store: &mut dyn ItemStore) -> Result<()> {
        if self.deleting {
            return Err(Error::DeleteInProgress);
        }

        self.deleting = true;
        match store.delete_items(&self.item_ids) {
            Ok(()) => {
                info!("Deleted {} worksheet item(s)", self.item_ids.len());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete cell: {}", e);
                self.deleting = false;
                Err(e)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
