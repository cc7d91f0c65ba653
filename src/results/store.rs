//! In-memory store for decoded prediction rows plus manual corrections.
//!
//! The base rows are immutable after construction; user edits live in a
//! sparse overlay keyed by decode position. The overlay strictly shadows
//! `predicted` for display and export and never mutates the row itself.

use std::collections::BTreeMap;

use thiserror::Error;

use super::decode::PredictionRow;
use super::label::{InvalidLabelError, Label};

/// Rejected correction attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CorrectionError {
    /// Correction value outside {0, 1, 2}.
    #[error(transparent)]
    InvalidLabel(#[from] InvalidLabelError),
    /// Position does not exist in the base row set.
    #[error("row position {position} out of range (have {len} rows)")]
    OutOfRange { position: usize, len: usize },
}

/// Decoded rows plus the correction overlay for one loaded result set.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<PredictionRow>,
    overlay: BTreeMap<usize, Label>,
}

impl RowStore {
    /// Wrap a freshly decoded row set with an empty overlay.
    pub fn new(rows: Vec<PredictionRow>) -> Self {
        Self {
            rows,
            overlay: BTreeMap::new(),
        }
    }

    pub fn rows(&self) -> &[PredictionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The label shown and exported for a row: the correction if present,
    /// else the model prediction. `None` only for out-of-range positions.
    pub fn effective_label(&self, position: usize) -> Option<Label> {
        if let Some(corrected) = self.overlay.get(&position) {
            return Some(*corrected);
        }
        self.rows.get(position).map(|row| row.predicted)
    }

    /// The correction recorded for a row, if any.
    pub fn correction(&self, position: usize) -> Option<Label> {
        self.overlay.get(&position).copied()
    }

    /// Insert or overwrite a correction.
    ///
    /// Re-correcting a row to its original predicted value keeps the overlay
    /// entry; "has a correction" is about the user's action, not the value.
    pub fn set_correction(&mut self, position: usize, label: i64) -> Result<(), CorrectionError> {
        let label = Label::try_from(label)?;
        if position >= self.rows.len() {
            return Err(CorrectionError::OutOfRange {
                position,
                len: self.rows.len(),
            });
        }
        self.overlay.insert(position, label);
        Ok(())
    }

    /// Number of corrected rows; gates the export-corrections affordance.
    pub fn correction_count(&self) -> usize {
        self.overlay.len()
    }

    /// Iterate `(position, row, effective label)` in decode order.
    pub fn iter_effective(&self) -> impl Iterator<Item = (usize, &PredictionRow, Label)> {
        self.rows.iter().enumerate().map(|(position, row)| {
            let label = self
                .overlay
                .get(&position)
                .copied()
                .unwrap_or(row.predicted);
            (position, row, label)
        })
    }
}
