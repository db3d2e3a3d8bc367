//! Transfer configuration.
//!
//! [`TransferConfig`] gathers the knobs of the encode path: how large each
//! chunk may be and how the grid is shaped. It deserialises from any serde
//! format, with every field optional.

use serde::{Deserialize, Serialize};

use crate::{
    chunker::ChunkLimit,
    error::EncodeError,
    layout::DEFAULT_CELL_SPACING,
};

/// Settings for encoding a transfer.
///
/// # Examples
///
/// ```
/// use qrarray::{chunker::ChunkLimit, config::TransferConfig};
///
/// let config = TransferConfig::default()
///     .with_chunk_limit(ChunkLimit::chars(500))
///     .with_cols(3);
/// assert_eq!(config.chunk_limit.size, 500);
/// assert_eq!(config.cols, Some(3));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Upper bound on each frame's payload.
    pub chunk_limit: ChunkLimit,
    /// Requested grid rows; derived when absent.
    pub rows: Option<usize>,
    /// Requested grid columns; derived when absent.
    pub cols: Option<usize>,
    /// Gap between cells of the composite image, in pixels.
    pub cell_spacing: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_limit: ChunkLimit::default(),
            rows: None,
            cols: None,
            cell_spacing: DEFAULT_CELL_SPACING,
        }
    }
}

impl TransferConfig {
    /// Replace the chunk limit.
    #[must_use]
    pub const fn with_chunk_limit(mut self, chunk_limit: ChunkLimit) -> Self {
        self.chunk_limit = chunk_limit;
        self
    }

    /// Request a number of rows.
    #[must_use]
    pub const fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Request a number of columns.
    #[must_use]
    pub const fn with_cols(mut self, cols: usize) -> Self {
        self.cols = Some(cols);
        self
    }

    /// Replace the gap between composite cells.
    #[must_use]
    pub const fn with_cell_spacing(mut self, cell_spacing: u32) -> Self {
        self.cell_spacing = cell_spacing;
        self
    }

    /// Check every setting that does not depend on the content.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidConfiguration`] for a zero chunk size or a
    /// requested dimension of zero.
    pub fn validate(&self) -> Result<(), EncodeError> {
        self.chunk_limit.validate()?;
        if self.rows == Some(0) || self.cols == Some(0) {
            return Err(EncodeError::invalid_configuration(
                "requested rows and columns must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TransferConfig;
    use crate::{
        chunker::{ChunkLimit, ChunkUnit},
        error::EncodeError,
    };

    #[test]
    fn defaults_are_documented_values() {
        let config = TransferConfig::default();
        assert_eq!(config.chunk_limit, ChunkLimit::chars(1000));
        assert_eq!((config.rows, config.cols), (None, None));
        assert_eq!(config.cell_spacing, 20);
    }

    #[test]
    fn deserialises_partial_json() {
        let config: TransferConfig =
            serde_json::from_str(r#"{"chunk_limit": {"size": 64, "unit": "bytes"}, "cols": 4}"#)
                .expect("valid config");
        assert_eq!(config.chunk_limit.size, 64);
        assert_eq!(config.chunk_limit.unit, ChunkUnit::Bytes);
        assert_eq!(config.cols, Some(4));
        assert_eq!(config.rows, None);
        assert_eq!(config.cell_spacing, 20);
    }

    #[test]
    fn zero_values_fail_validation() {
        let zero_chunk = TransferConfig::default().with_chunk_limit(ChunkLimit::chars(0));
        assert!(matches!(
            zero_chunk.validate(),
            Err(EncodeError::InvalidConfiguration { .. })
        ));

        let zero_rows = TransferConfig::default().with_rows(0);
        assert!(matches!(
            zero_rows.validate(),
            Err(EncodeError::InvalidConfiguration { .. })
        ));
    }
}
