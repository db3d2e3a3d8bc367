//! Canonical error types for the crate.
//!
//! Encoding and decoding fail through separate enums. Every variant is fatal
//! for the call that produced it: no frames are returned from a failed encode
//! and no content from a failed decode. Per-frame problems that do not stop
//! reassembly live in [`Diagnostics`] instead.

use thiserror::Error;

use crate::{
    envelope::EnvelopeError,
    reassembler::{Diagnostics, MissingIndices},
};

/// Errors raised while turning content into frames and a layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A configuration value is unusable (for example a zero chunk size).
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the configuration.
        reason: String,
    },
    /// The content to encode, or the frame count to lay out, is zero.
    #[error("transfer is empty")]
    EmptyTransfer,
    /// The explicitly requested grid cannot hold every frame.
    #[error("layout of {rows}x{cols} cannot hold {frame_count} frames")]
    LayoutTooSmall {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
        /// Frames that need a cell.
        frame_count: usize,
    },
    /// The filename cannot be embedded in the envelope marker.
    #[error("invalid filename {filename:?}: {reason}")]
    InvalidFilename {
        /// Offending filename.
        filename: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// Content flagged as text is not valid UTF-8.
    #[error("text content is not valid UTF-8")]
    NonTextContent,
    /// The transfer needs more frames than an index can address.
    #[error("transfer needs {frame_count} frames, more than an index can address")]
    TooManyFrames {
        /// Frames the content would have produced.
        frame_count: usize,
    },
}

impl EncodeError {
    /// Shorthand for [`EncodeError::InvalidConfiguration`].
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors raised while reassembling content from decoded strings.
///
/// Each variant carries the diagnostics gathered before the failure so a
/// caller can still annotate the source image.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The caller expected a transfer of zero frames.
    #[error("expected frame count must be at least 1")]
    InvalidExpectedTotal {
        /// Per-string outcomes.
        diagnostics: Box<Diagnostics>,
    },
    /// None of the raw strings parsed as a frame.
    #[error("no frames could be parsed from {} raw strings", .diagnostics.records().len())]
    NoFrames {
        /// Per-string outcomes.
        diagnostics: Box<Diagnostics>,
    },
    /// Some indices below the resolved total were never seen.
    #[error("missing {} of {total} frames: {missing}", .missing.count())]
    MissingFrames {
        /// Indices that were not recovered.
        missing: MissingIndices,
        /// Frame count the transfer was resolved to.
        total: u32,
        /// Per-string outcomes.
        diagnostics: Box<Diagnostics>,
    },
    /// The frames were complete but the envelope inside them is unreadable.
    #[error("corrupt envelope: {source}")]
    CorruptEnvelope {
        /// Envelope parsing failure.
        source: EnvelopeError,
        /// Per-string outcomes.
        diagnostics: Box<Diagnostics>,
    },
}

impl DecodeError {
    /// Diagnostics collected before the failure.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Self::InvalidExpectedTotal { diagnostics }
            | Self::NoFrames { diagnostics }
            | Self::MissingFrames { diagnostics, .. }
            | Self::CorruptEnvelope { diagnostics, .. } => diagnostics,
        }
    }
}
