//! End-to-end encode and decode of a transfer.
//!
//! Encode: envelope, chunk, frame, lay out. Decode: parse, reassemble,
//! unwrap. Both directions are pure functions of their inputs.

use log::debug;

use crate::{
    chunker,
    config::TransferConfig,
    envelope::Transfer,
    error::{DecodeError, EncodeError},
    frame::{FrameEncoder, FrameIndex},
    layout::{self, Cell, Layout},
    metrics,
    reassembler::{Detection, Reassembler, Reassembly},
};

/// Frames of one transfer and the grid they are arranged in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedTransfer {
    frames: Vec<String>,
    layout: Layout,
}

impl EncodedTransfer {
    /// Frame strings in index order.
    #[must_use]
    pub fn frames(&self) -> &[String] { &self.frames }

    /// Grid the frames are arranged in.
    #[must_use]
    pub const fn layout(&self) -> &Layout { &self.layout }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Always `false`: an encoded transfer has at least one frame.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Each frame with the grid cell it belongs in.
    pub fn placements(&self) -> impl Iterator<Item = (Cell, &str)> + '_ {
        self.layout
            .cells()
            .zip(self.frames.iter().map(String::as_str))
    }

    /// Consume the transfer, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Layout) { (self.frames, self.layout) }
}

/// Split `transfer` into frames and plan their grid.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidConfiguration`] for an unusable `config`,
/// [`EncodeError::EmptyTransfer`] for empty content, and any envelope, chunk,
/// or layout error raised along the way.
///
/// # Examples
///
/// ```
/// use qrarray::{chunker::ChunkLimit, config::TransferConfig, envelope::Transfer, encode_transfer};
///
/// let config = TransferConfig::default().with_chunk_limit(ChunkLimit::chars(4));
/// let encoded = encode_transfer(&Transfer::text("HELLO WORLD"), &config).expect("encodes");
/// assert_eq!(encoded.frames(), ["IDX:000:HELL", "IDX:001:O WO", "IDX:002:RLD"]);
/// assert_eq!((encoded.layout().rows(), encoded.layout().cols()), (1, 3));
/// ```
pub fn encode_transfer(
    transfer: &Transfer,
    config: &TransferConfig,
) -> Result<EncodedTransfer, EncodeError> {
    config.validate()?;
    if transfer.content().is_empty() {
        return Err(EncodeError::EmptyTransfer);
    }

    let payload = transfer.wrap()?;
    let chunks = chunker::split_text(&payload, config.chunk_limit)?;
    let frame_count = chunks.len();
    let total =
        u32::try_from(frame_count).map_err(|_| EncodeError::TooManyFrames { frame_count })?;
    let layout = layout::plan(frame_count, config.rows, config.cols)?;

    let encoder = FrameEncoder::new(total);
    let frames: Vec<String> = (0..total)
        .map(FrameIndex::new)
        .zip(chunks)
        .map(|(index, chunk)| encoder.encode(index, chunk))
        .collect();

    debug!(
        "encoded transfer: bytes={}, binary={}, frames={total}, rows={}, cols={}",
        transfer.content().len(),
        transfer.is_binary(),
        layout.rows(),
        layout.cols(),
    );
    metrics::inc_encoded(frames.len());

    Ok(EncodedTransfer { frames, layout })
}

/// Reassemble a transfer from detected strings with the default reassembler.
///
/// Canonical headers do not carry the frame count, so the count is inferred
/// from the highest index seen. Losing the last frames of a transfer then
/// yields a shorter transfer rather than an error; use
/// [`decode_transfer_expecting`] when the count is known.
///
/// # Errors
///
/// See [`Reassembler::reassemble`].
pub fn decode_transfer<I, D>(detections: I) -> Result<Reassembly, DecodeError>
where
    I: IntoIterator<Item = D>,
    D: Into<Detection>,
{
    decode_transfer_expecting(detections, None)
}

/// Reassemble a transfer whose frame count may be known out of band, for
/// example from [`Layout::frame_count`] of the captured array.
///
/// # Errors
///
/// See [`Reassembler::reassemble`].
///
/// # Examples
///
/// ```
/// use qrarray::{DecodeError, decode_transfer_expecting};
///
/// let err = decode_transfer_expecting(["IDX:000:HELL", "IDX:001:O WO"], Some(3))
///     .expect_err("last frame lost");
/// assert!(matches!(err, DecodeError::MissingFrames { total: 3, .. }));
/// ```
pub fn decode_transfer_expecting<I, D>(
    detections: I,
    expected_total: Option<u32>,
) -> Result<Reassembly, DecodeError>
where
    I: IntoIterator<Item = D>,
    D: Into<Detection>,
{
    let reassembler = match expected_total {
        Some(total) => Reassembler::new().expect_total(total),
        None => Reassembler::new(),
    };
    reassembler.reassemble(detections)
}
