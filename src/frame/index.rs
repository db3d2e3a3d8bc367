//! Zero-based frame positioning within a transfer.
//!
//! Provides [`FrameIndex`], a type-safe wrapper around `u32` used by both the
//! encoder and the reassembler to order frames.

use std::num::TryFromIntError;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Zero-based ordinal describing a frame's position within its transfer.
///
/// # Examples
///
/// ```
/// use qrarray::frame::FrameIndex;
/// let index = FrameIndex::new(3);
/// assert_eq!(index.get(), 3);
/// assert_eq!(index.padded(3), "003");
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    From,
    Serialize,
    Deserialize,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct FrameIndex(u32);

impl FrameIndex {
    /// Construct an index from a `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the first valid frame index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Render the index left-padded with zeros to `width` digits.
    #[must_use]
    pub fn padded(self, width: usize) -> String { format!("{:0width$}", self.0) }
}

impl TryFrom<usize> for FrameIndex {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u32::try_from(value).map(Self) }
}

impl From<FrameIndex> for u32 {
    fn from(value: FrameIndex) -> Self { value.0 }
}
