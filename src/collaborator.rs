//! Seams for the optical-code backends.
//!
//! Rendering a frame into a symbol, compositing symbols into one array
//! image, and detecting symbols in a captured image all live outside this
//! crate. These traits describe what the pipeline needs from them; the
//! drivers below wire implementations to the encode and decode paths.

use log::debug;
use thiserror::Error;

use crate::{
    error::DecodeError,
    frame::FrameIndex,
    layout::{Cell, CompositeGeometry, Layout},
    reassembler::{Detection, Reassembler, Reassembly},
    transfer::EncodedTransfer,
};

/// Turns one frame string into a scannable symbol image.
///
/// Implementations may reject frames beyond their native capacity; keeping
/// the chunk limit under that capacity is a configuration concern.
pub trait Renderer {
    /// Rendered symbol.
    type Image;
    /// Rendering failure.
    type Error;

    /// Render `frame` into a symbol.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the frame cannot be rendered.
    fn render(&self, frame: &str) -> Result<Self::Image, Self::Error>;
}

/// Places rendered symbols into the cells of a grid.
pub trait Compositor<I> {
    /// Composite image.
    type Output;
    /// Compositing failure.
    type Error;

    /// Build one image from `tiles`, each placed in its grid cell.
    ///
    /// Cells past the last frame stay blank.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the image cannot be built.
    fn compose(
        &self,
        layout: &Layout,
        spacing: u32,
        tiles: Vec<(Cell, I)>,
    ) -> Result<Self::Output, Self::Error>;
}

/// Finds symbols in a captured image.
pub trait Detector<I: ?Sized> {
    /// Detection failure.
    type Error;

    /// Decode every symbol in `image`, in any order.
    ///
    /// An unreadable image yields an empty list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the image cannot be processed at all.
    fn detect(&self, image: &I) -> Result<Vec<Detection>, Self::Error>;
}

/// Failure while producing an array image.
#[derive(Debug, Error)]
pub enum RenderError<R, C> {
    /// A frame could not be rendered.
    #[error("failed to render frame {index}: {error}")]
    Render {
        /// Index of the frame that failed.
        index: FrameIndex,
        /// Backend error.
        error: R,
    },
    /// The rendered frames could not be composed.
    #[error("failed to compose array image: {0}")]
    Compose(C),
}

/// Failure while recovering a transfer from an image.
#[derive(Debug, Error)]
pub enum ScanError<E> {
    /// The detector could not process the image.
    #[error("symbol detection failed: {0}")]
    Detect(E),
    /// Detected symbols did not reassemble.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Render every frame of `encoded` and compose them into one array image.
///
/// # Errors
///
/// Returns [`RenderError::Render`] for the first frame the renderer rejects
/// and [`RenderError::Compose`] when compositing fails.
pub fn render_array<R, C>(
    encoded: &EncodedTransfer,
    spacing: u32,
    renderer: &R,
    compositor: &C,
) -> Result<C::Output, RenderError<R::Error, C::Error>>
where
    R: Renderer,
    C: Compositor<R::Image>,
{
    let tiles = encoded
        .placements()
        .zip(0_u32..)
        .map(|((cell, frame), index)| {
            renderer
                .render(frame)
                .map(|image| (cell, image))
                .map_err(|error| RenderError::Render {
                    index: FrameIndex::new(index),
                    error,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "composing array: frames={}, rows={}, cols={}, spacing={spacing}",
        tiles.len(),
        encoded.layout().rows(),
        encoded.layout().cols(),
    );
    compositor
        .compose(encoded.layout(), spacing, tiles)
        .map_err(RenderError::Compose)
}

/// Detect symbols in `image` and reassemble them with `reassembler`.
///
/// # Errors
///
/// Returns [`ScanError::Detect`] when detection fails and
/// [`ScanError::Decode`] when the detected symbols do not reassemble.
pub fn decode_image<D, I>(
    detector: &D,
    image: &I,
    reassembler: &Reassembler,
) -> Result<Reassembly, ScanError<D::Error>>
where
    D: Detector<I>,
    I: ?Sized,
{
    let detections = detector.detect(image).map_err(ScanError::Detect)?;
    debug!("detected symbols: count={}", detections.len());
    Ok(reassembler.reassemble(detections)?)
}

/// Pixel origin of every tile for a compositor working on `geometry`.
///
/// Convenience for [`Compositor`] implementations.
pub fn tile_origins<'a, I>(
    geometry: &'a CompositeGeometry,
    tiles: &'a [(Cell, I)],
) -> impl Iterator<Item = (u32, u32)> + 'a {
    tiles.iter().map(move |(cell, _)| geometry.origin(*cell))
}
