#![doc(html_root_url = "https://docs.rs/qrarray/latest")]
//! Public API for the `qrarray` library.
//!
//! This crate splits content into indexed frames for an array of optical
//! codes and rebuilds the content from whatever frames a detector recovers,
//! in any order, with duplicates and noise.
//!
//! Rendering and detecting the codes themselves happen behind the traits in
//! [`collaborator`].

pub mod chunker;
pub mod collaborator;
pub mod config;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod layout;
pub mod metrics;
pub mod reassembler;
pub mod transfer;

pub use chunker::{ChunkLimit, ChunkUnit};
pub use collaborator::{Compositor, Detector, Renderer, decode_image, render_array};
pub use config::TransferConfig;
pub use envelope::{EnvelopeError, Transfer};
pub use error::{DecodeError, EncodeError};
pub use frame::{FrameDecoder, FrameEncoder, FrameIndex, ParseFailure, ParsedFrame, decode, encode};
pub use layout::{Cell, Layout, plan};
pub use metrics::{FRAMES_DECODED, FRAMES_ENCODED, REASSEMBLY_FAILURES};
pub use reassembler::{Detection, Diagnostics, MissingIndices, Reassembler, Reassembly, Warning};
pub use transfer::{EncodedTransfer, decode_transfer, decode_transfer_expecting, encode_transfer};
