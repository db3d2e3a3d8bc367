//! Frame codec: the text form of a single transportable unit.
//!
//! A frame is one optical code's worth of a transfer. The encoder writes the
//! canonical `IDX:<index>:<payload>` header; the decoder also accepts the
//! slash, bracket, and bare headers written by earlier tools.

pub mod codec;
pub mod error;
pub mod header;
pub mod index;

pub use codec::{
    FrameDecoder,
    FrameEncoder,
    MIN_INDEX_WIDTH,
    ParsedFrame,
    decode,
    encode,
    index_width,
};
pub use error::{ParseFailure, ParseFailureReason};
pub use header::{
    BareHeader,
    BracketHeader,
    CANONICAL_MARKER,
    CanonicalHeader,
    HeaderMatch,
    HeaderMatcher,
    HeaderSyntax,
    SlashHeader,
};
pub use index::FrameIndex;
