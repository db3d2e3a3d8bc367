//! Encoding of frames into text and tolerant decoding back.
//!
//! [`FrameEncoder`] writes the canonical `IDX:<index>:<payload>` form with an
//! index width fixed once per transfer. [`FrameDecoder`] walks an ordered list
//! of [`HeaderMatcher`]s so frames written by older tools still parse.

use std::{fmt, sync::Arc};

use super::{
    BareHeader,
    BracketHeader,
    CANONICAL_MARKER,
    CanonicalHeader,
    FrameIndex,
    HeaderMatch,
    HeaderMatcher,
    HeaderSyntax,
    ParseFailure,
    ParseFailureReason,
    SlashHeader,
};

/// Minimum number of digits in a canonical header index.
pub const MIN_INDEX_WIDTH: usize = 3;

/// Frame recovered from a raw decoded string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFrame {
    index: FrameIndex,
    total: Option<u32>,
    payload: String,
    syntax: HeaderSyntax,
}

impl ParsedFrame {
    /// Construct a parsed frame.
    #[must_use]
    pub fn new(
        index: FrameIndex,
        total: Option<u32>,
        payload: impl Into<String>,
        syntax: HeaderSyntax,
    ) -> Self {
        Self {
            index,
            total,
            payload: payload.into(),
            syntax,
        }
    }

    /// Position of the frame within its transfer.
    #[must_use]
    pub const fn index(&self) -> FrameIndex { self.index }

    /// Frame count carried by the header, when the syntax has one.
    #[must_use]
    pub const fn total(&self) -> Option<u32> { self.total }

    /// Borrow the payload text.
    #[must_use]
    pub fn payload(&self) -> &str { &self.payload }

    /// Header syntax the frame was written in.
    #[must_use]
    pub const fn syntax(&self) -> HeaderSyntax { self.syntax }

    /// Consume the frame, returning the owned payload.
    #[must_use]
    pub fn into_payload(self) -> String { self.payload }
}

/// Number of digits used for every index of a transfer with `total` frames.
///
/// # Examples
///
/// ```
/// use qrarray::frame::index_width;
/// assert_eq!(index_width(3), 3);
/// assert_eq!(index_width(1000), 3);
/// assert_eq!(index_width(1001), 4);
/// ```
#[must_use]
pub fn index_width(total: u32) -> usize {
    let last = total.saturating_sub(1);
    let digits = last.checked_ilog10().map_or(1, |log| log as usize + 1);
    digits.max(MIN_INDEX_WIDTH)
}

/// Writes canonical frame strings for one transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameEncoder {
    total: u32,
    width: usize,
}

impl FrameEncoder {
    /// Create an encoder for a transfer of `total` frames.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            width: index_width(total),
        }
    }

    /// Number of frames in the transfer.
    #[must_use]
    pub const fn total(&self) -> u32 { self.total }

    /// Width shared by every index in the transfer.
    #[must_use]
    pub const fn width(&self) -> usize { self.width }

    /// Render the frame at `index` carrying `payload`.
    #[must_use]
    pub fn encode(&self, index: FrameIndex, payload: &str) -> String {
        debug_assert!(index.get() < self.total, "frame index out of range");
        let mut frame =
            String::with_capacity(CANONICAL_MARKER.len() + self.width + 1 + payload.len());
        frame.push_str(CANONICAL_MARKER);
        frame.push_str(&index.padded(self.width));
        frame.push(':');
        frame.push_str(payload);
        frame
    }
}

/// Render a single canonical frame.
///
/// # Examples
///
/// ```
/// use qrarray::frame::{FrameIndex, encode};
/// assert_eq!(encode(FrameIndex::new(2), 3, "RLD"), "IDX:002:RLD");
/// ```
#[must_use]
pub fn encode(index: FrameIndex, total: u32, payload: &str) -> String {
    FrameEncoder::new(total).encode(index, payload)
}

/// Interpret `raw` with the default matcher list.
///
/// # Errors
///
/// Returns a [`ParseFailure`] when no header syntax matches.
///
/// # Examples
///
/// ```
/// use qrarray::frame::decode;
/// let frame = decode("2/5:hello").expect("slash header parses");
/// assert_eq!(frame.index().get(), 2);
/// assert_eq!(frame.total(), Some(5));
/// assert_eq!(frame.payload(), "hello");
/// ```
pub fn decode(raw: &str) -> Result<ParsedFrame, ParseFailure> {
    FrameDecoder::default().decode(raw)
}

/// Ordered set of header matchers.
#[derive(Clone)]
pub struct FrameDecoder {
    matchers: Vec<Arc<dyn HeaderMatcher>>,
}

impl FrameDecoder {
    /// Create a decoder with no matchers; every string fails to parse.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    /// Append `matcher` after the existing ones.
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl HeaderMatcher) -> Self {
        self.matchers.push(Arc::new(matcher));
        self
    }

    /// Syntaxes in the order they are tried.
    pub fn syntaxes(&self) -> impl Iterator<Item = HeaderSyntax> + '_ {
        self.matchers.iter().map(|matcher| matcher.syntax())
    }

    /// Interpret `raw`, trying each matcher in turn.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailureReason::EmptyPayload`] for an empty string,
    /// [`ParseFailureReason::MalformedIndex`] when some matcher recognised its
    /// syntax but could not read the index, and
    /// [`ParseFailureReason::NoHeaderMatch`] otherwise.
    pub fn decode(&self, raw: &str) -> Result<ParsedFrame, ParseFailure> {
        if raw.is_empty() {
            return Err(ParseFailure::new(raw, ParseFailureReason::EmptyPayload));
        }

        let mut malformed = false;
        for matcher in &self.matchers {
            match matcher.try_match(raw) {
                HeaderMatch::Frame(frame) => return Ok(frame),
                HeaderMatch::Malformed => malformed = true,
                HeaderMatch::NoMatch => {}
            }
        }

        let reason = if malformed {
            ParseFailureReason::MalformedIndex
        } else {
            ParseFailureReason::NoHeaderMatch
        };
        Err(ParseFailure::new(raw, reason))
    }
}

impl Default for FrameDecoder {
    /// Canonical, slash, bracket, then bare headers.
    fn default() -> Self {
        Self::empty()
            .with_matcher(CanonicalHeader)
            .with_matcher(SlashHeader)
            .with_matcher(BracketHeader)
            .with_matcher(BareHeader)
    }
}

impl fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.syntaxes()).finish()
    }
}
