//! Header syntaxes understood by the frame decoder.
//!
//! Each syntax is a [`HeaderMatcher`]: a pure function from a raw string to a
//! [`HeaderMatch`]. The decoder tries matchers in order and the first
//! structurally valid match wins, so supporting another historical syntax
//! means appending one matcher to the list.

use std::fmt;

use serde::Serialize;

use super::{FrameIndex, ParsedFrame};

/// Marker that opens the canonical header.
pub const CANONICAL_MARKER: &str = "IDX:";

/// Header syntaxes recognised by the default decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderSyntax {
    /// `IDX:<index>:<payload>`, written by the encoder.
    Canonical,
    /// `<index>/<total>:<payload>`.
    Slash,
    /// `[<index>]<payload>`.
    Bracket,
    /// `<index>:<payload>`.
    Bare,
    /// No header at all: the whole string is the only frame of its transfer.
    ///
    /// Never produced by a matcher; the reassembler assigns it to a lone
    /// unframed detection.
    Headerless,
}

impl fmt::Display for HeaderSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Canonical => "canonical",
            Self::Slash => "slash",
            Self::Bracket => "bracket",
            Self::Bare => "bare",
            Self::Headerless => "headerless",
        })
    }
}

/// Outcome of running one matcher against a raw string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderMatch {
    /// The syntax does not apply to this string.
    NoMatch,
    /// The syntax applies but a numeric field is unusable.
    Malformed,
    /// The string is a structurally valid frame in this syntax.
    Frame(ParsedFrame),
}

/// Strategy recognising one header syntax.
///
/// # Examples
///
/// ```
/// use qrarray::frame::{BracketHeader, HeaderMatch, HeaderMatcher};
///
/// let HeaderMatch::Frame(frame) = BracketHeader.try_match("[4]tail") else {
///     panic!("bracket header should match");
/// };
/// assert_eq!(frame.index().get(), 4);
/// assert_eq!(frame.payload(), "tail");
/// ```
pub trait HeaderMatcher: Send + Sync + 'static {
    /// Syntax this matcher recognises.
    fn syntax(&self) -> HeaderSyntax;

    /// Interpret `raw` in this matcher's syntax.
    fn try_match(&self, raw: &str) -> HeaderMatch;
}

/// Numeric header field after interpretation.
enum Field {
    Value(u32),
    Malformed,
    Absent,
}

impl Field {
    /// Parse a field that sits behind an explicit marker. Anything other than
    /// a `u32` is malformed.
    fn strict(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            return text.parse().map_or(Self::Malformed, Self::Value);
        }
        Self::Malformed
    }

    /// Parse a field with no marker of its own. Text that does not start with
    /// a digit is simply not a header.
    fn lenient(text: &str) -> Self {
        if !text.starts_with(|c: char| c.is_ascii_digit()) {
            return Self::Absent;
        }
        Self::strict(text)
    }
}

fn frame(syntax: HeaderSyntax, index: u32, total: Option<u32>, payload: &str) -> HeaderMatch {
    HeaderMatch::Frame(ParsedFrame::new(
        FrameIndex::new(index),
        total,
        payload,
        syntax,
    ))
}

/// Matcher for the canonical `IDX:<index>:` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalHeader;

impl HeaderMatcher for CanonicalHeader {
    fn syntax(&self) -> HeaderSyntax { HeaderSyntax::Canonical }

    fn try_match(&self, raw: &str) -> HeaderMatch {
        let Some(rest) = raw.strip_prefix(CANONICAL_MARKER) else {
            return HeaderMatch::NoMatch;
        };
        let Some((field, payload)) = rest.split_once(':') else {
            return HeaderMatch::Malformed;
        };
        match Field::strict(field) {
            Field::Value(index) => frame(self.syntax(), index, None, payload),
            Field::Malformed | Field::Absent => HeaderMatch::Malformed,
        }
    }
}

/// Matcher for the `<index>/<total>:` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlashHeader;

impl HeaderMatcher for SlashHeader {
    fn syntax(&self) -> HeaderSyntax { HeaderSyntax::Slash }

    fn try_match(&self, raw: &str) -> HeaderMatch {
        let Some((head, payload)) = raw.split_once(':') else {
            return HeaderMatch::NoMatch;
        };
        let Some((index, total)) = head.split_once('/') else {
            return HeaderMatch::NoMatch;
        };
        match (Field::lenient(index), Field::lenient(total)) {
            (Field::Value(index), Field::Value(total)) if index < total => {
                frame(self.syntax(), index, Some(total), payload)
            }
            (Field::Absent, _) | (_, Field::Absent) => HeaderMatch::NoMatch,
            _ => HeaderMatch::Malformed,
        }
    }
}

/// Matcher for the `[<index>]` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct BracketHeader;

impl HeaderMatcher for BracketHeader {
    fn syntax(&self) -> HeaderSyntax { HeaderSyntax::Bracket }

    fn try_match(&self, raw: &str) -> HeaderMatch {
        let Some((field, payload)) = raw
            .strip_prefix('[')
            .and_then(|rest| rest.split_once(']'))
        else {
            return HeaderMatch::NoMatch;
        };
        match Field::lenient(field) {
            Field::Value(index) => frame(self.syntax(), index, None, payload),
            Field::Malformed => HeaderMatch::Malformed,
            Field::Absent => HeaderMatch::NoMatch,
        }
    }
}

/// Matcher for the bare `<index>:` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct BareHeader;

impl HeaderMatcher for BareHeader {
    fn syntax(&self) -> HeaderSyntax { HeaderSyntax::Bare }

    fn try_match(&self, raw: &str) -> HeaderMatch {
        let Some((field, payload)) = raw.split_once(':') else {
            return HeaderMatch::NoMatch;
        };
        match Field::lenient(field) {
            Field::Value(index) => frame(self.syntax(), index, None, payload),
            Field::Malformed => HeaderMatch::Malformed,
            Field::Absent => HeaderMatch::NoMatch,
        }
    }
}
