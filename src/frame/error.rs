//! Failure types produced while interpreting raw decoded strings.
//!
//! A [`ParseFailure`] is never fatal on its own: the reassembler records it in
//! its diagnostics and carries on with the frames that did parse.

use serde::Serialize;
use thiserror::Error;

/// Why a raw string could not be interpreted as a frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailureReason {
    /// No known header syntax matched the raw string.
    #[error("no header syntax matched")]
    NoHeaderMatch,
    /// A header marker was recognised but its numeric field did not parse.
    #[error("malformed frame index")]
    MalformedIndex,
    /// The raw string was empty.
    #[error("empty payload")]
    EmptyPayload,
}

/// A raw string that failed to parse, together with the reason.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot parse frame {raw:?}: {reason}")]
pub struct ParseFailure {
    raw: String,
    reason: ParseFailureReason,
}

impl ParseFailure {
    /// Construct a failure for `raw`.
    #[must_use]
    pub fn new(raw: impl Into<String>, reason: ParseFailureReason) -> Self {
        Self {
            raw: raw.into(),
            reason,
        }
    }

    /// Borrow the raw string that failed to parse.
    #[must_use]
    pub fn raw(&self) -> &str { &self.raw }

    /// Return the failure reason.
    #[must_use]
    pub const fn reason(&self) -> ParseFailureReason { self.reason }
}
