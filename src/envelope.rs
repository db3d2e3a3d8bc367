//! Transfer envelope: binary-safe encoding plus filename metadata.
//!
//! The envelope is applied once per transfer, before chunking, and removed
//! once after reassembly. It is a text prefix:
//!
//! - `QRTEXT:<filename>:<text>` for text content.
//! - `QRFILE:<filename>:<base64>` for binary content.
//!
//! Plain text without a filename travels bare. A marker is still written when
//! that text itself starts with a marker prefix, with an empty filename, so
//! [`unwrap`] always inverts [`wrap`].

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EncodeError;

/// Prefix of the envelope marker for text content.
pub const TEXT_MARKER: &str = "QRTEXT:";
/// Prefix of the envelope marker for binary content.
pub const FILE_MARKER: &str = "QRFILE:";
/// Separates the filename from the content inside a marker.
pub const FIELD_DELIMITER: char = ':';
/// Byte-order mark written in front of recovered text files.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised while removing an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// A marker prefix was present without the delimiter ending the filename.
    #[error("envelope marker {marker:?} has no filename delimiter")]
    MissingDelimiter {
        /// Marker that was found.
        marker: &'static str,
    },
    /// Content flagged as binary is not valid base64.
    #[error("binary content is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Content moved by one encode or decode call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    content: Vec<u8>,
    is_binary: bool,
    filename: Option<String>,
}

impl Transfer {
    /// Text content without a filename.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into().into_bytes(),
            is_binary: false,
            filename: None,
        }
    }

    /// Binary content without a filename.
    #[must_use]
    pub fn binary(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            is_binary: true,
            filename: None,
        }
    }

    /// Classify `content` as text when it is valid UTF-8 and as binary
    /// otherwise.
    #[must_use]
    pub fn detect(content: impl Into<Vec<u8>>, filename: Option<String>) -> Self {
        let content = content.into();
        let is_binary = std::str::from_utf8(&content).is_err();
        Self {
            content,
            is_binary,
            filename,
        }
    }

    /// Attach a filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Borrow the content bytes.
    #[must_use]
    pub fn content(&self) -> &[u8] { &self.content }

    /// Whether the content travels base64 encoded.
    #[must_use]
    pub const fn is_binary(&self) -> bool { self.is_binary }

    /// Filename carried in the envelope, if any.
    ///
    /// A decoded filename comes from untrusted input; callers writing it to
    /// disk should keep only its final path component.
    #[must_use]
    pub fn filename(&self) -> Option<&str> { self.filename.as_deref() }

    /// Consume the transfer, returning the content bytes.
    #[must_use]
    pub fn into_content(self) -> Vec<u8> { self.content }

    /// Bytes to write when persisting the content: UTF-8 with byte-order mark
    /// for text, unchanged bytes for binary content.
    #[must_use]
    pub fn to_file_bytes(&self) -> Vec<u8> {
        if self.is_binary {
            return self.content.clone();
        }
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + self.content.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(&self.content);
        bytes
    }

    /// Wrap this transfer's content in its envelope.
    ///
    /// # Errors
    ///
    /// See [`wrap`].
    pub fn wrap(&self) -> Result<String, EncodeError> {
        wrap(&self.content, self.is_binary, self.filename.as_deref())
    }
}

/// Produce the envelope payload for `content`.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidFilename`] when `filename` cannot be embedded
/// in the marker and [`EncodeError::NonTextContent`] when text content is not
/// UTF-8.
///
/// # Examples
///
/// ```
/// use qrarray::envelope::wrap;
/// assert_eq!(wrap(b"hi", false, None).expect("plain text"), "hi");
/// assert_eq!(wrap(b"hi", false, Some("a.txt")).expect("named text"), "QRTEXT:a.txt:hi");
/// assert_eq!(wrap(&[0, 1], true, None).expect("binary"), "QRFILE::AAE=");
/// ```
pub fn wrap(
    content: &[u8],
    is_binary: bool,
    filename: Option<&str>,
) -> Result<String, EncodeError> {
    if let Some(name) = filename {
        validate_filename(name)?;
    }

    if is_binary {
        let encoded = STANDARD.encode(content);
        return Ok(marked(FILE_MARKER, filename.unwrap_or_default(), &encoded));
    }

    let text = std::str::from_utf8(content).map_err(|_| EncodeError::NonTextContent)?;
    match filename {
        Some(name) => Ok(marked(TEXT_MARKER, name, text)),
        None if starts_with_marker(text) => Ok(marked(TEXT_MARKER, "", text)),
        None => Ok(text.to_owned()),
    }
}

/// Recover the transfer from a reassembled payload.
///
/// Input without a marker is plain text with no filename.
///
/// # Errors
///
/// Returns [`EnvelopeError::MissingDelimiter`] when a marker is not closed and
/// [`EnvelopeError::InvalidBase64`] when binary content does not decode.
pub fn unwrap(payload: &str) -> Result<Transfer, EnvelopeError> {
    if let Some(rest) = payload.strip_prefix(FILE_MARKER) {
        let (filename, body) = split_marker(FILE_MARKER, rest)?;
        return Ok(Transfer {
            content: STANDARD.decode(body)?,
            is_binary: true,
            filename,
        });
    }
    if let Some(rest) = payload.strip_prefix(TEXT_MARKER) {
        let (filename, body) = split_marker(TEXT_MARKER, rest)?;
        return Ok(Transfer {
            content: body.as_bytes().to_vec(),
            is_binary: false,
            filename,
        });
    }
    Ok(Transfer::text(payload))
}

fn validate_filename(name: &str) -> Result<(), EncodeError> {
    let reject = |reason| {
        Err(EncodeError::InvalidFilename {
            filename: name.to_owned(),
            reason,
        })
    };
    if name.is_empty() {
        return reject("filename is empty");
    }
    if name.contains(FIELD_DELIMITER) {
        return reject("filename contains the marker delimiter ':'");
    }
    if name.contains(['/', '\\']) {
        return reject("filename contains a path separator");
    }
    if name.chars().any(char::is_control) {
        return reject("filename contains a control character");
    }
    Ok(())
}

fn starts_with_marker(text: &str) -> bool {
    text.starts_with(TEXT_MARKER) || text.starts_with(FILE_MARKER)
}

fn marked(marker: &str, filename: &str, body: &str) -> String {
    let mut out = String::with_capacity(marker.len() + filename.len() + 1 + body.len());
    out.push_str(marker);
    out.push_str(filename);
    out.push(FIELD_DELIMITER);
    out.push_str(body);
    out
}

fn split_marker<'a>(
    marker: &'static str,
    rest: &'a str,
) -> Result<(Option<String>, &'a str), EnvelopeError> {
    let (filename, body) = rest
        .split_once(FIELD_DELIMITER)
        .ok_or(EnvelopeError::MissingDelimiter { marker })?;
    let filename = (!filename.is_empty()).then(|| filename.to_owned());
    Ok((filename, body))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{EnvelopeError, Transfer, UTF8_BOM, unwrap, wrap};
    use crate::error::EncodeError;

    #[test]
    fn plain_text_travels_bare() {
        let payload = wrap("你好, world".as_bytes(), false, None).expect("plain text");
        assert_eq!(payload, "你好, world");
        assert_eq!(unwrap(&payload).expect("bare text"), Transfer::text("你好, world"));
    }

    #[test]
    fn named_text_round_trips() {
        let payload = wrap(b"notes: a, b", false, Some("notes.txt")).expect("named text");
        assert_eq!(payload, "QRTEXT:notes.txt:notes: a, b");

        let transfer = unwrap(&payload).expect("marker parses");
        assert_eq!(transfer.content(), b"notes: a, b");
        assert_eq!(transfer.filename(), Some("notes.txt"));
        assert!(!transfer.is_binary());
    }

    #[test]
    fn binary_round_trips_with_and_without_name() {
        let bytes = [0_u8, 159, 146, 150, 255];
        for name in [None, Some("blob.bin")] {
            let payload = wrap(&bytes, true, name).expect("binary");
            assert!(payload.starts_with("QRFILE:"));
            let transfer = unwrap(&payload).expect("binary marker parses");
            assert!(transfer.is_binary());
            assert_eq!(transfer.content(), bytes);
            assert_eq!(transfer.filename(), name);
        }
    }

    #[rstest]
    #[case("QRTEXT:looks:like a marker")]
    #[case("QRFILE:also")]
    fn marker_lookalike_text_is_protected(#[case] text: &str) {
        let payload = wrap(text.as_bytes(), false, None).expect("plain text");
        assert_eq!(payload, format!("QRTEXT::{text}"));
        assert_eq!(unwrap(&payload).expect("protected text"), Transfer::text(text));
    }

    #[rstest]
    #[case("")]
    #[case("a:b.txt")]
    #[case("../etc/passwd")]
    #[case("dir\\file")]
    #[case("line\nbreak")]
    fn unsafe_filenames_are_rejected(#[case] name: &str) {
        let err = wrap(b"x", false, Some(name)).expect_err("filename must be rejected");
        assert!(matches!(err, EncodeError::InvalidFilename { .. }));
    }

    #[test]
    fn text_flag_requires_utf8() {
        let err = wrap(&[0xff, 0xfe], false, None).expect_err("not UTF-8");
        assert_eq!(err, EncodeError::NonTextContent);
    }

    #[test]
    fn unclosed_marker_is_reported() {
        let err = unwrap("QRFILE:no-delimiter").expect_err("marker lacks delimiter");
        assert!(matches!(err, EnvelopeError::MissingDelimiter { marker: "QRFILE:" }));
    }

    #[test]
    fn corrupt_base64_is_reported() {
        let err = unwrap("QRFILE:x.bin:not base64!").expect_err("invalid base64");
        assert!(matches!(err, EnvelopeError::InvalidBase64(_)));
    }

    #[test]
    fn detect_classifies_by_utf8_validity() {
        assert!(!Transfer::detect("text".as_bytes().to_vec(), None).is_binary());
        assert!(Transfer::detect(vec![0xff, 0x00], None).is_binary());
    }

    #[test]
    fn file_bytes_carry_bom_only_for_text() {
        let text = Transfer::text("é").to_file_bytes();
        assert!(text.starts_with(UTF8_BOM));
        assert_eq!(&text[UTF8_BOM.len()..], "é".as_bytes());

        let binary = Transfer::binary(vec![1_u8, 2]).to_file_bytes();
        assert_eq!(binary, [1, 2]);
    }
}
