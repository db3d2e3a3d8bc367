//! Splits a payload into ordered chunks that each fit one frame.
//!
//! The limit is measured in characters or bytes ([`ChunkUnit`]). Textual
//! payloads are always cut on character boundaries, so every chunk is valid
//! UTF-8 on its own and the frames it ends up in remain printable text.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// Default chunk size, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Unit in which a [`ChunkLimit`] is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkUnit {
    /// Unicode scalar values.
    #[default]
    Chars,
    /// UTF-8 encoded bytes.
    Bytes,
}

/// Upper bound on the size of each chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLimit {
    /// Maximum chunk size in `unit`s. Must be at least one.
    pub size: usize,
    /// Unit `size` is measured in.
    #[serde(default)]
    pub unit: ChunkUnit,
}

impl ChunkLimit {
    /// Limit chunks to `size` characters.
    #[must_use]
    pub const fn chars(size: usize) -> Self {
        Self {
            size,
            unit: ChunkUnit::Chars,
        }
    }

    /// Limit chunks to `size` bytes.
    #[must_use]
    pub const fn bytes(size: usize) -> Self {
        Self {
            size,
            unit: ChunkUnit::Bytes,
        }
    }

    /// Check that the limit can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidConfiguration`] when `size` is zero.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.size == 0 {
            return Err(EncodeError::invalid_configuration(
                "chunk size must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for ChunkLimit {
    fn default() -> Self { Self::chars(DEFAULT_CHUNK_SIZE) }
}

/// Split `text` into chunks no larger than `limit`.
///
/// Concatenating the chunks reproduces `text`. An empty input yields no
/// chunks.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidConfiguration`] when the limit is zero, or
/// when a byte limit is smaller than the encoding of a character that has to
/// start a chunk.
///
/// # Examples
///
/// ```
/// use qrarray::chunker::{ChunkLimit, split_text};
/// let chunks = split_text("HELLO WORLD", ChunkLimit::chars(4)).expect("valid limit");
/// assert_eq!(chunks, ["HELL", "O WO", "RLD"]);
/// ```
pub fn split_text(text: &str, limit: ChunkLimit) -> Result<Vec<&str>, EncodeError> {
    limit.validate()?;
    match limit.unit {
        ChunkUnit::Chars => Ok(split_chars(text, limit.size)),
        ChunkUnit::Bytes => split_utf8_bytes(text, limit.size),
    }
}

/// Split an arbitrary byte payload into chunks no larger than `limit`.
///
/// UTF-8 input is treated as text and cut on character boundaries. Other
/// input is cut at the raw byte limit.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidConfiguration`] for a zero limit, for a
/// character limit over input that is not UTF-8, and for a byte limit too
/// small to hold one character of UTF-8 input.
pub fn split(payload: &[u8], limit: ChunkLimit) -> Result<Vec<&[u8]>, EncodeError> {
    limit.validate()?;
    if let Ok(text) = std::str::from_utf8(payload) {
        return Ok(split_text(text, limit)?
            .into_iter()
            .map(str::as_bytes)
            .collect());
    }
    match limit.unit {
        ChunkUnit::Bytes => Ok(payload.chunks(limit.size).collect()),
        ChunkUnit::Chars => Err(EncodeError::invalid_configuration(
            "a character limit needs UTF-8 input",
        )),
    }
}

fn split_chars(text: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let end = rest.char_indices().nth(size).map_or(rest.len(), |(at, _)| at);
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

fn split_utf8_bytes(text: &str, size: usize) -> Result<Vec<&str>, EncodeError> {
    let mut chunks = Vec::with_capacity(text.len().div_ceil(size));
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            return Err(EncodeError::invalid_configuration(format!(
                "chunk size of {size} bytes cannot hold a single character"
            )));
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ChunkLimit, ChunkUnit, split, split_text};
    use crate::error::EncodeError;

    #[test]
    fn splits_worked_example() {
        let chunks = split_text("HELLO WORLD", ChunkLimit::chars(4)).expect("valid limit");
        assert_eq!(chunks, ["HELL", "O WO", "RLD"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let chunks = split_text("abcdef", ChunkLimit::chars(3)).expect("valid limit");
        assert_eq!(chunks, ["abc", "def"]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_text("", ChunkLimit::chars(3)).expect("valid limit").is_empty());
        assert!(split(&[], ChunkLimit::bytes(3)).expect("valid limit").is_empty());
    }

    #[rstest]
    #[case(ChunkLimit::chars(0))]
    #[case(ChunkLimit::bytes(0))]
    fn zero_limit_is_rejected(#[case] limit: ChunkLimit) {
        let err = split_text("abc", limit).expect_err("zero limit must fail");
        assert!(matches!(err, EncodeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn char_limit_counts_characters_not_bytes() {
        let chunks = split_text("多字节文本", ChunkLimit::chars(2)).expect("valid limit");
        assert_eq!(chunks, ["多字", "节文", "本"]);
    }

    #[test]
    fn byte_limit_backs_off_to_char_boundary() {
        // Each CJK character is three bytes; a limit of 7 fits two of them.
        let chunks = split_text("多字节文本", ChunkLimit::bytes(7)).expect("valid limit");
        assert_eq!(chunks, ["多字", "节文", "本"]);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 7));
    }

    #[test]
    fn byte_limit_below_character_width_is_rejected() {
        let err = split_text("a多", ChunkLimit::bytes(2)).expect_err("cannot hold 多");
        assert!(matches!(err, EncodeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn binary_payload_splits_at_raw_byte_limit() {
        let payload = [0xff_u8, 0xfe, 0x00, 0x80, 0x81];
        let chunks = split(&payload, ChunkLimit::bytes(2)).expect("valid limit");
        assert_eq!(chunks, vec![&[0xff_u8, 0xfe][..], &[0x00, 0x80][..], &[0x81][..]]);
    }

    #[test]
    fn char_limit_rejects_binary_payload() {
        let err = split(&[0xff, 0xfe], ChunkLimit::chars(2)).expect_err("not text");
        assert!(matches!(err, EncodeError::InvalidConfiguration { .. }));
    }

    #[test]
    fn default_unit_is_characters() {
        assert_eq!(ChunkLimit::default().unit, ChunkUnit::Chars);
        assert_eq!(ChunkLimit::default().size, 1000);
    }
}
