//! Rebuilds a transfer from the raw strings a detector recovered.
//!
//! [`Reassembler`] is stateless between calls. One call parses every raw
//! string, keeps the first payload seen for each index, resolves the frame
//! count, checks that no index is missing, concatenates payloads in index
//! order, and removes the envelope. Input order never implies frame order.
//!
//! Parsing has no cross-frame dependencies, so callers may parse raw strings
//! in parallel and hand the outcomes to [`Reassembler::reassemble_parsed`];
//! everything after parsing happens in that single call.

pub mod diagnostics;

use std::collections::{BTreeMap, HashMap, btree_map::Entry};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub use self::diagnostics::{Diagnostics, FrameOutcome, FrameRecord, MissingIndices, Warning};
use crate::{
    envelope::{self, Transfer},
    error::DecodeError,
    frame::{
        FrameDecoder,
        FrameIndex,
        HeaderSyntax,
        ParseFailure,
        ParseFailureReason,
        ParsedFrame,
    },
    metrics,
};

/// Axis-aligned region of the source image where a string was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge, in pixels.
    pub x: u32,
    /// Top edge, in pixels.
    pub y: u32,
    /// Width, in pixels.
    pub width: u32,
    /// Height, in pixels.
    pub height: u32,
}

/// One raw string from a detector, with its position when known.
///
/// The position is carried into diagnostics only; it never affects ordering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Decoded text of the symbol.
    pub raw: String,
    /// Where the symbol was found.
    #[serde(default)]
    pub position: Option<BoundingBox>,
}

impl Detection {
    /// Detection without a position.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            position: None,
        }
    }

    /// Attach the region the string was detected in.
    #[must_use]
    pub const fn with_position(mut self, position: BoundingBox) -> Self {
        self.position = Some(position);
        self
    }
}

impl From<String> for Detection {
    fn from(raw: String) -> Self { Self::new(raw) }
}

impl From<&str> for Detection {
    fn from(raw: &str) -> Self { Self::new(raw) }
}

impl From<&String> for Detection {
    fn from(raw: &String) -> Self { Self::new(raw.as_str()) }
}

/// Successful reassembly: the recovered transfer and its diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reassembly {
    transfer: Transfer,
    total: u32,
    diagnostics: Diagnostics,
}

impl Reassembly {
    /// Recovered transfer.
    #[must_use]
    pub fn transfer(&self) -> &Transfer { &self.transfer }

    /// Number of frames the transfer was rebuilt from.
    #[must_use]
    pub const fn total(&self) -> u32 { self.total }

    /// Per-string outcomes and warnings.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics { &self.diagnostics }

    /// Consume the result, returning its parts.
    #[must_use]
    pub fn into_parts(self) -> (Transfer, Diagnostics) { (self.transfer, self.diagnostics) }
}

/// Payload kept for one index.
#[derive(Debug)]
struct Accepted {
    payload: String,
    total: Option<u32>,
}

/// Stateless frame reassembler.
#[derive(Clone, Debug, Default)]
pub struct Reassembler {
    decoder: FrameDecoder,
    expected_total: Option<u32>,
}

impl Reassembler {
    /// Reassembler using the default header syntaxes.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Replace the frame decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: FrameDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Use `total` as the frame count instead of inferring it from the frames.
    ///
    /// Useful when the count is known out of band, for example from the grid
    /// of the captured array, because canonical headers do not carry it.
    /// Without it, losing the highest-numbered canonical frames cannot be
    /// told apart from a shorter transfer. A `total` of zero makes every
    /// reassembly fail with [`DecodeError::InvalidExpectedTotal`].
    #[must_use]
    pub const fn expect_total(mut self, total: u32) -> Self {
        self.expected_total = Some(total);
        self
    }

    /// Parse and reassemble `detections`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidExpectedTotal`] when a frame count of
    /// zero was expected, [`DecodeError::NoFrames`] when nothing parses,
    /// [`DecodeError::MissingFrames`] when an index below the resolved total
    /// is absent, and [`DecodeError::CorruptEnvelope`] when the reassembled
    /// payload carries an unreadable envelope.
    pub fn reassemble<I, D>(&self, detections: I) -> Result<Reassembly, DecodeError>
    where
        I: IntoIterator<Item = D>,
        D: Into<Detection>,
    {
        let parsed = detections
            .into_iter()
            .map(|detection| {
                let detection = detection.into();
                let outcome = self.decoder.decode(&detection.raw);
                (detection, outcome)
            })
            .collect();
        self.reassemble_parsed(parsed)
    }

    /// Reassemble from parse outcomes produced elsewhere.
    ///
    /// `parsed` must be in detection order: it decides which payload wins
    /// when two frames claim one index.
    ///
    /// # Errors
    ///
    /// See [`Reassembler::reassemble`].
    pub fn reassemble_parsed(
        &self,
        mut parsed: Vec<(Detection, Result<ParsedFrame, ParseFailure>)>,
    ) -> Result<Reassembly, DecodeError> {
        if let [(detection, outcome)] = parsed.as_mut_slice() {
            if let Some(frame) = unframed(detection, outcome) {
                debug!("single detection without header: treating it as the whole transfer");
                *outcome = Ok(frame);
            }
        }

        let mut diagnostics = Diagnostics::default();
        let mut accepted = BTreeMap::new();

        for (detection, outcome) in parsed {
            let outcome = match outcome {
                Ok(frame) => Self::accept(&mut accepted, &mut diagnostics, frame),
                Err(failure) => FrameOutcome::Failed {
                    reason: failure.reason(),
                },
            };
            diagnostics.record(FrameRecord::new(detection.raw, detection.position, outcome));
        }

        let result = self.finish(accepted, diagnostics);
        let diagnostics = match &result {
            Ok(reassembly) => reassembly.diagnostics(),
            Err(err) => err.diagnostics(),
        };
        for record in diagnostics.records() {
            metrics::inc_decoded(&record.outcome());
        }
        if result.is_err() {
            metrics::inc_reassembly_failures();
        }
        result
    }

    fn accept(
        accepted: &mut BTreeMap<FrameIndex, Accepted>,
        diagnostics: &mut Diagnostics,
        frame: ParsedFrame,
    ) -> FrameOutcome {
        let index = frame.index();
        match accepted.entry(index) {
            Entry::Vacant(vacant) => {
                vacant.insert(Accepted {
                    total: frame.total(),
                    payload: frame.into_payload(),
                });
                FrameOutcome::Parsed { index }
            }
            Entry::Occupied(occupied) if occupied.get().payload == frame.payload() => {
                FrameOutcome::Duplicate { index }
            }
            Entry::Occupied(occupied) => {
                warn!("conflicting frame payloads: index={index}, keeping first seen");
                diagnostics.warn(Warning::Conflict {
                    index,
                    kept: occupied.get().payload.clone(),
                    discarded: frame.into_payload(),
                });
                FrameOutcome::Conflict { index }
            }
        }
    }

    fn finish(
        &self,
        mut accepted: BTreeMap<FrameIndex, Accepted>,
        mut diagnostics: Diagnostics,
    ) -> Result<Reassembly, DecodeError> {
        if self.expected_total == Some(0) {
            return Err(DecodeError::InvalidExpectedTotal {
                diagnostics: Box::new(diagnostics),
            });
        }
        let Some(max_index) = accepted.keys().next_back().copied() else {
            return Err(DecodeError::NoFrames {
                diagnostics: Box::new(diagnostics),
            });
        };

        let total = self.resolve_total(&accepted, max_index, &mut diagnostics);

        let beyond = accepted.split_off(&FrameIndex::new(total));
        for index in beyond.into_keys() {
            warn!("frame beyond total ignored: index={index}, total={total}");
            diagnostics.warn(Warning::OutOfRange { index, total });
            diagnostics.mark_out_of_range(index);
        }

        let missing = missing_indices(accepted.keys().copied(), total);
        if !missing.is_empty() {
            debug!(
                "reassembly incomplete: total={total}, missing={}",
                missing.count()
            );
            return Err(DecodeError::MissingFrames {
                missing,
                total,
                diagnostics: Box::new(diagnostics),
            });
        }

        let payload: String = accepted.into_values().map(|frame| frame.payload).collect();

        match envelope::unwrap(&payload) {
            Ok(transfer) => {
                debug!(
                    "reassembled transfer: total={total}, bytes={}, binary={}, failed={}, \
                     duplicates={}, conflicts={}",
                    transfer.content().len(),
                    transfer.is_binary(),
                    diagnostics.failed_count(),
                    diagnostics.duplicate_count(),
                    diagnostics.conflict_count(),
                );
                Ok(Reassembly {
                    transfer,
                    total,
                    diagnostics,
                })
            }
            Err(source) => Err(DecodeError::CorruptEnvelope {
                source,
                diagnostics: Box::new(diagnostics),
            }),
        }
    }

    /// Pick the frame count: an explicit expectation, else the majority of
    /// declared totals, else the highest index plus one.
    fn resolve_total(
        &self,
        accepted: &BTreeMap<FrameIndex, Accepted>,
        max_index: FrameIndex,
        diagnostics: &mut Diagnostics,
    ) -> u32 {
        let inferred = max_index.get().saturating_add(1);

        let mut votes: HashMap<u32, usize> = HashMap::new();
        for total in accepted.values().filter_map(|frame| frame.total) {
            *votes.entry(total).or_default() += 1;
        }
        if votes.len() > 1 {
            let mut observed: Vec<u32> = votes.keys().copied().collect();
            observed.sort_unstable();
            warn!("frames declare different totals: observed={observed:?}");
            diagnostics.warn(Warning::InconsistentTotals { observed });
        }
        // Ties go to the larger total so disagreement surfaces as missing
        // frames rather than silent truncation.
        let voted = votes
            .into_iter()
            .max_by_key(|&(total, count)| (count, total))
            .map(|(total, _)| total);

        let resolved = self.expected_total.or(voted).unwrap_or(inferred);
        if resolved != inferred {
            warn!("frame total disagreement: resolved={resolved}, inferred={inferred}");
            diagnostics.warn(Warning::TotalMismatch { resolved, inferred });
        }
        resolved
    }
}

/// A lone detection with no recognisable header is a transfer that fitted in
/// one code and was never framed.
fn unframed(
    detection: &Detection,
    outcome: &Result<ParsedFrame, ParseFailure>,
) -> Option<ParsedFrame> {
    match outcome {
        Err(failure) if failure.reason() == ParseFailureReason::NoHeaderMatch => {
            Some(ParsedFrame::new(
                FrameIndex::zero(),
                Some(1),
                detection.raw.as_str(),
                HeaderSyntax::Headerless,
            ))
        }
        _ => None,
    }
}

/// Indices in `0..total` absent from the ascending `present` sequence.
fn missing_indices(present: impl Iterator<Item = FrameIndex>, total: u32) -> MissingIndices {
    let mut missing = MissingIndices::default();
    let mut next = 0_u32;
    for index in present.map(FrameIndex::get) {
        if index >= total {
            break;
        }
        if index > next {
            missing.push_run(next, index - 1);
        }
        next = index + 1;
    }
    if next < total {
        missing.push_run(next, total - 1);
    }
    missing
}
