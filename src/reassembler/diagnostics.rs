//! Per-string outcomes and warnings collected during reassembly.
//!
//! A [`Diagnostics`] report accompanies every reassembly, successful or not.
//! It is the data a debug overlay draws onto the source image: one
//! [`FrameRecord`] per raw string, in input order, with its position when the
//! detector supplied one.

use std::{fmt, ops::RangeInclusive};

use derive_more::Display;
use serde::Serialize;

use super::BoundingBox;
use crate::frame::{FrameIndex, ParseFailureReason};

/// What happened to one raw string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FrameOutcome {
    /// First copy of a frame; its payload is used.
    Parsed {
        /// Frame index.
        index: FrameIndex,
    },
    /// Same index and payload as an earlier frame.
    Duplicate {
        /// Frame index.
        index: FrameIndex,
    },
    /// Same index as an earlier frame but a different payload; discarded.
    Conflict {
        /// Frame index.
        index: FrameIndex,
    },
    /// Parsed, but its index lies at or beyond the resolved total; ignored.
    OutOfRange {
        /// Frame index.
        index: FrameIndex,
    },
    /// Not a frame.
    Failed {
        /// Why parsing failed.
        reason: ParseFailureReason,
    },
}

/// Outcome for one raw string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrameRecord {
    raw: String,
    position: Option<BoundingBox>,
    #[serde(flatten)]
    outcome: FrameOutcome,
}

impl FrameRecord {
    pub(crate) fn new(raw: String, position: Option<BoundingBox>, outcome: FrameOutcome) -> Self {
        Self {
            raw,
            position,
            outcome,
        }
    }

    /// Raw string as supplied by the detector.
    #[must_use]
    pub fn raw(&self) -> &str { &self.raw }

    /// Where the detector found the string, if known.
    #[must_use]
    pub const fn position(&self) -> Option<BoundingBox> { self.position }

    /// What happened to the string.
    #[must_use]
    pub const fn outcome(&self) -> FrameOutcome { self.outcome }
}

/// Non-fatal conditions noticed during reassembly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Display)]
#[serde(tag = "warning", rename_all = "kebab-case")]
pub enum Warning {
    /// Two frames shared an index with different payloads; the first was
    /// kept.
    #[display("frame {index} seen with conflicting payloads; kept the first")]
    Conflict {
        /// Shared index.
        index: FrameIndex,
        /// Payload that was used.
        kept: String,
        /// Payload that was dropped.
        discarded: String,
    },
    /// The resolved total differs from the one implied by the highest index.
    #[display("resolved {resolved} frames but the highest index implies {inferred}")]
    TotalMismatch {
        /// Total that was used.
        resolved: u32,
        /// Highest index plus one.
        inferred: u32,
    },
    /// Frames declared different totals.
    #[display("frames declare different totals: {observed:?}")]
    InconsistentTotals {
        /// Distinct totals, ascending.
        observed: Vec<u32>,
    },
    /// A frame's index lies at or beyond the resolved total; it was ignored.
    #[display("frame {index} lies beyond the total of {total}; ignored")]
    OutOfRange {
        /// Ignored index.
        index: FrameIndex,
        /// Resolved total.
        total: u32,
    },
}

/// Report returned alongside every reassembly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    records: Vec<FrameRecord>,
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub(crate) fn record(&mut self, record: FrameRecord) { self.records.push(record); }

    pub(crate) fn warn(&mut self, warning: Warning) { self.warnings.push(warning); }

    /// Re-tag the record that supplied `index` once the index is known to lie
    /// beyond the total.
    pub(crate) fn mark_out_of_range(&mut self, index: FrameIndex) {
        for record in &mut self.records {
            if record.outcome == (FrameOutcome::Parsed { index }) {
                record.outcome = FrameOutcome::OutOfRange { index };
            }
        }
    }

    /// Every raw string's outcome, in input order.
    #[must_use]
    pub fn records(&self) -> &[FrameRecord] { &self.records }

    /// Warnings, in the order they were raised.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] { &self.warnings }

    /// Distinct frames that were used.
    #[must_use]
    pub fn parsed_count(&self) -> usize { self.count(|o| matches!(o, FrameOutcome::Parsed { .. })) }

    /// Raw strings that were not frames.
    #[must_use]
    pub fn failed_count(&self) -> usize { self.count(|o| matches!(o, FrameOutcome::Failed { .. })) }

    /// Harmless repeats of an earlier frame.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.count(|o| matches!(o, FrameOutcome::Duplicate { .. }))
    }

    /// Frames discarded because an earlier frame claimed their index.
    #[must_use]
    pub fn conflict_count(&self) -> usize {
        self.count(|o| matches!(o, FrameOutcome::Conflict { .. }))
    }

    /// Frames ignored because their index lies beyond the resolved total.
    #[must_use]
    pub fn out_of_range_count(&self) -> usize {
        self.count(|o| matches!(o, FrameOutcome::OutOfRange { .. }))
    }

    fn count(&self, predicate: impl Fn(FrameOutcome) -> bool) -> usize {
        self.records
            .iter()
            .filter(|record| predicate(record.outcome))
            .count()
    }
}

/// Indices absent from an incomplete transfer, stored as ascending runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MissingIndices {
    runs: Vec<RangeInclusive<u32>>,
}

impl MissingIndices {
    /// Record the run `start..=end`. Runs must arrive in ascending order.
    pub(crate) fn push_run(&mut self, start: u32, end: u32) {
        debug_assert!(start <= end, "empty run");
        self.runs.push(start..=end);
    }

    /// Whether nothing is missing.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.runs.is_empty() }

    /// Number of missing indices.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.runs
            .iter()
            .map(|run| u64::from(run.end() - run.start()) + 1)
            .sum()
    }

    /// Whether `index` is missing.
    #[must_use]
    pub fn contains(&self, index: u32) -> bool { self.runs.iter().any(|run| run.contains(&index)) }

    /// Missing indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ { self.runs.iter().cloned().flatten() }

    /// Missing indices as ascending runs.
    #[must_use]
    pub fn runs(&self) -> &[RangeInclusive<u32>] { &self.runs }
}

impl fmt::Display for MissingIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, run) in self.runs.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            if run.start() == run.end() {
                write!(f, "{}", run.start())?;
            } else {
                write!(f, "{}-{}", run.start(), run.end())?;
            }
        }
        Ok(())
    }
}
