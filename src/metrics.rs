//! Metric helpers for `qrarray`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to nothing.

use crate::reassembler::FrameOutcome;

/// Name of the counter tracking frames produced by the encoder.
pub const FRAMES_ENCODED: &str = "qrarray_frames_encoded_total";
/// Name of the counter tracking raw strings seen by the reassembler.
pub const FRAMES_DECODED: &str = "qrarray_frames_decoded_total";
/// Name of the counter tracking failed reassemblies.
pub const REASSEMBLY_FAILURES: &str = "qrarray_reassembly_failures_total";

fn outcome_label(outcome: &FrameOutcome) -> &'static str {
    match outcome {
        FrameOutcome::Parsed { .. } => "parsed",
        FrameOutcome::Duplicate { .. } => "duplicate",
        FrameOutcome::Conflict { .. } => "conflict",
        FrameOutcome::OutOfRange { .. } => "out-of-range",
        FrameOutcome::Failed { .. } => "failed",
    }
}

/// Record `count` frames produced by one encode call.
#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
pub fn inc_encoded(count: usize) {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_ENCODED).increment(count as u64);
}

/// Record one raw string handled by the reassembler.
#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
pub fn inc_decoded(outcome: &FrameOutcome) {
    let label = outcome_label(outcome);
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_DECODED, "outcome" => label).increment(1);
}

/// Record a reassembly that ended in an error.
pub fn inc_reassembly_failures() {
    #[cfg(feature = "metrics")]
    metrics::counter!(REASSEMBLY_FAILURES).increment(1);
}
