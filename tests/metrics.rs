#![cfg(feature = "metrics")]
//! Tests for `qrarray` metrics helpers.
//!
//! Counters are checked through `metrics_util::debugging::DebuggingRecorder`.
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use qrarray::{
    ChunkLimit,
    Reassembler,
    Transfer,
    TransferConfig,
    encode_transfer,
    metrics::{FRAMES_DECODED, FRAMES_ENCODED, REASSEMBLY_FAILURES},
};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter(snapshotter: &Snapshotter, name: &str, outcome: Option<&str>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && outcome.is_none_or(|expected| {
                    key.key()
                        .labels()
                        .any(|l| l.key() == "outcome" && l.value() == expected)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[test]
fn encoding_counts_frames() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let config = TransferConfig::default().with_chunk_limit(ChunkLimit::chars(4));
    metrics::with_local_recorder(&recorder, || {
        encode_transfer(&Transfer::text("HELLO WORLD"), &config).expect("encodes");
    });

    assert_eq!(counter(&snapshotter, FRAMES_ENCODED, None), 3);
}

#[rstest]
#[case("parsed", 2)]
#[case("duplicate", 1)]
#[case("conflict", 1)]
#[case("failed", 1)]
fn decoding_counts_each_outcome(#[case] outcome: &str, #[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        Reassembler::new()
            .reassemble(["IDX:000:a", "IDX:001:b", "IDX:001:b", "IDX:000:z", "noise"])
            .expect("complete transfer");
    });

    assert_eq!(counter(&snapshotter, FRAMES_DECODED, Some(outcome)), expected);
    assert_eq!(counter(&snapshotter, REASSEMBLY_FAILURES, None), 0);
}

#[test]
fn failed_reassembly_is_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        Reassembler::new()
            .reassemble(["IDX:000:a", "IDX:002:c"])
            .expect_err("frame 1 missing");
    });

    assert_eq!(counter(&snapshotter, REASSEMBLY_FAILURES, None), 1);
}
