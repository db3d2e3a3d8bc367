//! Tests for Display implementations on error and warning types.

use qrarray::{
    ChunkLimit,
    DecodeError,
    EncodeError,
    FrameIndex,
    Reassembler,
    Transfer,
    TransferConfig,
    Warning,
    encode_transfer,
    frame::{ParseFailureReason, decode},
};

#[test]
fn encode_error_messages() {
    assert_eq!(EncodeError::EmptyTransfer.to_string(), "transfer is empty");
    assert_eq!(
        EncodeError::LayoutTooSmall {
            rows: 2,
            cols: 2,
            frame_count: 5,
        }
        .to_string(),
        "layout of 2x2 cannot hold 5 frames"
    );

    let config = TransferConfig::default().with_chunk_limit(ChunkLimit::chars(0));
    let err = encode_transfer(&Transfer::text("x"), &config).expect_err("zero chunk size");
    assert!(err.to_string().starts_with("invalid configuration: "));
}

#[test]
fn decode_error_messages() {
    let err = Reassembler::new()
        .reassemble(["0/6:a", "4/6:e"])
        .expect_err("frames missing");
    assert_eq!(err.to_string(), "missing 4 of 6 frames: 1-3, 5");

    let err = Reassembler::new()
        .reassemble(["noise", "more noise"])
        .expect_err("nothing parses");
    assert_eq!(err.to_string(), "no frames could be parsed from 2 raw strings");
    assert!(matches!(err, DecodeError::NoFrames { .. }));

    let err = Reassembler::new()
        .expect_total(0)
        .reassemble(["IDX:000:a"])
        .expect_err("zero frames expected");
    assert_eq!(err.to_string(), "expected frame count must be at least 1");
}

#[test]
fn parse_failure_reasons_are_readable() {
    let failure = decode("IDX:x1:payload").expect_err("malformed index");
    assert_eq!(failure.reason(), ParseFailureReason::MalformedIndex);
    assert!(!failure.reason().to_string().is_empty());
}

#[test]
fn warning_messages() {
    assert_eq!(
        Warning::OutOfRange {
            index: FrameIndex::new(7),
            total: 2,
        }
        .to_string(),
        "frame 7 lies beyond the total of 2; ignored"
    );
    assert_eq!(
        Warning::InconsistentTotals {
            observed: vec![3, 4],
        }
        .to_string(),
        "frames declare different totals: [3, 4]"
    );
}
