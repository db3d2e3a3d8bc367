//! Log records emitted by the reassembler.

use std::sync::{Mutex, MutexGuard, OnceLock};

use log::Level;
use logtest::Logger;
use qrarray::Reassembler;
use rstest::{fixture, rstest};

/// Exclusive access to the process-wide log capture.
fn lock_logger() -> MutexGuard<'static, Logger> {
    static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();
    LOGGER
        .get_or_init(|| Mutex::new(Logger::start()))
        .lock()
        .expect("logger poisoned")
}

#[fixture]
fn logger() -> MutexGuard<'static, Logger> {
    let mut logger = lock_logger();
    while logger.pop().is_some() {}
    logger
}

fn drain(logger: &mut Logger) -> Vec<(Level, String)> {
    let mut records = Vec::new();
    while let Some(record) = logger.pop() {
        records.push((record.level(), record.args().to_owned()));
    }
    records
}

#[rstest]
fn conflicts_are_logged_as_warnings(mut logger: MutexGuard<'static, Logger>) {
    Reassembler::new()
        .reassemble(["IDX:000:a", "IDX:000:b"])
        .expect("complete transfer");

    let records = drain(&mut logger);
    assert!(
        records
            .iter()
            .any(|(level, msg)| *level == Level::Warn
                && msg.contains("conflicting frame payloads: index=0")),
        "missing conflict warning in {records:?}"
    );
}

#[rstest]
fn total_disagreement_is_logged(mut logger: MutexGuard<'static, Logger>) {
    Reassembler::new()
        .reassemble(["0/5:a", "1/5:b"])
        .expect_err("frames 2 to 4 missing");

    let records = drain(&mut logger);
    assert!(
        records.iter().any(|(level, msg)| *level == Level::Warn
            && msg.contains("frame total disagreement: resolved=5, inferred=2")),
        "missing total warning in {records:?}"
    );
}
