use bincode::Options;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{OutputMode, ResultDecoder, at_record};
use crate::error::{Result, ResultsError};
use crate::run_record::{ResultSet, RunRecord};

/// Size of the leading run count
pub const HEADER_SIZE: usize = 4;
/// Size of one packed run: three `i32` followed by one `i64`
pub const PACKED_RUN_SIZE: usize = 20;

/// One run as laid out on the wire. Field order matters.
#[derive(Debug, Serialize, Deserialize)]
struct PackedRun {
    total_samples: i32,
    run_samples: i32,
    samples_per_second: i32,
    render_time: i64,
}

impl PackedRun {
    fn into_record(self) -> Result<RunRecord> {
        RunRecord::new(
            i64::from(self.total_samples),
            self.run_samples,
            self.samples_per_second,
            self.render_time,
        )
    }
}

/// Big-endian, fixed-width integers, no length prefixes
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
}

/// Decode the result file written by the binary-mode benchmark tool.
///
/// The declared run count is bound-checked against the blob length before any record is read, a
/// corrupted header surfaces as [`ResultsError::MalformedPayload`].
pub fn decode_binary(blob: &[u8]) -> Result<ResultSet> {
    let header = blob.get(..HEADER_SIZE).ok_or_else(|| {
        ResultsError::malformed(format!(
            "expected a {HEADER_SIZE}-byte run count, got {} bytes",
            blob.len()
        ))
    })?;
    let num_runs: i32 = wire_options()
        .deserialize(header)
        .map_err(|e| ResultsError::malformed(format!("unreadable run count: {e}")))?;
    let num_runs = usize::try_from(num_runs)
        .map_err(|_| ResultsError::malformed(format!("negative run count: {num_runs}")))?;

    let expected_len = num_runs
        .checked_mul(PACKED_RUN_SIZE)
        .and_then(|records_len| records_len.checked_add(HEADER_SIZE))
        .ok_or_else(|| ResultsError::malformed(format!("run count too large: {num_runs}")))?;
    if blob.len() < expected_len {
        return Err(ResultsError::malformed(format!(
            "{num_runs} runs declared ({expected_len} bytes) but the payload is only {} bytes long",
            blob.len()
        )));
    }
    if blob.len() > expected_len {
        return Err(ResultsError::malformed(format!(
            "{} unexpected trailing bytes after {num_runs} runs",
            blob.len() - expected_len
        )));
    }
    debug!("Decoding {num_runs} packed runs");

    blob[HEADER_SIZE..]
        .chunks_exact(PACKED_RUN_SIZE)
        .enumerate()
        .map(|(index, chunk)| {
            wire_options()
                .deserialize::<PackedRun>(chunk)
                .map_err(|e| ResultsError::malformed(e.to_string()))
                .and_then(PackedRun::into_record)
                .map_err(at_record(index))
        })
        .collect::<Result<ResultSet>>()
}

/// Encode a result set with the same layout the benchmark tool writes.
///
/// Fails when a cumulative sample count does not fit the 32-bit wire field.
pub fn encode_binary(results: &ResultSet) -> Result<Vec<u8>> {
    let num_runs = i32::try_from(results.len())
        .map_err(|_| ResultsError::malformed(format!("too many runs: {}", results.len())))?;

    let mut blob = Vec::with_capacity(HEADER_SIZE + results.len() * PACKED_RUN_SIZE);
    wire_options()
        .serialize_into(&mut blob, &num_runs)
        .map_err(|e| ResultsError::malformed(e.to_string()))?;

    for (index, run) in results.runs().iter().enumerate() {
        let total_samples = i32::try_from(run.total_samples()).map_err(|_| {
            at_record(index)(ResultsError::malformed(format!(
                "total samples {} do not fit in 32 bits",
                run.total_samples()
            )))
        })?;
        let packed = PackedRun {
            total_samples,
            run_samples: run.run_samples(),
            samples_per_second: run.samples_per_second(),
            render_time: run.render_time(),
        };
        wire_options()
            .serialize_into(&mut blob, &packed)
            .map_err(|e| ResultsError::malformed(e.to_string()))?;
    }

    Ok(blob)
}

pub struct BinaryDecoder;

impl ResultDecoder for BinaryDecoder {
    fn mode(&self) -> OutputMode {
        OutputMode::Binary
    }

    fn decode(&self, payload: &[u8]) -> Result<ResultSet> {
        decode_binary(payload)
    }
}
