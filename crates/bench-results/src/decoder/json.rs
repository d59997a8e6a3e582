use log::debug;
use serde::Deserialize;
use serde_json::error::Category;

use super::{OutputMode, ResultDecoder, at_record};
use crate::error::{Result, ResultsError};
use crate::run_record::{ResultSet, RunRecord};

/// One element of the JSON array printed by the benchmark tool.
/// The camelCase names are emitted by the tool and must not change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRunResult {
    total_samples: i64,
    run_samples: i32,
    samples_per_second: i32,
    render_time: i64,
}

impl RawRunResult {
    fn into_record(self) -> Result<RunRecord> {
        RunRecord::new(
            self.total_samples,
            self.run_samples,
            self.samples_per_second,
            self.render_time,
        )
    }
}

/// Decode the JSON array printed by the JSON-mode benchmark tool.
pub fn decode_json(text: &str) -> Result<Vec<RunRecord>> {
    let raw_results: Vec<RawRunResult> = serde_json::from_str(text).map_err(|e| {
        let reason = match e.classify() {
            Category::Syntax | Category::Eof | Category::Io => "not valid JSON",
            Category::Data => "unexpected JSON shape",
        };
        ResultsError::malformed(format!("{reason}: {e}"))
    })?;
    debug!("Decoding {} JSON runs", raw_results.len());

    raw_results
        .into_iter()
        .enumerate()
        .map(|(index, raw)| raw.into_record().map_err(at_record(index)))
        .collect()
}

pub struct JsonDecoder;

impl ResultDecoder for JsonDecoder {
    fn mode(&self) -> OutputMode {
        OutputMode::Json
    }

    /// Invalid UTF-8 sequences in the captured output are replaced before parsing, only the JSON
    /// structure itself is validated.
    fn decode(&self, payload: &[u8]) -> Result<ResultSet> {
        let text = String::from_utf8_lossy(payload);
        decode_json(&text).map(ResultSet::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TWO_RUNS: &str = r#"[
        {"totalSamples": 10, "runSamples": 5, "samplesPerSecond": 15, "renderTime": 500},
        {"totalSamples": 15, "runSamples": 10, "samplesPerSecond": 20, "renderTime": 800}
    ]"#;

    #[test]
    fn test_decode_two_runs() {
        let runs = decode_json(TWO_RUNS).unwrap();
        assert_eq!(
            runs,
            vec![
                RunRecord::new(10, 5, 15, 500).unwrap(),
                RunRecord::new(15, 10, 20, 800).unwrap(),
            ]
        );
    }

    #[test]
    fn test_decode_empty_array() {
        assert!(decode_json("[]\n").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let runs = decode_json(
            r#"[{"totalSamples": 8, "runSamples": 8, "samplesPerSecond": 3, "renderTime": 1, "scene": "x"}]"#,
        )
        .unwrap();
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_render_time_uses_64_bits() {
        let runs = decode_json(
            r#"[{"totalSamples": 8, "runSamples": 8, "samplesPerSecond": 3, "renderTime": 5000000000}]"#,
        )
        .unwrap();
        assert_eq!(runs[0].render_time(), 5_000_000_000);
    }

    #[rstest]
    #[case::empty_text("")]
    #[case::not_json("Run: 8 total samples")]
    #[case::truncated(r#"[{"totalSamples": 8, "runSamples": 8"#)]
    #[case::object_root(r#"{"totalSamples": 8, "runSamples": 8, "samplesPerSecond": 3, "renderTime": 1}"#)]
    #[case::missing_field(r#"[{"totalSamples": 8, "runSamples": 8, "renderTime": 1}]"#)]
    #[case::float_field(r#"[{"totalSamples": 8, "runSamples": 8, "samplesPerSecond": 3.5, "renderTime": 1}]"#)]
    #[case::string_field(r#"[{"totalSamples": "8", "runSamples": 8, "samplesPerSecond": 3, "renderTime": 1}]"#)]
    #[case::null_field(r#"[{"totalSamples": 8, "runSamples": 8, "samplesPerSecond": null, "renderTime": 1}]"#)]
    #[case::out_of_range(r#"[{"totalSamples": 8, "runSamples": 8, "samplesPerSecond": 3000000000, "renderTime": 1}]"#)]
    #[case::snake_case(r#"[{"total_samples": 8, "run_samples": 8, "samples_per_second": 3, "render_time": 1}]"#)]
    #[case::invalid_record(r#"[{"totalSamples": 4, "runSamples": 8, "samplesPerSecond": 3, "renderTime": 1}]"#)]
    fn test_malformed_payload(#[case] text: &str) {
        assert!(matches!(
            decode_json(text),
            Err(ResultsError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_lossy_transport_decoding() {
        let mut payload = TWO_RUNS.as_bytes().to_vec();
        payload.extend_from_slice(&[b' ', 0xFF, 0xFE]);
        // Replaced bytes after the array are still trailing garbage for the JSON parser
        let err = JsonDecoder.decode(&payload).unwrap_err();
        assert!(matches!(err, ResultsError::MalformedPayload(_)));

        let mut payload = b"[{\"totalSamples\": 8, \"runSamples\": 8, \"samplesPerSecond\": 3, \"renderTime\": 1, \"note\": \"".to_vec();
        payload.extend_from_slice(&[0xC3, 0x28]);
        payload.extend_from_slice(b"\"}]");
        let results = JsonDecoder.decode(&payload).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_error_names_offending_record() {
        let err = decode_json(
            r#"[
                {"totalSamples": 8, "runSamples": 8, "samplesPerSecond": 3, "renderTime": 1},
                {"totalSamples": 16, "runSamples": 8, "samplesPerSecond": -3, "renderTime": 1}
            ]"#,
        )
        .unwrap_err();
        insta::assert_snapshot!(err, @"Malformed benchmark payload: record 1: negative field in run (16, 8, -3, 1)");
    }
}
