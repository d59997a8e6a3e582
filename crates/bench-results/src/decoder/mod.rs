use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod binary;
mod json;

pub use binary::{BinaryDecoder, HEADER_SIZE, PACKED_RUN_SIZE, decode_binary, encode_binary};
pub use json::{JsonDecoder, decode_json};

use crate::error::{Result, ResultsError};
use crate::run_record::ResultSet;

/// Generation of the benchmark tool protocol.
///
/// The mode is a property of how the tool was built, the payload itself is never inspected to
/// guess it.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Fixed-layout big-endian file written next to the tool
    Binary,
    /// JSON array printed on the tool's standard output
    #[default]
    Json,
}

impl Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Binary => write!(f, "binary"),
            OutputMode::Json => write!(f, "json"),
        }
    }
}

impl OutputMode {
    pub fn decoder(&self) -> Box<dyn ResultDecoder> {
        match self {
            OutputMode::Binary => Box::new(BinaryDecoder),
            OutputMode::Json => Box::new(JsonDecoder),
        }
    }
}

pub trait ResultDecoder {
    fn mode(&self) -> OutputMode;

    /// Turn a complete payload into a result set. Fails as a whole on any malformed part.
    fn decode(&self, payload: &[u8]) -> Result<ResultSet>;
}

/// Prefix a record-level failure with the position of the offending record
fn at_record(index: usize) -> impl Fn(ResultsError) -> ResultsError {
    move |err| match err {
        ResultsError::MalformedPayload(reason) => {
            ResultsError::MalformedPayload(format!("record {index}: {reason}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_follows_mode() {
        for mode in [OutputMode::Binary, OutputMode::Json] {
            assert_eq!(mode.decoder().mode(), mode);
        }
    }

    #[test]
    fn test_mode_is_not_sniffed_from_payload() {
        let json_payload = br#"[{"totalSamples":8,"runSamples":8,"samplesPerSecond":1,"renderTime":2}]"#;
        assert!(OutputMode::Json.decoder().decode(json_payload).is_ok());
        assert!(matches!(
            OutputMode::Binary.decoder().decode(json_payload),
            Err(ResultsError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_mode_serde() {
        let mode: OutputMode = serde_json::from_str("\"binary\"").unwrap();
        assert_eq!(mode, OutputMode::Binary);
        assert_eq!(OutputMode::default(), OutputMode::Json);
        assert_eq!(OutputMode::Json.to_string(), "json");
    }
}
