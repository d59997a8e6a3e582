//! Result protocol of the Chunky benchmark tool and the aggregation of its runs.
//!
//! WARN: The binary layout and the JSON field names are owned by the benchmark tool, keep them in
//! sync with it.

pub mod aggregate;
pub mod decoder;
pub mod error;
pub mod run_record;
pub mod summary;

pub use aggregate::{ConfigKey, RunCombinations};
pub use decoder::{BinaryDecoder, JsonDecoder, OutputMode, ResultDecoder};
pub use error::{Result, ResultsError};
pub use run_record::{ResultSet, RunRecord};
pub use summary::GroupSummary;
