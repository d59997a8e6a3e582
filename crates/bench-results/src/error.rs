/// Result type of every decode and aggregation operation
pub type Result<T> = std::result::Result<T, ResultsError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultsError {
    /// The payload emitted by the benchmark tool cannot be turned into runs.
    /// Decoding is all-or-nothing, no partial result set is ever returned.
    #[error("Malformed benchmark payload: {0}")]
    MalformedPayload(String),

    /// A statistic was requested over zero runs
    #[error("No data: cannot compute a statistic over zero runs")]
    NoData,
}

impl ResultsError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ResultsError::MalformedPayload(reason.into())
    }
}
