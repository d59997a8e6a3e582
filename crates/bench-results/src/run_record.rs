use itertools::Itertools;
use serde::Serialize;
use std::fmt;

use crate::error::{Result, ResultsError};

/// Outcome of one batch of samples rendered by the benchmark tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    /// Samples rendered since the JVM was started, this batch included
    total_samples: i64,
    /// Samples rendered in this batch
    run_samples: i32,
    samples_per_second: i32,
    /// Render time of this batch in milliseconds
    render_time: i64,
}

impl RunRecord {
    /// Build a record, checking that every field is non-negative and that the batch does not
    /// account for more samples than the cumulative total.
    pub fn new(
        total_samples: i64,
        run_samples: i32,
        samples_per_second: i32,
        render_time: i64,
    ) -> Result<Self> {
        if total_samples < 0 || run_samples < 0 || samples_per_second < 0 || render_time < 0 {
            return Err(ResultsError::malformed(format!(
                "negative field in run ({total_samples}, {run_samples}, {samples_per_second}, {render_time})"
            )));
        }
        if i64::from(run_samples) > total_samples {
            return Err(ResultsError::malformed(format!(
                "run samples ({run_samples}) exceed total samples ({total_samples})"
            )));
        }

        Ok(RunRecord {
            total_samples,
            run_samples,
            samples_per_second,
            render_time,
        })
    }

    pub fn total_samples(&self) -> i64 {
        self.total_samples
    }

    pub fn run_samples(&self) -> i32 {
        self.run_samples
    }

    pub fn samples_per_second(&self) -> i32 {
        self.samples_per_second
    }

    pub fn render_time(&self) -> i64 {
        self.render_time
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run: {:4} total samples. {:4} run samples. {:8} samples per second. {} milliseconds.",
            self.total_samples, self.run_samples, self.samples_per_second, self.render_time
        )
    }
}

/// Every batch produced by a single invocation of the benchmark tool, in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    runs: Vec<RunRecord>,
}

impl ResultSet {
    pub fn new(runs: Vec<RunRecord>) -> Self {
        ResultSet { runs }
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Upper median of the per-batch throughput: the element at index `n / 2` of the ascending
    /// sorted values. For an even number of batches this picks the larger of the two middle
    /// values, no averaging is performed.
    pub fn median_samples_per_second(&self) -> Result<i32> {
        let middle = self.runs.len() / 2;
        self.runs
            .iter()
            .map(RunRecord::samples_per_second)
            .sorted_unstable()
            .nth(middle)
            .ok_or(ResultsError::NoData)
    }
}

impl FromIterator<RunRecord> for ResultSet {
    fn from_iter<T: IntoIterator<Item = RunRecord>>(iter: T) -> Self {
        ResultSet::new(iter.into_iter().collect())
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} runs:", self.runs.len())?;
        for run in &self.runs {
            writeln!(f, "\t{run}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn result_set_with_sps(values: &[i32]) -> ResultSet {
        values
            .iter()
            .enumerate()
            .map(|(i, &sps)| {
                let batch = i as i64 + 1;
                RunRecord::new(batch * 8, 8, sps, 1_000).unwrap()
            })
            .collect()
    }

    #[rstest]
    #[case::single(&[42], 42)]
    #[case::odd(&[10, 30, 20], 20)]
    #[case::even_picks_upper(&[10, 20, 30, 40], 30)]
    #[case::unsorted_even(&[40, 10, 30, 20], 30)]
    #[case::two_values(&[20, 15], 20)]
    #[case::ties(&[7, 7, 3, 7], 7)]
    fn test_median_samples_per_second(#[case] values: &[i32], #[case] expected: i32) {
        let results = result_set_with_sps(values);
        assert_eq!(results.median_samples_per_second().unwrap(), expected);
    }

    #[test]
    fn test_median_of_empty_result_set_is_no_data() {
        let results = ResultSet::default();
        assert!(results.is_empty());
        assert_eq!(
            results.median_samples_per_second(),
            Err(ResultsError::NoData)
        );
    }

    #[test]
    fn test_median_does_not_reorder_runs() {
        let results = result_set_with_sps(&[30, 10, 20]);
        results.median_samples_per_second().unwrap();
        let sps: Vec<_> = results
            .runs()
            .iter()
            .map(RunRecord::samples_per_second)
            .collect();
        assert_eq!(sps, vec![30, 10, 20]);
    }

    #[rstest]
    #[case::negative_total(-1, 0, 0, 0)]
    #[case::negative_run(8, -8, 0, 0)]
    #[case::negative_sps(8, 8, -1, 0)]
    #[case::negative_time(8, 8, 1, -5)]
    #[case::run_exceeds_total(8, 16, 1, 5)]
    fn test_invalid_record_is_rejected(
        #[case] total: i64,
        #[case] run: i32,
        #[case] sps: i32,
        #[case] time: i64,
    ) {
        assert!(matches!(
            RunRecord::new(total, run, sps, time),
            Err(ResultsError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_display() {
        let results = ResultSet::new(vec![
            RunRecord::new(10, 5, 15, 500).unwrap(),
            RunRecord::new(15, 10, 20, 800).unwrap(),
        ]);
        assert_eq!(
            results.to_string(),
            "2 runs:\n\
             \tRun:   10 total samples.    5 run samples.       15 samples per second. 500 milliseconds.\n\
             \tRun:   15 total samples.   10 run samples.       20 samples per second. 800 milliseconds.\n"
        );
    }
}
