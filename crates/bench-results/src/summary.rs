use serde::Serialize;

use crate::error::{Result, ResultsError};

/// z-score of a two-sided 95% confidence interval
const Z_95: f64 = 1.960;

/// Statistics over the median throughputs of repeated invocations of one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Number of invocations
    pub runs: usize,
    pub mean: f64,
    /// Population standard deviation (n denominator)
    pub stdev: f64,
    /// Half-width of the 95% confidence interval of the mean
    pub ci95: f64,
}

impl GroupSummary {
    pub fn from_medians(medians: &[i32]) -> Result<Self> {
        if medians.is_empty() {
            return Err(ResultsError::NoData);
        }

        let runs = medians.len();
        let values: Vec<f64> = medians.iter().map(|&m| f64::from(m)).collect();
        let mean = values.iter().sum::<f64>() / runs as f64;
        let stdev = population_stdev(&values, mean);
        let ci95 = Z_95 * (stdev / (runs as f64).sqrt());

        Ok(GroupSummary {
            runs,
            mean,
            stdev,
            ci95,
        })
    }

    /// Confidence interval relative to the mean, in percent
    pub fn relative_ci_percent(&self) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        self.ci95 / self.mean * 100.0
    }
}

fn population_stdev(data: &[f64], mean: f64) -> f64 {
    let variance = data
        .iter()
        .map(|&value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_median() {
        let summary = GroupSummary::from_medians(&[1200]).unwrap();
        assert_eq!(summary.runs, 1);
        assert_eq!(summary.mean, 1200.0);
        assert_eq!(summary.stdev, 0.0);
        assert_eq!(summary.ci95, 0.0);
        assert_eq!(summary.relative_ci_percent(), 0.0);
    }

    #[test]
    fn test_spread_medians() {
        // mean = 5, squared deviations sum to 32 over 8 values
        let summary = GroupSummary::from_medians(&[2, 4, 4, 4, 5, 5, 7, 9]).unwrap();
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.stdev, 2.0);
        let expected_ci = 1.960 * 2.0 / 8.0_f64.sqrt();
        assert!((summary.ci95 - expected_ci).abs() < 1e-12);
        assert!((summary.relative_ci_percent() - expected_ci / 5.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_mean() {
        let summary = GroupSummary::from_medians(&[0, 0]).unwrap();
        assert_eq!(summary.relative_ci_percent(), 0.0);
    }

    #[test]
    fn test_no_medians() {
        assert_eq!(GroupSummary::from_medians(&[]), Err(ResultsError::NoData));
    }
}
