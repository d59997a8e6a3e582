use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::run_record::ResultSet;
use crate::summary::GroupSummary;

/// Identifies one benchmark configuration under test
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConfigKey {
    pub jvm: PathBuf,
    pub library: PathBuf,
    pub threads: u32,
}

impl ConfigKey {
    pub fn new(jvm: impl Into<PathBuf>, library: impl Into<PathBuf>, threads: u32) -> Self {
        ConfigKey {
            jvm: jvm.into(),
            library: library.into(),
            threads,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} threads)",
            self.library.display(),
            self.jvm.display(),
            self.threads
        )
    }
}

/// Result sets of every invocation, grouped by configuration.
///
/// Keys are iterated in the order they were first recorded, result sets in the order they were
/// appended. Entries are never removed.
#[derive(Debug, Default)]
pub struct RunCombinations {
    groups: Vec<(ConfigKey, Vec<ResultSet>)>,
    index: HashMap<ConfigKey, usize>,
}

impl RunCombinations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the result set of one invocation to its configuration
    pub fn record(&mut self, key: ConfigKey, result: ResultSet) {
        match self.index.get(&key) {
            Some(&position) => self.groups[position].1.push(result),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![result]));
            }
        }
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&[ResultSet]> {
        self.index
            .get(key)
            .map(|&position| self.groups[position].1.as_slice())
    }

    /// Median throughput of every result set recorded under `key`, in recording order.
    ///
    /// An unknown key yields an empty series. A recorded result set without runs fails the whole
    /// series with [`crate::ResultsError::NoData`].
    pub fn median_series(&self, key: &ConfigKey) -> Result<Vec<i32>> {
        self.get(key)
            .unwrap_or_default()
            .iter()
            .map(ResultSet::median_samples_per_second)
            .collect()
    }

    /// Every configuration with its result sets. Each call starts a fresh iteration.
    pub fn iter_groups(&self) -> impl Iterator<Item = (&ConfigKey, &[ResultSet])> + '_ {
        self.groups
            .iter()
            .map(|(key, results)| (key, results.as_slice()))
    }

    /// Summary of the median series of every configuration
    pub fn summaries(&self) -> impl Iterator<Item = (&ConfigKey, Result<GroupSummary>)> + '_ {
        self.iter_groups().map(|(key, _)| {
            let summary = self
                .median_series(key)
                .and_then(|medians| GroupSummary::from_medians(&medians));
            (key, summary)
        })
    }

    /// Number of distinct configurations
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of result sets over all configurations
    pub fn result_set_count(&self) -> usize {
        self.groups.iter().map(|(_, results)| results.len()).sum()
    }
}
