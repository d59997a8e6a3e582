use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::prelude::*;
use bench_results::{ConfigKey, ResultSet, RunCombinations};
use serde::Serialize;
use tabled::{Table, Tabled};
use tabled::settings::Style;

pub const RAW_RESULTS_FILENAME: &str = "raw_results.csv";
pub const RAW_SPS_FILENAME: &str = "raw_sps.csv";
pub const SUMMARY_CSV_FILENAME: &str = "summary.csv";
pub const SUMMARY_MARKDOWN_FILENAME: &str = "summary.md";

/// Streams every decoded run to CSV as soon as its invocation completes.
///
/// Each invocation is a `jvm, library, threads` row followed by one
/// `total samples, run samples, samples per second, render time` row per batch.
pub struct RawResultsWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RawResultsWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> RawResultsWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        RawResultsWriter {
            writer: csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(writer),
        }
    }

    pub fn write_result_set(&mut self, key: &ConfigKey, results: &ResultSet) -> Result<()> {
        self.writer.write_record(key_columns(key))?;
        for run in results.runs() {
            self.writer.write_record([
                run.total_samples().to_string(),
                run.run_samples().to_string(),
                run.samples_per_second().to_string(),
                run.render_time().to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush raw results: {}", e.error()))
    }
}

fn key_columns(key: &ConfigKey) -> Vec<String> {
    vec![
        key.jvm.display().to_string(),
        key.library.display().to_string(),
        key.threads.to_string(),
    ]
}

/// One line per configuration, with the median throughput of every invocation
pub fn write_median_series<W: Write>(combinations: &RunCombinations, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    writer.write_record(["JVM", "Chunky Version", "Threads", "Samples per second"])?;

    for (key, _) in combinations.iter_groups() {
        let mut record = key_columns(key);
        match combinations.median_series(key) {
            Ok(medians) => record.extend(medians.iter().map(i32::to_string)),
            Err(e) => warn!("No median series for {key}: {e}"),
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Tabled, Serialize)]
pub struct SummaryRow {
    #[tabled(rename = "JVM")]
    #[serde(rename = "JVM")]
    jvm: String,
    #[tabled(rename = "Chunky Version")]
    #[serde(rename = "Chunky Version")]
    library: String,
    #[tabled(rename = "Threads")]
    #[serde(rename = "Threads")]
    threads: u32,
    #[tabled(rename = "Runs")]
    #[serde(rename = "Runs")]
    runs: usize,
    #[tabled(rename = "Mean SPS")]
    #[serde(rename = "Mean SPS")]
    mean: String,
    #[tabled(rename = "Std Dev")]
    #[serde(rename = "Std Dev")]
    stdev: String,
    #[tabled(rename = "95% CI")]
    #[serde(rename = "95% CI")]
    ci95: String,
    #[tabled(rename = "Result")]
    #[serde(skip)]
    result: String,
}

/// Summary of every configuration that has at least one usable median
pub fn summary_rows(combinations: &RunCombinations) -> Vec<SummaryRow> {
    combinations
        .summaries()
        .filter_map(|(key, summary)| match summary {
            Ok(summary) => Some(SummaryRow {
                jvm: key.jvm.display().to_string(),
                library: key
                    .library
                    .file_name()
                    .unwrap_or(key.library.as_os_str())
                    .to_string_lossy()
                    .into_owned(),
                threads: key.threads,
                runs: summary.runs,
                mean: format!("{:.2}", summary.mean),
                stdev: format!("{:.2}", summary.stdev),
                ci95: format!("{:.2}", summary.ci95),
                result: format!(
                    "{} +/- {:.2}%",
                    summary.mean.round(),
                    summary.relative_ci_percent()
                ),
            }),
            Err(e) => {
                warn!("Skipping {key} in the summary: {e}");
                None
            }
        })
        .collect()
}

const SUMMARY_CSV_HEADER: [&str; 7] = [
    "JVM",
    "Chunky Version",
    "Threads",
    "Runs",
    "Mean SPS",
    "Std Dev",
    "95% CI",
];

/// The header is written even when no configuration could be summarized
pub fn write_summary_csv<W: Write>(rows: &[SummaryRow], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(SUMMARY_CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn render_summary_markdown(rows: &[SummaryRow]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table.to_string()
}

pub fn render_summary_table(rows: &[SummaryRow]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// Write the aggregated reports into `output_dir` and log the summary table
pub fn write_reports(combinations: &RunCombinations, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let raw_sps_path = output_dir.join(RAW_SPS_FILENAME);
    let raw_sps = File::create(&raw_sps_path)
        .with_context(|| format!("Failed to create {}", raw_sps_path.display()))?;
    write_median_series(combinations, raw_sps)
        .with_context(|| format!("Failed to write {}", raw_sps_path.display()))?;

    let rows = summary_rows(combinations);

    let summary_path = output_dir.join(SUMMARY_CSV_FILENAME);
    let summary = File::create(&summary_path)
        .with_context(|| format!("Failed to create {}", summary_path.display()))?;
    write_summary_csv(&rows, summary)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    let markdown_path = output_dir.join(SUMMARY_MARKDOWN_FILENAME);
    fs::write(&markdown_path, render_summary_markdown(&rows) + "\n")
        .with_context(|| format!("Failed to write {}", markdown_path.display()))?;

    if rows.is_empty() {
        warn!("No configuration produced usable results");
    } else {
        info!("Summary:\n{}", render_summary_table(&rows));
    }
    info!("Reports written to {}", output_dir.display());
    Ok(())
}
