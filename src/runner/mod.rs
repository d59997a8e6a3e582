use std::fs;
use std::path::{Path, PathBuf};

mod command;
mod log_pipe;

use crate::config::{BenchmarkConfig, ToolConfig};
use crate::prelude::*;
use bench_results::{ConfigKey, OutputMode, ResultSet};
use command::build_command;
use log_pipe::run_command_with_log_pipe;

/// Name of the file the binary-mode tool writes into its temporary directory
const BINARY_RESULTS_FILENAME: &str = "results.bin";

/// One invocation of the benchmark tool
pub struct Invocation<'a> {
    pub key: &'a ConfigKey,
    pub tool_config: ToolConfig<'a>,
}

impl<'a> Invocation<'a> {
    pub fn new(key: &'a ConfigKey, config: &'a BenchmarkConfig) -> Self {
        Invocation {
            key,
            tool_config: config.tool_config(key.threads),
        }
    }
}

pub trait BenchmarkLauncher {
    /// Run the benchmark for one configuration and decode everything it produced.
    /// No result set is returned unless the tool exited successfully and its whole output decoded.
    fn launch(&self, invocation: &Invocation<'_>) -> Result<ResultSet>;
}

/// The external Chunky benchmark tool, started in a fresh JVM for every invocation
pub struct BenchmarkTool {
    tool_path: PathBuf,
    main_class: String,
    mode: OutputMode,
}

impl BenchmarkTool {
    pub fn new(tool_path: impl Into<PathBuf>, main_class: impl Into<String>, mode: OutputMode) -> Self {
        BenchmarkTool {
            tool_path: tool_path.into(),
            main_class: main_class.into(),
            mode,
        }
    }

    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self::new(&config.runner, config.main_class(), config.mode)
    }

    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }

    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    fn launch_binary(&self, invocation: &Invocation<'_>) -> Result<Vec<u8>> {
        let temp_dir = tempfile::TempDir::new()
            .context("Failed to create a temporary directory for the benchmark results")?;
        let results_path = temp_dir.path().join(BINARY_RESULTS_FILENAME);

        let cmd = build_command(self, invocation, Some(&results_path))?;
        debug!("Running: {cmd:?}");
        let output = run_command_with_log_pipe(cmd, false)?;
        info!("Benchmark finished with {}", output.status);
        if !output.status.success() {
            bail!("Benchmark tool exited with non-zero status: {}", output.status);
        }

        fs::read(&results_path).with_context(|| {
            format!(
                "Failed to read benchmark results at {}",
                results_path.display()
            )
        })
    }

    fn launch_json(&self, invocation: &Invocation<'_>) -> Result<Vec<u8>> {
        let cmd = build_command(self, invocation, None)?;
        debug!("Running: {cmd:?}");
        let output = run_command_with_log_pipe(cmd, true)?;
        info!("Benchmark finished with {}", output.status);
        if !output.status.success() {
            bail!("Benchmark tool exited with non-zero status: {}", output.status);
        }

        Ok(output.stdout)
    }
}

impl BenchmarkLauncher for BenchmarkTool {
    fn launch(&self, invocation: &Invocation<'_>) -> Result<ResultSet> {
        let payload = match self.mode {
            OutputMode::Binary => self.launch_binary(invocation)?,
            OutputMode::Json => self.launch_json(invocation)?,
        };

        let results = self.mode.decoder().decode(&payload).with_context(|| {
            format!(
                "Failed to decode the {} results of {}",
                self.mode, invocation.key
            )
        })?;
        debug!("Results: {results}");
        Ok(results)
    }
}
