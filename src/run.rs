use std::path::PathBuf;

use crate::config::{BenchmarkConfig, ConfigOverrides};
use crate::prelude::*;
use crate::report::{self, RAW_RESULTS_FILENAME, RawResultsWriter};
use crate::runner::BenchmarkTool;
use crate::sweep::run_sweep;

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the YAML sweep configuration
    #[arg(short, long, env = "CHUNKY_BENCH_CONFIG", default_value = "chunky-bench.yaml")]
    pub config: PathBuf,

    /// Number of passes through every configuration, overrides `runs`
    #[arg(short, long)]
    pub runs: Option<u32>,

    /// Randomize the library order on every pass
    #[arg(short, long)]
    pub mix: bool,

    /// Directory the reports are written to, overrides `output-dir`
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = BenchmarkConfig::load_from_path(&args.config)?;
    config.apply_overrides(ConfigOverrides {
        runs: args.runs,
        mix: args.mix,
        output_dir: args.output_dir,
    })?;
    debug!("Loaded config: {config:?}");

    let libraries = config.resolve_libraries()?;
    let tool = BenchmarkTool::from_config(&config);
    info!(
        "Benchmark tool: {} ({} mode, {})",
        tool.tool_path().display(),
        tool.mode(),
        tool.main_class()
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let mut raw_results = RawResultsWriter::create(&config.output_dir.join(RAW_RESULTS_FILENAME))?;

    let outcome = run_sweep(&config, &libraries, &tool, &mut raw_results)?;
    raw_results.into_inner()?;

    report::write_reports(&outcome.combinations, &config.output_dir)?;
    if outcome.skipped > 0 {
        bail!(
            "{} benchmark invocation(s) failed, reports only contain the successful ones",
            outcome.skipped
        );
    }
    Ok(())
}
