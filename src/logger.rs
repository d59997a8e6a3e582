use std::env;
use std::fs::File;
use std::path::Path;

use crate::prelude::*;
use simplelog::{CombinedLogger, ConfigBuilder, SharedLogger};

pub const LOG_LEVEL_ENV: &str = "CHUNKY_BENCH_LOG";

/// Log target used for the forwarded output of the benchmark tool
pub const BENCHMARK_TOOL_TARGET: &str = "benchmark-tool";

fn log_level_from_env() -> log::LevelFilter {
    env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|log_level| log_level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info)
}

fn get_terminal_logger() -> Box<dyn SharedLogger> {
    let config = ConfigBuilder::new()
        .set_time_level(log::LevelFilter::Debug)
        .build();

    simplelog::TermLogger::new(
        log_level_from_env(),
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
}

/// The log file always receives debug output, whatever the terminal level is
fn get_file_logger(log_file: &Path) -> Result<Box<dyn SharedLogger>> {
    let file = File::create(log_file)
        .with_context(|| format!("Failed to create log file at {}", log_file.display()))?;
    let config = ConfigBuilder::new()
        .set_time_level(log::LevelFilter::Error)
        .build();

    Ok(simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config,
        file,
    ))
}

pub fn init_logger(log_file: Option<&Path>) -> Result<()> {
    let mut loggers = vec![get_terminal_logger()];
    if let Some(log_file) = log_file {
        loggers.push(get_file_logger(log_file)?);
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}
