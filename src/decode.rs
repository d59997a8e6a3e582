use std::fs;
use std::path::PathBuf;

use crate::prelude::*;
use bench_results::OutputMode;
use console::style;

#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    /// Result payload saved from the benchmark tool
    pub file: PathBuf,

    /// Protocol the payload was produced with, same default as the config `mode`
    #[arg(long, value_enum, default_value_t = OutputMode::default())]
    pub mode: OutputMode,
}

/// Print the runs stored in a result payload
pub fn run(args: DecodeArgs) -> Result<()> {
    let payload =
        fs::read(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
    let results = args
        .mode
        .decoder()
        .decode(&payload)
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;

    println!(
        "{}",
        style(format!("{} ({} mode)", args.file.display(), args.mode)).bold()
    );
    print!("{results}");
    match results.median_samples_per_second() {
        Ok(median) => println!("Median samples per second: {median}"),
        Err(e) => warn!("{e}"),
    }
    Ok(())
}
