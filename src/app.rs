use std::path::PathBuf;

use crate::{decode, logger::init_logger, prelude::*, run};
use clap::{
    Parser, Subcommand,
    builder::{Styles, styling},
};

const ACCENT_U8_COLOR_CODE: u8 = 208;

fn create_styles() -> Styles {
    styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::Ansi256Color(ACCENT_U8_COLOR_CODE).on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Benchmark Chunky across JVMs, library versions and thread counts",
    styles = create_styles()
)]
pub struct Cli {
    /// Also write debug logs to this file
    #[arg(long, env = "CHUNKY_BENCH_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the benchmark tool over every configured combination and write the reports
    Run(run::RunArgs),
    /// Decode a saved result payload and print its runs
    Decode(decode::DecodeArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run(args) => run::run(args)?,
        Commands::Decode(args) => decode::run(args)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_results::OutputMode;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "chunky-bench",
            "--log-file",
            "bench.log",
            "run",
            "--config",
            "sweep.yaml",
            "--runs",
            "3",
            "--mix",
        ])
        .unwrap();

        assert_eq!(cli.log_file, Some(PathBuf::from("bench.log")));
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.config, PathBuf::from("sweep.yaml"));
        assert_eq!(args.runs, Some(3));
        assert!(args.mix);
        assert!(args.output_dir.is_none());
    }

    #[test]
    fn test_parse_decode() {
        let cli = Cli::try_parse_from(["chunky-bench", "decode", "out.json", "--mode", "json"])
            .unwrap();
        let Commands::Decode(args) = cli.command else {
            panic!("expected the decode command");
        };
        assert_eq!(args.file, PathBuf::from("out.json"));
        assert_eq!(args.mode, OutputMode::Json);

        assert!(Cli::try_parse_from(["chunky-bench", "decode", "out.bin", "--mode", "xml"]).is_err());
    }

    #[test]
    fn test_decode_mode_defaults_to_config_mode() {
        let cli = Cli::try_parse_from(["chunky-bench", "decode", "out.json"]).unwrap();
        let Commands::Decode(args) = cli.command else {
            panic!("expected the decode command");
        };
        assert_eq!(args.mode, OutputMode::default());
        assert_eq!(args.mode, OutputMode::Json);
    }
}
