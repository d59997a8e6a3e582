use std::io::Write;
use std::path::PathBuf;

use crate::config::{BenchmarkConfig, FailurePolicy};
use crate::prelude::*;
use crate::report::RawResultsWriter;
use crate::runner::{BenchmarkLauncher, Invocation};
use bench_results::{ConfigKey, RunCombinations};
use itertools::iproduct;
use rand::seq::SliceRandom;

pub struct SweepOutcome {
    pub combinations: RunCombinations,
    /// Invocations skipped because of the `skip` failure policy
    pub skipped: usize,
}

/// Benchmark every configuration `config.runs` times, one invocation at a time.
pub fn run_sweep<W: Write>(
    config: &BenchmarkConfig,
    libraries: &[PathBuf],
    launcher: &impl BenchmarkLauncher,
    raw_results: &mut RawResultsWriter<W>,
) -> Result<SweepOutcome> {
    let mut libraries = libraries.to_vec();
    let mut combinations = RunCombinations::new();
    let mut skipped = 0;

    let per_run = config.jvms.len() * libraries.len() * config.threads.len();
    info!(
        "Testing {} versions {} times each on {} JVM(s) with {} thread count(s){}",
        libraries.len(),
        config.runs,
        config.jvms.len(),
        config.threads.len(),
        if config.mix { " with mixing" } else { "" }
    );

    for run in 0..config.runs {
        info!("Running pass {}/{}", run + 1, config.runs);
        if config.mix {
            libraries.shuffle(&mut rand::thread_rng());
        }

        for (index, (jvm, library, &threads)) in
            iproduct!(&config.jvms, &libraries, &config.threads).enumerate()
        {
            let key = ConfigKey::new(jvm, library, threads);
            info!(
                "Running {} batches of {} samples on {key} ({}/{per_run})",
                config.batches,
                config.samples,
                index + 1
            );

            match launcher.launch(&Invocation::new(&key, config)) {
                Ok(results) => {
                    raw_results.write_result_set(&key, &results)?;
                    combinations.record(key, results);
                }
                Err(e) => match config.on_failure {
                    FailurePolicy::Abort => {
                        return Err(e.context(format!("Benchmark failed for {key}")));
                    }
                    FailurePolicy::Skip => {
                        warn!("Skipping failed benchmark for {key}: {e:#}");
                        skipped += 1;
                    }
                },
            }
        }
    }

    if skipped > 0 {
        warn!("{skipped} invocation(s) failed and were skipped");
    }
    Ok(SweepOutcome {
        combinations,
        skipped,
    })
}
