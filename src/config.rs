use std::fs;
use std::path::{Path, PathBuf};

use crate::prelude::*;
use bench_results::OutputMode;
use serde::{Deserialize, Serialize};

const BINARY_MODE_MAIN_CLASS: &str = "io.github.thatredox.chunkybenchmark.Benchmark";
const JSON_MODE_MAIN_CLASS: &str = "dev.thatredox.chunky.benchmark.Benchmark";

/// What the sweep driver does when an invocation or its decoding fails
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the sweep and surface the error
    #[default]
    Abort,
    /// Log the error, record nothing for this invocation and continue
    Skip,
}

/// Sweep configuration, loaded from a YAML file.
///
/// Every combination of `jvms`, `libs` and `threads` is benchmarked `runs` times.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BenchmarkConfig {
    /// Path to the benchmark tool jar
    pub runner: PathBuf,
    /// Protocol generation of the benchmark tool
    #[serde(default)]
    pub mode: OutputMode,
    /// Entry class of the benchmark tool, defaults depend on `mode`
    pub main_class: Option<String>,
    #[serde(default = "default_jvms")]
    pub jvms: Vec<PathBuf>,
    /// Chunky library jars, or directories containing them
    pub libs: Vec<PathBuf>,
    #[serde(default = "default_threads")]
    pub threads: Vec<u32>,
    /// Scene to render
    pub scene: String,
    /// Texture pack to use instead of the default textures
    pub textures: Option<PathBuf>,
    /// File the tool saves the final render to
    pub save: Option<PathBuf>,
    /// Samples per batch
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default = "default_batches")]
    pub batches: u32,
    /// Passes over every configuration
    #[serde(default = "default_runs")]
    pub runs: u32,
    /// Shuffle the library order on every pass
    #[serde(default)]
    pub mix: bool,
    #[serde(default)]
    pub on_failure: FailurePolicy,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_jvms() -> Vec<PathBuf> {
    vec![PathBuf::from("java")]
}

fn default_threads() -> Vec<u32> {
    vec![1]
}

fn default_samples() -> u32 {
    64
}

fn default_batches() -> u32 {
    4
}

fn default_runs() -> u32 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Options given on the command line, taking precedence over the file
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub runs: Option<u32>,
    pub mix: bool,
    pub output_dir: Option<PathBuf>,
}

/// Document passed as the single argument of the JSON-mode benchmark tool
#[derive(Debug, Serialize, PartialEq)]
pub struct ToolConfig<'a> {
    pub textures: Option<&'a Path>,
    pub scene: &'a str,
    pub save: Option<&'a Path>,
    pub threads: u32,
    pub samples: u32,
    pub batches: u32,
}

impl BenchmarkConfig {
    /// Load, parse and validate the configuration file at `path`
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_content = fs::read(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: Self = serde_yaml::from_slice(&config_content)
            .with_context(|| format!("Failed to parse benchmark config at {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid benchmark config at {}", path.display()))?;
        debug!("Config loaded from {}", path.display());

        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(runs) = overrides.runs {
            self.runs = runs;
        }
        if overrides.mix {
            self.mix = true;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.jvms.is_empty() {
            bail!("at least one JVM must be configured");
        }
        if self.libs.is_empty() {
            bail!("at least one library must be configured");
        }
        if self.threads.is_empty() {
            bail!("at least one thread count must be configured");
        }
        if self.threads.contains(&0) {
            bail!("thread counts must be greater than 0");
        }
        if self.scene.trim().is_empty() {
            bail!("scene cannot be empty");
        }
        if self.samples == 0 {
            bail!("samples must be greater than 0");
        }
        if self.batches == 0 {
            bail!("batches must be greater than 0");
        }
        if self.runs == 0 {
            bail!("runs must be greater than 0");
        }
        Ok(())
    }

    pub fn main_class(&self) -> &str {
        match (&self.main_class, self.mode) {
            (Some(main_class), _) => main_class,
            (None, OutputMode::Binary) => BINARY_MODE_MAIN_CLASS,
            (None, OutputMode::Json) => JSON_MODE_MAIN_CLASS,
        }
    }

    /// Expand `libs` into the list of library jars.
    ///
    /// Directories are scanned (not recursively) for `.jar` files, sorted by file name.
    pub fn resolve_libraries(&self) -> Result<Vec<PathBuf>> {
        let mut libraries = Vec::new();

        for lib in &self.libs {
            if lib.is_dir() {
                let mut jars = fs::read_dir(lib)
                    .with_context(|| format!("Failed to list libraries in {}", lib.display()))?
                    .map(|entry| entry.map(|entry| entry.path()))
                    .collect::<std::io::Result<Vec<_>>>()
                    .with_context(|| format!("Failed to list libraries in {}", lib.display()))?
                    .into_iter()
                    .filter(|path| path.is_file() && is_jar(path))
                    .collect::<Vec<_>>();
                if jars.is_empty() {
                    warn!("No library found in {}", lib.display());
                }
                jars.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
                libraries.extend(jars);
            } else if lib.is_file() {
                libraries.push(lib.clone());
            } else {
                bail!("Library not found: {}", lib.display());
            }
        }

        if libraries.is_empty() {
            bail!("No library to benchmark");
        }
        Ok(libraries)
    }

    pub fn tool_config(&self, threads: u32) -> ToolConfig<'_> {
        ToolConfig {
            textures: self.textures.as_deref(),
            scene: &self.scene,
            save: self.save.as_deref(),
            threads,
            samples: self.samples,
            batches: self.batches,
        }
    }
}

fn is_jar(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("jar")
}
