use std::env;
use std::path::Path;
use std::process::Command;

use crate::prelude::*;
use crate::runner::{BenchmarkTool, Invocation};
use bench_results::OutputMode;

/// Build the JVM command line running the benchmark tool against one library.
///
/// `result_file` is where the binary-mode tool writes its results, it is ignored in JSON mode.
pub fn build_command(
    tool: &BenchmarkTool,
    invocation: &Invocation<'_>,
    result_file: Option<&Path>,
) -> Result<Command> {
    let classpath = env::join_paths([tool.tool_path(), invocation.key.library.as_path()])
        .context("Failed to build the benchmark classpath")?;

    let mut cmd = Command::new(&invocation.key.jvm);
    cmd.arg("-cp").arg(classpath).arg(tool.main_class());

    let tool_config = &invocation.tool_config;
    match tool.mode() {
        OutputMode::Binary => {
            let result_file =
                result_file.context("The binary-mode benchmark tool needs a result file")?;
            cmd.arg("--input")
                .arg(tool_config.scene)
                .arg("--threads")
                .arg(tool_config.threads.to_string())
                .arg("--samples")
                .arg(tool_config.samples.to_string())
                .arg("--batches")
                .arg(tool_config.batches.to_string())
                .arg("--tempOut")
                .arg(result_file);
            if let Some(textures) = tool_config.textures {
                cmd.arg("--textures").arg(textures);
            }
            if tool_config.save.is_some() {
                warn!("The binary-mode benchmark tool cannot save renders, ignoring `save`");
            }
        }
        OutputMode::Json => {
            let config_json = serde_json::to_string(tool_config)
                .context("Failed to serialize the benchmark tool config")?;
            cmd.arg(config_json);
        }
    }

    Ok(cmd)
}
