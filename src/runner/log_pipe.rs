use crate::logger::BENCHMARK_TOOL_TARGET;
use crate::prelude::*;
use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

pub struct CommandOutput {
    pub status: ExitStatus,
    /// Complete standard output, only filled when it was captured
    pub stdout: Vec<u8>,
}

fn is_line_end(byte: &u8) -> bool {
    *byte == b'\n' || *byte == b'\r'
}

fn for_each_line(chunk: &[u8], on_line: &mut impl FnMut(&str)) {
    for line in chunk.split(is_line_end).filter(|line| !line.is_empty()) {
        on_line(&String::from_utf8_lossy(line));
    }
}

/// Copy `reader` into `writer`, handing every complete line to `on_line`.
///
/// A trailing partial line is only handed over once the reader reached its end.
fn log_tee(
    mut reader: impl Read,
    mut writer: impl Write,
    mut on_line: impl FnMut(&str),
) -> Result<()> {
    let mut buffer = [0; 1024];
    let mut line_buffer = Vec::new();
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            if !line_buffer.is_empty() {
                writer.write_all(&line_buffer)?;
                for_each_line(&line_buffer, &mut on_line);
            }
            break;
        }
        line_buffer.extend_from_slice(&buffer[..bytes_read]);

        if let Some(last_line_end) = line_buffer.iter().rposition(is_line_end) {
            let complete: Vec<u8> = line_buffer.drain(..=last_line_end).collect();
            writer.write_all(&complete)?;
            for_each_line(&complete, &mut on_line);
        }
    }
    writer.flush()?;
    Ok(())
}

fn trace_tool_line(prefix: &'static str) -> impl FnMut(&str) {
    move |line| trace!(target: BENCHMARK_TOOL_TARGET, "{prefix}{line}")
}

fn join_pipe<T>(handle: thread::JoinHandle<Result<T>>, stream: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("the {stream} reader thread panicked"))?
        .with_context(|| format!("failed to read the {stream} of the process"))
}

/// Run `cmd` to completion while forwarding its stderr to the terminal and the log.
///
/// With `capture_stdout`, stdout is buffered in memory and returned instead of being forwarded.
/// The call only returns once both streams reached their end.
pub fn run_command_with_log_pipe(mut cmd: Command, capture_stdout: bool) -> Result<CommandOutput> {
    let mut process = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to spawn the process")?;
    let stdout = process.stdout.take().context("unable to get stdout")?;
    let stderr = process.stderr.take().context("unable to get stderr")?;

    let stdout_handle = thread::spawn(move || -> Result<Vec<u8>> {
        let mut captured = Vec::new();
        if capture_stdout {
            let mut stdout = stdout;
            stdout.read_to_end(&mut captured)?;
        } else {
            log_tee(stdout, std::io::stdout(), trace_tool_line(""))?;
        }
        Ok(captured)
    });
    let stderr_handle = thread::spawn(move || {
        log_tee(stderr, std::io::stderr(), trace_tool_line("[stderr]"))
    });

    let status = process.wait().context("failed to wait for the process")?;
    let stdout = join_pipe(stdout_handle, "stdout")?;
    join_pipe(stderr_handle, "stderr")?;

    Ok(CommandOutput { status, stdout })
}
