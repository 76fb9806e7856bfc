use crate::params::{Encoding, ParameterSet, SamplingMethod};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{error, info};

// The converter's own default chunking strategy; elided from the command line.
const DEFAULT_CHUNK_METHOD: &str = "LASZIP";

// Public convert command entrypoint.
// Logs the resolved parameters and constructed command, runs the converter
// once, and returns the exit code this process should terminate with.
pub fn run_convert(converter_path: &Path, params: &ParameterSet) -> Result<i32> {
    info!(parameters = ?params, "resolved conversion parameters");

    let tokens = build_converter_command(converter_path, params);
    info!(command = %render_command(&tokens), "executing converter");

    let outcome = execute_converter(&tokens)?;

    if outcome.status.success() {
        info!("converter completed successfully");
        // Converter payload goes to stdout; diagnostics stay on stderr.
        io::stdout()
            .write_all(outcome.output.as_bytes())
            .context("writing converter output failed")?;
        return Ok(0);
    }

    match outcome.status.code() {
        Some(code) => {
            error!(exit_code = code, "converter failed");
            error!("converter output:\n{}", outcome.output.trim_end());
            Ok(code)
        }
        None => {
            error!("converter was terminated by a signal before reporting an exit code");
            error!("converter output:\n{}", outcome.output.trim_end());
            Ok(1)
        }
    }
}

// Build the converter invocation as an ordered token list.
// Token order is fixed: executable, positional sources, then flags. Values
// matching the converter's own defaults (DEFAULT encoding, poisson sampling,
// LASZIP chunking) are elided entirely so the converter applies them itself;
// recorded invocations rely on that elision and it must not change.
pub fn build_converter_command(converter_path: &Path, params: &ParameterSet) -> Vec<OsString> {
    let mut cmd: Vec<OsString> = Vec::new();
    cmd.push(converter_path.as_os_str().to_owned());

    for source in &params.source {
        cmd.push(OsString::from(source));
    }

    if let Some(outdir) = &params.outdir {
        cmd.push(OsString::from("-o"));
        cmd.push(outdir.clone().into_os_string());
    }

    if params.encoding != Encoding::Default {
        cmd.push(OsString::from("--encoding"));
        cmd.push(OsString::from(params.encoding.as_converter_arg()));
    }

    if params.method != SamplingMethod::Poisson {
        cmd.push(OsString::from("-m"));
        cmd.push(OsString::from(params.method.as_converter_arg()));
    }

    if params.chunk_method != DEFAULT_CHUNK_METHOD {
        cmd.push(OsString::from("--chunkMethod"));
        cmd.push(OsString::from(&params.chunk_method));
    }

    for attribute in &params.attributes {
        cmd.push(OsString::from("--attributes"));
        cmd.push(OsString::from(attribute));
    }

    if params.keep_chunks {
        cmd.push(OsString::from("--keep-chunks"));
    }

    if params.no_chunking {
        cmd.push(OsString::from("--no-chunking"));
    }

    if params.no_indexing {
        cmd.push(OsString::from("--no-indexing"));
    }

    if let Some(page) = &params.generate_page {
        cmd.push(OsString::from("-p"));
        cmd.push(OsString::from(page));
    }

    if let Some(title) = &params.title {
        cmd.push(OsString::from("--title"));
        cmd.push(OsString::from(title));
    }

    cmd
}

#[derive(Debug)]
struct ConverterOutcome {
    status: ExitStatus,
    output: String,
}

// Spawn the token list and block until the child exits, capturing stdout and
// stderr interleaved through a single pipe. No timeout: a hung converter
// hangs this process until it is externally killed.
fn execute_converter(tokens: &[OsString]) -> Result<ConverterOutcome> {
    let (program, args) = tokens
        .split_first()
        .context("converter command is missing its executable token")?;

    let (mut reader, writer) = io::pipe().context("creating output capture pipe failed")?;
    let stderr_writer = writer.try_clone().context("cloning output capture pipe failed")?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(writer))
        .stderr(Stdio::from(stderr_writer));

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning converter failed: {}", Path::new(program).display()))?;

    // The Command retains its copies of the pipe writer; they must be dropped
    // or the read below never reaches EOF.
    drop(command);

    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .context("reading converter output failed")?;
    let status = child.wait().context("waiting for converter exit failed")?;

    Ok(ConverterOutcome {
        status,
        output: String::from_utf8_lossy(&raw).into_owned(),
    })
}

// Shell-style rendering of the token list for log lines.
fn render_command(tokens: &[OsString]) -> String {
    tokens
        .iter()
        .map(|token| token.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
