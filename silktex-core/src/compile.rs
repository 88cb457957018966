//! Compile runner
//!
//! Thin subprocess wrapper around the command builder: runs the built
//! command through the shell, collects whatever log text the engine
//! produced, and scrapes it into messages. An engine that runs and fails
//! is a successful `run` with `success = false`; only failing to spawn
//! the shell is an error.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::buildlog::{self, LogMessage};
use crate::typeset::{build_command, TypesetterConfig};

/// Outcome of one compile run
#[derive(Clone, Debug)]
pub struct CompileResult {
    pub success: bool,
    pub log: String,
    pub messages: Vec<LogMessage>,
}

/// Build and execute the compile command for the given config
pub fn run(cfg: &TypesetterConfig) -> Result<CompileResult> {
    let command = build_command(cfg);
    debug!("running typesetter: {command}");

    let workdir = cfg
        .work_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let output = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .current_dir(workdir)
        .output()
        .with_context(|| format!("Failed to spawn typesetter command: {command}"))?;

    let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
    captured.push_str(&String::from_utf8_lossy(&output.stderr));

    let log = read_log(cfg, captured);
    let messages = buildlog::scrape(&log);

    Ok(CompileResult {
        success: output.status.success(),
        log,
        messages,
    })
}

/// The engine's own log file is more complete than captured output;
/// prefer it when it exists, falling back to what the process printed.
fn read_log(cfg: &TypesetterConfig, captured: String) -> String {
    let log_path = cfg.output_dir.join(format!("{}.log", cfg.base_name));
    fs::read_to_string(&log_path).unwrap_or(captured)
}
