//! Startup checks module for autoconvert
//!
//! Provides preflight checks run before a batch touches any file:
//! - Input and output directories exist
//! - The external tools the run needs can be started

use crate::batch::BatchOptions;
use crate::config::Config;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{info, warn};

/// Error types for startup checks
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{tool} not available; is it installed and in PATH? ({reason})")]
    ToolUnavailable { tool: String, reason: String },

    #[error("{role} directory {path} does not exist or is not a directory")]
    MissingDirectory { role: &'static str, path: PathBuf },
}

/// Check that a tool starts and exits successfully with `version_arg`
///
/// Returns the tool's standard output.
pub fn check_tool_available(tool: &Path, version_arg: &str) -> Result<String, StartupError> {
    let output = Command::new(tool)
        .arg(version_arg)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| StartupError::ToolUnavailable {
            tool: tool.display().to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(StartupError::ToolUnavailable {
            tool: tool.display().to_string(),
            reason: format!("`{} {}` exited with {}", tool.display(), version_arg, output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `ffmpeg -version` output and extract the version token
///
/// Handles various FFmpeg version formats:
/// - Standard: "ffmpeg version 6.1.1 ..."
/// - N-prefixed: "ffmpeg version n6.1-... ..."
pub fn parse_ffmpeg_version(version_output: &str) -> Option<String> {
    let version_line = version_output
        .lines()
        .find(|line| line.to_lowercase().contains("ffmpeg version"))?;

    let version = version_line
        .to_lowercase()
        .split("ffmpeg version")
        .nth(1)?
        .split_whitespace()
        .next()?
        .to_string();

    Some(version)
}

/// Check the directories a batch will touch
///
/// A dry run never writes, so only the input directory is checked for it.
pub fn check_directories(options: &BatchOptions) -> Vec<StartupError> {
    let mut dirs = vec![("Input", &options.input_dir)];
    if !options.dry_run {
        dirs.push(("Output", &options.output_dir));
    }

    dirs.into_iter()
        .filter(|(_, path)| !path.is_dir())
        .map(|(role, path)| StartupError::MissingDirectory {
            role,
            path: path.clone(),
        })
        .collect()
}

/// Check the tools needed by a run
///
/// HandBrake mode needs only HandBrakeCLI; otherwise ffprobe and ffmpeg.
pub fn check_tools(config: &Config, handbrake: bool) -> Result<(), StartupError> {
    if handbrake {
        check_tool_available(&config.tools.handbrake, "--version")?;
        return Ok(());
    }

    check_tool_available(&config.tools.ffprobe, "-version")?;
    let ffmpeg_version = check_tool_available(&config.tools.ffmpeg, "-version")?;
    match parse_ffmpeg_version(&ffmpeg_version) {
        Some(version) => info!("Using ffmpeg {}", version),
        None => warn!("Could not determine ffmpeg version"),
    }
    Ok(())
}

/// Run all preflight checks: directories, then tools
///
/// Problems are logged as warnings and returned; they never stop the batch.
/// A missing tool or output directory makes each file fail on its own and
/// shows up in the summary. Tool checks are skipped for dry runs and when
/// `skip_tool_checks` is set.
pub fn run_startup_checks(
    config: &Config,
    options: &BatchOptions,
    skip_tool_checks: bool,
) -> Vec<StartupError> {
    let mut problems = check_directories(options);

    if !skip_tool_checks && !options.dry_run {
        if let Err(e) = check_tools(config, options.handbrake) {
            problems.push(e);
        }
    }

    for problem in &problems {
        warn!("Startup check: {}", problem);
    }
    problems
}
