//! HandBrakeCLI encoder module for autoconvert
//!
//! Whole-file alternative to the codec-aware ffmpeg pipeline: always
//! re-encodes both streams to fixed bitrate targets.

use super::{check_exit_status, ConversionResult, EncodeError, EncodeParams, Transcoder};
use crate::config::{Config, HandbrakeConfig};
use crate::elapsed::format_duration;
use crate::scan::SourceFile;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{error, info};

/// Build the HandBrakeCLI command
///
/// Creates a Command configured with:
/// - Input and output paths
/// - Encoder name and average video/audio bitrates from `settings`
/// - `--optimize` for web (fast start) playback
pub fn build_handbrake_command(
    handbrake: &Path,
    settings: &HandbrakeConfig,
    params: &EncodeParams,
) -> Command {
    let mut cmd = Command::new(handbrake);

    cmd.arg("-i").arg(&params.input_path);
    cmd.arg("-o").arg(&params.output_path);
    cmd.arg("--encoder").arg(&settings.encoder);
    cmd.arg("--vb").arg(settings.video_bitrate_kbps.to_string());
    cmd.arg("--ab").arg(settings.audio_bitrate_kbps.to_string());
    cmd.arg("--optimize");

    cmd
}

/// Execute HandBrakeCLI to completion
///
/// # Errors
/// Returns an error if:
/// - The process fails to start (IO error)
/// - The process exits with non-zero status
/// - The process is terminated by a signal
pub fn run_handbrake(
    handbrake: &Path,
    settings: &HandbrakeConfig,
    params: &EncodeParams,
) -> Result<(), EncodeError> {
    let mut cmd = build_handbrake_command(handbrake, settings, params);
    cmd.stdin(Stdio::null());

    let status = cmd.status()?;
    check_exit_status(status)
}

/// Encode one file with HandBrakeCLI, honoring dry-run.
///
/// Unlike the ffmpeg path, partial output is left in place on failure.
pub fn encode_with_handbrake(
    handbrake: &Path,
    settings: &HandbrakeConfig,
    params: &EncodeParams,
    dry_run: bool,
) -> ConversionResult {
    let start = Instant::now();
    let name = params.input_path.display();

    info!("Working on video file: {}", name);
    info!("Output file will be: {}", params.output_path.display());

    if dry_run {
        info!(
            "[dry run] would run: {:?}",
            build_handbrake_command(handbrake, settings, params)
        );
        return ConversionResult::success(start.elapsed());
    }

    let outcome = run_handbrake(handbrake, settings, params);
    let elapsed = start.elapsed();

    match outcome {
        Ok(()) => {
            info!("{} took {}", name, format_duration(elapsed));
            ConversionResult::success(elapsed)
        }
        Err(e) => {
            error!(
                "Error occurred trying to convert [{}]: {}; took {}",
                name,
                e,
                format_duration(elapsed)
            );
            ConversionResult::failure(e, elapsed)
        }
    }
}

/// Whole-file conversion through HandBrakeCLI.
#[derive(Debug, Clone)]
pub struct HandbrakeTranscoder {
    handbrake: PathBuf,
    settings: HandbrakeConfig,
}

impl HandbrakeTranscoder {
    pub fn new(handbrake: PathBuf, settings: HandbrakeConfig) -> Self {
        Self {
            handbrake,
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tools.handbrake.clone(), config.handbrake.clone())
    }
}

impl Transcoder for HandbrakeTranscoder {
    fn name(&self) -> &'static str {
        "HandBrakeCLI"
    }

    fn transcode(&self, source: &SourceFile, output_dir: &Path, dry_run: bool) -> ConversionResult {
        let params = EncodeParams::for_source(source, output_dir);
        encode_with_handbrake(&self.handbrake, &self.settings, &params, dry_run)
    }
}
