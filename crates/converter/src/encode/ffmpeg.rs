//! ffmpeg encoder module for autoconvert
//!
//! Builds and runs the ffmpeg invocation for each [`EncodeMode`], and wires
//! probe, plan and encode together as the default [`Transcoder`].

use super::{
    check_exit_status, ConversionResult, EncodeError, EncodeParams, PartialOutputGuard, Transcoder,
};
use crate::config::Config;
use crate::elapsed::format_duration;
use crate::plan::EncodeMode;
use crate::probe::{build_probe_command, probe_codecs, StreamKind};
use crate::scan::SourceFile;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Lines of encoder stderr kept in the log when an encode fails.
const STDERR_TAIL_LINES: usize = 10;

/// Codec arguments for one encode mode.
pub fn codec_args(mode: EncodeMode) -> &'static [&'static str] {
    match mode {
        EncodeMode::PassthroughBoth => &["-c:v", "copy", "-c:a", "copy"],
        EncodeMode::AudioOnly => &["-c:v", "copy", "-c:a", "aac"],
        EncodeMode::VideoOnly => &["-c:v", "libx264", "-c:a", "copy"],
        EncodeMode::Both => &["-c:v", "libx264", "-level:v", "4.0", "-c:a", "aac"],
    }
}

/// Build the ffmpeg command for an encode mode
///
/// Creates a Command configured with:
/// - No-overwrite and regenerated presentation timestamps
/// - The first video stream and any English audio stream
/// - Per-mode codec arguments from [`codec_args`]
/// - MP4 output with the index moved to the front (fast start)
pub fn build_ffmpeg_command(ffmpeg: &Path, mode: EncodeMode, params: &EncodeParams) -> Command {
    let mut cmd = Command::new(ffmpeg);

    cmd.arg("-n");
    cmd.args(["-fflags", "+genpts"]);
    cmd.arg("-i").arg(&params.input_path);
    cmd.args(["-threads", "0"]);

    // Trailing '?' keeps sources without an English track convertible
    cmd.args(["-map", "0:v:0"]);
    cmd.args(["-map", "0:a:m:language:eng?"]);

    cmd.args(codec_args(mode));

    cmd.args(["-movflags", "+faststart"]);
    cmd.args(["-f", "mp4"]);
    cmd.arg(&params.output_path);

    cmd
}

/// Run ffmpeg to completion.
///
/// Standard output is treated as opaque diagnostics and logged at debug
/// level; the tail of standard error is logged when the encode fails.
pub fn run_ffmpeg(
    ffmpeg: &Path,
    mode: EncodeMode,
    params: &EncodeParams,
) -> Result<(), EncodeError> {
    let mut cmd = build_ffmpeg_command(ffmpeg, mode, params);
    cmd.stdin(Stdio::null());

    let output = cmd.output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        debug!("ffmpeg output:\n{}", stdout.trim_end());
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
        if !tail.is_empty() {
            warn!("ffmpeg stderr (last {} lines):\n{}", tail.len(), tail.join("\n"));
        }
    }

    check_exit_status(output.status)
}

/// Encode one file with ffmpeg, honoring dry-run.
///
/// On failure any output file created by this invocation is removed.
pub fn encode_with_ffmpeg(
    ffmpeg: &Path,
    mode: EncodeMode,
    params: &EncodeParams,
    dry_run: bool,
) -> ConversionResult {
    let start = Instant::now();
    let name = params.input_path.display();

    if dry_run {
        info!(
            "[dry run] would convert {} ({}) with: {:?}",
            name,
            mode,
            build_ffmpeg_command(ffmpeg, mode, params)
        );
        return ConversionResult::success(start.elapsed());
    }

    info!("Beginning {} conversion ({})...", name, mode);

    let mut guard = PartialOutputGuard::arm(&params.output_path);
    let outcome = run_ffmpeg(ffmpeg, mode, params);
    let elapsed = start.elapsed();

    match outcome {
        Ok(()) => {
            guard.disarm();
            info!(
                "ffmpeg completed conversion of {} in {}",
                name,
                format_duration(elapsed)
            );
            ConversionResult::success(elapsed)
        }
        Err(e) => {
            error!(
                "ffmpeg failed to convert {} after {}: {}",
                name,
                format_duration(elapsed),
                e
            );
            ConversionResult::failure(e, elapsed)
        }
    }
}

/// Codec-aware conversion: probe, plan, then encode with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegPipeline {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
}

impl FfmpegPipeline {
    pub fn new(ffprobe: PathBuf, ffmpeg: PathBuf) -> Self {
        Self { ffprobe, ffmpeg }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tools.ffprobe.clone(), config.tools.ffmpeg.clone())
    }
}

impl Transcoder for FfmpegPipeline {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn transcode(&self, source: &SourceFile, output_dir: &Path, dry_run: bool) -> ConversionResult {
        let start = Instant::now();
        let params = EncodeParams::for_source(source, output_dir);

        if dry_run {
            for kind in [StreamKind::Video, StreamKind::Audio] {
                info!(
                    "[dry run] would probe {} with: {:?}",
                    source.file_name(),
                    build_probe_command(&self.ffprobe, kind, source.path())
                );
            }
            info!(
                "[dry run] would convert {} with {} (mode decided from the probed codecs)",
                source.file_name(),
                self.ffmpeg.display()
            );
            return ConversionResult::success(start.elapsed());
        }

        let codecs = match probe_codecs(&self.ffprobe, source.path()) {
            Ok(codecs) => codecs,
            Err(e) => {
                error!("Could not probe {}: {}", source.file_name(), e);
                return ConversionResult::failure(e, start.elapsed());
            }
        };

        info!(
            "{}: A - [{}] V: [{}]",
            source.file_name(),
            codecs.audio_codec,
            codecs.video_codec
        );

        let mode = EncodeMode::for_codecs(&codecs);
        let mut result = encode_with_ffmpeg(&self.ffmpeg, mode, &params, false);
        result.elapsed = start.elapsed();
        result
    }
}
