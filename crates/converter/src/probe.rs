//! Codec inspector.
//!
//! Runs ffprobe once per stream kind and reports the codec name of the first
//! video and first audio stream of a media file.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Error type for probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The prober could not be started.
    #[error("failed to start prober: {0}")]
    Spawn(#[from] std::io::Error),

    /// The prober exited unsuccessfully.
    #[error("prober exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Stream kind selected for one probe invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// ffprobe stream specifier for the first stream of this kind.
    pub fn selector(&self) -> &'static str {
        match self {
            StreamKind::Video => "v:0",
            StreamKind::Audio => "a:0",
        }
    }
}

/// Codec names detected for one source file.
///
/// A name is empty when the file has no stream of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodecPair {
    pub audio_codec: String,
    pub video_codec: String,
}

/// Builds the ffprobe invocation that prints only the codec name of the
/// selected stream, without section wrappers or keys.
pub fn build_probe_command(prober: &Path, kind: StreamKind, media: &Path) -> Command {
    let mut cmd = Command::new(prober);
    cmd.args(["-v", "error"]);
    cmd.arg("-select_streams").arg(kind.selector());
    cmd.args(["-show_entries", "stream=codec_name"]);
    cmd.args(["-of", "default=nokey=1:noprint_wrappers=1"]);
    cmd.arg(media);
    cmd
}

/// Extracts the codec name from bare ffprobe output.
pub fn parse_codec_name(stdout: &str) -> String {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Probes one stream kind of a media file.
pub fn probe_stream(prober: &Path, kind: StreamKind, media: &Path) -> Result<String, ProbeError> {
    let output = build_probe_command(prober, kind, media).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::Failed {
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(parse_codec_name(&String::from_utf8_lossy(&output.stdout)))
}

/// Probes the first video and the first audio stream of a media file.
pub fn probe_codecs(prober: &Path, media: &Path) -> Result<CodecPair, ProbeError> {
    let video_codec = probe_stream(prober, StreamKind::Video, media)?;
    let audio_codec = probe_stream(prober, StreamKind::Audio, media)?;

    Ok(CodecPair {
        audio_codec,
        video_codec,
    })
}
