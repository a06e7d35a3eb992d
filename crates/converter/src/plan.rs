//! Encoding planner.
//!
//! Decides which streams of a source need re-encoding for web playback,
//! from the codec names reported by the prober.

use crate::probe::CodecPair;

/// Video codec that browsers play without re-encoding.
pub const TARGET_VIDEO_CODEC: &str = "h264";

/// Audio codec that browsers play without re-encoding.
pub const TARGET_AUDIO_CODEC: &str = "aac";

/// Which streams of a source get re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Both streams already match; remux only.
    PassthroughBoth,
    /// Video is copied, audio is re-encoded.
    AudioOnly,
    /// Video is re-encoded, audio is copied.
    VideoOnly,
    /// Both streams are re-encoded.
    Both,
}

impl EncodeMode {
    /// Plan the mode for a probed codec pair.
    pub fn for_codecs(codecs: &CodecPair) -> Self {
        plan_encode(&codecs.video_codec, &codecs.audio_codec)
    }

    pub fn reencodes_video(&self) -> bool {
        matches!(self, EncodeMode::VideoOnly | EncodeMode::Both)
    }

    pub fn reencodes_audio(&self) -> bool {
        matches!(self, EncodeMode::AudioOnly | EncodeMode::Both)
    }
}

impl std::fmt::Display for EncodeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeMode::PassthroughBoth => write!(f, "passthrough"),
            EncodeMode::AudioOnly => write!(f, "audio_only"),
            EncodeMode::VideoOnly => write!(f, "video_only"),
            EncodeMode::Both => write!(f, "both"),
        }
    }
}

/// Chooses the encode mode from the detected video and audio codec names.
///
/// The video codec is only ever compared with [`TARGET_VIDEO_CODEC`] and the
/// audio codec with [`TARGET_AUDIO_CODEC`]. An empty name (stream absent)
/// counts as a mismatch.
pub fn plan_encode(video_codec: &str, audio_codec: &str) -> EncodeMode {
    let needs_video = video_codec != TARGET_VIDEO_CODEC;
    let needs_audio = audio_codec != TARGET_AUDIO_CODEC;

    match (needs_video, needs_audio) {
        (true, true) => EncodeMode::Both,
        (true, false) => EncodeMode::VideoOnly,
        (false, true) => EncodeMode::AudioOnly,
        (false, false) => EncodeMode::PassthroughBoth,
    }
}
