//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Locations of the external executables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// Transcoder used by the codec-aware pipeline
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    /// Prober used to detect stream codecs
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
    /// Whole-file transcoder used in HandBrake mode
    #[serde(default = "default_handbrake")]
    pub handbrake: PathBuf,
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_handbrake() -> PathBuf {
    PathBuf::from("HandBrakeCLI")
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            handbrake: default_handbrake(),
        }
    }
}

/// HandBrake encode settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandbrakeConfig {
    /// Video encoder name passed to `--encoder` (default x264)
    #[serde(default = "default_handbrake_encoder")]
    pub encoder: String,
    /// Average video bitrate in kbps (default 900)
    #[serde(default = "default_video_bitrate_kbps")]
    pub video_bitrate_kbps: u32,
    /// Audio bitrate in kbps (default 128)
    #[serde(default = "default_audio_bitrate_kbps")]
    pub audio_bitrate_kbps: u32,
}

fn default_handbrake_encoder() -> String {
    "x264".to_string()
}

fn default_video_bitrate_kbps() -> u32 {
    900
}

fn default_audio_bitrate_kbps() -> u32 {
    128
}

impl Default for HandbrakeConfig {
    fn default() -> Self {
        Self {
            encoder: default_handbrake_encoder(),
            video_bitrate_kbps: default_video_bitrate_kbps(),
            audio_bitrate_kbps: default_audio_bitrate_kbps(),
        }
    }
}

/// Candidate discovery settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Allowed source extensions, with leading dot (default [".mkv"])
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec![".mkv".to_string()]
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Log sink settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Append-only log file (default autoconverter.log in the working directory)
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("autoconverter.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub handbrake: HandbrakeConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Parses the file and handles missing optional fields with defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - AUTOCONVERT_FFMPEG -> tools.ffmpeg
    /// - AUTOCONVERT_FFPROBE -> tools.ffprobe
    /// - AUTOCONVERT_HANDBRAKE -> tools.handbrake
    /// - AUTOCONVERT_HANDBRAKE_VIDEO_BITRATE -> handbrake.video_bitrate_kbps
    /// - AUTOCONVERT_HANDBRAKE_AUDIO_BITRATE -> handbrake.audio_bitrate_kbps
    /// - AUTOCONVERT_LOG_FILE -> logging.file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("AUTOCONVERT_FFMPEG") {
            if !val.is_empty() {
                self.tools.ffmpeg = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("AUTOCONVERT_FFPROBE") {
            if !val.is_empty() {
                self.tools.ffprobe = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("AUTOCONVERT_HANDBRAKE") {
            if !val.is_empty() {
                self.tools.handbrake = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("AUTOCONVERT_HANDBRAKE_VIDEO_BITRATE") {
            if let Ok(kbps) = val.parse::<u32>() {
                self.handbrake.video_bitrate_kbps = kbps;
            }
        }

        if let Ok(val) = env::var("AUTOCONVERT_HANDBRAKE_AUDIO_BITRATE") {
            if let Ok(kbps) = val.parse::<u32>() {
                self.handbrake.audio_bitrate_kbps = kbps;
            }
        }

        if let Ok(val) = env::var("AUTOCONVERT_LOG_FILE") {
            if !val.is_empty() {
                self.logging.file = PathBuf::from(val);
            }
        }
    }

    /// Load configuration from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }
}
