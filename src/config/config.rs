//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::error::{ConversationError, Result};
use crate::timeline::SILENCE_GAP_MS;

/// Longest accepted pause between lines.
pub const MAX_GAP_MS: u64 = 60_000;

/// Audio format requested from the speech provider for each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipFormat {
    /// MPEG layer III (default)
    #[default]
    Mp3,
    /// Ogg container with Vorbis audio
    OggVorbis,
    /// Raw signed 16-bit little-endian mono PCM at the session sample rate
    Pcm,
}

impl std::fmt::Display for ClipFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_provider_format())
    }
}

impl ClipFormat {
    /// Format name sent in synthesis requests.
    pub fn as_provider_format(&self) -> &'static str {
        match self {
            ClipFormat::Mp3 => "mp3",
            ClipFormat::OggVorbis => "ogg_vorbis",
            ClipFormat::Pcm => "pcm",
        }
    }

    /// File extension for intermediate clip files.
    pub fn extension(&self) -> &'static str {
        match self {
            ClipFormat::Mp3 => "mp3",
            ClipFormat::OggVorbis => "ogg",
            ClipFormat::Pcm => "pcm",
        }
    }
}

/// Container for the rendered tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum TrackFormat {
    /// MPEG layer III via LAME (default)
    #[default]
    Mp3,
    /// 16-bit PCM WAV
    Wav,
}

impl std::fmt::Display for TrackFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl TrackFormat {
    /// File extension of the rendered tracks.
    pub fn extension(&self) -> &'static str {
        match self {
            TrackFormat::Mp3 => "mp3",
            TrackFormat::Wav => "wav",
        }
    }
}

/// Conversation renderer configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "conversation-tts")]
#[command(author, version, about = "Render a speaker/dialogue script into a multi-speaker conversation", long_about = None)]
pub struct AppConfig {
    /// Script file: alternating speaker name and dialogue lines
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Directory for the rendered audio files
    #[arg(long, short = 'o', default_value = "./output")]
    pub output_dir: PathBuf,

    /// Also write a separate audio file for every speaker
    #[arg(long, short = 's')]
    pub separate: bool,

    /// Container for the merged and per-speaker tracks
    #[arg(long, value_enum, default_value = "mp3")]
    pub track_format: TrackFormat,

    /// Speech synthesis endpoint (HTTP POST, JSON request, audio response)
    #[arg(long, env = "TTS_URL", default_value = "http://localhost:8080/v1/speech")]
    pub tts_url: String,

    /// Bearer token for the speech synthesis endpoint
    #[arg(long, env = "TTS_API_KEY", hide_env_values = true)]
    pub tts_api_key: Option<String>,

    /// Audio format requested from the provider
    #[arg(long, value_enum, default_value = "mp3")]
    pub output_format: ClipFormat,

    /// Session sample rate in Hz; clips at other rates are resampled
    #[arg(long, default_value = "24000")]
    pub sample_rate: u32,

    /// Silence after every line, in milliseconds
    #[arg(long, default_value_t = SILENCE_GAP_MS)]
    pub gap_ms: u64,

    /// Concurrent synthesis requests (0 = auto-detect based on CPU cores)
    #[arg(long, default_value = "0")]
    pub concurrency: usize,

    /// Retries for a line after a transient provider failure
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    /// Timeout for a single synthesis request, in seconds
    #[arg(long, default_value = "30")]
    pub request_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let mut config = Self::parse();
        config.normalize_concurrency();
        config
    }

    /// Resolve `--concurrency 0` to a CPU-based default.
    ///
    /// Requests are I/O bound, but providers rate-limit aggressively, so the auto value is capped.
    pub fn normalize_concurrency(&mut self) {
        if self.concurrency == 0 {
            self.concurrency = num_cpus::get().clamp(1, 8);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.input.is_none() {
            return Err(ConversationError::MissingInput);
        }

        if self.sample_rate == 0 {
            return Err(ConversationError::InvalidConfig { key: "sample-rate", message: "must be positive".to_string() });
        }

        if self.gap_ms > MAX_GAP_MS {
            return Err(ConversationError::InvalidConfig { key: "gap-ms", message: format!("{}ms exceeds the {}ms limit", self.gap_ms, MAX_GAP_MS) });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConversationError::InvalidConfig { key: "request-timeout-secs", message: "must be positive".to_string() });
        }

        if !(self.tts_url.starts_with("http://") || self.tts_url.starts_with("https://")) {
            return Err(ConversationError::InvalidConfig { key: "tts-url", message: format!("'{}' is not an http(s) URL", self.tts_url) });
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        if let Some(ref input) = self.input {
            info!("  Input script: {}", input.display());
        }
        info!("  Output directory: {}", self.output_dir.display());
        info!("  Separate speaker files: {}", self.separate);
        info!("  Track format: {}", self.track_format);
        info!("  TTS endpoint: {}", self.tts_url);
        info!("  TTS API key: {}", if self.tts_api_key.is_some() { "set" } else { "not set" });
        info!("  Clip format: {}", self.output_format);
        info!("  Sample rate: {} Hz", self.sample_rate);
        info!("  Gap between lines: {}ms", self.gap_ms);
        info!("  Concurrency: {}", self.concurrency);
        info!("  Max retries: {}", self.max_retries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        let mut config = AppConfig::parse_from(std::iter::once("conversation-tts").chain(args.iter().copied()));
        config.normalize_concurrency();
        config
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["-i", "script.txt"]);
        assert_eq!(config.input, Some(PathBuf::from("script.txt")));
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert!(!config.separate);
        assert_eq!(config.output_format, ClipFormat::Mp3);
        assert_eq!(config.track_format, TrackFormat::Mp3);
        assert_eq!(config.gap_ms, 450);
        assert!(config.concurrency >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_flags() {
        let config = parse(&["-i", "dialog.txt", "-o", "/tmp/out", "-s", "--output-format", "ogg-vorbis", "--concurrency", "2"]);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert!(config.separate);
        assert_eq!(config.output_format, ClipFormat::OggVorbis);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_track_format_flag() {
        let config = parse(&["-i", "dialog.txt", "--track-format", "wav"]);
        assert_eq!(config.track_format, TrackFormat::Wav);
        assert_eq!(config.track_format.extension(), "wav");
    }

    #[test]
    fn test_missing_input_is_usage_error() {
        let config = parse(&[]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConversationError::MissingInput));
        assert_eq!(err.kind(), crate::error::ErrorKind::Usage);
    }

    #[test]
    fn test_oversized_gap_rejected() {
        let config = parse(&["-i", "s.txt", "--gap-ms", "18446744073709551615"]);
        assert!(matches!(config.validate(), Err(ConversationError::InvalidConfig { key: "gap-ms", .. })));
        assert!(parse(&["-i", "s.txt", "--gap-ms", "60000"]).validate().is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config = parse(&["-i", "s.txt", "--tts-url", "ftp://example.com"]);
        assert!(matches!(config.validate(), Err(ConversationError::InvalidConfig { key: "tts-url", .. })));
    }

    #[test]
    fn test_clip_format_names() {
        assert_eq!(ClipFormat::OggVorbis.as_provider_format(), "ogg_vorbis");
        assert_eq!(ClipFormat::OggVorbis.extension(), "ogg");
        assert_eq!(serde_json::to_string(&ClipFormat::Pcm).unwrap(), "\"pcm\"");
    }
}
