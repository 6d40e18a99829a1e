//! Error types for conversation rendering.
//!
//! Every error is terminal for a run. `ErrorKind` gives callers a closed set of categories to match on
//! without inspecting messages.

use std::path::PathBuf;

use thiserror::Error;

/// Category of a [`ConversationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Script,
    Synthesis,
    Io,
    Decode,
    Assembly,
    Mix,
}

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("No input script given (use --input <FILE>)")]
    MissingInput,

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    // Script errors
    #[error("Script is empty")]
    EmptyScript,

    // Synthesis errors
    #[error("Speech synthesis failed for line {index} ({voice_id}): {message}")]
    Synthesis { index: usize, voice_id: String, message: String },

    #[error("Speech provider returned no audio for line {index} ({voice_id})")]
    NoAudio { index: usize, voice_id: String },

    // I/O errors
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    // Audio errors
    #[error("Failed to decode clip {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Failed to resample audio from {from} Hz to {to} Hz: {message}")]
    Resample { from: u32, to: u32, message: String },

    // Assembly errors
    #[error("Script has an odd number of lines ({count}); every speaker line needs a dialogue line")]
    OddLineCount { count: usize },

    #[error("No speech lines to assemble")]
    NoSpeechLines,

    #[error("Line {index} references speaker '{speaker_id}' which is not in the speaker set")]
    UnknownSpeaker { index: usize, speaker_id: String },

    #[error("Speech line {index} is out of order (previous index {previous})")]
    OutOfOrder { index: usize, previous: usize },

    #[error("Clip for line {index} has sample rate {actual} Hz, session rate is {expected} Hz")]
    SampleRateMismatch { index: usize, expected: u32, actual: u32 },

    #[error("Rendering task failed: {message}")]
    RenderTask { message: String },

    // Mix errors
    #[error("No timelines to mix")]
    NoTimelines,

    #[error("No track for speaker '{speaker_id}'")]
    MissingTrack { speaker_id: String },

    #[error("Track for '{speaker_id}' does not belong to any speaker")]
    UnexpectedTrack { speaker_id: String },

    #[error("Track for '{speaker_id}' is {actual} samples at {actual_rate} Hz, session is {expected} samples at {expected_rate} Hz")]
    TrackMismatch { speaker_id: String, expected: usize, actual: usize, expected_rate: u32, actual_rate: u32 },
}

impl ConversationError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInput | Self::InvalidConfig { .. } => ErrorKind::Usage,
            Self::EmptyScript => ErrorKind::Script,
            Self::Synthesis { .. } | Self::NoAudio { .. } => ErrorKind::Synthesis,
            Self::Io { .. } | Self::Encode { .. } => ErrorKind::Io,
            Self::Decode { .. } | Self::Resample { .. } => ErrorKind::Decode,
            Self::OddLineCount { .. }
            | Self::NoSpeechLines
            | Self::UnknownSpeaker { .. }
            | Self::OutOfOrder { .. }
            | Self::SampleRateMismatch { .. }
            | Self::RenderTask { .. } => ErrorKind::Assembly,
            Self::NoTimelines | Self::MissingTrack { .. } | Self::UnexpectedTrack { .. } | Self::TrackMismatch { .. } => ErrorKind::Mix,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversationError>;
