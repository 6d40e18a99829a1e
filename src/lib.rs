//! conversation-tts - render a speaker/dialogue script into a multi-speaker conversation.
//!
//! Each dialogue line is synthesized by a speech provider, the clips are laid out on one time-aligned
//! track per speaker, and the tracks are overlaid into a single file.

pub mod audio;
pub mod clips;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod script;
pub mod timeline;
pub mod tts;

pub use config::{AppConfig, ClipFormat, TrackFormat};
pub use error::{ConversationError, ErrorKind, Result};
pub use pipeline::{RunSummary, run};
pub use timeline::{Assembler, MixOutput, SILENCE_GAP_MS, SpeakerSet, SpeakerTimeline, SpeechLine, Timelines, mix};
pub use tts::{HttpSpeechProvider, SpeechProvider};
