//! Timeline assembly and mixing.
//!
//! The assembler turns the ordered list of synthesized lines into one equal-length track per speaker; the
//! mixer overlays those tracks into the final conversation.

mod assembler;
mod mixer;

use std::path::PathBuf;

use crate::audio::AudioBuffer;
use crate::error::Result;

pub use assembler::{Assembler, SILENCE_GAP_MS};
pub use mixer::{MixOutput, mix};

/// One synthesized dialogue line, in script order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechLine {
    pub speaker_id: String,
    pub clip: PathBuf,
    pub sequence_index: usize,
}

/// Turns a speech line's clip into samples at the session rate.
pub trait ClipDecoder {
    fn decode(&self, line: &SpeechLine) -> Result<AudioBuffer>;
}

/// Unique speaker ids in first-appearance order.
///
/// The order is fixed when the script is parsed and is the order tracks are built, mixed and named in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerSet {
    ids: Vec<String>,
}

impl SpeakerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a speaker; returns `false` if it was already present.
    pub fn insert(&mut self, speaker_id: &str) -> bool {
        if self.contains(speaker_id) {
            return false;
        }
        self.ids.push(speaker_id.to_string());
        true
    }

    pub fn contains(&self, speaker_id: &str) -> bool {
        self.position(speaker_id).is_some()
    }

    pub fn position(&self, speaker_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == speaker_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SpeakerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id.as_ref());
        }
        set
    }
}

/// A single speaker's full-session track.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerTimeline {
    pub speaker_id: String,
    pub track: AudioBuffer,
    /// Sum of the whole-millisecond lengths of every segment appended to `track`.
    ///
    /// Each clip is measured on its own, so this can differ slightly from `track.duration_ms()`.
    pub duration_ms: u64,
}

impl SpeakerTimeline {
    /// Timeline made of a single segment: `track`.
    pub fn new(speaker_id: &str, track: AudioBuffer) -> Self {
        let duration_ms = track.duration_ms();
        Self { speaker_id: speaker_id.to_string(), track, duration_ms }
    }

    /// Empty timeline at `sample_rate`.
    pub fn empty(speaker_id: &str, sample_rate: u32) -> Self {
        Self::new(speaker_id, AudioBuffer::empty(sample_rate))
    }
}

/// Ordered mapping of speaker id to timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timelines {
    entries: Vec<SpeakerTimeline>,
}

impl Timelines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a timeline, replacing any existing one for the same speaker.
    pub fn insert(&mut self, timeline: SpeakerTimeline) {
        match self.entries.iter_mut().find(|t| t.speaker_id == timeline.speaker_id) {
            Some(existing) => *existing = timeline,
            None => self.entries.push(timeline),
        }
    }

    pub fn get(&self, speaker_id: &str) -> Option<&SpeakerTimeline> {
        self.entries.iter().find(|t| t.speaker_id == speaker_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeakerTimeline> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Common duration of every track; `None` if empty or the tracks disagree.
    pub fn session_duration_ms(&self) -> Option<u64> {
        let first = self.entries.first()?.duration_ms;
        self.entries.iter().all(|t| t.duration_ms == first).then_some(first)
    }
}

impl FromIterator<SpeakerTimeline> for Timelines {
    fn from_iter<I: IntoIterator<Item = SpeakerTimeline>>(iter: I) -> Self {
        let mut timelines = Self::new();
        for timeline in iter {
            timelines.insert(timeline);
        }
        timelines
    }
}
