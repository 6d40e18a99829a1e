//! Per-speaker timeline assembly.

use tracing::{debug, info};

use super::{ClipDecoder, SpeakerSet, SpeakerTimeline, SpeechLine, Timelines};
use crate::audio::ms_to_samples;
use crate::error::{ConversationError, Result};

/// Pause appended to every track after every line.
pub const SILENCE_GAP_MS: u64 = 450;

/// Builds time-aligned speaker tracks from an ordered list of speech lines.
///
/// Each line adds its clip length plus the gap to every track: the speaker gets the clip, everyone else
/// gets silence of the same length. All tracks therefore end up the same length.
pub struct Assembler {
    sample_rate: u32, // Session sample rate
    gap_ms: u64,      // Pause after each line
}

impl Assembler {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, gap_ms: SILENCE_GAP_MS }
    }

    pub fn with_gap_ms(mut self, gap_ms: u64) -> Self {
        self.gap_ms = gap_ms;
        self
    }

    /// Assemble one timeline per speaker.
    ///
    /// # Arguments
    /// * `lines` - Speech lines in script order
    /// * `speakers` - Every speaker to build a track for (may include speakers with no lines)
    /// * `decoder` - Loads each line's clip
    ///
    /// # Errors
    /// Fails without returning any timeline if the input is empty, out of order, references an unknown
    /// speaker, or any clip fails to decode or has the wrong sample rate.
    pub fn assemble<D: ClipDecoder + ?Sized>(&self, lines: &[SpeechLine], speakers: &SpeakerSet, decoder: &D) -> Result<Timelines> {
        self.validate(lines, speakers)?;

        let gap = ms_to_samples(self.gap_ms, self.sample_rate);
        let mut tracks: Vec<SpeakerTimeline> = speakers.iter().map(|id| SpeakerTimeline::empty(id, self.sample_rate)).collect();
        let mut total_ms = 0;

        for line in lines {
            info!("Running total audio duration: {}ms", total_ms);
            info!("Current speaker: {}", line.speaker_id);

            let clip = decoder.decode(line)?;
            if clip.sample_rate() != self.sample_rate {
                return Err(ConversationError::SampleRateMismatch { index: line.sequence_index, expected: self.sample_rate, actual: clip.sample_rate() });
            }
            let segment_ms = clip.duration_ms();

            for timeline in tracks.iter_mut() {
                if timeline.speaker_id == line.speaker_id {
                    debug!("{}: appending clip from {}", timeline.speaker_id, line.clip.display());
                    timeline.track.append(&clip);
                } else {
                    debug!("{}: appending {}ms of silence", timeline.speaker_id, segment_ms);
                    timeline.track.append_silence(clip.len());
                }
                timeline.track.append_silence(gap);
                timeline.duration_ms += segment_ms + self.gap_ms;
            }

            total_ms += segment_ms;
        }

        let timelines: Timelines = tracks.into_iter().collect();

        if let Some(session_ms) = timelines.session_duration_ms() {
            info!("Assembled {} timeline(s) of {}ms", timelines.len(), session_ms);
        }

        Ok(timelines)
    }

    fn validate(&self, lines: &[SpeechLine], speakers: &SpeakerSet) -> Result<()> {
        if lines.is_empty() {
            return Err(ConversationError::NoSpeechLines);
        }

        let mut previous: Option<usize> = None;
        for line in lines {
            if !speakers.contains(&line.speaker_id) {
                return Err(ConversationError::UnknownSpeaker { index: line.sequence_index, speaker_id: line.speaker_id.clone() });
            }
            if let Some(previous) = previous
                && line.sequence_index <= previous
            {
                return Err(ConversationError::OutOfOrder { index: line.sequence_index, previous });
            }
            previous = Some(line.sequence_index);
        }

        Ok(())
    }
}
