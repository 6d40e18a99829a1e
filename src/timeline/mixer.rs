//! Overlay of per-speaker timelines.

use tracing::debug;

use super::{SpeakerSet, SpeakerTimeline, Timelines};
use crate::audio::AudioBuffer;
use crate::error::{ConversationError, Result};

/// Result of mixing a set of timelines.
#[derive(Debug, Clone, PartialEq)]
pub struct MixOutput {
    /// Overlay of every track.
    pub merged: AudioBuffer,
    /// Each speaker's own track, in speaker order, when separate export was requested.
    pub separate: Option<Vec<SpeakerTimeline>>,
}

/// Overlay every timeline into a single buffer.
///
/// All tracks are summed sample by sample in one pass. Tracks are accumulated in speaker-id order with
/// f64 precision, so the result does not depend on the order of `timelines`. The sum is clamped to
/// `[-1.0, 1.0]` afterwards.
///
/// # Arguments
/// * `timelines` - Assembled speaker timelines
/// * `speakers` - Every speaker of the session; each must have exactly one timeline
/// * `emit_separate` - Also return each speaker's track unchanged, in `speakers` order
///
/// # Errors
/// Fails before mixing if there are no timelines, a speaker has no timeline, a timeline belongs to no
/// speaker, or any track differs from the first in length or sample rate.
pub fn mix(timelines: &Timelines, speakers: &SpeakerSet, emit_separate: bool) -> Result<MixOutput> {
    let first = timelines.iter().next().ok_or(ConversationError::NoTimelines)?;
    let expected_len = first.track.len();
    let sample_rate = first.track.sample_rate();

    if let Some(missing) = speakers.iter().find(|id| timelines.get(id).is_none()) {
        return Err(ConversationError::MissingTrack { speaker_id: missing.to_string() });
    }
    if let Some(extra) = timelines.iter().find(|t| !speakers.contains(&t.speaker_id)) {
        return Err(ConversationError::UnexpectedTrack { speaker_id: extra.speaker_id.clone() });
    }

    for timeline in timelines.iter() {
        if timeline.track.len() != expected_len || timeline.track.sample_rate() != sample_rate {
            return Err(ConversationError::TrackMismatch {
                speaker_id: timeline.speaker_id.clone(),
                expected: expected_len,
                actual: timeline.track.len(),
                expected_rate: sample_rate,
                actual_rate: timeline.track.sample_rate(),
            });
        }
    }

    let mut ordered: Vec<&SpeakerTimeline> = timelines.iter().collect();
    ordered.sort_by(|a, b| a.speaker_id.cmp(&b.speaker_id));

    let mut sum = vec![0.0f64; expected_len];
    for timeline in ordered {
        debug!("Overlaying track for {}", timeline.speaker_id);
        for (acc, &sample) in sum.iter_mut().zip(timeline.track.samples()) {
            *acc += f64::from(sample);
        }
    }

    let merged = AudioBuffer::new(sum.into_iter().map(|s| s.clamp(-1.0, 1.0) as f32).collect(), sample_rate);
    let separate = emit_separate.then(|| speakers.iter().filter_map(|id| timelines.get(id)).cloned().collect());

    Ok(MixOutput { merged, separate })
}
