//! Clip resampling using the rubato FFT-based resampler.
//!
//! Providers do not always honour the requested sample rate, so every decoded clip is brought to the
//! session rate before it is placed on a timeline.

use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

use crate::error::{ConversationError, Result};

/// Chunk size for FFT-based resampling (provides good quality and performance).
const CHUNK_SIZE: usize = 1024;

/// Number of sub-chunks for FFT processing (higher = better quality but more CPU).
const SUB_CHUNKS: usize = 2;

/// Resample a whole mono clip from one sample rate to another.
///
/// The output length is exactly `len * to_rate / from_rate` samples so that clip durations stay
/// predictable. The resampler's output delay is skipped and the input is flushed with silence until the
/// tail of the clip has come out, so the result is time-aligned with the input.
///
/// # Arguments
/// * `samples` - Input audio samples
/// * `from_rate` - Input sample rate (e.g., 22050 from the provider)
/// * `to_rate` - Session sample rate (e.g., 24000)
///
/// # Returns
/// Resampled audio samples at the target rate
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    // No resampling needed if rates match
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let failure = |message: String| ConversationError::Resample { from: from_rate, to: to_rate, message };

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // mono
        FixedSync::Input,
    )
    .map_err(|e| failure(e.to_string()))?;

    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f32; output_frames_max];

    let delay = resampler.output_delay();
    let expected_len = (samples.len() as u64 * u64::from(to_rate) / u64::from(from_rate)) as usize;
    let needed = delay + expected_len;
    let mut output = Vec::with_capacity(needed + output_frames_max);

    let mut input_chunk = vec![0.0f32; CHUNK_SIZE];
    let mut position = 0;
    while output.len() < needed {
        // Past the end of the clip the chunk is all silence, which flushes the resampler
        let remaining = samples.get(position..).unwrap_or_default();
        let take = remaining.len().min(CHUNK_SIZE);
        input_chunk[..take].copy_from_slice(&remaining[..take]);
        input_chunk[take..].fill(0.0);
        position += CHUNK_SIZE;

        let input_adapter = InterleavedSlice::new(&input_chunk, 1, CHUNK_SIZE).map_err(|e| failure(e.to_string()))?;
        let mut output_adapter = InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max).map_err(|e| failure(e.to_string()))?;

        let (_, frames_written) = resampler.process_into_buffer(&input_adapter, &mut output_adapter, None).map_err(|e| failure(e.to_string()))?;
        if frames_written == 0 && take == 0 {
            return Err(failure("resampler produced no output".to_string()));
        }
        output.extend_from_slice(&output_buffer[..frames_written]);
    }

    output.drain(..delay);
    output.truncate(expected_len);
    Ok(output)
}
