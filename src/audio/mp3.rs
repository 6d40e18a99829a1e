//! MP3 encoding for timelines and the mixed output, using LAME.

use std::path::Path;

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

use super::buffer::AudioBuffer;
use super::util::f32_to_i16;
use crate::error::{ConversationError, Result};

/// Constant bitrate for speech tracks. High enough that LAME keeps the input sample rate.
const BITRATE: Bitrate = Bitrate::Kbps128;

/// Encode a mono buffer to MP3 bytes.
pub fn encode_mp3(buffer: &AudioBuffer) -> std::result::Result<Vec<u8>, String> {
    let mut builder = Builder::new().ok_or_else(|| "failed to initialise LAME".to_string())?;
    builder.set_num_channels(1).map_err(|e| format!("channels: {}", e))?;
    builder.set_sample_rate(buffer.sample_rate()).map_err(|e| format!("sample rate {}: {}", buffer.sample_rate(), e))?;
    builder.set_brate(BITRATE).map_err(|e| format!("bitrate: {}", e))?;
    builder.set_quality(Quality::Good).map_err(|e| format!("quality: {}", e))?;
    let mut encoder = builder.build().map_err(|e| format!("failed to build LAME encoder: {}", e))?;

    let pcm: Vec<i16> = buffer.samples().iter().map(|&s| f32_to_i16(s)).collect();
    let mut encoded = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(pcm.len()));
    encoder.encode_to_vec(MonoPcm(pcm.as_slice()), &mut encoded).map_err(|e| e.to_string())?;
    encoder.flush_to_vec::<FlushNoGap>(&mut encoded).map_err(|e| e.to_string())?;

    Ok(encoded)
}

/// Write a buffer to `path` as mono MP3.
pub fn write_mp3(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let encoded = encode_mp3(buffer).map_err(|message| ConversationError::Encode { path: path.to_path_buf(), message })?;
    std::fs::write(path, encoded).map_err(|e| ConversationError::io(path, e))
}
