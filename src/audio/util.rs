//! Shared sample conversion helpers.

/// Downmix interleaved f32 samples to mono.
///
/// Handles both mono and multi-channel input:
/// - Mono: Returns a copy of the input
/// - Otherwise: Averages each frame across channels
///
/// # Arguments
/// * `data` - Raw f32 samples (interleaved when `channels > 1`)
/// * `channels` - Number of channels
///
/// # Returns
/// Vector of mono f32 samples
pub fn downmix_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks(channels).map(|frame| frame.iter().sum::<f32>() / channels as f32).collect()
    }
}

/// Convert signed 16-bit little-endian PCM bytes to f32 samples in `[-1.0, 1.0)`.
///
/// A trailing odd byte is ignored.
pub fn pcm_s16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(2).map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0).collect()
}

/// Convert an f32 sample to 16-bit PCM, clamping out-of-range values.
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_to_mono_f32() {
        let data = vec![0.5f32, 1.0, -0.5, -1.0];
        let result = downmix_to_mono(&data, 2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], 0.75); // (0.5 + 1.0) / 2
        assert_eq!(result[1], -0.75); // (-0.5 + -1.0) / 2
    }

    #[test]
    fn test_pcm_s16le_decoding() {
        let bytes = [0x00, 0x40, 0x00, 0xC0, 0x7F];
        let result = pcm_s16le_to_f32(&bytes);
        assert_eq!(result, vec![0.5, -0.5]);
    }

    #[test]
    fn test_f32_to_i16_clamps() {
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-2.0), -i16::MAX);
        assert_eq!(f32_to_i16(0.0), 0);
    }
}
