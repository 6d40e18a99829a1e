//! In-memory mono PCM buffer used for clips, timelines and the mixed output.

/// Convert a duration in milliseconds to a sample count at `sample_rate`.
///
/// Saturates at `usize::MAX` instead of overflowing.
pub fn ms_to_samples(ms: u64, sample_rate: u32) -> usize {
    let samples = u128::from(ms) * u128::from(sample_rate) / 1000;
    usize::try_from(samples).unwrap_or(usize::MAX)
}

/// Mono f32 samples at a fixed sample rate.
///
/// Lengths are tracked in samples so that appending a clip and appending silence of the "same duration"
/// always add exactly the same amount to a track.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Zero-length buffer.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    /// Buffer of `len` samples of digital silence.
    pub fn silent(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in whole milliseconds (truncated).
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(self.sample_rate)
    }

    /// Append another buffer's samples. Callers guarantee matching sample rates.
    pub fn append(&mut self, other: &AudioBuffer) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Append `len` samples of silence.
    pub fn append_silence(&mut self, len: usize) {
        self.samples.resize(self.samples.len() + len, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(450, 24000), 10800);
        assert_eq!(ms_to_samples(1000, 16000), 16000);
        assert_eq!(ms_to_samples(0, 48000), 0);
    }

    #[test]
    fn test_ms_to_samples_does_not_overflow() {
        assert_eq!(ms_to_samples(u64::MAX, 48000), usize::MAX);
    }

    #[test]
    fn test_append_and_duration() {
        let mut track = AudioBuffer::empty(1000);
        track.append(&AudioBuffer::new(vec![0.5; 250], 1000));
        track.append_silence(750);
        assert_eq!(track.len(), 1000);
        assert_eq!(track.duration_ms(), 1000);
        assert_eq!(track.samples()[249], 0.5);
        assert_eq!(track.samples()[250], 0.0);
    }
}
