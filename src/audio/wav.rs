//! WAV encoding for timelines and the mixed output.

use std::io::{Seek, Write};
use std::path::Path;

use super::buffer::AudioBuffer;
use super::util::f32_to_i16;
use crate::error::{ConversationError, Result};

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec { channels: 1, sample_rate, bits_per_sample: 16, sample_format: hound::SampleFormat::Int }
}

fn write_samples<W: Write + Seek>(writer: W, buffer: &AudioBuffer) -> std::result::Result<(), hound::Error> {
    let mut writer = hound::WavWriter::new(writer, wav_spec(buffer.sample_rate()))?;
    for &sample in buffer.samples() {
        writer.write_sample(f32_to_i16(sample))?;
    }
    writer.finalize()
}

/// Write a buffer to `path` as 16-bit mono PCM WAV.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| ConversationError::io(path, e))?;
    write_samples(std::io::BufWriter::new(file), buffer).map_err(|e| match e {
        hound::Error::IoError(source) => ConversationError::io(path, source),
        other => ConversationError::Encode { path: path.to_path_buf(), message: other.to_string() },
    })
}

/// Encode a buffer to WAV bytes in memory.
#[cfg(test)]
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    write_samples(&mut cursor, buffer).map_err(|e| ConversationError::Encode { path: "<memory>".into(), message: e.to_string() })?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_roundtrip_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.wav");
        let buffer = AudioBuffer::new(vec![0.0, 0.5, -0.5, 1.5], 24000);

        write_wav(&path, &buffer).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 24000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, -16383, i16::MAX]);
    }

    #[test]
    fn test_write_wav_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("track.wav");
        let err = write_wav(&path, &AudioBuffer::silent(10, 8000)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
