//! Clip decoding with symphonia.
//!
//! Provider clips arrive as encoded bytes (MP3 or Ogg Vorbis) or as raw 16-bit PCM. They are decoded to
//! mono f32 and brought to the session sample rate.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::buffer::AudioBuffer;
use super::resampler::resample;
use super::util::{downmix_to_mono, pcm_s16le_to_f32};
use crate::config::ClipFormat;
use crate::error::{ConversationError, Result};
use crate::timeline::{ClipDecoder, SpeechLine};

/// Decode an encoded audio container to mono samples.
///
/// # Arguments
/// * `bytes` - Encoded audio (any container symphonia can probe)
/// * `extension` - File extension used as a probe hint
///
/// # Returns
/// Mono samples and their sample rate.
pub fn decode_container(bytes: Vec<u8>, extension: &str) -> std::result::Result<(Vec<f32>, u32), String> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(extension);

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| format!("unrecognised audio data: {}", e))?;
    let mut format = probed.format;

    // Find the first audio track with a known (decodeable) codec.
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| "no supported audio track".to_string())?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| format!("unsupported codec: {}", e))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.to_string()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                interleaved.copy_interleaved_ref(decoded);
                samples.extend(downmix_to_mono(interleaved.samples(), spec.channels.count()));
            }
            // A corrupt frame is skipped, matching how players treat it
            Err(SymphoniaError::DecodeError(e)) => warn!("Skipping undecodable frame: {}", e),
            Err(e) => return Err(e.to_string()),
        }
    }

    if sample_rate == 0 {
        return Err("audio stream has no sample rate".to_string());
    }

    Ok((samples, sample_rate))
}

/// Decodes clip files written by the clip store.
pub struct FileClipDecoder {
    format: ClipFormat,
    sample_rate: u32,
}

impl FileClipDecoder {
    /// # Arguments
    /// * `format` - Format the provider was asked for
    /// * `sample_rate` - Session sample rate; raw PCM clips are assumed to be at this rate
    pub fn new(format: ClipFormat, sample_rate: u32) -> Self {
        Self { format, sample_rate }
    }

    fn decode_file(&self, path: &Path) -> Result<AudioBuffer> {
        let decode_error = |message: String| ConversationError::Decode { path: PathBuf::from(path), message };

        let bytes = std::fs::read(path).map_err(|e| ConversationError::io(path, e))?;
        if bytes.is_empty() {
            return Err(decode_error("clip file is empty".to_string()));
        }

        let (samples, source_rate) = match self.format {
            ClipFormat::Pcm => (pcm_s16le_to_f32(&bytes), self.sample_rate),
            ClipFormat::Mp3 | ClipFormat::OggVorbis => decode_container(bytes, self.format.extension()).map_err(decode_error)?,
        };

        if samples.is_empty() {
            return Err(decode_error("clip contains no audio".to_string()));
        }

        let samples = if source_rate != self.sample_rate {
            debug!("Resampling {} from {} Hz to {} Hz", path.display(), source_rate, self.sample_rate);
            resample(&samples, source_rate, self.sample_rate)?
        } else {
            samples
        };

        Ok(AudioBuffer::new(samples, self.sample_rate))
    }
}

impl ClipDecoder for FileClipDecoder {
    fn decode(&self, line: &SpeechLine) -> Result<AudioBuffer> {
        self.decode_file(&line.clip)
    }
}
