//! Audio buffers and codecs.
//!
//! Decoding uses symphonia, resampling uses rubato, and tracks are encoded with LAME (MP3) or hound (WAV).
//! Everything downstream of the decoder works on mono f32 buffers at the session sample rate.

mod buffer;
mod decode;
pub mod mp3;
pub mod resampler;
pub mod util;
pub mod wav;

pub use buffer::{AudioBuffer, ms_to_samples};
pub use decode::{FileClipDecoder, decode_container};
