//! Text-to-speech module.
//!
//! Sends each dialogue line to a speech provider and collects the resulting clips in script order.

mod provider;
mod synthesizer;

pub use provider::{HttpSpeechProvider, ProviderError, SpeechProvider, SpeechRequest};
pub use synthesizer::{SynthesisOptions, Synthesizer};
