//! Script synthesis: one provider request per dialogue line.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, warn};

use super::provider::{SpeechProvider, SpeechRequest};
use crate::clips::ClipStore;
use crate::config::{AppConfig, ClipFormat};
use crate::error::{ConversationError, Result};
use crate::script::{Script, ScriptLine};

/// Delay before the first retry; doubled for every further attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Upper bound for a single backoff delay.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Settings for dispatching synthesis requests.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    pub format: ClipFormat,
    pub sample_rate: u32,
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl SynthesisOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            format: config.output_format,
            sample_rate: config.sample_rate,
            concurrency: config.concurrency.max(1),
            max_retries: config.max_retries,
            retry_base_delay: RETRY_BASE_DELAY,
        }
    }
}

/// Dispatches every line of a script to a speech provider.
///
/// Requests run concurrently up to `concurrency`, but results are consumed strictly in script order, so
/// the clip store always holds lines in sequence.
pub struct Synthesizer {
    provider: Arc<dyn SpeechProvider>,
    options: SynthesisOptions,
}

impl Synthesizer {
    pub fn new(provider: Arc<dyn SpeechProvider>, options: SynthesisOptions) -> Self {
        Self { provider, options }
    }

    /// Synthesize every line of `script` into `store`.
    ///
    /// # Errors
    /// The first failing line aborts the whole script; requests still in flight are dropped.
    pub async fn synthesize_script(&self, script: &Script, store: &mut ClipStore) -> Result<()> {
        let total = script.lines().len();
        info!("Synthesizing {} line(s) with {} provider (concurrency {})", total, self.provider.name(), self.options.concurrency);

        let mut results = stream::iter(script.lines().iter().map(|line| self.synthesize_line(line))).buffered(self.options.concurrency.max(1));

        while let Some(result) = results.next().await {
            let (line, audio) = result?;
            store.store(line.index, &line.speaker_id, &audio).await?;
            info!("🎵 Line {}/{} ({}): {} bytes", line.index + 1, total, line.speaker_id, audio.len());
        }

        Ok(())
    }

    /// Synthesize one line, retrying transient failures with exponential backoff.
    async fn synthesize_line<'a>(&self, line: &'a ScriptLine) -> Result<(&'a ScriptLine, Vec<u8>)> {
        let request = SpeechRequest::ssml(line.ssml(), &line.speaker_id, self.options.format, self.options.sample_rate);
        let mut attempt = 0;

        loop {
            debug!("Requesting line {} ({}), attempt {}", line.index, line.speaker_id, attempt + 1);

            match self.provider.synthesize(&request).await {
                Ok(audio) if audio.is_empty() => {
                    return Err(ConversationError::NoAudio { index: line.index, voice_id: line.speaker_id.clone() });
                }
                Ok(audio) => return Ok((line, audio)),
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let delay = (self.options.retry_base_delay * 2u32.saturating_pow(attempt)).min(MAX_RETRY_DELAY);
                    warn!("Line {} ({}) failed: {}; retrying in {:?}", line.index, line.speaker_id, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(ConversationError::Synthesis { index: line.index, voice_id: line.speaker_id.clone(), message: e.to_string() });
                }
            }
        }
    }
}
