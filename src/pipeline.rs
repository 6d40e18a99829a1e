//! End-to-end conversation rendering.
//!
//! parse → synthesize (concurrent, joined in script order) → assemble → mix → write. Intermediate clips
//! are owned by a [`ClipStore`] and removed on every exit path; final outputs are all-or-nothing.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::audio::FileClipDecoder;
use crate::clips::ClipStore;
use crate::config::AppConfig;
use crate::error::{ConversationError, Result};
use crate::output::{OutputWriter, session_timestamp};
use crate::script::parse_script;
use crate::timeline::{Assembler, SpeakerSet, SpeechLine, mix};
use crate::tts::{SpeechProvider, SynthesisOptions, Synthesizer};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files written, per-speaker tracks first and the merged file last.
    pub files: Vec<PathBuf>,
    pub speakers: Vec<String>,
    pub lines: usize,
    pub session_duration_ms: u64,
}

impl RunSummary {
    /// Path of the merged conversation.
    pub fn merged_file(&self) -> Option<&PathBuf> {
        self.files.last()
    }
}

/// Render the script named in `config` using `provider`.
///
/// # Errors
/// Any failure aborts the run. No clip files remain afterwards, and no output files are left behind
/// unless the whole run succeeded.
pub async fn run(config: &AppConfig, provider: Arc<dyn SpeechProvider>) -> Result<RunSummary> {
    config.validate()?;
    let input = config.input.as_ref().ok_or(ConversationError::MissingInput)?;

    info!("📜 Reading script from {}", input.display());
    let text = tokio::fs::read_to_string(input).await.map_err(|e| ConversationError::io(input, e))?;
    let script = parse_script(&text)?;
    info!("Parsed {} line(s) from {} speaker(s)", script.lines().len(), script.speakers().len());

    tokio::fs::create_dir_all(&config.output_dir).await.map_err(|e| ConversationError::io(&config.output_dir, e))?;

    let timestamp = session_timestamp();
    let mut store = ClipStore::create(&config.output_dir, &timestamp, config.output_format)?;

    Synthesizer::new(provider, SynthesisOptions::from_config(config)).synthesize_script(&script, &mut store).await?;

    // Decoding, mixing and encoding are blocking and CPU bound
    let lines = store.lines().to_vec();
    let speakers = script.speakers().clone();
    let render_config = config.clone();
    let (files, session_duration_ms) = tokio::task::spawn_blocking(move || render(&render_config, &timestamp, &lines, &speakers))
        .await
        .map_err(|e| ConversationError::RenderTask { message: format!("render task panicked: {}", e) })??;

    drop(store);

    Ok(RunSummary {
        files,
        speakers: script.speakers().iter().map(str::to_string).collect(),
        lines: script.lines().len(),
        session_duration_ms,
    })
}

/// Assemble, mix and write the synthesized lines. Returns the files written and the session duration.
fn render(config: &AppConfig, timestamp: &str, lines: &[SpeechLine], speakers: &SpeakerSet) -> Result<(Vec<PathBuf>, u64)> {
    info!("🎚️  Assembling timelines");
    let decoder = FileClipDecoder::new(config.output_format, config.sample_rate);
    let timelines = Assembler::new(config.sample_rate).with_gap_ms(config.gap_ms).assemble(lines, speakers, &decoder)?;
    let session_duration_ms = timelines.session_duration_ms().unwrap_or_default();

    let mixed = mix(&timelines, speakers, config.separate)?;
    let files = OutputWriter::new(&config.output_dir, timestamp, config.track_format).write_all(&mixed)?;

    Ok((files, session_duration_ms))
}
