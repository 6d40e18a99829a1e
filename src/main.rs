//! Conversation TTS - render a two-column script into a multi-speaker conversation.
//!
//! Reads alternating speaker / dialogue lines, synthesizes every line through a speech provider, lines the
//! clips up on one track per speaker and writes the overlaid conversation (plus, optionally, each track).

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::OffsetTime;

use conversation_tts::output::capture_local_offset;
use conversation_tts::{AppConfig, HttpSpeechProvider, pipeline};

fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // The local offset has to be read before any other thread exists
    let offset = capture_local_offset();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(OffsetTime::new(offset, time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    tokio::runtime::Runtime::new()?.block_on(run(config))
}

async fn run(config: AppConfig) -> Result<()> {
    info!("🎙️  Conversation TTS v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }

    config.log_config();

    let provider = Arc::new(HttpSpeechProvider::new(&config)?);

    match pipeline::run(&config, provider).await {
        Ok(summary) => {
            info!(
                "✅ Rendered {} line(s) from {} speaker(s), {}ms of audio",
                summary.lines,
                summary.speakers.len(),
                summary.session_duration_ms
            );
            for file in &summary.files {
                info!("  {}", file.display());
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ {:?} error: {}", e.kind(), e);
            std::process::exit(1);
        }
    }
}
