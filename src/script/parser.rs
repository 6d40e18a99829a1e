//! Two-column conversation script parsing.

use tracing::debug;

use crate::error::{ConversationError, Result};
use crate::timeline::SpeakerSet;

/// One dialogue line of the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub index: usize,
    pub speaker_id: String,
    pub text: String,
}

impl ScriptLine {
    /// Dialogue text in the SSML envelope sent to the provider.
    ///
    /// The text is not escaped, so inline SSML tags in the script are passed through.
    pub fn ssml(&self) -> String {
        format!("<speak>{}</speak>", self.text)
    }
}

/// Parsed script: dialogue lines in order plus the speakers in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    lines: Vec<ScriptLine>,
    speakers: SpeakerSet,
}

impl Script {
    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    pub fn speakers(&self) -> &SpeakerSet {
        &self.speakers
    }
}

/// Parse alternating speaker / dialogue lines.
///
/// Lines are trimmed and blank lines are skipped. The remaining lines must come in pairs.
///
/// # Errors
/// `EmptyScript` if nothing remains after skipping blank lines, `OddLineCount` if a speaker has no
/// dialogue line.
pub fn parse_script(input: &str) -> Result<Script> {
    let content: Vec<&str> = input.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

    if content.is_empty() {
        return Err(ConversationError::EmptyScript);
    }
    if content.len() % 2 != 0 {
        return Err(ConversationError::OddLineCount { count: content.len() });
    }

    let mut speakers = SpeakerSet::new();
    let lines: Vec<ScriptLine> = content
        .chunks_exact(2)
        .enumerate()
        .map(|(index, pair)| {
            if speakers.insert(pair[0]) {
                debug!("New speaker: {}", pair[0]);
            }
            ScriptLine { index, speaker_id: pair[0].to_string(), text: pair[1].to_string() }
        })
        .collect();

    Ok(Script { lines, speakers })
}
