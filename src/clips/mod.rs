//! Intermediate per-line clip files.
//!
//! The store owns every clip file it creates and removes them, together with its directory, when it is
//! dropped. That covers the success path and every early return.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ClipFormat;
use crate::error::{ConversationError, Result};
use crate::output::file_component;
use crate::timeline::SpeechLine;

/// Ordered collection of synthesized lines backed by files in a private directory.
pub struct ClipStore {
    dir: PathBuf,
    extension: &'static str,
    lines: Vec<SpeechLine>,
}

impl ClipStore {
    /// Create the clip directory `{output_dir}/.clips-{session}`.
    ///
    /// # Errors
    /// Fails if the directory cannot be created.
    pub fn create(output_dir: &Path, session: &str, format: ClipFormat) -> Result<Self> {
        let dir = output_dir.join(format!(".clips-{}", session));
        std::fs::create_dir_all(&dir).map_err(|e| ConversationError::io(&dir, e))?;
        debug!("Clip directory: {}", dir.display());
        Ok(Self { dir, extension: format.extension(), lines: Vec::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the clip for line `index` spoken by `speaker_id`.
    pub fn clip_path(&self, index: usize, speaker_id: &str) -> PathBuf {
        self.dir.join(format!("{:04}-{}.{}", index, file_component(speaker_id), self.extension))
    }

    /// Write a synthesized clip and record it as the next speech line.
    ///
    /// The line is recorded before the write so a partially written file is still cleaned up.
    pub async fn store(&mut self, index: usize, speaker_id: &str, audio: &[u8]) -> Result<&SpeechLine> {
        let clip = self.clip_path(index, speaker_id);
        self.lines.push(SpeechLine { speaker_id: speaker_id.to_string(), clip: clip.clone(), sequence_index: index });

        tokio::fs::write(&clip, audio).await.map_err(|e| ConversationError::io(&clip, e))?;
        debug!("Stored line {} for {} ({} bytes) at {}", index, speaker_id, audio.len(), clip.display());

        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Stored lines in the order they were added.
    pub fn lines(&self) -> &[SpeechLine] {
        &self.lines
    }
}

impl Drop for ClipStore {
    fn drop(&mut self) {
        for line in &self.lines {
            match std::fs::remove_file(&line.clip) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove clip {}: {}", line.clip.display(), e),
            }
        }
        if let Err(e) = std::fs::remove_dir(&self.dir)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove clip directory {}: {}", self.dir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_records_lines_in_order() {
        let output = tempfile::tempdir().unwrap();
        let mut store = ClipStore::create(output.path(), "2024-01-01_00-00-00", ClipFormat::Mp3).unwrap();

        store.store(0, "Joanna", b"one").await.unwrap();
        store.store(1, "Matthew", b"two").await.unwrap();

        let lines = store.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sequence_index, 0);
        assert_eq!(lines[1].speaker_id, "Matthew");
        assert_eq!(std::fs::read(&lines[1].clip).unwrap(), b"two");
        assert!(lines[0].clip.ends_with("0000-Joanna.mp3"));
    }

    #[test]
    fn test_clip_names_are_unambiguous() {
        let output = tempfile::tempdir().unwrap();
        let store = ClipStore::create(output.path(), "s", ClipFormat::OggVorbis).unwrap();

        // The same speaker on two lines must not share a file
        assert_ne!(store.clip_path(0, "Joanna"), store.clip_path(2, "Joanna"));
        assert_eq!(store.clip_path(7, "../evil").parent(), Some(store.dir()));
        assert!(store.clip_path(7, "Joanna").to_string_lossy().ends_with("0007-Joanna.ogg"));
    }

    #[tokio::test]
    async fn test_drop_removes_files_and_directory() {
        let output = tempfile::tempdir().unwrap();
        let dir;
        let clip;
        {
            let mut store = ClipStore::create(output.path(), "s", ClipFormat::Mp3).unwrap();
            clip = store.store(0, "Amy", b"audio").await.unwrap().clip.clone();
            dir = store.dir().to_path_buf();
            assert!(clip.exists());
        }
        assert!(!clip.exists());
        assert!(!dir.exists());
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }
}
