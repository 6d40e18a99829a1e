//! Final output files.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::file_component;
use crate::audio::AudioBuffer;
use crate::audio::mp3::write_mp3;
use crate::audio::wav::write_wav;
use crate::config::TrackFormat;
use crate::error::Result;
use crate::timeline::MixOutput;

const MERGED_SUFFIX: &str = "Merged";

/// Writes the merged conversation and, optionally, each speaker's track.
///
/// Either every file is written or none is left behind: files written before a failure are removed when
/// the writer is dropped without completing.
pub struct OutputWriter {
    dir: PathBuf,
    timestamp: String,
    format: TrackFormat,
    written: Vec<PathBuf>,
    completed: bool,
}

impl OutputWriter {
    pub fn new(dir: &Path, timestamp: &str, format: TrackFormat) -> Self {
        Self { dir: dir.to_path_buf(), timestamp: timestamp.to_string(), format, written: Vec::new(), completed: false }
    }

    /// `{timestamp}_Merged.{mp3|wav}`
    pub fn merged_path(&self) -> PathBuf {
        self.dir.join(format!("{}_{}.{}", self.timestamp, MERGED_SUFFIX, self.format.extension()))
    }

    /// `{timestamp}_{speaker}.{mp3|wav}` for each speaker, in order.
    ///
    /// A name that would clash with the merged file or an earlier speaker gets the speaker's position
    /// appended.
    pub fn speaker_paths<'a>(&self, speaker_ids: impl IntoIterator<Item = &'a str>) -> Vec<PathBuf> {
        let extension = self.format.extension();
        let mut taken = vec![self.merged_path()];
        let mut paths = Vec::new();
        for (position, speaker_id) in speaker_ids.into_iter().enumerate() {
            let stem = format!("{}_{}", self.timestamp, file_component(speaker_id));
            let mut path = self.dir.join(format!("{}.{}", stem, extension));
            if taken.contains(&path) {
                path = self.dir.join(format!("{}-{}.{}", stem, position + 1, extension));
            }
            taken.push(path.clone());
            paths.push(path);
        }
        paths
    }

    /// Write every output of `mix`, returning the paths written.
    pub fn write_all(mut self, mix: &MixOutput) -> Result<Vec<PathBuf>> {
        if let Some(ref separate) = mix.separate {
            let paths = self.speaker_paths(separate.iter().map(|t| t.speaker_id.as_str()));
            for (timeline, path) in separate.iter().zip(paths) {
                info!("Exporting track for {} of length {}ms to {}", timeline.speaker_id, timeline.duration_ms, path.display());
                self.written.push(path.clone());
                self.write_track(&path, &timeline.track)?;
            }
        }

        let merged = self.merged_path();
        info!("Exporting conversation to a single file at {}", merged.display());
        self.written.push(merged.clone());
        self.write_track(&merged, &mix.merged)?;

        self.completed = true;
        Ok(std::mem::take(&mut self.written))
    }

    fn write_track(&self, path: &Path, track: &AudioBuffer) -> Result<()> {
        match self.format {
            TrackFormat::Mp3 => write_mp3(path, track),
            TrackFormat::Wav => write_wav(path, track),
        }
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        for path in &self.written {
            if let Err(e) = std::fs::remove_file(path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to remove partial output {}: {}", path.display(), e);
            }
        }
    }
}
