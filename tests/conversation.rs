use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use clap::Parser;
use conversation_tts::audio::decode_container;
use conversation_tts::tts::{ProviderError, SpeechRequest};
use conversation_tts::{AppConfig, ConversationError, ErrorKind, SpeechProvider, run};

const RATE: u32 = 16000;

/// Provider returning raw 16-bit PCM of a fixed length per voice.
struct FakeProvider {
    durations_ms: HashMap<&'static str, u64>,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn new(durations_ms: &[(&'static str, u64)]) -> Self {
        Self { durations_ms: durations_ms.iter().copied().collect(), fail_on_call: None, calls: AtomicUsize::new(0) }
    }

    fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }
}

#[async_trait]
impl SpeechProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(ProviderError::Permanent("voice unavailable".into()));
        }
        let ms = self.durations_ms.get(request.voice_id.as_str()).copied().unwrap_or(100);
        let samples = (ms * u64::from(request.sample_rate) / 1000) as usize;
        Ok(std::iter::repeat_n(0x1000i16.to_le_bytes(), samples).flatten().collect())
    }
}

fn write_script(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("script.txt");
    std::fs::write(&path, text).unwrap();
    path
}

fn config(input: &Path, output: &Path, separate: bool) -> AppConfig {
    config_with_tracks(input, output, separate, "wav")
}

fn config_with_tracks(input: &Path, output: &Path, separate: bool, track_format: &str) -> AppConfig {
    let rate = RATE.to_string();
    let mut args = vec![
        "conversation-tts",
        "-i",
        input.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
        "--output-format",
        "pcm",
        "--track-format",
        track_format,
        "--sample-rate",
        rate.as_str(),
        "--concurrency",
        "2",
        "--max-retries",
        "0",
    ];
    if separate {
        args.push("-s");
    }
    AppConfig::parse_from(args)
}

fn read_wav(path: &Path) -> Vec<i16> {
    let reader = hound::WavReader::open(path).unwrap();
    assert_eq!(reader.spec().sample_rate, RATE);
    reader.into_samples::<i16>().map(|s| s.unwrap()).collect()
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().to_string()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn two_speakers_render_aligned_tracks() {
    let work = tempfile::tempdir().unwrap();
    let output = work.path().join("out");
    let input = write_script(work.path(), "A\nFirst line.\nB\nSecond line.\n");
    let provider = Arc::new(FakeProvider::new(&[("A", 1000), ("B", 2000)]));

    let summary = run(&config(&input, &output, true), provider).await.unwrap();

    assert_eq!(summary.session_duration_ms, 3900);
    assert_eq!(summary.speakers, vec!["A", "B"]);
    assert_eq!(summary.files.len(), 3);

    let a = read_wav(&summary.files[0]);
    let b = read_wav(&summary.files[1]);
    let merged = read_wav(summary.merged_file().unwrap());
    let ms = |n: usize| n * RATE as usize / 1000;

    assert_eq!(a.len(), ms(3900));
    assert_eq!(b.len(), ms(3900));
    assert_eq!(merged.len(), ms(3900));

    assert!(a[..ms(1000)].iter().all(|&s| s != 0));
    assert!(a[ms(1000)..].iter().all(|&s| s == 0));
    assert!(b[..ms(1450)].iter().all(|&s| s == 0));
    assert!(b[ms(1450)..ms(3450)].iter().all(|&s| s != 0));
    assert!(b[ms(3450)..].iter().all(|&s| s == 0));
    for i in 0..merged.len() {
        assert_eq!(merged[i], a[i].max(b[i]), "sample {}", i);
    }

    // Only the final outputs remain; the clip directory is gone
    let names = entries(&output);
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|n| n.ends_with(".wav") && !n.starts_with(".clips")));
    assert!(names.iter().any(|n| n.ends_with("_Merged.wav")));
}

#[tokio::test]
async fn mp3_tracks_are_written_by_default_format() {
    let work = tempfile::tempdir().unwrap();
    let output = work.path().join("out");
    let input = write_script(work.path(), "A\nFirst line.\nB\nSecond line.\n");
    let provider = Arc::new(FakeProvider::new(&[("A", 1000), ("B", 2000)]));

    let summary = run(&config_with_tracks(&input, &output, true, "mp3"), provider).await.unwrap();

    let names: Vec<_> = summary.files.iter().map(|p| p.file_name().unwrap().to_string_lossy().to_string()).collect();
    assert!(names[0].ends_with("_A.mp3"));
    assert!(names[1].ends_with("_B.mp3"));
    assert!(names[2].ends_with("_Merged.mp3"));

    let (merged, rate) = decode_container(std::fs::read(summary.merged_file().unwrap()).unwrap(), "mp3").unwrap();
    assert_eq!(rate, RATE);
    // Encoder delay and frame padding only ever add a little
    let expected = 3900 * RATE as usize / 1000;
    assert!(merged.len() >= expected && merged.len() < expected + RATE as usize / 5, "decoded {} samples", merged.len());
}

#[tokio::test]
async fn single_speaker_merged_equals_track() {
    let work = tempfile::tempdir().unwrap();
    let output = work.path().join("out");
    let input = write_script(work.path(), "Joanna\nHello.\nJoanna\nStill me.\n");
    let provider = Arc::new(FakeProvider::new(&[("Joanna", 300)]));

    let summary = run(&config(&input, &output, true), provider).await.unwrap();

    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.session_duration_ms, 2 * (300 + 450));
    assert_eq!(read_wav(&summary.files[0]), read_wav(&summary.files[1]));
}

#[tokio::test]
async fn merged_only_without_separate_flag() {
    let work = tempfile::tempdir().unwrap();
    let output = work.path().join("out");
    let input = write_script(work.path(), "A\nHi\nB\nHey\nC\nHello\n");
    let provider = Arc::new(FakeProvider::new(&[]));

    let summary = run(&config(&input, &output, false), provider).await.unwrap();

    assert_eq!(summary.files.len(), 1);
    assert_eq!(summary.lines, 3);
    assert_eq!(entries(&output).len(), 1);
}

#[tokio::test]
async fn odd_script_rejected_before_synthesis() {
    let work = tempfile::tempdir().unwrap();
    let output = work.path().join("out");
    let input = write_script(work.path(), "A\nHi\nB\n");
    let provider = Arc::new(FakeProvider::new(&[]));

    let err = run(&config(&input, &output, false), provider.clone()).await.unwrap_err();

    assert!(matches!(err, ConversationError::OddLineCount { count: 3 }));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn synthesis_failure_leaves_no_files() {
    let work = tempfile::tempdir().unwrap();
    let output = work.path().join("out");
    let input = write_script(work.path(), "A\nOne\nB\nTwo\nA\nThree\nB\nFour\n");
    let provider = Arc::new(FakeProvider::new(&[("A", 200), ("B", 200)]).failing_on(2));

    let err = run(&config(&input, &output, true), provider).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Synthesis);
    assert!(entries(&output).is_empty(), "leftover files: {:?}", entries(&output));
}

#[tokio::test]
async fn missing_input_is_usage_error() {
    let work = tempfile::tempdir().unwrap();
    let config = AppConfig::parse_from(["conversation-tts", "-o", work.path().to_str().unwrap()]);

    let err = run(&config, Arc::new(FakeProvider::new(&[]))).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}
