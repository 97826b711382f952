//! Open, teardown, and metadata integration tests.
//!
//! Tests that need real media require fixture files from
//! `tests/fixtures/generate_fixtures.sh`; they return early when the
//! fixtures are absent.

use std::path::Path;

use framepump::DecodeEngine;

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn sample_audio_only_path() -> &'static str {
    "tests/fixtures/sample_audio_only.mp4"
}

fn sample_elementary_path() -> &'static str {
    "tests/fixtures/sample_video.h264"
}

#[test]
fn open_nonexistent_file() {
    let result = DecodeEngine::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open media file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    // A temporary file with garbage content is not a media file.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = DecodeEngine::open(&invalid_file_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn open_failure_leaves_nothing_behind() {
    // Repeated failing opens must not accumulate resources; every partial
    // setup is rolled back by drop.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("garbage.mp4");
    std::fs::write(&invalid_file_path, vec![0u8; 4096]).expect("Failed to write garbage file");

    for _ in 0..50 {
        assert!(DecodeEngine::open(&invalid_file_path).is_err());
    }
}

#[test]
fn open_audio_only_file() {
    let path = sample_audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    let result = DecodeEngine::open(path);
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("No video stream"),
        "Error should mention no video stream: {error_message}",
    );
}

#[test]
fn open_reports_stream_info() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let engine = DecodeEngine::open(path).expect("Failed to open fixture");
    let info = engine.info();

    assert!(info.width > 0);
    assert!(info.height > 0);
    assert!(
        (info.frames_per_second - 25.0).abs() < 0.5,
        "Fixture is 25 fps, got {}",
        info.frames_per_second,
    );
    assert!(!info.codec.is_empty());
}

#[test]
fn opened_engine_starts_at_zero() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let engine = DecodeEngine::open(path).expect("Failed to open fixture");
    assert_eq!(engine.current_time(), 0.0);
    assert!(!engine.at_end());
}

#[test]
fn duration_known_for_container() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let engine = DecodeEngine::open(path).expect("Failed to open fixture");
    let duration = engine.duration().expect("Container publishes a duration");
    assert!(
        (duration - 10.0).abs() < 0.5,
        "Fixture is 10 seconds, duration() said {duration}",
    );
}

#[test]
fn duration_unknown_for_elementary_stream() {
    // A raw H.264 elementary stream has neither a container nor a stream
    // duration.
    let path = sample_elementary_path();
    if !Path::new(path).exists() {
        return;
    }

    let engine = DecodeEngine::open(path).expect("Failed to open elementary stream");
    assert_eq!(engine.duration(), None);
}
