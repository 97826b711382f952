//! Benchmarks for the decode pump and seeking.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use framepump::{DecodeEngine, DecodeOutcome, FfmpegLogLevel, rgb_buffer_len};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn benchmark_full_decode(criterion: &mut Criterion) {
    framepump::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("decode all frames to RGB24", |bencher| {
        bencher.iter(|| {
            let mut engine = DecodeEngine::open(SAMPLE_VIDEO).unwrap();
            let info = engine.info().clone();
            let mut rgb = vec![0u8; rgb_buffer_len(info.width, info.height)];
            let mut frames = 0_u64;
            while let DecodeOutcome::Frame(_) = engine.decode_next(&mut rgb).unwrap() {
                frames += 1;
            }
            frames
        });
    });
}

fn benchmark_seek_and_decode(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    criterion.bench_function("seek to middle and decode one frame", |bencher| {
        bencher.iter(|| {
            let mut engine = DecodeEngine::open(SAMPLE_VIDEO).unwrap();
            let info = engine.info().clone();
            let mut rgb = vec![0u8; rgb_buffer_len(info.width, info.height)];
            engine.seek(5.0).unwrap();
            engine.decode_next(&mut rgb).unwrap()
        });
    });
}

criterion_group!(benches, benchmark_full_decode, benchmark_seek_and_decode);
criterion_main!(benches);
