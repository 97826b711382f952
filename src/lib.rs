//! # framepump
//!
//! In-process video decode engine — open a media file, pump decoded video
//! frames as packed RGB24, and seek, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! `framepump` is the decode core of a video player: it multiplexes demuxing
//! and decoding behind a single pull-based handle, converts every frame to a
//! fixed 3-bytes-per-pixel RGB layout, and keeps a coherent notion of the
//! current playback position across seeks and end of stream. Display pacing,
//! audio, and play/pause policy are the caller's responsibility.
//!
//! ## Quick Start
//!
//! ### Pump frames
//!
//! ```no_run
//! use framepump::{DecodeEngine, DecodeOutcome, rgb_buffer_len};
//!
//! let mut engine = DecodeEngine::open("input.mp4").unwrap();
//! let info = engine.info().clone();
//! let mut rgb = vec![0u8; rgb_buffer_len(info.width, info.height)];
//!
//! loop {
//!     match engine.decode_next(&mut rgb).unwrap() {
//!         DecodeOutcome::Frame(frame) => {
//!             // rgb[..frame.width * frame.height * 3] holds the pixels.
//!             println!("frame at {:.3}s", frame.pts_seconds);
//!         }
//!         DecodeOutcome::EndOfStream => break,
//!     }
//! }
//! ```
//!
//! ### Seek
//!
//! ```no_run
//! use framepump::DecodeEngine;
//!
//! let mut engine = DecodeEngine::open("input.mp4").unwrap();
//! engine.seek(5.0).unwrap();
//! assert_eq!(engine.current_time(), 5.0);
//! // The next decode_next corrects current_time to the true frame
//! // timestamp, which lands on or after the preceding keyframe.
//! ```
//!
//! ## Behaviour notes
//!
//! - **One frame per call.** [`DecodeEngine::decode_next`] reads as many
//!   container packets as needed (silently dropping audio and subtitle
//!   packets) to deliver exactly one video frame, then stops.
//! - **End of stream is sticky.** After the decoder has been drained, every
//!   further call reports end of stream until a successful seek.
//! - **Caller-owned output.** The engine never allocates on the caller's
//!   behalf: the RGB buffer is supplied per call and must hold
//!   `width * height * 3` bytes for the delivered frame. An undersized
//!   buffer fails the call without losing the frame.
//! - **Best-effort seeking.** Seeks are backward-biased and keyframe
//!   aligned; the first frame after a seek may precede the requested time.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system for
//! `ffmpeg-next` to link against.

pub mod engine;
pub mod error;
pub mod ffmpeg;
pub mod info;
mod scaler;
pub mod timing;

pub use engine::{DecodeEngine, DecodeOutcome, FrameInfo};
pub use error::EngineError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use info::VideoInfo;
pub use timing::rgb_buffer_len;
