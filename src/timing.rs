//! Timestamp and buffer-size arithmetic.
//!
//! Helpers for converting between native stream ticks and seconds, and for
//! sizing RGB24 output buffers. All timestamp conversions go through the
//! stream's [`Rational`] time base.

use ffmpeg_next::Rational;

/// Rescale a PTS value from stream time base to seconds.
pub fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert a time in seconds to a timestamp in the stream's time base.
///
/// The result is suitable for passing to FFmpeg stream-directed seek calls.
/// A degenerate time base (zero numerator) maps everything to tick 0.
pub fn seconds_to_pts(seconds: f64, time_base: Rational) -> i64 {
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    if numerator == 0.0 {
        return 0;
    }
    (seconds * denominator / numerator) as i64
}

/// Number of bytes a tightly packed RGB24 frame of the given dimensions needs.
///
/// This is the minimum capacity a buffer passed to
/// [`DecodeEngine::decode_next`](crate::DecodeEngine::decode_next) must have
/// for a frame of these dimensions.
pub const fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}
