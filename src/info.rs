//! Video stream metadata captured at open time.

use ffmpeg_next::{decoder, format::stream::Stream};

/// Metadata for the selected video stream.
///
/// Extracted once during [`DecodeEngine::open`](crate::DecodeEngine::open)
/// without decoding any frames. Note that `width`/`height` describe the
/// stream's declared geometry; individual decoded frames can differ (e.g. a
/// mid-stream resolution change), so callers should trust the per-frame
/// dimensions reported by
/// [`decode_next`](crate::DecodeEngine::decode_next) when sizing buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Declared frame width in pixels.
    pub width: u32,
    /// Declared frame height in pixels.
    pub height: u32,
    /// Average frame rate, or 0.0 if the container does not declare one.
    pub frames_per_second: f64,
    /// Decoder codec name (e.g. `h264`), or `unknown`.
    pub codec: String,
    /// Source pixel format name, if declared.
    pub pixel_format: Option<String>,
    /// Index of the selected video stream within the container.
    pub stream_index: usize,
}

impl VideoInfo {
    pub(crate) fn from_stream(stream: &Stream<'_>, decoder: &decoder::Video) -> Self {
        // Prefer the average frame rate; fall back to the declared rate.
        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let pixel_format = {
            let format = decoder.format();
            let name = format!("{format:?}");
            if name == "None" { None } else { Some(name) }
        };

        Self {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            codec,
            pixel_format,
            stream_index: stream.index(),
        }
    }
}
