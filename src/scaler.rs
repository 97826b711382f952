//! Lazily rebuilt RGB24 conversion stage.
//!
//! [`RgbConverter`] wraps an FFmpeg software scaling context and memoizes it
//! against the geometry of incoming frames. The context is only valid for one
//! (width, height, source pixel format) triple; any frame that differs from
//! the cached triple discards the old context and builds a fresh one before
//! converting. Conversion always targets packed, row-major RGB24 with a
//! stride of exactly `width * 3`, using a fixed bilinear filter.

use ffmpeg_next::{
    Error as FfmpegError,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

/// Geometry triple a scaling context is valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConverterKey {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: Pixel,
}

impl ConverterKey {
    pub(crate) fn of(frame: &VideoFrame) -> Self {
        Self {
            width: frame.width(),
            height: frame.height(),
            format: frame.format(),
        }
    }
}

/// Memoized decoded-frame → packed RGB24 converter.
///
/// Owns one scaling context and one scratch destination frame; both are
/// rebuilt together whenever the incoming frame geometry changes. Callers
/// only ever receive the packed bytes copied into their own buffer.
pub(crate) struct RgbConverter {
    cached: Option<(ConverterKey, ScalingContext)>,
    scratch: VideoFrame,
}

impl RgbConverter {
    pub(crate) fn new() -> Self {
        Self {
            cached: None,
            scratch: VideoFrame::empty(),
        }
    }

    /// Convert `frame` into `out` as tightly packed RGB24.
    ///
    /// `out` must hold at least `width * height * 3` bytes for the frame's
    /// dimensions; the caller checks this before calling. Source scan-line
    /// padding is stripped row by row.
    pub(crate) fn convert(
        &mut self,
        frame: &VideoFrame,
        out: &mut [u8],
    ) -> Result<(), FfmpegError> {
        let key = ConverterKey::of(frame);

        let stale = !matches!(&self.cached, Some((cached, _)) if *cached == key);
        if stale {
            log::debug!(
                "Rebuilding RGB converter for {}x{} {:?}",
                key.width,
                key.height,
                key.format,
            );
            let context = ScalingContext::get(
                key.format,
                key.width,
                key.height,
                Pixel::RGB24,
                key.width,
                key.height,
                ScalingFlags::BILINEAR,
            )?;
            self.cached = Some((key, context));
            // An empty scratch frame is re-allocated to the new geometry by
            // the scaling run.
            self.scratch = VideoFrame::empty();
        }

        if let Some((_, context)) = &mut self.cached {
            context.run(frame, &mut self.scratch)?;
        }

        let row = key.width as usize * 3;
        let height = key.height as usize;
        let stride = self.scratch.stride(0);
        let data = self.scratch.data(0);

        if stride == row {
            out[..row * height].copy_from_slice(&data[..row * height]);
        } else {
            for (index, packed_row) in out[..row * height].chunks_exact_mut(row).enumerate() {
                let start = index * stride;
                packed_row.copy_from_slice(&data[start..start + row]);
            }
        }

        Ok(())
    }
}
