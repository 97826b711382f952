//! Core [`DecodeEngine`] implementation.
//!
//! `DecodeEngine` is the single handle over one open media file. It owns the
//! demuxer, the video decoder bound to the best video stream, the lazily
//! rebuilt RGB converter, and the timing state, and exposes the pump
//! ([`decode_next`](DecodeEngine::decode_next)), best-effort seeking, and
//! duration/position queries. All operations are synchronous and run to
//! completion on the calling thread; callers that pump from a dedicated
//! decode thread must serialize `decode_next`, `seek`, and drop themselves.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational, codec::context::Context as CodecContext, decoder,
    format::context::Input, frame::Video as VideoFrame, media::Type, util::error::EAGAIN,
};
use ffmpeg_sys_next::{AV_NOPTS_VALUE, AV_TIME_BASE, AVSEEK_FLAG_BACKWARD, av_seek_frame};
use image::RgbImage;

use crate::{error::EngineError, info::VideoInfo, scaler::RgbConverter, timing};

/// Where the pump is within the stream.
///
/// `Reading` feeds container packets to the decoder; `Draining` has signalled
/// end of input and retrieves the decoder's buffered frames; `Finished` is
/// the sticky end-of-stream state, cleared only by a successful
/// [`seek`](DecodeEngine::seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PumpState {
    Reading,
    Draining,
    Finished,
}

/// Dimensions and timestamp of one delivered frame.
///
/// Dimensions may change from frame to frame (mid-stream resolution
/// switches), so callers must re-check them on every call when sizing
/// buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Presentation time in seconds. Carried forward from the previous frame
    /// or seek target when the decoded frame has no timestamp of its own.
    pub pts_seconds: f64,
}

/// Result of one successful pump call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub enum DecodeOutcome {
    /// A frame was decoded and its RGB24 bytes written to the caller's buffer.
    Frame(FrameInfo),
    /// The source is exhausted and the decoder fully drained. Sticky until
    /// the next successful seek.
    EndOfStream,
}

/// In-process video decode engine over one open media file.
///
/// Created via [`DecodeEngine::open`]. Each call to
/// [`decode_next`](DecodeEngine::decode_next) produces at most one decoded,
/// RGB24-converted frame; [`seek`](DecodeEngine::seek) repositions the
/// demuxer and resets decoder state. Closing is `Drop`: the converter,
/// frame buffer, decoder, and demuxer are released in dependency order by
/// their RAII wrappers.
///
/// # Example
///
/// ```no_run
/// use framepump::{DecodeEngine, DecodeOutcome, rgb_buffer_len};
///
/// let mut engine = DecodeEngine::open("input.mp4")?;
/// let info = engine.info().clone();
/// let mut rgb = vec![0u8; rgb_buffer_len(info.width, info.height)];
///
/// while let DecodeOutcome::Frame(frame) = engine.decode_next(&mut rgb)? {
///     println!("{}x{} @ {:.3}s", frame.width, frame.height, frame.pts_seconds);
/// }
/// # Ok::<(), framepump::EngineError>(())
/// ```
pub struct DecodeEngine {
    /// The opened FFmpeg input (demuxer) context.
    input: Input,
    /// Video decoder bound to the selected stream's codec parameters.
    decoder: decoder::Video,
    /// Index of the selected video stream; packets from other streams are
    /// dropped.
    stream_index: usize,
    /// Seconds-per-tick ratio of the selected stream.
    time_base: Rational,
    /// Memoized RGB24 conversion stage.
    converter: RgbConverter,
    /// Reusable decoded-frame buffer, overwritten on every pump iteration.
    decoded: VideoFrame,
    /// Packet the decoder transiently rejected, to be resubmitted after a
    /// frame has been drained.
    backlog: Option<Packet>,
    state: PumpState,
    /// `decoded` holds a frame that has not been delivered yet (either just
    /// pumped, or re-delivery after a buffer-too-small call).
    pending: bool,
    /// Best-known playback position in seconds.
    current_pts_sec: f64,
    /// Stream metadata cached at open time.
    info: VideoInfo,
    /// Kept for error messages.
    path: PathBuf,
}

impl Debug for DecodeEngine {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DecodeEngine")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("current_pts_sec", &self.current_pts_sec)
            .finish_non_exhaustive()
    }
}

impl DecodeEngine {
    /// Open a media file and prepare its best video stream for decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens and probes the container,
    /// selects the best video stream, and opens a decoder from that stream's
    /// codec parameters. Every step is a hard-fail point; resources acquired
    /// before a failing step are released by drop, so a failed open leaves
    /// nothing behind.
    ///
    /// The returned engine starts at position 0 with end-of-stream clear.
    /// The RGB converter is built lazily on the first decoded frame.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Open`] if the file cannot be opened, probed, or
    /// its codec prepared, and [`EngineError::NoVideoStream`] if the
    /// container holds no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();

        log::debug!("Opening media file: {}", path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| EngineError::Open {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| EngineError::Open {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let (stream_index, time_base, decoder, info) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or(EngineError::NoVideoStream)?;
            let stream_index = stream.index();
            let time_base = stream.time_base();

            let decoder_context =
                CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                    EngineError::Open {
                        path: path.to_path_buf(),
                        reason: format!(
                            "Failed to read video codec parameters for stream {stream_index}: {error}"
                        ),
                    }
                })?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| EngineError::Open {
                    path: path.to_path_buf(),
                    reason: format!("Failed to open video decoder for stream {stream_index}: {error}"),
                })?;

            let info = VideoInfo::from_stream(&stream, &decoder);
            (stream_index, time_base, decoder, info)
        };

        log::info!(
            "Opened media file: {} ({}x{} @ {:.2} fps, codec={}, stream={})",
            path.display(),
            info.width,
            info.height,
            info.frames_per_second,
            info.codec,
            stream_index,
        );

        Ok(Self {
            input,
            decoder,
            stream_index,
            time_base,
            converter: RgbConverter::new(),
            decoded: VideoFrame::empty(),
            backlog: None,
            state: PumpState::Reading,
            pending: false,
            current_pts_sec: 0.0,
            info,
            path: path.to_path_buf(),
        })
    }

    /// Metadata of the selected video stream, captured at open time.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Decode the next video frame into `rgb` as packed RGB24.
    ///
    /// Produces at most one frame per call. Packets belonging to other
    /// streams (audio, subtitles) are read and dropped transparently; once
    /// the container is exhausted the decoder is drained, the final buffered
    /// frames are still delivered one per call, and only then does the engine
    /// report [`DecodeOutcome::EndOfStream`] — sticky until the next
    /// [`seek`](DecodeEngine::seek).
    ///
    /// `rgb` must hold at least `width * height * 3` bytes for the frame
    /// being delivered. Frame dimensions can change mid-stream, so check
    /// the returned [`FrameInfo`] every call.
    ///
    /// # Errors
    ///
    /// - [`EngineError::BufferTooSmall`] if `rgb` cannot hold the decoded
    ///   frame. The frame is kept pending and no engine state advances; a
    ///   retry with a large enough buffer delivers the same frame.
    /// - [`EngineError::Decode`] on a fatal decoder fault; the stream should
    ///   be treated as unusable.
    pub fn decode_next(&mut self, rgb: &mut [u8]) -> Result<DecodeOutcome, EngineError> {
        if !self.ensure_frame()? {
            return Ok(DecodeOutcome::EndOfStream);
        }

        let width = self.decoded.width();
        let height = self.decoded.height();
        let required = timing::rgb_buffer_len(width, height);
        if rgb.len() < required {
            // Frame stays pending so the next call can deliver it.
            return Err(EngineError::BufferTooSmall {
                required,
                provided: rgb.len(),
            });
        }

        // Timestamp-less frames carry the previous position forward.
        if let Some(pts) = self.decoded.pts() {
            self.current_pts_sec = timing::pts_to_seconds(pts, self.time_base);
        }

        self.converter.convert(&self.decoded, &mut rgb[..required])?;
        self.pending = false;

        Ok(DecodeOutcome::Frame(FrameInfo {
            width,
            height,
            pts_seconds: self.current_pts_sec,
        }))
    }

    /// Decode the next frame into a freshly allocated [`RgbImage`].
    ///
    /// Allocating convenience wrapper over
    /// [`decode_next`](DecodeEngine::decode_next); returns `None` at end of
    /// stream.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Decode`] on decoder faults, as `decode_next`
    /// does. Buffer sizing is handled internally.
    pub fn decode_next_image(&mut self) -> Result<Option<(RgbImage, FrameInfo)>, EngineError> {
        if !self.ensure_frame()? {
            return Ok(None);
        }

        let mut buffer =
            vec![0u8; timing::rgb_buffer_len(self.decoded.width(), self.decoded.height())];
        match self.decode_next(&mut buffer)? {
            DecodeOutcome::Frame(frame) => {
                let image =
                    RgbImage::from_raw(frame.width, frame.height, buffer).ok_or_else(|| {
                        EngineError::Decode(
                            "Failed to construct RGB image from decoded frame data".to_string(),
                        )
                    })?;
                Ok(Some((image, frame)))
            }
            DecodeOutcome::EndOfStream => Ok(None),
        }
    }

    /// Seek to `seconds`, best-effort and keyframe-aligned.
    ///
    /// Requests a backward-biased seek on the selected video stream (the
    /// demuxer lands on or before the target, never after), flushes the
    /// decoder's buffered state, clears end-of-stream, and sets the current
    /// position optimistically to the requested target. The position is
    /// corrected to the true decoded timestamp by the next
    /// [`decode_next`](DecodeEngine::decode_next), so a brief mismatch
    /// proportional to the keyframe spacing is expected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Seek`] if the demuxer rejects the request; the
    /// engine's state is left unchanged in that case.
    pub fn seek(&mut self, seconds: f64) -> Result<(), EngineError> {
        let target = timing::seconds_to_pts(seconds, self.time_base);

        let status = unsafe {
            av_seek_frame(
                self.input.as_mut_ptr(),
                self.stream_index as i32,
                target,
                AVSEEK_FLAG_BACKWARD,
            )
        };
        if status < 0 {
            return Err(EngineError::Seek(FfmpegError::from(status).to_string()));
        }

        self.decoder.flush();
        self.backlog = None;
        self.pending = false;
        self.state = PumpState::Reading;
        self.current_pts_sec = seconds;

        log::debug!(
            "Seeked {} to {seconds:.3}s (stream tick {target})",
            self.path.display(),
        );
        Ok(())
    }

    /// Total duration in seconds, or `None` if the container does not know.
    ///
    /// Prefers the container-level duration; falls back to the selected
    /// stream's own duration field converted through its time base.
    pub fn duration(&self) -> Option<f64> {
        let container = self.input.duration();
        if container != AV_NOPTS_VALUE {
            return Some(container as f64 / AV_TIME_BASE as f64);
        }

        let stream_duration = self.input.stream(self.stream_index)?.duration();
        (stream_duration != AV_NOPTS_VALUE)
            .then(|| timing::pts_to_seconds(stream_duration, self.time_base))
    }

    /// Best-known playback position in seconds.
    ///
    /// Updated from decoded-frame timestamps as frames are pumped, and set
    /// optimistically by [`seek`](DecodeEngine::seek). Passive getter; never
    /// touches the stream.
    pub fn current_time(&self) -> f64 {
        self.current_pts_sec
    }

    /// Whether the engine has delivered its final frame and reported
    /// end of stream. Cleared by a successful [`seek`](DecodeEngine::seek).
    pub fn at_end(&self) -> bool {
        self.state == PumpState::Finished && !self.pending
    }

    /// Make sure `decoded` holds an undelivered frame, pumping if necessary.
    ///
    /// Returns `false` once the stream is exhausted.
    fn ensure_frame(&mut self) -> Result<bool, EngineError> {
        if self.pending {
            return Ok(true);
        }
        if self.pump_one()? {
            self.pending = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// Advance the demux/decode state machine until one frame lands in
    /// `decoded` or the stream ends.
    ///
    /// Drives the decoder's two-phase send/receive handshake: output is
    /// always drained before more input is offered, so a transient
    /// "decoder full" reject can never spin — the rejected packet is parked
    /// in `backlog` and a frame must come out before it is resubmitted.
    fn pump_one(&mut self) -> Result<bool, EngineError> {
        if self.state == PumpState::Finished {
            return Ok(false);
        }

        loop {
            match self.decoder.receive_frame(&mut self.decoded) {
                Ok(()) => return Ok(true),
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => {}
                Err(FfmpegError::Eof) => {
                    self.state = PumpState::Finished;
                    return Ok(false);
                }
                Err(error) => return Err(EngineError::Decode(error.to_string())),
            }

            if self.state == PumpState::Draining {
                // End of input already signalled and nothing buffered.
                self.state = PumpState::Finished;
                return Ok(false);
            }

            let packet = match self.backlog.take() {
                Some(packet) => Some(packet),
                None => self.read_video_packet(),
            };

            let Some(packet) = packet else {
                // Container exhausted: signal end of input, then drain.
                match self.decoder.send_eof() {
                    Ok(()) | Err(FfmpegError::Eof) => {}
                    Err(error) => return Err(EngineError::Decode(error.to_string())),
                }
                self.state = PumpState::Draining;
                continue;
            };

            match self.decoder.send_packet(&packet) {
                Ok(()) => {}
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => {
                    // Decoder is full; it owes us a frame before it will
                    // accept this packet again.
                    self.backlog = Some(packet);
                    return match self.decoder.receive_frame(&mut self.decoded) {
                        Ok(()) => Ok(true),
                        Err(error) => Err(EngineError::Decode(format!(
                            "decoder refused input without producing output: {error}"
                        ))),
                    };
                }
                Err(error) => return Err(EngineError::Decode(error.to_string())),
            }
        }
    }

    /// Read container packets until one belongs to the selected video
    /// stream. Returns `None` when the container is exhausted (any demux
    /// read failure is treated as end of container, matching
    /// `av_read_frame` semantics).
    fn read_video_packet(&mut self) -> Option<Packet> {
        loop {
            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) if packet.stream() == self.stream_index => return Some(packet),
                Ok(()) => {} // audio/subtitle packets are dropped
                Err(_) => return None,
            }
        }
    }
}
