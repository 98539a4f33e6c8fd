//! Video decode sessions.
//!
//! [`FrameSource`] is the decoder seam: a lazy, finite, non-restartable
//! sequence of decoded frames, walked strictly in decode order from index 0.
//! The pipeline never assumes random access — there is no seeking here.
//!
//! [`VideoSource`] is the production implementation over FFmpeg (via
//! `ffmpeg-next`). Each call to [`next_frame`](FrameSource::next_frame)
//! reads and decodes just enough packets to produce the next frame, so the
//! whole video is never buffered. Dropping the source releases the decode
//! session; there is no explicit close.

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError,
    Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::log as ffmpeg_log,
};
use ffmpeg_sys_next::AV_NOPTS_VALUE;
use image::{DynamicImage, RgbImage};

use crate::error::VidsnapError;

static FFMPEG_INIT: OnceLock<Result<(), FfmpegError>> = OnceLock::new();

/// A lazy, finite, non-restartable sequence of decoded frames.
///
/// Implementations yield frames sequentially from index 0 and return
/// `Ok(None)` once the stream is exhausted. The caller owns frame-index
/// bookkeeping; sources only produce the next image.
pub trait FrameSource {
    /// The source's native frame rate in frames per second.
    ///
    /// `0.0` (or any non-positive value) means the container did not report
    /// a usable rate.
    fn frame_rate(&self) -> f64;

    /// Estimated total number of frames, or `0` when unknown.
    ///
    /// Used for progress display only — it is an estimate, not a promise of
    /// how many frames will actually decode.
    fn frame_count(&self) -> u64;

    /// Decode and return the next frame, or `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, VidsnapError>;
}

/// FFmpeg-backed [`FrameSource`].
///
/// Opens the demuxer, picks the best video stream, and sets up a decoder
/// plus an RGB24 scaler. Frames are produced on demand by pumping packets
/// into the decoder until it yields one.
pub struct VideoSource {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    frame_rate: f64,
    frame_count: u64,
    width: u32,
    height: u32,
    decoded: VideoFrame,
    scaled: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl VideoSource {
    /// Open a video file for sequential decoding.
    ///
    /// # Errors
    ///
    /// Returns [`VidsnapError::FileOpen`] if FFmpeg cannot open the file and
    /// [`VidsnapError::NoVideoStream`] if it contains no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VidsnapError> {
        let path = path.as_ref();

        init_ffmpeg().map_err(|error| VidsnapError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        log::debug!("Opening video: {}", path.display());
        let input =
            ffmpeg_next::format::input(&path).map_err(|error| VidsnapError::FileOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(VidsnapError::NoVideoStream)?;
        let stream_index = stream.index();

        // Average frame rate, falling back to the stream's nominal rate.
        let avg = stream.avg_frame_rate();
        let frame_rate = if avg.denominator() != 0 {
            avg.numerator() as f64 / avg.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        // Frame count: prefer the container's figure, estimate from the
        // duration otherwise, and report 0 when neither is known.
        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            let micros = input.duration();
            if micros != AV_NOPTS_VALUE && micros > 0 && frame_rate > 0.0 {
                let duration = Duration::from_micros(micros as u64);
                (duration.as_secs_f64() * frame_rate) as u64
            } else {
                0
            }
        };

        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let decoder = decoder_context.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            frame_rate,
            frame_count,
            width,
            height,
            decoded: VideoFrame::empty(),
            scaled: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Scale and convert the current decoded frame to a [`DynamicImage`].
    fn convert_current_frame(&mut self) -> Result<DynamicImage, VidsnapError> {
        self.scaler.run(&self.decoded, &mut self.scaled)?;
        let buffer = frame_to_rgb_buffer(&self.scaled, self.width, self.height);
        let image = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            VidsnapError::VideoDecode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl FrameSource for VideoSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, VidsnapError> {
        if self.done {
            return Ok(None);
        }

        loop {
            // Drain any frame the decoder already holds.
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                return self.convert_current_frame().map(Some);
            }

            if self.eof_sent {
                // EOF was flushed and the decoder has nothing left.
                self.done = true;
                return Ok(None);
            }

            // Feed the decoder more packets; audio/subtitle packets are
            // simply skipped.
            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Transient read error; move on to the next packet.
                }
            }
        }
    }
}

/// Initialise FFmpeg once per process and clamp its stderr chatter.
///
/// FFmpeg's own logging is separate from the Rust `log` facade and defaults
/// to printing warnings, which is noise in a long-running bot process.
fn init_ffmpeg() -> Result<(), FfmpegError> {
    FFMPEG_INIT
        .get_or_init(|| {
            ffmpeg_next::init()?;
            ffmpeg_log::set_level(ffmpeg_log::Level::Fatal);
            Ok(())
        })
        .clone()
}

/// Repack a scaled RGB24 frame into a buffer [`RgbImage::from_raw`] accepts.
///
/// FFmpeg may pad each row (stride > width × 3), so rows are copied
/// individually whenever padding is present.
fn frame_to_rgb_buffer(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = frame.data(0);

    if stride == row_bytes {
        return data[..row_bytes * (height as usize)].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
    for row in 0..(height as usize) {
        let start = row * stride;
        buffer.extend_from_slice(&data[start..start + row_bytes]);
    }
    buffer
}
