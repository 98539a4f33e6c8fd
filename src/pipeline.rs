//! The frame-sampling pipeline.
//!
//! Given a requester and a local video file, the pipeline emits a
//! deterministic, evenly time-spaced subsequence of the video's frames as
//! individual JPEG images, editing a single status message as it goes and
//! finishing with a terminal summary.
//!
//! Frames are walked strictly sequentially; a frame is selected when its
//! index is an exact multiple of the stride `floor(frame_rate ×
//! sample_interval)`. Selected frames are encoded into a per-frame scratch
//! file, transmitted, and discarded — frame N+1 is never touched before
//! frame N's transmission resolves. Decoding and encoding run inline between
//! awaits; only transport calls suspend.
//!
//! Failure handling follows one rule: a problem ends this request, never the
//! process. Setup failures (unopenable file, unusable frame rate) and
//! mid-stream failures are reported to the requester through the status
//! message, the decode session is released, and the pipeline still finalizes
//! with a summary of whatever was sent.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::SamplerConfig;
use crate::encode::save_jpeg;
use crate::error::VidsnapError;
use crate::progress::StatusMessage;
use crate::scratch::{ScratchFile, frame_scratch_name};
use crate::transport::{ChatId, ChatTransport};
use crate::video::{FrameSource, VideoSource};

const MSG_STARTING: &str = "Starting video processing and frame extraction...";
const MSG_OPEN_FAILED: &str = "Error: could not open the video file.";
const MSG_RATE_FAILED: &str = "Error: could not determine the video frame rate.";

/// Map a sampling interval to a frame-index stride.
///
/// Returns `floor(frame_rate × interval)`; `0` signals that the rate is
/// unusable (non-positive, or too low to yield at least one frame per
/// interval) and must be treated as a decode-metadata failure.
pub fn stride_for_interval(frame_rate: f64, interval: Duration) -> u64 {
    if frame_rate <= 0.0 {
        return 0;
    }
    (frame_rate * interval.as_secs_f64()).floor() as u64
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSummary {
    /// Number of stills transmitted to the requester.
    pub frames_emitted: u64,
    /// Wall-clock time from metadata validation to the last frame.
    pub elapsed: Duration,
}

impl SampleSummary {
    fn empty() -> Self {
        Self {
            frames_emitted: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Transient per-request state, owned exclusively by the pipeline.
struct SamplingSession {
    /// Frame-index stride between selections. Always >= 1.
    stride: u64,
    /// Source frame count as reported by the container; 0 when unknown.
    total_frames: u64,
    /// `total_frames / stride`, computed once. An estimate, not a promise.
    estimated_total: u64,
    /// Index of the frame currently being processed.
    frame_index: u64,
    /// Count of stills transmitted so far.
    emitted: u64,
    started: Instant,
}

impl SamplingSession {
    fn caption(&self) -> String {
        let ordinal = self.emitted + 1;
        match self.estimated_total {
            0 => format!("Frame {} ({ordinal}/?)", self.frame_index),
            estimated => format!("Frame {} ({ordinal}/{estimated})", self.frame_index),
        }
    }

    fn progress_text(&self) -> String {
        let percentage = if self.total_frames > 0 {
            self.frame_index as f64 / self.total_frames as f64 * 100.0
        } else {
            0.0
        };
        format!(
            "Processing... {} screenshots sent (~{percentage:.1}%)",
            self.emitted
        )
    }

    fn summary_text(&self, elapsed: Duration) -> String {
        format!(
            "Finished: sent {} screenshots in {:.2} seconds.",
            self.emitted,
            elapsed.as_secs_f64()
        )
    }
}

/// Drives one sampling request over a [`ChatTransport`].
pub struct SamplingPipeline<'a, T: ChatTransport> {
    transport: &'a T,
    config: &'a SamplerConfig,
}

impl<'a, T: ChatTransport> SamplingPipeline<'a, T> {
    /// Bind a pipeline to a transport and configuration.
    pub fn new(transport: &'a T, config: &'a SamplerConfig) -> Self {
        Self { transport, config }
    }

    /// Sample a video file and stream the stills back to `chat`.
    ///
    /// # Errors
    ///
    /// Only a failure to create the status message propagates — without it
    /// there is no channel to report on. Every other problem is reported to
    /// the requester and folded into the returned [`SampleSummary`].
    pub async fn run(
        &self,
        chat: ChatId,
        video: &Path,
    ) -> Result<SampleSummary, VidsnapError> {
        self.run_with(chat, || VideoSource::open(video)).await
    }

    /// Like [`run`](SamplingPipeline::run), but with a caller-supplied
    /// frame source.
    ///
    /// `open` is invoked after the status message exists, so an open failure
    /// can be reported in place.
    pub async fn run_with<S, F>(
        &self,
        chat: ChatId,
        open: F,
    ) -> Result<SampleSummary, VidsnapError>
    where
        S: FrameSource,
        F: FnOnce() -> Result<S, VidsnapError>,
    {
        let status = StatusMessage::create(self.transport, chat, MSG_STARTING).await?;

        let mut source = match open() {
            Ok(source) => source,
            Err(error) => {
                log::debug!("Could not open video for chat {chat}: {error}");
                status.update(MSG_OPEN_FAILED).await;
                return Ok(SampleSummary::empty());
            }
        };

        let frame_rate = source.frame_rate();
        if frame_rate <= 0.0 {
            status.update(MSG_RATE_FAILED).await;
            return Ok(SampleSummary::empty());
        }

        let stride = stride_for_interval(frame_rate, self.config.sample_interval);
        if stride == 0 {
            // Rate below one frame per interval reads as broken metadata.
            log::debug!(
                "Rejecting stride 0 for chat {chat}: {}",
                VidsnapError::UnusableFrameRate { rate: frame_rate }
            );
            status.update(MSG_RATE_FAILED).await;
            return Ok(SampleSummary::empty());
        }

        let total_frames = source.frame_count();
        let mut session = SamplingSession {
            stride,
            total_frames,
            estimated_total: total_frames / stride,
            frame_index: 0,
            emitted: 0,
            started: Instant::now(),
        };

        let walk = self
            .sample_frames(chat, &status, &mut source, &mut session)
            .await;

        // Release the decode session before finalizing.
        drop(source);

        if let Err(error) = walk {
            log::warn!("Frame extraction failed for chat {chat}: {error}");
            status
                .update(&format!("Error during frame extraction: {error}"))
                .await;
        }

        let elapsed = session.started.elapsed();
        status.update(&session.summary_text(elapsed)).await;

        Ok(SampleSummary {
            frames_emitted: session.emitted,
            elapsed,
        })
    }

    /// Walk the frame stream, emitting every `stride`-th frame.
    async fn sample_frames<S: FrameSource>(
        &self,
        chat: ChatId,
        status: &StatusMessage<'_, T>,
        source: &mut S,
        session: &mut SamplingSession,
    ) -> Result<(), VidsnapError> {
        while let Some(frame) = source.next_frame()? {
            if session.frame_index % session.stride == 0 {
                let scratch = ScratchFile::new(
                    self.config
                        .scratch_dir
                        .join(frame_scratch_name(chat, session.emitted)),
                );
                save_jpeg(&frame, scratch.path(), self.config.jpeg_quality)?;

                self.transport
                    .send_photo(chat, scratch.path(), &session.caption())
                    .await?;
                // The still's backing storage goes away with the guard.
                drop(scratch);

                session.emitted += 1;
                if session.emitted % self.config.progress_edit_every == 0 {
                    status.update(&session.progress_text()).await;
                }
            }
            session.frame_index += 1;
        }
        Ok(())
    }
}
