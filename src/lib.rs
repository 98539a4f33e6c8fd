//! # vidsnap
//!
//! Chat-bot pipeline that samples still frames from an uploaded video and
//! streams them back to the requester as captioned JPEG images, with live
//! progress reported through a single in-place-edited status message.
//!
//! The crate deliberately does not speak to any messaging service itself.
//! The embedding bot implements [`ChatTransport`] with its client library of
//! choice and feeds parsed updates into [`dispatch`](dispatch::dispatch);
//! everything from size validation to the final summary edit happens here.
//! Video decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate, behind the
//! [`FrameSource`] seam.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidsnap::{ChatId, SamplerConfig, SamplingPipeline};
//! # async fn example<T: vidsnap::ChatTransport>(transport: T) -> Result<(), vidsnap::VidsnapError> {
//! let config = SamplerConfig::new("temp_videos");
//! config.ensure_scratch_dir()?;
//!
//! let pipeline = SamplingPipeline::new(&transport, &config);
//! let summary = pipeline.run(ChatId(1234), "upload.mp4".as_ref()).await?;
//! println!("sent {} stills", summary.frames_emitted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Handling updates
//!
//! ```no_run
//! use vidsnap::{ChatId, Inbound, SamplerConfig, dispatch};
//! # async fn example<T: vidsnap::ChatTransport>(transport: T, inbound: Inbound) -> Result<(), vidsnap::VidsnapError> {
//! let config = SamplerConfig::new("temp_videos");
//! config.ensure_scratch_dir()?;
//! dispatch::dispatch(&transport, &config, ChatId(1234), inbound).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Behavior
//!
//! - **Sampling** — one frame every 0.5 s of source time: frame indices
//!   `{0, stride, 2·stride, …}` with `stride = floor(fps × 0.5)`, emitted
//!   strictly in increasing order.
//! - **Stills** — quality-95 JPEG, captioned with the source frame index and
//!   the ordinal among the estimated total selections.
//! - **Progress** — one editable status message per request, updated every
//!   5th emitted frame and finalized with a count + elapsed-time summary.
//! - **Limits** — uploads over 50 MiB are rejected before retrieval.
//! - **Cleanup** — the downloaded video and every per-frame still are
//!   scratch files removed on every exit path.
//! - **Failure containment** — an error ends its own request only; partial
//!   results already sent stay sent, and every network call is attempted
//!   exactly once (no retries).
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system; see the
//! `ffmpeg-next` documentation for platform specifics.

pub mod config;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod ingress;
pub mod pipeline;
pub mod progress;
pub mod scratch;
pub mod transport;
pub mod video;

pub use config::{
    JPEG_QUALITY, MAX_UPLOAD_BYTES, PROGRESS_EDIT_EVERY, SAMPLE_INTERVAL, SamplerConfig,
};
pub use error::VidsnapError;
pub use pipeline::{SampleSummary, SamplingPipeline, stride_for_interval};
pub use progress::StatusMessage;
pub use scratch::ScratchFile;
pub use transport::{
    ChatId, ChatTransport, Command, FileRef, Inbound, MessageId, TransportError, VideoAttachment,
};
pub use video::{FrameSource, VideoSource};
