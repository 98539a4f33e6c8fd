//! The ingress handler.
//!
//! Accepts an inbound video attachment, validates its declared size, pulls
//! the bytes into a namespaced scratch file, and hands the file to the
//! sampling pipeline. The scratch file is removed when the request ends, on
//! every path — success, download failure, or a pipeline error.

use crate::config::SamplerConfig;
use crate::error::VidsnapError;
use crate::pipeline::SamplingPipeline;
use crate::scratch::{ScratchFile, video_scratch_name};
use crate::transport::{ChatId, ChatTransport, VideoAttachment};

const MSG_TOO_LARGE: &str = "Video is too large. The maximum supported size is 50 MB.";
const MSG_DOWNLOADING: &str = "Downloading video... Please wait.";
const MSG_DOWNLOADED: &str = "Video downloaded. Starting processing...";

/// Handle one inbound video attachment end to end.
///
/// Oversized uploads are rejected before any retrieval call. Download
/// failures are reported to the requester and the pipeline is never
/// invoked. A pipeline error that escapes (the status message could not be
/// created) is reported with a generic processing-error message.
///
/// # Errors
///
/// Returns an error only when even the plain-text replies cannot be sent —
/// at that point there is no way left to talk to the requester.
pub async fn handle_video<T: ChatTransport>(
    transport: &T,
    config: &SamplerConfig,
    chat: ChatId,
    attachment: &VideoAttachment,
) -> Result<(), VidsnapError> {
    if attachment.size_bytes > config.max_upload_bytes {
        transport.send_message(chat, MSG_TOO_LARGE).await?;
        return Ok(());
    }

    transport.send_message(chat, MSG_DOWNLOADING).await?;

    let scratch = ScratchFile::new(
        config
            .scratch_dir
            .join(video_scratch_name(chat, &attachment.file.id)),
    );

    if let Err(error) = transport.download_file(&attachment.file, scratch.path()).await {
        log::warn!("Download failed for chat {chat}: {error}");
        transport
            .send_message(chat, &format!("An error occurred while downloading: {error}"))
            .await?;
        return Ok(());
    }

    transport.send_message(chat, MSG_DOWNLOADED).await?;

    let pipeline = SamplingPipeline::new(transport, config);
    if let Err(error) = pipeline.run(chat, scratch.path()).await {
        log::warn!("Pipeline failed for chat {chat}: {error}");
        transport
            .send_message(
                chat,
                &format!("An error occurred during processing: {error}"),
            )
            .await?;
    }

    // `scratch` drops here: the downloaded video is removed whatever happened.
    Ok(())
}
