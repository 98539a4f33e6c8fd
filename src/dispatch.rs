//! Inbound message routing.

use crate::config::SamplerConfig;
use crate::error::VidsnapError;
use crate::ingress;
use crate::transport::{ChatId, ChatTransport, Command, Inbound};

const MSG_WELCOME: &str = "Hello! Send me a video and I will extract a still frame \
every 0.5 seconds and send the frames back, with live status updates.";
const MSG_NOT_A_VIDEO: &str = "Please send a video file.";

/// Route one parsed inbound message.
///
/// Failures are contained at this boundary: a broken request never takes
/// down the process or other requests.
///
/// # Errors
///
/// Propagates only transport failures on the plain-text replies; the video
/// path reports its own problems to the requester.
pub async fn dispatch<T: ChatTransport>(
    transport: &T,
    config: &SamplerConfig,
    chat: ChatId,
    inbound: Inbound,
) -> Result<(), VidsnapError> {
    match inbound {
        Inbound::Command(Command::Start) => {
            transport.send_message(chat, MSG_WELCOME).await?;
            Ok(())
        }
        Inbound::Video(attachment) => {
            ingress::handle_video(transport, config, chat, &attachment).await
        }
        Inbound::Other => {
            transport.send_message(chat, MSG_NOT_A_VIDEO).await?;
            Ok(())
        }
    }
}
