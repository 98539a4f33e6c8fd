//! The progress-notification handle.
//!
//! Each sampling request owns exactly one [`StatusMessage`]: a single status
//! line in the chat, created at request start, edited in place as work
//! progresses, and finalized exactly once with a terminal summary. Editing
//! instead of re-sending keeps long extractions from flooding the channel.
//!
//! Edit failures never abort a request. The transport may reject an edit
//! whose text matches what the message already shows
//! ([`TransportError::NotModified`]); that class is absorbed silently, and
//! any other edit failure is logged for operator visibility.

use crate::transport::{ChatId, ChatTransport, MessageId, TransportError};

/// One request's editable status line.
///
/// Edits are strictly ordered: a request is driven by a single logical task,
/// so no two edits are ever in flight at once.
pub struct StatusMessage<'a, T: ChatTransport> {
    transport: &'a T,
    chat: ChatId,
    message: MessageId,
}

impl<'a, T: ChatTransport> StatusMessage<'a, T> {
    /// Send the initial status text and capture the edit handle.
    ///
    /// # Errors
    ///
    /// Propagates the send failure — without a message there is nothing to
    /// report progress on, so the caller must handle this one.
    pub async fn create(
        transport: &'a T,
        chat: ChatId,
        text: &str,
    ) -> Result<StatusMessage<'a, T>, TransportError> {
        let message = transport.send_message(chat, text).await?;
        Ok(Self {
            transport,
            chat,
            message,
        })
    }

    /// Replace the status text in place.
    ///
    /// Infallible by policy: a `NotModified` rejection is absorbed, any
    /// other failure is logged and otherwise ignored.
    pub async fn update(&self, text: &str) {
        match self.transport.edit_message(self.chat, self.message, text).await {
            Ok(()) | Err(TransportError::NotModified) => {}
            Err(error) => log::warn!("Failed to update status message: {error}"),
        }
    }

    /// The handle of the underlying chat message.
    pub fn id(&self) -> MessageId {
        self.message
    }
}
