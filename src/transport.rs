//! The chat-transport seam.
//!
//! `vidsnap` never talks to a messaging service directly. Everything it needs
//! from one — sending text, editing a status message in place, sending a
//! photo, downloading an uploaded file — is expressed by the [`ChatTransport`]
//! trait, and the embedding bot supplies the implementation backed by its
//! client library.
//!
//! Every trait method is a suspension point and is attempted exactly once:
//! there is no retry policy anywhere in this crate. Implementations should
//! apply whatever timeout their client library defaults to.
//!
//! The one error class the pipeline treats specially is
//! [`TransportError::NotModified`]: editing a message with text identical to
//! what it already shows. Some services reject such edits outright, so
//! implementations are expected to map that rejection to `NotModified`;
//! the pipeline absorbs it silently.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;
use std::path::Path;

use thiserror::Error;

/// Opaque identifier of a conversation/channel.
///
/// Doubles as the requester identity used to namespace scratch files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl Display for ChatId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a previously sent message, used for in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// A retrievable content handle for an uploaded file.
///
/// The `id` is assigned by the messaging service and is unique per upload,
/// which makes it the content-unique token in scratch file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Service-assigned file identifier.
    pub id: String,
}

impl FileRef {
    /// Wrap a service-assigned file identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Descriptor of an inbound video attachment.
#[derive(Debug, Clone)]
pub struct VideoAttachment {
    /// Handle used to retrieve the video bytes.
    pub file: FileRef,
    /// Declared size of the upload in bytes.
    pub size_bytes: u64,
}

/// A bot command the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start` — greet the user and describe usage.
    Start,
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that
    /// is not a recognised command.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().split_whitespace().next()? {
            "/start" => Some(Command::Start),
            _ => None,
        }
    }
}

/// A parsed inbound message, as handed to [`dispatch`](crate::dispatch::dispatch).
///
/// The embedding bot converts its client library's update type into this
/// enum before calling in.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A recognised command.
    Command(Command),
    /// A video attachment.
    Video(VideoAttachment),
    /// Anything else (text, stickers, photos, …).
    Other,
}

/// Errors surfaced by [`ChatTransport`] implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// An edit was rejected because the message already shows that text.
    ///
    /// This is the only error class the pipeline swallows.
    #[error("Message is not modified")]
    NotModified,

    /// The messaging service rejected or failed the call.
    #[error("Transport API error: {0}")]
    Api(String),

    /// Local I/O failed while writing a downloaded file.
    #[error("Transport I/O error: {0}")]
    Io(#[from] IoError),
}

/// Async interface to the messaging service.
///
/// One logical task drives each request, so implementations never see two
/// concurrent calls for the same chat from this crate. Methods take `&self`;
/// client libraries are typically internally synchronised.
pub trait ChatTransport {
    /// Send a plain-text message. Returns the handle needed to edit it later.
    fn send_message(
        &self,
        chat: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<MessageId, TransportError>>;

    /// Replace the text of a previously sent message in place.
    ///
    /// Must map the service's "message is not modified" rejection to
    /// [`TransportError::NotModified`].
    fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Send an image read from a local file, with a short caption.
    fn send_photo(
        &self,
        chat: ChatId,
        photo: &Path,
        caption: &str,
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Retrieve an uploaded file's bytes into `dest`.
    fn download_file(
        &self,
        file: &FileRef,
        dest: &Path,
    ) -> impl Future<Output = Result<(), TransportError>>;
}
