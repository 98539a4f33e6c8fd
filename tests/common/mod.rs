//! Shared test doubles: a recording [`ChatTransport`] and scripted frame
//! sources. The seams make every pipeline property testable without fixture
//! videos.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use image::{DynamicImage, Rgb, RgbImage};
use vidsnap::{
    ChatId, ChatTransport, FileRef, FrameSource, MessageId, TransportError, VidsnapError,
};

/// One observed transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message {
        text: String,
    },
    Edit {
        message: MessageId,
        text: String,
    },
    Photo {
        path: PathBuf,
        caption: String,
        /// Whether the photo file existed at transmission time.
        existed: bool,
    },
    Download {
        file_id: String,
        dest: PathBuf,
    },
}

/// Recording transport with injectable failures.
///
/// Failure knobs are all off by default; enable them per test with the
/// `failing_*` constructors below.
pub struct MockTransport {
    events: Mutex<Vec<Event>>,
    next_message_id: AtomicI64,
    photo_calls: AtomicU64,
    /// Fail the Nth `send_photo` call (1-based).
    pub fail_photo_at: Option<u64>,
    /// Every `download_file` call fails.
    pub fail_downloads: bool,
    /// Every `edit_message` call fails with an API error.
    pub fail_edits: bool,
    /// Reject an edit whose text matches the last accepted edit, the way
    /// real chat APIs do.
    pub strict_edits: bool,
    last_edit: Mutex<Option<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_message_id: AtomicI64::new(1),
            photo_calls: AtomicU64::new(0),
            fail_photo_at: None,
            fail_downloads: false,
            fail_edits: false,
            strict_edits: false,
            last_edit: Mutex::new(None),
        }
    }

    pub fn failing_photo_at(n: u64) -> Self {
        Self {
            fail_photo_at: Some(n),
            ..Self::new()
        }
    }

    pub fn failing_downloads() -> Self {
        Self {
            fail_downloads: true,
            ..Self::new()
        }
    }

    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::new()
        }
    }

    pub fn strict() -> Self {
        Self {
            strict_edits: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Message { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn photos(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, Event::Photo { .. }))
            .collect()
    }

    pub fn photo_captions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Photo { caption, .. } => Some(caption),
                _ => None,
            })
            .collect()
    }

    pub fn download_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::Download { .. }))
            .count()
    }
}

impl ChatTransport for MockTransport {
    async fn send_message(&self, _chat: ChatId, text: &str) -> Result<MessageId, TransportError> {
        self.events.lock().unwrap().push(Event::Message {
            text: text.to_string(),
        });
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        Ok(MessageId(id))
    }

    async fn edit_message(
        &self,
        _chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        if self.fail_edits {
            return Err(TransportError::Api("edit rejected".to_string()));
        }
        if self.strict_edits {
            let mut last = self.last_edit.lock().unwrap();
            if last.as_deref() == Some(text) {
                return Err(TransportError::NotModified);
            }
            *last = Some(text.to_string());
        }
        self.events.lock().unwrap().push(Event::Edit {
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat: ChatId,
        photo: &Path,
        caption: &str,
    ) -> Result<(), TransportError> {
        let call = self.photo_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_photo_at == Some(call) {
            return Err(TransportError::Api("photo upload failed".to_string()));
        }
        self.events.lock().unwrap().push(Event::Photo {
            path: photo.to_path_buf(),
            caption: caption.to_string(),
            existed: photo.exists(),
        });
        Ok(())
    }

    async fn download_file(&self, file: &FileRef, dest: &Path) -> Result<(), TransportError> {
        if self.fail_downloads {
            return Err(TransportError::Api("file retrieval failed".to_string()));
        }
        std::fs::write(dest, b"not a real video")?;
        self.events.lock().unwrap().push(Event::Download {
            file_id: file.id.clone(),
            dest: dest.to_path_buf(),
        });
        Ok(())
    }
}

/// A scripted [`FrameSource`]: reports fixed metadata and yields a fixed
/// number of tiny frames, optionally failing partway through.
pub struct ScriptedSource {
    frame_rate: f64,
    frame_count: u64,
    frames_to_yield: u64,
    yielded: u64,
    /// Return a decode error instead of the frame with this index.
    fail_at: Option<u64>,
}

impl ScriptedSource {
    pub fn new(frame_rate: f64, frame_count: u64) -> Self {
        Self {
            frame_rate,
            frame_count,
            frames_to_yield: frame_count,
            yielded: 0,
            fail_at: None,
        }
    }

    /// Yield a different number of frames than the reported count.
    pub fn yielding(mut self, frames: u64) -> Self {
        self.frames_to_yield = frames;
        self
    }

    /// Fail when asked for the frame with this index.
    pub fn failing_at(mut self, index: u64) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl FrameSource for ScriptedSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, VidsnapError> {
        if self.fail_at == Some(self.yielded) {
            return Err(VidsnapError::VideoDecode(
                "scripted decode failure".to_string(),
            ));
        }
        if self.yielded >= self.frames_to_yield {
            return Ok(None);
        }
        self.yielded += 1;
        Ok(Some(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            8,
            8,
            Rgb([0, 128, 255]),
        ))))
    }
}
