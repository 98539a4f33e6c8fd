//! Ingress-handler and dispatch integration tests.

mod common;

use common::{Event, MockTransport};
use vidsnap::{
    ChatId, Command, FileRef, Inbound, MAX_UPLOAD_BYTES, SamplerConfig, VideoAttachment, dispatch,
    ingress,
};

const CHAT: ChatId = ChatId(42);

fn attachment(size_bytes: u64) -> VideoAttachment {
    VideoAttachment {
        file: FileRef::new("filetoken"),
        size_bytes,
    }
}

fn config_in(dir: &tempfile::TempDir) -> SamplerConfig {
    SamplerConfig::new(dir.path())
}

fn scratch_is_empty(dir: &tempfile::TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

// ── Size gate ──────────────────────────────────────────────────────

#[tokio::test]
async fn oversized_upload_is_rejected_without_retrieval() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::new();

    ingress::handle_video(&transport, &config, CHAT, &attachment(MAX_UPLOAD_BYTES + 1))
        .await
        .unwrap();

    assert_eq!(
        transport.messages(),
        vec!["Video is too large. The maximum supported size is 50 MB.".to_string()]
    );
    assert_eq!(transport.download_count(), 0);
    assert!(transport.edits().is_empty());
    assert!(scratch_is_empty(&scratch));
}

#[tokio::test]
async fn upload_at_exactly_the_limit_is_accepted() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::new();

    ingress::handle_video(&transport, &config, CHAT, &attachment(MAX_UPLOAD_BYTES))
        .await
        .unwrap();

    assert_eq!(transport.download_count(), 1);
}

// ── Download failures ──────────────────────────────────────────────

#[tokio::test]
async fn download_failure_reports_and_skips_pipeline() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::failing_downloads();

    ingress::handle_video(&transport, &config, CHAT, &attachment(1024))
        .await
        .unwrap();

    let messages = transport.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "Downloading video... Please wait.");
    assert!(messages[1].starts_with("An error occurred while downloading: "));

    // The pipeline never ran: no status message, no edits, no photos.
    assert!(transport.edits().is_empty());
    assert!(transport.photos().is_empty());
    assert!(scratch_is_empty(&scratch));
}

// ── Full flow ──────────────────────────────────────────────────────

#[tokio::test]
async fn transient_notices_bracket_the_download() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::new();

    // The mock "downloads" garbage bytes, so the pipeline opens the scratch
    // file, fails, and reports in place — which is exactly the shape of a
    // real request up to decoding.
    ingress::handle_video(&transport, &config, CHAT, &attachment(1024))
        .await
        .unwrap();

    let messages = transport.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], "Downloading video... Please wait.");
    assert_eq!(messages[1], "Video downloaded. Starting processing...");
    assert_eq!(
        messages[2],
        "Starting video processing and frame extraction..."
    );

    assert_eq!(
        transport.edits(),
        vec!["Error: could not open the video file.".to_string()]
    );

    // Scratch video is namespaced by chat and file token, and gone afterward.
    let downloads: Vec<_> = transport
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::Download { dest, .. } => Some(dest),
            _ => None,
        })
        .collect();
    assert_eq!(downloads.len(), 1);
    assert_eq!(
        downloads[0].file_name().unwrap().to_str().unwrap(),
        "42_filetoken.mp4"
    );
    assert!(scratch_is_empty(&scratch));
}

// ── Dispatch ───────────────────────────────────────────────────────

#[tokio::test]
async fn start_command_sends_welcome() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::new();

    dispatch::dispatch(&transport, &config, CHAT, Inbound::Command(Command::Start))
        .await
        .unwrap();

    assert_eq!(
        transport.messages(),
        vec![
            "Hello! Send me a video and I will extract a still frame every 0.5 seconds \
             and send the frames back, with live status updates."
                .to_string()
        ]
    );
}

#[tokio::test]
async fn non_video_gets_instructional_reply() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::new();

    dispatch::dispatch(&transport, &config, CHAT, Inbound::Other)
        .await
        .unwrap();

    assert_eq!(
        transport.messages(),
        vec!["Please send a video file.".to_string()]
    );
}

#[tokio::test]
async fn video_routes_through_the_ingress_handler() {
    let scratch = tempfile::tempdir().unwrap();
    let config = config_in(&scratch);
    let transport = MockTransport::new();

    dispatch::dispatch(
        &transport,
        &config,
        CHAT,
        Inbound::Video(attachment(MAX_UPLOAD_BYTES + 1)),
    )
    .await
    .unwrap();

    assert_eq!(
        transport.messages(),
        vec!["Video is too large. The maximum supported size is 50 MB.".to_string()]
    );
}
