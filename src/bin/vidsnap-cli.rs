use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicI64, AtomicU64, Ordering},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::ProgressBar;
use serde_json::json;
use vidsnap::{
    ChatId, ChatTransport, FileRef, FrameSource, MessageId, SAMPLE_INTERVAL, SamplerConfig,
    TransportError, VideoAttachment, VideoSource, ingress, stride_for_interval,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidsnap probe input.mp4 --json\n  vidsnap sample input.mp4 --out stills --verbose\n  vidsnap completions zsh > _vidsnap";

#[derive(Debug, Parser)]
#[command(
    name = "vidsnap",
    version,
    about = "Sample still frames from a video the way the bot pipeline would",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Show additional output (frame captions, per-file notes).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print sampling metadata for a video file.
    #[command(
        about = "Print frame rate, frame count, and the derived sampling plan",
        after_help = "Examples:\n  vidsnap probe input.mp4\n  vidsnap probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the full ingress + sampling pipeline against local directories.
    #[command(
        about = "Extract stills every 0.5 s into a directory",
        after_help = "Examples:\n  vidsnap sample input.mp4 --out stills\n  vidsnap sample input.mp4 --out stills --json"
    )]
    Sample {
        /// Input video path.
        input: PathBuf,

        /// Output directory for the sampled stills.
        #[arg(long)]
        out: PathBuf,

        /// Scratch directory (defaults to a `vidsnap` dir under the system
        /// temp directory).
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Output a machine-readable JSON summary.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Estimated number of stills a sampling run will emit.
fn estimated_stills(frame_count: u64, stride: u64) -> u64 {
    if stride == 0 { 0 } else { frame_count / stride }
}

/// A [`ChatTransport`] backed by the local filesystem and terminal.
///
/// "Downloads" copy the local input file, photos land in the output
/// directory, the editable status message renders as a spinner line, and
/// plain messages print to stderr.
struct LocalTransport {
    out_dir: PathBuf,
    status: ProgressBar,
    verbose: bool,
    next_message_id: AtomicI64,
    photos_sent: AtomicU64,
}

impl LocalTransport {
    fn new(out_dir: PathBuf, verbose: bool) -> Self {
        Self {
            out_dir,
            status: ProgressBar::new_spinner(),
            verbose,
            next_message_id: AtomicI64::new(1),
            photos_sent: AtomicU64::new(0),
        }
    }

    /// Tear down the status line and return how many photos were "sent".
    fn finish(&self) -> u64 {
        self.status.finish_and_clear();
        self.photos_sent.load(Ordering::Relaxed)
    }
}

impl ChatTransport for LocalTransport {
    async fn send_message(&self, _chat: ChatId, text: &str) -> Result<MessageId, TransportError> {
        self.status.suspend(|| {
            eprintln!("{} {text}", "bot:".blue().bold());
        });
        let id = self.next_message_id.fetch_add(1, Ordering::Relaxed);
        Ok(MessageId(id))
    }

    async fn edit_message(
        &self,
        _chat: ChatId,
        _message: MessageId,
        text: &str,
    ) -> Result<(), TransportError> {
        self.status.set_message(text.to_string());
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat: ChatId,
        photo: &Path,
        caption: &str,
    ) -> Result<(), TransportError> {
        let name = photo
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "frame.jpg".into());
        let dest = self.out_dir.join(name);
        tokio::fs::copy(photo, &dest).await?;
        self.photos_sent.fetch_add(1, Ordering::Relaxed);
        if self.verbose {
            self.status.suspend(|| {
                eprintln!("{} {} ({caption})", "photo:".cyan().bold(), dest.display());
            });
        }
        Ok(())
    }

    async fn download_file(&self, file: &FileRef, dest: &Path) -> Result<(), TransportError> {
        tokio::fs::copy(Path::new(&file.id), dest).await?;
        Ok(())
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { input, json } => {
            let source = VideoSource::open(&input)?;
            let frame_rate = source.frame_rate();
            let frame_count = source.frame_count();
            let stride = stride_for_interval(frame_rate, SAMPLE_INTERVAL);
            let stills = estimated_stills(frame_count, stride);

            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "frame_rate": frame_rate,
                    "frame_count": frame_count,
                    "sample_interval_seconds": SAMPLE_INTERVAL.as_secs_f64(),
                    "stride": stride,
                    "estimated_stills": stills,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Frame rate: {frame_rate:.2} fps");
                println!("Frame count: {frame_count}");
                if stride == 0 {
                    println!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        "frame rate too low to derive a sampling stride".yellow()
                    );
                } else {
                    println!(
                        "Sampling plan: every {stride} frames, ~{stills} still(s)"
                    );
                }
            }
        }
        Commands::Sample {
            input,
            out,
            scratch_dir,
            json,
        } => {
            fs::create_dir_all(&out)?;
            let scratch = scratch_dir.unwrap_or_else(|| env::temp_dir().join("vidsnap"));
            let config = SamplerConfig::new(scratch);
            config.ensure_scratch_dir()?;

            let size_bytes = fs::metadata(&input)?.len();
            let attachment = VideoAttachment {
                file: FileRef::new(input.display().to_string()),
                size_bytes,
            };

            let transport = LocalTransport::new(out.clone(), cli.verbose);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(ingress::handle_video(
                &transport,
                &config,
                ChatId(0),
                &attachment,
            ))?;

            let stills = transport.finish();
            if json {
                let payload = json!({
                    "stills": stills,
                    "out_dir": out.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!("Saved {stills} still(s) to {}", out.display()).green()
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidsnap", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
