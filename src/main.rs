//! # video2pdf CLI
//!
//! Usage:
//!   video2pdf -i talk.mp4 -o talk.pdf -t 0:10 1:30 4:05
//!   video2pdf --config sheet.json
//!   video2pdf            (interactive prompt)
//!
//! Anything the command line leaves out (input, output or timestamps) drops
//! into the interactive prompt with the given values pre-filled.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use video2pdf::capture::{self, FfmpegCapture};
use video2pdf::font::StandardFont;
use video2pdf::shell::{self, ProcessBackend, Session};
use video2pdf::{render_to_file, Result, SheetConfig, Timestamp};

const CLI_AFTER_HELP: &str = "Examples:\n  video2pdf -i talk.mp4 -o talk.pdf -t 0:10 1:30 4:05\n  video2pdf -i talk.mp4 -o talk.pdf -m 55 -u 20 -t 90 180\n  video2pdf --url https://example.com/v -i talk.mp4 -o talk.pdf -t 0:30";

#[derive(Debug, Parser)]
#[command(
    name = "video2pdf",
    version,
    about = "Capture video frames at timestamps and lay them out as a PDF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video file.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output PDF name; a bare name is written next to the input video.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Timestamps to capture (m:ss, h:mm:ss or seconds).
    #[arg(short, long, num_args = 1..)]
    timestamps: Vec<Timestamp>,

    /// Left and right margins in points.
    #[arg(short, long)]
    margins: Option<i64>,

    /// Top margin in points.
    #[arg(short = 'u', long, visible_alias = "top_margin")]
    top_margin: Option<i64>,

    /// Download the input video from this URL first (needs yt-dlp).
    #[arg(short = 'd', long)]
    url: Option<String>,

    /// JSON configuration file; command-line values override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page number font (Helvetica, Times-Roman, Courier).
    #[arg(long)]
    font: Option<StandardFont>,

    /// Page number font size in points.
    #[arg(long)]
    font_size: Option<f64>,

    /// Show debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<(SheetConfig, Option<String>)> {
        let mut config = match &self.config {
            Some(path) => SheetConfig::load(path)?,
            None => SheetConfig::default(),
        };
        if self.input.is_some() {
            config.input = self.input;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if !self.timestamps.is_empty() {
            config.timestamps = self.timestamps;
        }
        if let Some(m) = self.margins {
            config.margin = m;
        }
        if let Some(u) = self.top_margin {
            config.top_margin = u;
        }
        if let Some(font) = self.font {
            config.font = font;
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        Ok((config, self.url))
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, url) = cli.into_config()?;

    if config.validate().is_err() {
        let mut session = Session::new(config);
        session.url = url;
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        shell::run_shell(stdin.lock(), &mut stdout, &mut session, &mut ProcessBackend)?;
        return Ok(());
    }

    let video = config.input.clone().unwrap_or_default();
    if let Some(url) = &url {
        capture::download_video(url, &video)?;
    }
    let mut source = FfmpegCapture::new(video);
    let path = render_to_file(&config, &mut source)?;
    eprintln!("✓ Written {}", path.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}
