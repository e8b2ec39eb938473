//! # Interactive Shell
//!
//! A line-command prompt for building up a run configuration, used when the
//! command line does not supply everything. Each line is a one-letter command
//! followed by an optional argument:
//!
//! ```text
//! > i talk             input talk.mp4, output talk.pdf
//! > t 0:10 1:30 4:05   timestamps
//! > m 55               left/right margins
//! > r                  run
//! ```
//!
//! Commands are parsed into [`ShellCommand`] values and applied to a
//! [`Session`]; the side effects of `r` and `v` go through a [`ShellBackend`].

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::capture::{self, FfmpegCapture};
use crate::error::{Result, SheetError};
use crate::model::{SheetConfig, Timestamp};
use crate::sheet;

const HELP: &str = "\
Available commands:
  d <url>
  i <input file>
  o <output file>
  t <time stamps>
  m <left/right margins> (optional)
  u <top margin> (optional)
  s show settings
  c clear settings
  r run
  v view pdf-file
  h help
  q quit
";

/// One parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Download(String),
    /// Base name: sets `<name>.mp4` as input and `<name>.pdf` as output.
    Input(String),
    Output(PathBuf),
    Timestamps(Vec<Timestamp>),
    Margins(i64),
    TopMargin(i64),
    Show,
    Clear,
    Run,
    View,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Type d, i, o, t, m, u, s, c, r, v, h or q.")]
    Unknown(char),
    #[error("No {0} given.")]
    MissingArgument(&'static str),
    #[error("Incorrect argument: {0}")]
    InvalidNumber(String),
    #[error("Invalid time stamp: {0}")]
    InvalidTimestamp(String),
}

impl ShellCommand {
    /// Parse a non-empty prompt line.
    pub fn parse(line: &str) -> std::result::Result<Self, CommandError> {
        let line = line.trim();
        let mut chars = line.chars();
        let letter = chars.next().unwrap_or(' ');
        let arg = chars.as_str().trim();

        let require = |what: &'static str| {
            if arg.is_empty() {
                Err(CommandError::MissingArgument(what))
            } else {
                Ok(arg.to_string())
            }
        };
        let number = || {
            arg.parse::<i64>()
                .map_err(|_| CommandError::InvalidNumber(arg.to_string()))
        };

        Ok(match letter {
            'd' => ShellCommand::Download(require("url")?),
            'i' => ShellCommand::Input(require("input file")?),
            'o' => ShellCommand::Output(PathBuf::from(require("output file")?)),
            't' => {
                let list = require("time stamps")?;
                let stamps = Timestamp::parse_list(&list).map_err(|e| match e {
                    SheetError::InvalidTimestamp(token) => CommandError::InvalidTimestamp(token),
                    other => CommandError::InvalidTimestamp(other.to_string()),
                })?;
                ShellCommand::Timestamps(stamps)
            }
            'm' => ShellCommand::Margins(number()?),
            'u' => ShellCommand::TopMargin(number()?),
            's' => ShellCommand::Show,
            'c' => ShellCommand::Clear,
            'r' => ShellCommand::Run,
            'v' => ShellCommand::View,
            'h' => ShellCommand::Help,
            'q' => ShellCommand::Quit,
            other => return Err(CommandError::Unknown(other)),
        })
    }
}

/// The side effects the shell triggers.
pub trait ShellBackend {
    /// Download (if a URL is set) and build the PDF; return its path.
    fn run(&mut self, session: &Session) -> Result<PathBuf>;

    /// Show a finished PDF.
    fn view(&mut self, path: &Path) -> Result<()>;
}

/// Runs the real external tools.
#[derive(Debug, Default)]
pub struct ProcessBackend;

impl ShellBackend for ProcessBackend {
    fn run(&mut self, session: &Session) -> Result<PathBuf> {
        let config = &session.config;
        config.validate()?;
        let video = config.input.clone().unwrap_or_default();
        if let Some(url) = &session.url {
            capture::download_video(url, &video)?;
        }
        let mut source = FfmpegCapture::new(video);
        sheet::render_to_file(config, &mut source)
    }

    fn view(&mut self, path: &Path) -> Result<()> {
        capture::open_in_viewer(path)
    }
}

/// State accumulated across prompt lines.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: SheetConfig,
    pub url: Option<String>,
    /// The PDF written by the last successful run.
    pub last_output: Option<PathBuf>,
}

/// What the prompt loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Session {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Apply one command, printing feedback to `out`.
    pub fn apply<W, B>(&mut self, command: ShellCommand, out: &mut W, backend: &mut B) -> io::Result<Flow>
    where
        W: Write + ?Sized,
        B: ShellBackend + ?Sized,
    {
        match command {
            ShellCommand::Download(url) => {
                writeln!(out, "Video url set to: {}", url)?;
                self.url = Some(url);
            }
            ShellCommand::Input(name) => {
                let input = PathBuf::from(format!("{}.mp4", name));
                let output = PathBuf::from(format!("{}.pdf", name));
                writeln!(out, "Input file set to: {}", input.display())?;
                writeln!(out, "Output file set to: {}", output.display())?;
                self.config.input = Some(input);
                self.config.output = Some(output);
            }
            ShellCommand::Output(path) => {
                writeln!(out, "Output file set to: {}", path.display())?;
                self.config.output = Some(path);
            }
            ShellCommand::Timestamps(stamps) => {
                writeln!(out, "{} time stamps set.", stamps.len())?;
                self.config.timestamps = stamps;
            }
            ShellCommand::Margins(m) => {
                writeln!(out, "Margins set to: {}", m)?;
                self.config.margin = m;
            }
            ShellCommand::TopMargin(m) => {
                writeln!(out, "Top margin set to: {}", m)?;
                self.config.top_margin = m;
            }
            ShellCommand::Show => self.show(out)?,
            ShellCommand::Clear => {
                writeln!(out, "Clearing all settings.")?;
                self.config.input = None;
                self.config.output = None;
                self.config.timestamps.clear();
                self.config.margin = 0;
                self.config.top_margin = 0;
                self.last_output = None;
            }
            ShellCommand::Run => self.run(out, backend)?,
            ShellCommand::View => match &self.last_output {
                Some(path) => {
                    if let Err(e) = backend.view(path) {
                        writeln!(out, "Failed to open file: {}", e)?;
                    }
                }
                None => writeln!(out, "No output file set.")?,
            },
            ShellCommand::Help => write!(out, "{}", HELP)?,
            ShellCommand::Quit => {
                writeln!(out, "Quitting.")?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn run<W, B>(&mut self, out: &mut W, backend: &mut B) -> io::Result<()>
    where
        W: Write + ?Sized,
        B: ShellBackend + ?Sized,
    {
        if self.url.is_some() && self.config.input.is_none() {
            return writeln!(out, "Missing filename for download.");
        }
        if self.config.validate().is_err() {
            return writeln!(out, "Not all mandatory parameters are set.");
        }
        writeln!(out, "Creating PDF...")?;
        match backend.run(self) {
            Ok(path) => {
                writeln!(out, "PDF created: {}", path.display())?;
                writeln!(out, "You can change parameters and run again.")?;
                self.last_output = Some(path);
            }
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
        Ok(())
    }

    fn show<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let or_unset = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "Not set.".to_string())
        };
        writeln!(out, "Settings:")?;
        writeln!(out, "  URL: {}", self.url.as_deref().unwrap_or("Not set."))?;
        writeln!(out, "  Input file: {}", or_unset(&self.config.input))?;
        writeln!(out, "  Output file: {}", or_unset(&self.config.output))?;
        writeln!(out, "  Margins: {}", self.config.margin)?;
        writeln!(out, "  Top margin: {}", self.config.top_margin)?;
        if self.config.timestamps.is_empty() {
            writeln!(out, "  Time stamps: No time stamps set.")
        } else {
            let stamps = self
                .config
                .timestamps
                .iter()
                .map(Timestamp::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "  Time stamps: {}", stamps)
        }
    }
}

/// Read commands from `input` until `q` or end of input.
pub fn run_shell<R, W, B>(input: R, out: &mut W, session: &mut Session, backend: &mut B) -> io::Result<()>
where
    R: BufRead,
    W: Write + ?Sized,
    B: ShellBackend + ?Sized,
{
    writeln!(out, "Welcome to video2pdf!")?;
    write!(out, "{}", HELP)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };
        if line.trim().is_empty() {
            continue;
        }
        match ShellCommand::parse(&line) {
            Ok(command) => {
                if session.apply(command, out, backend)? == Flow::Quit {
                    return Ok(());
                }
            }
            Err(e) => writeln!(out, "{}", e)?,
        }
    }
}
