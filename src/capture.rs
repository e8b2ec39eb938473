//! # External Processes
//!
//! Frame capture, video download and "open the result" all shell out to
//! existing tools: `ffmpeg`, `yt-dlp` and the platform's file opener. Each
//! command is built with [`Command`] arguments, never by string formatting,
//! so paths with spaces or quotes pass through untouched.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{Result, SheetError};
use crate::model::Timestamp;

/// Produces one JPEG frame per timestamp.
pub trait FrameSource {
    /// Capture the frame at `at` and return the JPEG bytes.
    fn capture(&mut self, at: Timestamp) -> Result<Vec<u8>>;
}

/// Captures frames by running `ffmpeg` once per timestamp.
#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    program: OsString,
    video: PathBuf,
    scratch: PathBuf,
}

impl FfmpegCapture {
    /// Capture from `video` using the `ffmpeg` found on `PATH`.
    pub fn new(video: impl Into<PathBuf>) -> Self {
        let scratch = std::env::temp_dir().join(format!("video2pdf-{}.jpg", std::process::id()));
        Self {
            program: OsString::from("ffmpeg"),
            video: video.into(),
            scratch,
        }
    }

    /// Use a different ffmpeg executable.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Write the intermediate JPEG somewhere other than the temp directory.
    pub fn with_scratch_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scratch = path.into();
        self
    }

    pub fn scratch_path(&self) -> &Path {
        &self.scratch
    }

    /// The full argument list passed to ffmpeg for one capture.
    pub fn arguments(&self, at: Timestamp) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            at.seconds().to_string().into(),
            "-i".into(),
            self.video.clone().into_os_string(),
            "-frames:v".into(),
            "1".into(),
            "-q:v".into(),
            "1".into(),
            self.scratch.clone().into_os_string(),
        ]
    }

    /// Remove the intermediate JPEG, complete or partial, if one was written.
    fn discard_scratch(&self) {
        if !self.scratch.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.scratch) {
            log::warn!("Could not remove {}: {}", self.scratch.display(), e);
        }
    }
}

impl FrameSource for FfmpegCapture {
    fn capture(&mut self, at: Timestamp) -> Result<Vec<u8>> {
        log::debug!("Capturing frame at {} from {}", at, self.video.display());

        let output = Command::new(&self.program)
            .args(self.arguments(at))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SheetError::Capture {
                seconds: at.seconds(),
                reason: format!("failed to run {}: {}", self.program.to_string_lossy(), e),
            })?;
        let captured = check_status(&output).and_then(|()| {
            std::fs::read(&self.scratch)
                .map_err(|e| format!("no frame written to {}: {}", self.scratch.display(), e))
        });
        self.discard_scratch();
        captured.map_err(|reason| SheetError::Capture {
            seconds: at.seconds(),
            reason,
        })
    }
}

/// Download `url` as MP4 into `dest` with `yt-dlp`.
pub fn download_video(url: &str, dest: &Path) -> Result<()> {
    log::info!("Downloading {} to {}", url, dest.display());

    let output = Command::new("yt-dlp")
        .arg("-f")
        .arg("mp4")
        .arg("-o")
        .arg(dest)
        .arg(url)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SheetError::Download {
            url: url.to_string(),
            reason: format!("failed to run yt-dlp: {}", e),
        })?;
    check_status(&output).map_err(|reason| SheetError::Download {
        url: url.to_string(),
        reason,
    })
}

/// Open `path` with the platform's default application.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    let status = command.arg(path).status()?;
    if !status.success() {
        log::warn!("Viewer exited with {} for {}", status, path.display());
    }
    Ok(())
}

/// Turn a non-zero exit into an error message carrying the tool's stderr.
fn check_status(output: &Output) -> std::result::Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        Err(format!("exited with {}", output.status))
    } else {
        Err(format!("exited with {}: {}", output.status, stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_arguments() {
        let capture = FfmpegCapture::new("/videos/my talk.mp4").with_scratch_path("/tmp/frame.jpg");
        let args: Vec<String> = capture
            .arguments(Timestamp(75))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-y", "-loglevel", "error", "-ss", "75", "-i", "/videos/my talk.mp4",
                "-frames:v", "1", "-q:v", "1", "/tmp/frame.jpg",
            ]
        );
    }

    #[test]
    fn test_default_scratch_in_temp_dir() {
        let capture = FfmpegCapture::new("a.mp4");
        assert!(capture.scratch_path().starts_with(std::env::temp_dir()));
        assert_eq!(capture.scratch_path().extension().unwrap(), "jpg");
    }

    #[test]
    fn test_missing_program_is_capture_error() {
        let mut capture = FfmpegCapture::new("a.mp4").with_program("video2pdf-no-such-ffmpeg");
        match capture.capture(Timestamp(3)) {
            Err(SheetError::Capture { seconds, reason }) => {
                assert_eq!(seconds, 3);
                assert!(reason.contains("video2pdf-no-such-ffmpeg"));
            }
            other => panic!("expected capture error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-ffmpeg");
        std::fs::write(&script, format!("#!/bin/sh\nfor last; do :; done\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_capture_removes_partial_frame() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_ffmpeg(dir.path(), "printf 'partial' > \"$last\"\nexit 1");
        let scratch = dir.path().join("frame.jpg");
        let mut capture = FfmpegCapture::new("a.mp4")
            .with_program(&program)
            .with_scratch_path(&scratch);

        assert!(matches!(
            capture.capture(Timestamp(7)),
            Err(SheetError::Capture { seconds: 7, .. })
        ));
        assert!(!scratch.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_capture_returns_bytes_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_ffmpeg(dir.path(), "printf 'jpeg' > \"$last\"");
        let scratch = dir.path().join("frame.jpg");
        let mut capture = FfmpegCapture::new("a.mp4")
            .with_program(&program)
            .with_scratch_path(&scratch);

        assert_eq!(capture.capture(Timestamp(7)).unwrap(), b"jpeg".to_vec());
        assert!(!scratch.exists());
    }
}
