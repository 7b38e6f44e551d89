//! Video decoding delegated to the `ffprobe` and `ffmpeg` executables.
//!
//! `ffprobe` reports stream geometry and frame rate; `ffmpeg` streams raw
//! `rgb24` frames over a pipe which the decode worker reads one frame at a time.

use crate::playback::frame::RawFrame;
use crate::playback::source::{SourceOpener, VideoSource};
use crate::prelude::{PlaybackError, PlaybackResult};
use log::debug;
use serde::Deserialize;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

#[derive(Debug, Clone)]
pub struct FfmpegOpener {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegOpener {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegOpener {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn probe(&self, path: &Path) -> PlaybackResult<StreamInfo> {
        let output = Command::new(&self.ffprobe)
            .args(build_ffprobe_args(path))
            .stdin(Stdio::null())
            .output()
            .map_err(|err| unavailable(path, format!("running {}: {}", self.ffprobe.display(), err)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unavailable(path, format!("ffprobe failed: {}", stderr.trim())));
        }
        parse_probe(&output.stdout).map_err(|reason| unavailable(path, reason))
    }
}

impl SourceOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> PlaybackResult<Box<dyn VideoSource + Send>> {
        if !path.is_file() {
            return Err(unavailable(path, "no such file".into()));
        }
        let info = self.probe(path)?;

        let mut child = Command::new(&self.ffmpeg)
            .args(build_ffmpeg_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| unavailable(path, format!("running {}: {}", self.ffmpeg.display(), err)))?;
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(unavailable(path, "decoder produced no output pipe".into()));
            }
        };

        debug!(
            "opened {} ({}x{}, {:?} fps)",
            path.display(),
            info.width,
            info.height,
            info.frame_rate
        );
        Ok(Box::new(FfmpegSource {
            child,
            stdout,
            info,
        }))
    }
}

/// Running `ffmpeg` process; killed and reaped when dropped.
pub struct FfmpegSource {
    child: Child,
    stdout: ChildStdout,
    info: StreamInfo,
}

impl VideoSource for FfmpegSource {
    fn frame_rate(&self) -> Option<f64> {
        self.info.frame_rate
    }

    fn read_frame(&mut self) -> PlaybackResult<Option<RawFrame>> {
        let mut data = vec![0u8; self.info.width as usize * self.info.height as usize * 3];
        match self.stdout.read_exact(&mut data) {
            Ok(()) => Ok(Some(RawFrame {
                width: self.info.width,
                height: self.info.height,
                data,
            })),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(err) => Err(PlaybackError::Decode(err.to_string())),
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StreamInfo {
    width: u32,
    height: u32,
    frame_rate: Option<f64>,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

pub fn build_ffprobe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".into(),
        "error".into(),
        "-select_streams".into(),
        "v:0".into(),
        "-show_entries".into(),
        "stream=width,height,r_frame_rate,avg_frame_rate".into(),
        "-of".into(),
        "json".into(),
        path.to_string_lossy().into_owned(),
    ]
}

pub fn build_ffmpeg_args(path: &Path) -> Vec<String> {
    vec![
        "-v".into(),
        "error".into(),
        "-nostdin".into(),
        "-i".into(),
        path.to_string_lossy().into_owned(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-".into(),
    ]
}

fn parse_probe(stdout: &[u8]) -> Result<StreamInfo, String> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|err| format!("unreadable probe output: {err}"))?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| "no video stream".to_string())?;
    match (stream.width, stream.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok(StreamInfo {
            width,
            height,
            frame_rate: stream
                .r_frame_rate
                .as_deref()
                .and_then(parse_rate)
                .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_rate)),
        }),
        _ => Err("video stream has no dimensions".into()),
    }
}

/// Parses a rate such as `30000/1001` or `25`; `None` unless finite and positive.
pub fn parse_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => num.trim().parse::<f64>().ok()? / den.trim().parse::<f64>().ok()?,
        None => rate.trim().parse::<f64>().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn unavailable(path: &Path, reason: String) -> PlaybackError {
    PlaybackError::SourceUnavailable {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_parse_fractions_and_reject_zero() {
        assert_eq!(parse_rate("25/1"), Some(25.0));
        assert!((parse_rate("30000/1001").unwrap() - 29.97).abs() < 1e-3);
        assert_eq!(parse_rate("60"), Some(60.0));
        assert_eq!(parse_rate("0/0"), None);
        assert_eq!(parse_rate("-5"), None);
        assert_eq!(parse_rate("n/a"), None);
    }

    #[test]
    fn probe_output_falls_back_to_average_rate() {
        let info = parse_probe(
            br#"{"streams": [{"width": 1280, "height": 720,
                "r_frame_rate": "0/0", "avg_frame_rate": "24000/1001"}]}"#,
        )
        .unwrap();
        assert_eq!((info.width, info.height), (1280, 720));
        assert!((info.frame_rate.unwrap() - 23.976).abs() < 1e-3);
    }

    #[test]
    fn probe_without_streams_is_rejected() {
        assert!(parse_probe(br#"{"streams": []}"#).is_err());
        assert!(parse_probe(br#"{}"#).is_err());
        assert!(parse_probe(b"garbage").is_err());
    }

    #[test]
    fn ffmpeg_args_stream_raw_rgb() {
        let args = build_ffmpeg_args(Path::new("/tmp/burn.mp4"));
        assert_eq!(args[4], "/tmp/burn.mp4");
        assert!(args.windows(2).any(|pair| pair == ["-pix_fmt", "rgb24"]));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let opener = FfmpegOpener::default();
        let result = opener.open(&dir.path().join("absent.mp4"));
        assert!(matches!(
            result,
            Err(PlaybackError::SourceUnavailable { .. })
        ));
    }
}
