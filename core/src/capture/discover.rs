use crate::capture::loader::resolve_video_reference;
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CAPTURE_EXTENSION: &str = "json";
pub const VIDEO_EXTENSION: &str = "mp4";

/// Capture and video located in a test directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
    pub capture: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

/// Finds the first capture file and the first video file in `dir`, in file-name
/// order. A `video_path` declared by the capture overrides the scanned video when
/// it names an existing video file.
pub fn discover<P: AsRef<Path>>(dir: P) -> io::Result<DiscoveredFiles> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut found = DiscoveredFiles {
        capture: files
            .iter()
            .find(|path| has_extension(path, CAPTURE_EXTENSION))
            .cloned(),
        video: files
            .iter()
            .find(|path| has_extension(path, VIDEO_EXTENSION))
            .cloned(),
    };

    if let Some(declared) = found
        .capture
        .as_deref()
        .and_then(|capture| declared_video(capture, dir))
    {
        if is_playable_video(&declared) {
            found.video = Some(declared);
        }
    }

    Ok(found)
}

/// True for an existing file with the video extension.
pub fn is_playable_video(path: &Path) -> bool {
    path.is_file() && has_extension(path, VIDEO_EXTENSION)
}

fn declared_video(capture: &Path, dir: &Path) -> Option<PathBuf> {
    let contents = fs::read_to_string(capture).ok()?;
    match serde_json::from_str::<Map<String, Value>>(&contents) {
        Ok(document) => resolve_video_reference(&document, Some(dir)),
        Err(err) => {
            debug!("ignoring video_path of {}: {}", capture.display(), err);
            None
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
