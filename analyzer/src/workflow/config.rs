use anyhow::Context;
use firecore::prelude::{PlaybackConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub interval_trim: f64,
    pub target_width: u32,
    pub target_height: u32,
    pub fallback_fps: f64,
    pub frame_capacity: usize,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            interval_trim: session.interval_trim,
            target_width: session.playback.target_width,
            target_height: session.playback.target_height,
            fallback_fps: session.playback.fallback_fps,
            frame_capacity: session.playback.frame_capacity,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(interval_trim: f64, fallback_fps: f64) -> Self {
        Self {
            interval_trim,
            fallback_fps,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..0.5).contains(&self.interval_trim) {
            anyhow::bail!("interval_trim must be in [0, 0.5), got {}", self.interval_trim);
        }
        if !(self.fallback_fps.is_finite() && self.fallback_fps > 0.0) {
            anyhow::bail!("fallback_fps must be positive, got {}", self.fallback_fps);
        }
        if self.target_width == 0 || self.target_height == 0 {
            anyhow::bail!(
                "target resolution must be non-zero, got {}x{}",
                self.target_width,
                self.target_height
            );
        }
        Ok(())
    }

    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            interval_trim: self.interval_trim,
            playback: PlaybackConfig {
                target_width: self.target_width,
                target_height: self.target_height,
                fallback_fps: self.fallback_fps,
                frame_capacity: self.frame_capacity,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_session_config() {
        let cfg = WorkflowConfig::from_args(0.1, 30.0);
        let session = cfg.to_session_config();
        assert_eq!(session.interval_trim, 0.1);
        assert_eq!(session.playback.fallback_fps, 30.0);
        assert_eq!(session.playback.target_width, 640);
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"interval_trim: 0.1\ntarget_width: 320\nffmpeg: /opt/ffmpeg/bin/ffmpeg\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.interval_trim, 0.1);
        assert_eq!(cfg.target_width, 320);
        assert_eq!(cfg.target_height, 360);
        assert_eq!(cfg.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(cfg.ffprobe, PathBuf::from("ffprobe"));
    }

    #[test]
    fn config_load_rejects_invalid_values() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"fallback_fps: 0\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
