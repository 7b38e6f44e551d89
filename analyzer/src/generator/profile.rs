use crate::generator::template::burn_profile;
use anyhow::Context;
use firecore::processing::convert::{load_cell_millivolts, transducer_volts};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for generating a synthetic static-fire capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub samples: usize,
    pub sample_rate: f64,
    /// Peak thrust in newtons.
    pub peak_thrust: f64,
    /// Peak chamber pressure in PSI.
    pub peak_pressure: f64,
    /// Uniform jitter amplitude, in newtons and PSI.
    pub noise: f64,
    pub seed: u64,
    pub video_path: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            samples: 400,
            sample_rate: 100.0,
            peak_thrust: 250.0,
            peak_pressure: 450.0,
            noise: 0.5,
            seed: 0,
            video_path: None,
        }
    }
}

/// On-disk capture layout read by `firecore::TelemetryCapture`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDocument {
    pub load_cell_voltages_mv: Vec<f64>,
    pub pressure_transducer_voltages_v: Vec<f64>,
    pub time_values_seconds: Vec<f64>,
    pub sample_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
}

pub fn build_capture(config: &GeneratorConfig) -> anyhow::Result<CaptureDocument> {
    anyhow::ensure!(config.samples > 0, "generator needs at least one sample");
    anyhow::ensure!(
        config.sample_rate.is_finite() && config.sample_rate > 0.0,
        "sample rate must be positive, got {}",
        config.sample_rate
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut jitter = |amplitude: f64| {
        if amplitude > 0.0 {
            rng.gen_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    };

    let profile = burn_profile(config.samples);
    let mut load_cell = Vec::with_capacity(config.samples);
    let mut pressure = Vec::with_capacity(config.samples);
    for level in &profile {
        let newtons = level * config.peak_thrust + jitter(config.noise);
        let psi = (level * config.peak_pressure + jitter(config.noise)).max(0.0);
        load_cell.push(load_cell_millivolts(newtons));
        pressure.push(transducer_volts(psi));
    }

    Ok(CaptureDocument {
        load_cell_voltages_mv: load_cell,
        pressure_transducer_voltages_v: pressure,
        time_values_seconds: (0..config.samples)
            .map(|i| i as f64 / config.sample_rate)
            .collect(),
        sample_rate: config.sample_rate,
        video_path: config.video_path.clone(),
    })
}

pub fn write_capture(path: &Path, config: &GeneratorConfig) -> anyhow::Result<()> {
    let document = build_capture(config)?;
    let contents = serde_json::to_string_pretty(&document).context("serializing capture")?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing capture {}", path.display()))
}
