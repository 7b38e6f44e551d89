use anyhow::Context;
use clap::Parser;
use firecore::{discover, FrameReceiver, IntervalBounds, PlaybackStatus, Session};
use generator::profile::{write_capture, GeneratorConfig};
use presenter::bridge::DisplayBridge;
use presenter::model::DisplayModel;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{choose_video, Runner, WorkflowResult};

mod generator;
mod presenter;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Static-fire telemetry reduction and test video playback")]
struct Args {
    /// Directory holding a capture (.json) and a test video (.mp4)
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Capture file to load; takes precedence over --dir
    #[arg(long)]
    capture: Option<PathBuf>,
    /// Video to play; defaults to the discovered or declared video
    #[arg(long)]
    video: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 0.05)]
    trim: f64,
    #[arg(long, default_value_t = 25.0)]
    fallback_fps: f64,
    /// Interval start cursor in seconds
    #[arg(long, requires = "interval_max")]
    interval_min: Option<f64>,
    /// Interval end cursor in seconds
    #[arg(long, requires = "interval_min")]
    interval_max: Option<f64>,
    /// Write a synthetic capture to this path and analyze it
    #[arg(long)]
    generate: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Append a one-line summary to this file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Print the display model as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Play the test video headless until it ends (Ctrl+C to stop)
    #[arg(long, default_value_t = false)]
    play: bool,
    #[arg(long)]
    ffmpeg: Option<PathBuf>,
    #[arg(long)]
    ffprobe: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        let config = WorkflowConfig::from_args(args.trim, args.fallback_fps);
        config.validate()?;
        config
    };
    if let Some(ffmpeg) = &args.ffmpeg {
        workflow_config.ffmpeg = ffmpeg.clone();
    }
    if let Some(ffprobe) = &args.ffprobe {
        workflow_config.ffprobe = ffprobe.clone();
    }

    if let Some(path) = &args.generate {
        let config = GeneratorConfig {
            seed: args.seed,
            ..Default::default()
        };
        write_capture(path, &config)?;
        println!("Synthetic capture written to {}", path.display());
    }

    let discovered = match &args.dir {
        Some(dir) => discover(dir)
            .with_context(|| format!("scanning directory {}", dir.display()))?,
        None => Default::default(),
    };
    let capture = args
        .capture
        .clone()
        .or_else(|| args.generate.clone())
        .or(discovered.capture)
        .context("no capture given; use --capture, --dir or --generate")?;

    let bounds = match (args.interval_min, args.interval_max) {
        (Some(min), Some(max)) => Some(IntervalBounds::new(min, max)),
        _ => None,
    };

    let runner = Runner::new(workflow_config);
    let (mut session, mut frames) = runner.session();
    let bridge = DisplayBridge::new();

    let mut result = runner.execute(&mut session, &capture, bounds)?;
    result.video = choose_video(discovered.video, result.video.take());
    let model = DisplayModel::from_result(&result, session.series());
    bridge.publish(&model);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&bridge.snapshot()).context("serializing display model")?
        );
    } else {
        print!("{}", bridge.render_text());
    }

    if let Some(report_path) = &args.report {
        append_report(report_path, &result)?;
    }

    if args.play {
        let video = args
            .video
            .clone()
            .or_else(|| result.video.clone())
            .context("no video to play; use --video or --dir")?;
        play_headless(&mut session, &mut frames, &bridge, &video)?;
    }

    Ok(())
}

fn append_report(path: &Path, result: &WorkflowResult) -> anyhow::Result<()> {
    let interval = result
        .interval
        .map(|stats| format!("{:.2}Ns/{}", stats.total_impulse, stats.designation()))
        .unwrap_or_else(|| "none".into());
    let line = format!(
        "capture={} samples={} burn_time={:.2} impulse={:.2} designation={} interval={} notices={:?}\n",
        result.capture.display(),
        result.samples,
        result.overall.burn_time,
        result.overall.total_impulse,
        result.overall.designation(),
        interval,
        result.notices
    );
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening report {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Plays `video` with no window: frames are consumed as a display would, the
/// cursor is mirrored to the bridge, and Ctrl+C stops playback.
fn play_headless(
    session: &mut Session,
    frames: &mut FrameReceiver,
    bridge: &DisplayBridge,
    video: &Path,
) -> anyhow::Result<()> {
    if let Err(err) = session.toggle_playback(Some(video)) {
        bridge.publish_status(&format!("Video unavailable: {err}"));
        return Ok(());
    }
    bridge.publish_status(&format!("Playing {} (Ctrl+C to stop)...", video.display()));

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for playback")?;
    let shown = runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_millis(20));
        let mut shown = 0usize;
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    result.context("awaiting Ctrl+C")?;
                    session.playback_mut().stop();
                    break;
                }
                _ = ticker.tick() => {
                    if frames.latest().is_some() {
                        shown += 1;
                    }
                    bridge.publish_cursor(session.cursor().elapsed());
                    if session.playback().status() == PlaybackStatus::Stopped {
                        break;
                    }
                }
            }
        }
        Ok::<usize, anyhow::Error>(shown)
    })?;

    let metrics = session.playback().metrics();
    bridge.publish_status(&format!(
        "{} (frames decoded {}, displayed {}, cursor {:.2} s)",
        session
            .playback()
            .notice()
            .unwrap_or_else(|| "Playback stopped".into()),
        metrics.frames_published,
        shown,
        bridge.snapshot().cursor
    ));
    Ok(())
}
