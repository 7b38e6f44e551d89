use crate::presenter::model::DisplayModel;
use log::info;
use std::sync::{Arc, PoisonError, RwLock};

/// Presentation adapter: the single place core results are pushed to the display.
#[derive(Clone, Default)]
pub struct DisplayBridge {
    state: Arc<RwLock<DisplayModel>>,
}

impl DisplayBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, model: &DisplayModel) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = model.clone();
        info!(
            "[display] thrust points: {}, pressure points: {}, interval: {}",
            guard.thrust_series.len(),
            guard.pressure_series.len(),
            guard.interval.is_some()
        );
    }

    /// Moves the plot overlay marker.
    pub fn publish_cursor(&self, elapsed: f64) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .cursor = elapsed;
    }

    pub fn publish_status(&self, message: &str) {
        println!("[display] {}", message);
    }

    pub fn snapshot(&self) -> DisplayModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Renders the current model as the lines the stats panels would show.
    pub fn render_text(&self) -> String {
        let model = self.snapshot();
        let mut out = String::from(" Key Stats\n");
        for line in model.overall.lines() {
            out.push_str(line);
            out.push('\n');
        }
        if let Some(interval) = &model.interval {
            match model.interval_bounds {
                Some([min, max]) => out.push_str(&format!(" Interval {min:.2} s - {max:.2} s\n")),
                None => out.push_str(" Interval\n"),
            }
            for line in interval.lines() {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(&model.video_path_label);
        out.push('\n');
        for notice in &model.notices {
            out.push_str(&format!(" Notice: {notice}\n"));
        }
        out
    }
}
