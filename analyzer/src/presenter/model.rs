use crate::workflow::runner::WorkflowResult;
use firecore::{CalibratedSeries, SummaryStats};
use serde::{Deserialize, Serialize};

/// One statistics panel, as the text lines the display shows.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StatsPanel {
    pub avg_thrust: String,
    pub max_thrust: String,
    pub avg_pressure: String,
    pub max_pressure: String,
    pub burn_time: String,
    pub total_impulse: String,
    pub motor_designation: String,
}

impl StatsPanel {
    pub fn from_stats(stats: &SummaryStats) -> Self {
        Self {
            avg_thrust: format!(" Average Thrust: {} N", group_thousands(stats.avg_thrust)),
            max_thrust: format!(" Max Thrust: {} N", group_thousands(stats.max_thrust)),
            avg_pressure: format!(
                " Average Pressure: {} PSI",
                group_thousands(stats.avg_pressure)
            ),
            max_pressure: format!(" Max Pressure: {} PSI", group_thousands(stats.max_pressure)),
            burn_time: format!(" Burn Time: {:.2} s", stats.burn_time),
            total_impulse: format!(" Total Impulse: {:.2} Ns", stats.total_impulse),
            motor_designation: format!(" Motor Designation: {}", stats.designation()),
        }
    }

    pub fn lines(&self) -> [&str; 7] {
        [
            &self.avg_thrust,
            &self.max_thrust,
            &self.avg_pressure,
            &self.max_pressure,
            &self.burn_time,
            &self.total_impulse,
            &self.motor_designation,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayModel {
    /// `(time, thrust)` points of the thrust plot.
    pub thrust_series: Vec<[f64; 2]>,
    pub pressure_series: Vec<[f64; 2]>,
    pub overall: StatsPanel,
    pub interval: Option<StatsPanel>,
    pub interval_bounds: Option<[f64; 2]>,
    pub video_path_label: String,
    pub notices: Vec<String>,
    /// Timeline cursor position drawn on both plots, in seconds.
    pub cursor: f64,
}

impl DisplayModel {
    pub fn from_result(result: &WorkflowResult, series: &CalibratedSeries) -> Self {
        let points = |values: &[f64]| -> Vec<[f64; 2]> {
            series
                .time()
                .iter()
                .zip(values)
                .map(|(&t, &v)| [t, v])
                .collect()
        };
        Self {
            thrust_series: points(series.thrust()),
            pressure_series: points(series.pressure()),
            overall: StatsPanel::from_stats(&result.overall),
            interval: result.interval.as_ref().map(StatsPanel::from_stats),
            interval_bounds: result.bounds.map(|b| [b.min_time, b.max_time]),
            video_path_label: format!(
                "Video Path: {}",
                result
                    .video
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default()
            ),
            notices: result.notices.clone(),
            cursor: 0.0,
        }
    }
}

/// Formats with two decimals and comma thousands separators, e.g. `1,234.50`.
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let nonzero = formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if value.is_sign_negative() && nonzero { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use firecore::MotorClass;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(25.0), "25.00");
        assert_eq!(group_thousands(1234.567), "1,234.57");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567.00");
        assert_eq!(group_thousands(-37.5), "-37.50");
        assert_eq!(group_thousands(-0.001), "0.00");
    }

    #[test]
    fn panel_matches_display_labels() {
        let stats = SummaryStats {
            burn_time: 3.0,
            avg_thrust: 25.0,
            max_thrust: 40.0,
            avg_pressure: 250.0,
            max_pressure: 1400.0,
            total_impulse: 75.0,
            motor_class: Some(MotorClass::F),
        };
        let panel = StatsPanel::from_stats(&stats);
        assert_eq!(panel.avg_thrust, " Average Thrust: 25.00 N");
        assert_eq!(panel.max_pressure, " Max Pressure: 1,400.00 PSI");
        assert_eq!(panel.burn_time, " Burn Time: 3.00 s");
        assert_eq!(panel.total_impulse, " Total Impulse: 75.00 Ns");
        assert_eq!(panel.motor_designation, " Motor Designation: F25");
    }
}
