use crate::capture::TelemetryCapture;
use crate::diagnostics::LogManager;
use crate::processing::align::{align, CalibratedSeries};
use crate::processing::convert::{convert_pressure, convert_thrust};

/// Converts a capture's raw voltages and aligns the result.
pub fn reduce(capture: &TelemetryCapture, logger: &LogManager) -> CalibratedSeries {
    let thrust = convert_thrust(&capture.load_cell_voltages);
    let pressure = convert_pressure(&capture.pressure_voltages);
    let series = align(capture.time_values.clone(), thrust, pressure);

    let dropped = capture.time_values.len() - series.len();
    if dropped > 0 {
        logger.record(&format!(
            "aligned series to {} samples ({} trailing time samples dropped)",
            series.len(),
            dropped
        ));
    } else {
        logger.record(&format!("aligned series to {} samples", series.len()));
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::convert::{pressure_psi, thrust_newtons};

    #[test]
    fn reduce_converts_then_aligns() {
        let capture = TelemetryCapture::from_json_str(
            r#"{"load_cell_voltages_mv": [1.25, 1.45, 1.65],
                "pressure_transducer_voltages_v": [1.0, 2.0],
                "time_values_seconds": [0, 1, 2]}"#,
            None,
        )
        .unwrap();
        let series = reduce(&capture, &LogManager::new());
        assert_eq!(series.len(), 2);
        assert_eq!(series.thrust(), &[thrust_newtons(1.25), thrust_newtons(1.45)]);
        assert_eq!(series.pressure(), &[pressure_psi(1.0), pressure_psi(2.0)]);
    }

    #[test]
    fn reduce_keeps_time_when_sensors_are_missing() {
        let capture =
            TelemetryCapture::from_json_str(r#"{"time_values_seconds": [0, 0.5]}"#, None).unwrap();
        let series = reduce(&capture, &LogManager::new());
        assert_eq!(series.time(), &[0.0, 0.5]);
        assert!(series.thrust().is_empty());
        assert!(series.pressure().is_empty());
    }
}
