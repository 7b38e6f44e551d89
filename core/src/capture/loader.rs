use crate::prelude::{
    Channel, FatalDataError, FieldFault, LoadError, LoadResult, PartialFieldError,
};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const TIME_KEY: &str = "time_values_seconds";
pub const VIDEO_KEY: &str = "video_path";

/// Raw telemetry read from a static-fire capture file.
///
/// Immutable once loaded; a reload replaces the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryCapture {
    /// Load-cell output in millivolts.
    pub load_cell_voltages: Vec<f64>,
    /// Pressure-transducer output in volts.
    pub pressure_voltages: Vec<f64>,
    /// Sample times in seconds, non-decreasing.
    pub time_values: Vec<f64>,
    /// Video declared by the capture, resolved against the capture's directory.
    pub video_reference: Option<PathBuf>,
    /// Sensor channels that were absent or malformed and load as empty.
    pub channel_faults: Vec<PartialFieldError>,
}

impl TelemetryCapture {
    pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| LoadError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let capture = Self::from_json_str(&contents, path_ref.parent())?;
        debug!(
            "loaded capture {} ({} time samples)",
            path_ref.display(),
            capture.time_values.len()
        );
        Ok(capture)
    }

    /// Parses capture contents. A relative `video_path` is joined onto `base_dir`.
    pub fn from_json_str(contents: &str, base_dir: Option<&Path>) -> LoadResult<Self> {
        let document: Map<String, Value> = serde_json::from_str(contents)?;

        let time_values = match numeric_series(document.get(TIME_KEY)) {
            Ok(values) => values,
            Err(FieldFault::Missing) => return Err(FatalDataError::MissingTime.into()),
            Err(FieldFault::Malformed) => return Err(FatalDataError::MalformedTime.into()),
        };
        if time_values.is_empty() {
            return Err(FatalDataError::EmptyTime.into());
        }
        if let Some(index) = first_decrease(&time_values) {
            return Err(FatalDataError::NonMonotonicTime { index }.into());
        }

        let mut channel_faults = Vec::new();
        let mut read_channel = |channel: Channel| match numeric_series(document.get(channel.key())) {
            Ok(values) => values,
            Err(reason) => {
                let fault = PartialFieldError { channel, reason };
                warn!("{}", fault);
                channel_faults.push(fault);
                Vec::new()
            }
        };
        let load_cell_voltages = read_channel(Channel::LoadCell);
        let pressure_voltages = read_channel(Channel::PressureTransducer);

        let video_reference = resolve_video_reference(&document, base_dir);

        Ok(Self {
            load_cell_voltages,
            pressure_voltages,
            time_values,
            video_reference,
            channel_faults,
        })
    }
}

/// Reads the `video_path` key of a parsed capture, if any.
pub(crate) fn resolve_video_reference(
    document: &Map<String, Value>,
    base_dir: Option<&Path>,
) -> Option<PathBuf> {
    let declared = PathBuf::from(document.get(VIDEO_KEY)?.as_str()?);
    match base_dir {
        Some(dir) if declared.is_relative() => Some(dir.join(declared)),
        _ => Some(declared),
    }
}

fn numeric_series(value: Option<&Value>) -> Result<Vec<f64>, FieldFault> {
    match value {
        None | Some(Value::Null) => Err(FieldFault::Missing),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_f64().ok_or(FieldFault::Malformed))
            .collect(),
        Some(_) => Err(FieldFault::Malformed),
    }
}

fn first_decrease(values: &[f64]) -> Option<usize> {
    values
        .windows(2)
        .position(|pair| pair[1] < pair[0])
        .map(|offset| offset + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_reads_all_three_series() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"{"load_cell_voltages_mv": [1.25, 1.45, 1.65],
                "pressure_transducer_voltages_v": [1.0, 2.0, 3.0],
                "time_values_seconds": [0, 1, 2]}"#,
        )
        .unwrap();
        let capture = TelemetryCapture::load(temp.path()).unwrap();
        assert_eq!(capture.time_values, vec![0.0, 1.0, 2.0]);
        assert_eq!(capture.load_cell_voltages.len(), 3);
        assert_eq!(capture.pressure_voltages.len(), 3);
        assert!(capture.channel_faults.is_empty());
        assert!(capture.video_reference.is_none());
    }

    #[test]
    fn missing_time_is_fatal() {
        let err = TelemetryCapture::from_json_str(r#"{"load_cell_voltages_mv": [1.0]}"#, None)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::FatalData(FatalDataError::MissingTime)
        ));
    }

    #[test]
    fn decreasing_time_is_fatal() {
        let err =
            TelemetryCapture::from_json_str(r#"{"time_values_seconds": [0, 1, 0.5]}"#, None)
                .unwrap_err();
        assert!(matches!(
            err,
            LoadError::FatalData(FatalDataError::NonMonotonicTime { index: 2 })
        ));
    }

    #[test]
    fn empty_time_is_fatal() {
        let err = TelemetryCapture::from_json_str(
            r#"{"load_cell_voltages_mv": [1.0], "time_values_seconds": []}"#,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::FatalData(FatalDataError::EmptyTime)));
    }

    #[test]
    fn invalid_document_is_parse_error() {
        let err = TelemetryCapture::from_json_str("{not json", None).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        let err = TelemetryCapture::from_json_str("[1, 2, 3]", None).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn broken_channels_degrade_to_empty() {
        let capture = TelemetryCapture::from_json_str(
            r#"{"load_cell_voltages_mv": "oops", "time_values_seconds": [0, 1]}"#,
            None,
        )
        .unwrap();
        assert!(capture.load_cell_voltages.is_empty());
        assert!(capture.pressure_voltages.is_empty());
        assert_eq!(
            capture.channel_faults,
            vec![
                PartialFieldError {
                    channel: Channel::LoadCell,
                    reason: FieldFault::Malformed,
                },
                PartialFieldError {
                    channel: Channel::PressureTransducer,
                    reason: FieldFault::Missing,
                },
            ]
        );
    }

    #[test]
    fn relative_video_path_joins_capture_directory() {
        let capture = TelemetryCapture::from_json_str(
            r#"{"time_values_seconds": [0.0], "video_path": "burn.mp4"}"#,
            Some(Path::new("/data/test-3")),
        )
        .unwrap();
        assert_eq!(
            capture.video_reference,
            Some(PathBuf::from("/data/test-3/burn.mp4"))
        );
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TelemetryCapture::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
