use crate::math::{simpson, StatsHelper};
use crate::processing::align::SeriesSlice;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Impulse class letter of a solid or hybrid motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MotorClass {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
}

/// Right-inclusive upper bound of total impulse (N·s) for each class.
const CLASS_LIMITS: [(MotorClass, f64); 16] = [
    (MotorClass::A, 2.5),
    (MotorClass::B, 5.0),
    (MotorClass::C, 10.0),
    (MotorClass::D, 20.0),
    (MotorClass::E, 40.0),
    (MotorClass::F, 80.0),
    (MotorClass::G, 160.0),
    (MotorClass::H, 320.0),
    (MotorClass::I, 640.0),
    (MotorClass::J, 1280.0),
    (MotorClass::K, 2560.0),
    (MotorClass::L, 5120.0),
    (MotorClass::M, 10240.0),
    (MotorClass::N, 20480.0),
    (MotorClass::O, 40960.0),
    (MotorClass::P, 81920.0),
];

impl MotorClass {
    /// Classifies a total impulse; `None` above the P range.
    pub fn from_impulse(impulse: f64) -> Option<Self> {
        CLASS_LIMITS
            .iter()
            .find(|(_, limit)| impulse <= *limit)
            .map(|(class, _)| *class)
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for MotorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Summary of a calibrated series or of a sub-range of one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Last time value of the range, in seconds.
    pub burn_time: f64,
    pub avg_thrust: f64,
    pub max_thrust: f64,
    pub avg_pressure: f64,
    pub max_pressure: f64,
    /// Integral of thrust over time, in N·s.
    pub total_impulse: f64,
    pub motor_class: Option<MotorClass>,
}

impl Default for SummaryStats {
    /// Same as the summary of an empty series.
    fn default() -> Self {
        Self {
            burn_time: 0.0,
            avg_thrust: 0.0,
            max_thrust: 0.0,
            avg_pressure: 0.0,
            max_pressure: 0.0,
            total_impulse: 0.0,
            motor_class: MotorClass::from_impulse(0.0),
        }
    }
}

impl SummaryStats {
    /// Class letter followed by the rounded average thrust, e.g. `F25`.
    ///
    /// The letter is empty when the impulse exceeds every class, and the number
    /// is still reported when the thrust channel is empty.
    pub fn designation(&self) -> String {
        let letter = self
            .motor_class
            .map(|class| class.letter().to_string())
            .unwrap_or_default();
        format!("{}{:.0}", letter, self.avg_thrust)
    }
}

pub fn summarize(slice: SeriesSlice<'_>) -> SummaryStats {
    let total_impulse = if slice.thrust.is_empty() {
        0.0
    } else {
        simpson(slice.thrust, slice.time)
    };

    SummaryStats {
        burn_time: slice.time.last().copied().unwrap_or(0.0),
        avg_thrust: StatsHelper::mean(slice.thrust),
        max_thrust: StatsHelper::peak(slice.thrust),
        avg_pressure: StatsHelper::mean(slice.pressure),
        max_pressure: StatsHelper::peak(slice.pressure),
        total_impulse,
        motor_class: MotorClass::from_impulse(total_impulse),
    }
}
