//! Calibration from raw sensor voltages to physical units.

/// Load-cell bridge offset at zero load, in millivolts.
pub const LOAD_CELL_ZERO_MV: f64 = 1.25;
/// Gain of the load-cell instrumentation amplifier.
pub const LOAD_CELL_GAIN: f64 = 201.0;
/// Kilograms per amplified volt.
pub const LOAD_CELL_SCALE_KG: f64 = 100_387.5;
/// Residual offset of the load-cell fit, in kilograms.
pub const LOAD_CELL_OFFSET_KG: f64 = 3.806_937_5;
pub const STANDARD_GRAVITY: f64 = 9.81;

pub const TRANSDUCER_MIN_VOLTAGE: f64 = 0.5;
pub const TRANSDUCER_MAX_VOLTAGE: f64 = 4.5;
pub const TRANSDUCER_MAX_PRESSURE_PSI: f64 = 1600.0;
pub const TRANSDUCER_SCALE: f64 =
    TRANSDUCER_MAX_PRESSURE_PSI / (TRANSDUCER_MAX_VOLTAGE - TRANSDUCER_MIN_VOLTAGE);

/// Load-cell millivolts to thrust in newtons.
pub fn thrust_newtons(millivolts: f64) -> f64 {
    let amplified = (millivolts - LOAD_CELL_ZERO_MV) / LOAD_CELL_GAIN;
    (amplified * LOAD_CELL_SCALE_KG - LOAD_CELL_OFFSET_KG) * STANDARD_GRAVITY
}

/// Transducer volts to gauge pressure in PSI.
pub fn pressure_psi(volts: f64) -> f64 {
    (volts - TRANSDUCER_MIN_VOLTAGE) * TRANSDUCER_SCALE
}

/// Inverse of [`thrust_newtons`], used to synthesize captures.
pub fn load_cell_millivolts(newtons: f64) -> f64 {
    (newtons / STANDARD_GRAVITY + LOAD_CELL_OFFSET_KG) / LOAD_CELL_SCALE_KG * LOAD_CELL_GAIN
        + LOAD_CELL_ZERO_MV
}

/// Inverse of [`pressure_psi`].
pub fn transducer_volts(psi: f64) -> f64 {
    psi / TRANSDUCER_SCALE + TRANSDUCER_MIN_VOLTAGE
}

pub fn convert_thrust(millivolts: &[f64]) -> Vec<f64> {
    millivolts.iter().copied().map(thrust_newtons).collect()
}

pub fn convert_pressure(volts: &[f64]) -> Vec<f64> {
    volts.iter().copied().map(pressure_psi).collect()
}
