pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, `0.0` for an empty slice.
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Largest value, `0.0` for an empty slice.
    pub fn peak(samples: &[f64]) -> f64 {
        samples
            .iter()
            .copied()
            .reduce(f64::max)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_yields_zero() {
        assert_eq!(StatsHelper::mean(&[]), 0.0);
        assert_eq!(StatsHelper::peak(&[]), 0.0);
    }

    #[test]
    fn peak_handles_all_negative_values() {
        assert_eq!(StatsHelper::peak(&[-4.0, -1.5, -9.0]), -1.5);
    }

    #[test]
    fn mean_of_ramp() {
        assert_eq!(StatsHelper::mean(&[10.0, 20.0, 30.0, 40.0]), 25.0);
    }
}
