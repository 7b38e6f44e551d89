/// Normalized thrust curve of a typical static fire: quadratic ignition
/// rise, regressive plateau, linear tail-off and a quiet post-burn stretch.
pub fn burn_profile(length: usize) -> Vec<f64> {
    (0..length)
        .map(|i| shape(i as f64 / length.max(1) as f64))
        .collect()
}

fn shape(u: f64) -> f64 {
    match u {
        u if u < 0.1 => (u / 0.1).powi(2),
        u if u < 0.7 => 1.0 - 0.25 * (u - 0.1) / 0.6,
        u if u < 0.85 => 0.75 * (0.85 - u) / 0.15,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_peaks_at_one_and_ends_at_rest() {
        let profile = burn_profile(200);
        assert_eq!(profile.len(), 200);
        assert_eq!(profile[0], 0.0);
        assert_eq!(profile[199], 0.0);
        assert!(profile.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(profile.iter().any(|v| (*v - 1.0).abs() < 1e-9));
    }
}
