/// Composite Simpson integration of `y` over sample points `x`.
///
/// Spacing may be irregular. Pairs of intervals use the three-point rule; an
/// odd interval count closes the last interval with the three-point end
/// correction. Two points integrate with the trapezoid rule; fewer give `0.0`.
/// The slices are truncated to their common length.
pub fn simpson(y: &[f64], x: &[f64]) -> f64 {
    let n = y.len().min(x.len());
    if n < 2 {
        return 0.0;
    }
    if n == 2 {
        return trapezoid(y[0], y[1], x[1] - x[0]);
    }

    let intervals = n - 1;
    let paired_end = if intervals % 2 == 0 { n - 1 } else { n - 2 };

    let mut total = 0.0;
    let mut i = 0;
    while i + 2 <= paired_end {
        total += simpson_pair(&y[i..i + 3], x[i + 1] - x[i], x[i + 2] - x[i + 1]);
        i += 2;
    }

    if paired_end != n - 1 {
        total += end_correction(&y[n - 3..n], x[n - 2] - x[n - 3], x[n - 1] - x[n - 2]);
    }
    total
}

fn trapezoid(y0: f64, y1: f64, h: f64) -> f64 {
    0.5 * h * (y0 + y1)
}

fn simpson_pair(y: &[f64], h0: f64, h1: f64) -> f64 {
    if h0 == 0.0 || h1 == 0.0 {
        return trapezoid(y[0], y[1], h0) + trapezoid(y[1], y[2], h1);
    }
    let hsum = h0 + h1;
    let ratio = h0 / h1;
    hsum / 6.0 * (y[0] * (2.0 - 1.0 / ratio) + y[1] * (hsum * hsum / (h0 * h1)) + y[2] * (2.0 - ratio))
}

/// Integral over the last interval `[x1, x2]` of the parabola through three points.
fn end_correction(y: &[f64], h0: f64, h1: f64) -> f64 {
    if h0 == 0.0 || h1 == 0.0 {
        return trapezoid(y[1], y[2], h1);
    }
    let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
    let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
    let eta = (h1 * h1 * h1) / (6.0 * h0 * (h0 + h1));
    alpha * y[2] + beta * y[1] - eta * y[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(simpson(&[], &[]), 0.0);
        assert_eq!(simpson(&[42.0], &[1.0]), 0.0);
        assert!(close(simpson(&[2.0, 4.0], &[0.0, 1.0]), 3.0));
    }

    #[test]
    fn linear_ramp_with_even_point_count_is_exact() {
        let value = simpson(&[10.0, 20.0, 30.0, 40.0], &[0.0, 1.0, 2.0, 3.0]);
        assert!(close(value, 75.0));
    }

    #[test]
    fn quadratic_is_exact_on_irregular_grid() {
        let x = [0.0, 0.3, 1.0, 1.2, 2.0, 2.9];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        assert!(close(simpson(&y, &x), 2.9f64.powi(3) / 3.0));

        let x = [0.0, 0.5, 1.5, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v * v - v + 1.0).collect();
        assert!(close(simpson(&y, &x), 27.0 - 4.5 + 3.0));
    }

    #[test]
    fn repeated_timestamps_stay_finite() {
        let value = simpson(&[1.0, 1.0, 1.0, 1.0], &[0.0, 1.0, 1.0, 2.0]);
        assert!(value.is_finite());
        assert!(close(value, 2.0));
    }
}
