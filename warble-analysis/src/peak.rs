//! Sub-sample refinement of curve extrema

/// Refine an integer extremum index with a parabola through its neighbours
///
/// At the curve boundaries only one neighbour exists; the index of whichever
/// of the two is smaller is returned instead. A flat parabola (zero
/// curvature) keeps the integer index.
pub fn parabolic_interpolation(curve: &[f64], x: usize) -> f64 {
    let len = curve.len();
    if len < 2 || x >= len {
        return x as f64;
    }

    if x == 0 {
        return if curve[0] <= curve[1] { 0.0 } else { 1.0 };
    }
    if x == len - 1 {
        return if curve[x] <= curve[x - 1] {
            x as f64
        } else {
            (x - 1) as f64
        };
    }

    let denom = curve[x + 1] + curve[x - 1] - 2.0 * curve[x];
    if denom == 0.0 {
        return x as f64;
    }
    let delta = curve[x - 1] - curve[x + 1];
    x as f64 + delta / (2.0 * denom)
}

/// Convert a lag in samples to a frequency, rejecting non-positive lags
pub(crate) fn lag_to_frequency(sample_rate: u32, lag: f64) -> Option<f64> {
    if lag > 0.0 && lag.is_finite() {
        Some(sample_rate as f64 / lag)
    } else {
        None
    }
}
