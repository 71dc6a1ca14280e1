//! Windowed-sinc fractional resampler
//!
//! Each output sample `n` reads the input at the fractional position
//! `t = ratio · n`, summing `input[k] · sinc(t − k)` over the `2·half_width + 1`
//! integer neighbours of `t`. Neighbours outside the input contribute zero.

use std::f64::consts::PI;

use crate::error::MAX_OUTPUT_LEN;
use tracing::warn;

/// Default number of sinc lobes on each side of the read position
pub const DEFAULT_HALF_WIDTH: usize = 30;

/// Arguments closer to zero than this are treated as exactly zero
const SINC_ZERO: f64 = 1e-8;

/// Normalized sinc: `sin(πx) / (πx)`, with `sinc(0) = 1`
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x.abs() < SINC_ZERO {
        return 1.0;
    }
    let px = PI * x;
    px.sin() / px
}

/// Resample by the input-to-output rate `ratio`
///
/// The output holds `floor(len / ratio)` samples: `ratio > 1` shortens the
/// signal (raising its pitch on playback), `ratio < 1` lengthens it. A
/// non-positive or non-finite ratio, or one that would produce more than
/// [`MAX_OUTPUT_LEN`] samples, yields an empty output.
pub fn resample(input: &[f64], ratio: f64, half_width: usize) -> Vec<f64> {
    if !(ratio.is_finite() && ratio > 0.0) || input.is_empty() {
        return Vec::new();
    }

    let requested = input.len() as f64 / ratio;
    if !(requested <= MAX_OUTPUT_LEN as f64) {
        warn!(ratio, requested, "resampled output too long, skipping");
        return Vec::new();
    }
    let out_len = requested as usize;
    let last = input.len() as i64 - 1;
    let reach = half_width as i64;

    (0..out_len)
        .map(|n| {
            let t = ratio * n as f64;
            let base = t.floor() as i64;
            let lo = (base - reach).max(0);
            let hi = (base + reach).min(last);
            (lo..=hi)
                .map(|k| input[k as usize] * sinc(t - k as f64))
                .sum()
        })
        .collect()
}

/// Convert a buffer from one sample rate to another
pub fn resample_to_rate(input: &[f64], from_rate: u32, to_rate: u32, half_width: usize) -> Vec<f64> {
    if from_rate == to_rate {
        return input.to_vec();
    }
    if from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }
    resample(input, from_rate as f64 / to_rate as f64, half_width)
}
