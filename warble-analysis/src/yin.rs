//! YIN pitch estimation (de Cheveigné & Kawahara, 2002)
//!
//! Difference functions are derived from the FFT autocorrelation rather than
//! computed directly:
//! - Type 1: `d(τ) = r(0) − r(τ)` over the circular autocorrelation
//! - Type 2: `d(τ) = E(0) + E(τ) − 2·r(τ)` over the linear autocorrelation,
//!   with `E(τ)` the energy from τ to the end of the buffer
//!
//! The difference is normalized by its cumulative mean (CMND), and the first
//! dip under an absolute threshold is descended to its local minimum.
//!
//! The YIN-NSD variants run the same threshold search over an inverted MPM
//! NSD curve instead of a difference function.

use crate::autocorr::{autocorrelation_type1, autocorrelation_type2, is_silent, reverse_energy};
use crate::mpm::{nsd_type1, nsd_type2};
use crate::peak::{lag_to_frequency, parabolic_interpolation};
use tracing::debug;

/// Absolute CMND threshold for the direct YIN path
pub const YIN_THRESHOLD: f64 = 0.3;

/// Type 2 searches relative to the deepest dip: `1.5 × min(cmnd)`
const RELATIVE_THRESHOLD_FACTOR: f64 = 1.5;

/// Difference function type 1: `r(0) − r(τ)`
pub fn difference_type1(signal: &[f64]) -> Vec<f64> {
    let corr = autocorrelation_type1(signal);
    let Some(&energy) = corr.first() else {
        return corr;
    };
    corr.iter().map(|&r| energy - r).collect()
}

/// Difference function type 2: `E(0) + E(τ) − 2·r(τ)`
pub fn difference_type2(signal: &[f64]) -> Vec<f64> {
    let corr = autocorrelation_type2(signal);
    let energy = reverse_energy(signal);
    let Some(&total) = energy.first() else {
        return corr;
    };

    corr.iter()
        .zip(&energy)
        .map(|(&r, &tail)| total + tail - 2.0 * r)
        .collect()
}

/// Cumulative mean normalized difference
///
/// Consumes the difference curve and returns it normalized in place:
/// `cmnd(0) = 1`, `cmnd(τ) = d(τ) / (Σ_{i=1..τ} d(i) / τ)`. Where the running
/// sum is still zero the value is left at 1, matching lag 0.
pub fn cumulative_mean_normalized_difference(mut diff: Vec<f64>) -> Vec<f64> {
    let Some(first) = diff.first_mut() else {
        return diff;
    };
    *first = 1.0;

    let mut running_sum = 0.0;
    for (tau, value) in diff.iter_mut().enumerate().skip(1) {
        running_sum += *value;
        *value = if running_sum != 0.0 {
            *value / (running_sum / tau as f64)
        } else {
            1.0
        };
    }
    diff
}

/// First dip under `threshold`, descended to its local minimum
///
/// The search starts at lag 2. A dip that only bottoms out on the last
/// sample of the curve is rejected, since its minimum cannot be confirmed.
pub fn absolute_threshold(cmnd: &[f64], threshold: f64) -> Option<usize> {
    let len = cmnd.len();
    let mut tau = 2;

    while tau < len {
        if cmnd[tau] < threshold {
            while tau + 1 < len && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            break;
        }
        tau += 1;
    }

    if tau + 1 >= len || cmnd[tau] >= threshold {
        return None;
    }
    Some(tau)
}

/// Turn an NSD curve into a dip-searchable curve
///
/// Zeroes the leading positive lobe around lag 0, then negates every value so
/// NSD peaks become dips below zero. A curve that never leaves its leading
/// lobe has nothing to search and yields `None`.
pub fn invert_nsd(mut nsd: Vec<f64>) -> Option<Vec<f64>> {
    let lobe_end = nsd.iter().position(|&v| !(v > 0.0))?;
    for value in nsd[..lobe_end].iter_mut() {
        *value = 0.0;
    }
    for value in nsd.iter_mut() {
        *value = -*value;
    }
    Some(nsd)
}

fn estimate_from_cmnd(cmnd: &[f64], threshold: f64, sample_rate: u32) -> Option<f64> {
    let Some(lag) = absolute_threshold(cmnd, threshold) else {
        debug!(threshold, "YIN found no dip under threshold");
        return None;
    };
    let refined = parabolic_interpolation(cmnd, lag);
    let frequency = lag_to_frequency(sample_rate, refined);
    debug!(lag, refined, threshold, ?frequency, "YIN estimate");
    frequency
}

/// YIN over the circular difference function, fixed threshold
pub fn yin_type1(signal: &[f64], sample_rate: u32) -> Option<f64> {
    if is_silent(signal) {
        return None;
    }
    let cmnd = cumulative_mean_normalized_difference(difference_type1(signal));
    estimate_from_cmnd(&cmnd, YIN_THRESHOLD, sample_rate)
}

/// YIN over the linear difference function, threshold relative to the deepest dip
pub fn yin_type2(signal: &[f64], sample_rate: u32) -> Option<f64> {
    if is_silent(signal) {
        return None;
    }
    let cmnd = cumulative_mean_normalized_difference(difference_type2(signal));
    let deepest = cmnd.iter().copied().fold(f64::INFINITY, f64::min);
    estimate_from_cmnd(&cmnd, RELATIVE_THRESHOLD_FACTOR * deepest, sample_rate)
}

fn estimate_from_nsd(nsd: Vec<f64>, sample_rate: u32) -> Option<f64> {
    let Some(inverted) = invert_nsd(nsd) else {
        debug!("NSD never leaves its leading lobe");
        return None;
    };
    estimate_from_cmnd(&inverted, 0.0, sample_rate)
}

/// YIN threshold search over the inverted circular NSD
pub fn yin_nsd_type1(signal: &[f64], sample_rate: u32) -> Option<f64> {
    if is_silent(signal) {
        return None;
    }
    estimate_from_nsd(nsd_type1(signal), sample_rate)
}

/// YIN threshold search over the inverted linear NSD
pub fn yin_nsd_type2(signal: &[f64], sample_rate: u32) -> Option<f64> {
    if is_silent(signal) {
        return None;
    }
    estimate_from_nsd(nsd_type2(signal), sample_rate)
}
