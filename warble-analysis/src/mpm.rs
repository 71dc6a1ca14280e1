//! McLeod Pitch Method (MPM)
//!
//! Pitch estimation from a normalized square difference (NSD) curve:
//! 1. Autocorrelate the buffer via FFT
//! 2. Normalize into an NSD curve indexed by lag
//! 3. Pick the first positive lobe whose peak reaches `k · max` (key maximum)
//! 4. Refine the peak with parabolic interpolation and convert to Hz

use crate::autocorr::{autocorrelation_type1, autocorrelation_type2, is_silent, reverse_energy};
use crate::peak::{lag_to_frequency, parabolic_interpolation};
use tracing::{debug, trace};

/// Fraction of the highest remaining NSD peak a lobe must reach to be chosen
pub const MPM_K: f64 = 0.5;

/// Floor for the tail energy term, keeps near-silent tails from blowing up
const TAIL_ENERGY_FLOOR: f64 = 1.0;

/// NSD type 1: circular autocorrelation divided by its lag-0 value
///
/// A zero-energy buffer is returned unnormalized (all zeros).
pub fn nsd_type1(signal: &[f64]) -> Vec<f64> {
    let mut corr = autocorrelation_type1(signal);
    let Some(&energy) = corr.first() else {
        return corr;
    };
    if energy != 0.0 {
        for value in corr.iter_mut() {
            *value /= energy;
        }
    }
    corr
}

/// NSD type 2: `r(τ) / (r(0) + m(τ))` over the linear autocorrelation
///
/// `m(τ)` is the energy from lag τ to the end of the buffer, floored at 1.
pub fn nsd_type2(signal: &[f64]) -> Vec<f64> {
    let corr = autocorrelation_type2(signal);
    let Some(&energy) = corr.first() else {
        return corr;
    };

    corr.iter()
        .zip(reverse_energy(signal))
        .map(|(&r, tail)| r / (energy + tail.max(TAIL_ENERGY_FLOOR)))
        .collect()
}

/// Key-maximum search over an NSD curve
///
/// Scanning starts at the first value at or below `max(min(nsd), 0)`. Each
/// positive lobe tracks its running peak; the first lobe that closes (dips
/// back below zero) with a peak at or above `MPM_K` times the highest
/// remaining value wins. A lobe that never closes yields no estimate.
pub fn key_maximum(nsd: &[f64]) -> Option<usize> {
    let lowest = nsd.iter().copied().fold(f64::INFINITY, f64::min);
    if !lowest.is_finite() {
        return None;
    }
    let floor = lowest.max(0.0);

    let start = nsd.iter().position(|&v| v <= floor)?;
    let highest = nsd[start..]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let threshold = MPM_K * highest;

    let mut in_negative = true;
    let mut lobe_peak: Option<usize> = None;

    for (i, &value) in nsd.iter().enumerate().skip(start) {
        if in_negative {
            if value < 0.0 {
                continue;
            }
            lobe_peak = Some(i);
            in_negative = false;
        }

        if value < 0.0 {
            in_negative = true;
            if let Some(peak) = lobe_peak {
                trace!(peak, value = nsd[peak], threshold, "NSD lobe closed");
                if nsd[peak] >= threshold {
                    return Some(peak);
                }
            }
        }

        if let Some(peak) = lobe_peak {
            if value > nsd[peak] {
                lobe_peak = Some(i);
            }
        }
    }

    None
}

fn estimate_from_nsd(nsd: &[f64], sample_rate: u32) -> Option<f64> {
    let Some(lag) = key_maximum(nsd) else {
        debug!("MPM found no qualifying NSD lobe");
        return None;
    };
    let refined = parabolic_interpolation(nsd, lag);
    let frequency = lag_to_frequency(sample_rate, refined);
    debug!(lag, refined, ?frequency, "MPM estimate");
    frequency
}

/// MPM over the circular NSD curve
pub fn mpm_type1(signal: &[f64], sample_rate: u32) -> Option<f64> {
    if is_silent(signal) {
        return None;
    }
    estimate_from_nsd(&nsd_type1(signal), sample_rate)
}

/// MPM over the linear NSD curve (preferred)
pub fn mpm_type2(signal: &[f64], sample_rate: u32) -> Option<f64> {
    if is_silent(signal) {
        return None;
    }
    estimate_from_nsd(&nsd_type2(signal), sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn sine(frequency: f64, sample_rate: u32, len: usize, amplitude: f64) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn test_nsd_type1_starts_at_one() {
        let nsd = nsd_type1(&sine(480.0, 48000, 2000, 0.7));
        assert_abs_diff_eq!(nsd[0], 1.0, epsilon = 1e-12);
        // Whole number of cycles: circular NSD is a pure cosine
        assert_abs_diff_eq!(nsd[100], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(nsd[50], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nsd_type2_is_bounded() {
        let nsd = nsd_type2(&sine(440.0, 48000, 2048, 0.8));
        assert!(nsd.iter().all(|v| v.abs() <= 1.0));
        // r(0) / (r(0) + r(0))
        assert_abs_diff_eq!(nsd[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_nsd_of_silence_is_zero() {
        assert!(nsd_type1(&[0.0; 64]).iter().all(|&v| v == 0.0));
        assert!(nsd_type2(&[0.0; 64]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_key_maximum_picks_first_qualifying_lobe() {
        // Small lobe at 3 (below half of the max), big lobe at 7
        let nsd = [1.0, 0.2, -0.3, 0.1, -0.2, 0.3, 0.8, 0.9, 0.4, -0.1, 0.5, -0.2];
        assert_eq!(key_maximum(&nsd), Some(7));
    }

    #[test]
    fn test_key_maximum_needs_closed_lobe() {
        // Peak at 5 never dips back below zero
        let nsd = [1.0, 0.1, -0.5, 0.2, 0.6, 0.9, 0.7];
        assert_eq!(key_maximum(&nsd), None);
    }

    #[test]
    fn test_key_maximum_degenerate() {
        assert_eq!(key_maximum(&[]), None);
        assert_eq!(key_maximum(&[0.0; 32]), None);
    }

    #[test]
    fn test_mpm_type1_whole_cycles() {
        let signal = sine(480.0, 48000, 2000, 0.7);
        let frequency = mpm_type1(&signal, 48000).unwrap();
        assert_abs_diff_eq!(frequency, 480.0, epsilon = 1.0);
    }

    #[test]
    fn test_mpm_type2_three_periods() {
        // Shortest buffer holding three whole periods
        let cases: [(f64, u32); 4] = [(440.0, 48000), (110.0, 48000), (1000.0, 44100), (220.0, 16000)];
        for (f0, sample_rate) in cases {
            let len = (3.0 * sample_rate as f64 / f0).ceil() as usize;
            let signal = sine(f0, sample_rate, len, 0.8);
            let frequency = mpm_type2(&signal, sample_rate)
                .unwrap_or_else(|| panic!("no estimate for {f0} Hz over {len} samples"));
            assert!(
                (frequency - f0).abs() < f0 * 0.01,
                "expected {f0} Hz from {len} samples, got {frequency} Hz"
            );
        }
    }

    #[test]
    fn test_mpm_type2_sine_within_one_percent() {
        for &f0 in &[110.0, 220.0, 440.0, 880.0] {
            let signal = sine(f0, 48000, 4096, 0.8);
            let frequency = mpm_type2(&signal, 48000).unwrap();
            assert!(
                (frequency - f0).abs() < f0 * 0.01,
                "expected {f0} Hz, got {frequency} Hz"
            );
        }
    }

    #[test]
    fn test_mpm_silence_has_no_estimate() {
        assert_eq!(mpm_type1(&[0.0; 2048], 48000), None);
        assert_eq!(mpm_type2(&[0.0; 2048], 48000), None);
        assert_eq!(mpm_type2(&[], 48000), None);
    }
}
