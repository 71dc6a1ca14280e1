//! Local periodicity estimation by normalized cross-correlation
//!
//! A reference window at the analysis offset is correlated against the same
//! window shifted by every candidate lag. Normalizing by both window energies
//! keeps the choice stable when the amplitude drifts across a segment.

use crate::error::{AudioError, Result};
use tracing::trace;

/// Added to the correlation denominator so silent windows score zero
pub const CORRELATION_EPSILON: f64 = 1e-12;

/// Reference window length in seconds
const WINDOW_SECS: f64 = 0.010;
/// Shortest candidate period in seconds
const MIN_PERIOD_SECS: f64 = 0.005;
/// Longest candidate period in seconds
const MAX_PERIOD_SECS: f64 = 0.020;

/// Validated period search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSearch {
    min_period: usize,
    max_period: usize,
    window: usize,
}

impl PeriodSearch {
    /// Create a search over `[min_period, max_period]` with a reference window
    /// of `window` samples
    pub fn new(min_period: usize, max_period: usize, window: usize) -> Result<Self> {
        if min_period == 0 || min_period >= max_period {
            return Err(AudioError::InvalidPeriodRange {
                min: min_period,
                max: max_period,
            });
        }
        Ok(Self {
            min_period,
            max_period,
            window,
        })
    }

    /// Search parameters for speech and singing at `sample_rate`
    ///
    /// 10 ms reference window, periods from 5 ms to 20 ms. Every length is at
    /// least one sample and the range always spans at least one lag.
    pub fn for_sample_rate(sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        let rate = sample_rate as f64;
        let window = ((rate * WINDOW_SECS) as usize).max(1);
        let min_period = ((rate * MIN_PERIOD_SECS) as usize).max(1);
        let max_period = ((rate * MAX_PERIOD_SECS) as usize).max(min_period + 1);
        Self::new(min_period, max_period, window)
    }

    pub fn min_period(&self) -> usize {
        self.min_period
    }

    pub fn max_period(&self) -> usize {
        self.max_period
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Dominant period of `signal` at `offset`, in samples
    ///
    /// The reference window shrinks when fewer than `window + max_period`
    /// samples follow the offset. With nothing left to correlate the minimum
    /// period is returned. Ties keep the shortest lag.
    pub fn estimate(&self, signal: &[f64], offset: usize) -> usize {
        let available = signal
            .len()
            .saturating_sub(offset)
            .saturating_sub(self.max_period);
        let window = self.window.min(available);
        if window == 0 {
            trace!(offset, "no room for a reference window, using minimum period");
            return self.min_period;
        }

        let reference = &signal[offset..offset + window];
        let reference_energy: f64 = reference.iter().map(|s| s * s).sum();

        let mut best_lag = self.min_period;
        let mut best_score = f64::NEG_INFINITY;

        for lag in self.min_period..=self.max_period {
            let shifted = &signal[offset + lag..offset + lag + window];
            let (dot, energy) = reference
                .iter()
                .zip(shifted)
                .fold((0.0, 0.0), |(dot, energy), (&a, &b)| {
                    (dot + a * b, energy + b * b)
                });
            let score = dot / ((reference_energy * energy).sqrt() + CORRELATION_EPSILON);
            if score > best_score {
                best_score = score;
                best_lag = lag;
            }
        }

        trace!(offset, window, best_lag, best_score, "period estimate");
        best_lag
    }
}

/// One-shot period estimate with explicit search parameters
pub fn estimate_period(
    signal: &[f64],
    offset: usize,
    min_period: usize,
    max_period: usize,
    window: usize,
) -> Result<usize> {
    Ok(PeriodSearch::new(min_period, max_period, window)?.estimate(signal, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(period: f64, len: usize) -> Vec<f64> {
        (0..len).map(|i| (2.0 * PI * i as f64 / period).sin()).collect()
    }

    #[test]
    fn test_rejects_inverted_range() {
        assert_eq!(
            PeriodSearch::new(50, 20, 10),
            Err(AudioError::InvalidPeriodRange { min: 50, max: 20 })
        );
        assert!(PeriodSearch::new(0, 20, 10).is_err());
        assert!(PeriodSearch::new(20, 20, 10).is_err());
        assert!(estimate_period(&[0.0; 100], 0, 30, 10, 10).is_err());
    }

    #[test]
    fn test_sample_rate_parameters() {
        let search = PeriodSearch::for_sample_rate(48000).unwrap();
        assert_eq!(search.window(), 480);
        assert_eq!(search.min_period(), 240);
        assert_eq!(search.max_period(), 960);

        // Tiny rates still give a usable range
        let search = PeriodSearch::for_sample_rate(50).unwrap();
        assert_eq!(search.min_period(), 1);
        assert_eq!(search.max_period(), 2);
        assert_eq!(search.window(), 1);

        assert_eq!(
            PeriodSearch::for_sample_rate(0),
            Err(AudioError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn test_finds_integer_period() {
        let signal = sine(40.0, 400);
        assert_eq!(estimate_period(&signal, 0, 25, 60, 50).unwrap(), 40);
        assert_eq!(estimate_period(&signal, 13, 25, 60, 50).unwrap(), 40);
    }

    #[test]
    fn test_tolerates_amplitude_drift() {
        // Decaying sine: raw correlation would favour the shortest lag
        let signal: Vec<f64> = (0..400)
            .map(|i| (-(i as f64) / 60.0).exp() * (2.0 * PI * i as f64 / 32.0).sin())
            .collect();
        assert_eq!(estimate_period(&signal, 0, 20, 50, 40).unwrap(), 32);
    }

    #[test]
    fn test_silence_keeps_minimum_period() {
        assert_eq!(estimate_period(&[0.0; 400], 0, 25, 60, 50).unwrap(), 25);
    }

    #[test]
    fn test_short_tail_shrinks_window() {
        let signal = sine(40.0, 120);
        // 120 - 0 - 60 = 60 samples available, window shrinks from 100 to 60
        assert_eq!(estimate_period(&signal, 0, 25, 60, 100).unwrap(), 40);
    }

    #[test]
    fn test_no_room_falls_back_to_minimum() {
        let signal = sine(40.0, 100);
        assert_eq!(estimate_period(&signal, 50, 25, 60, 50).unwrap(), 25);
        assert_eq!(estimate_period(&signal, 500, 25, 60, 50).unwrap(), 25);
        assert_eq!(estimate_period(&[], 0, 25, 60, 50).unwrap(), 25);
    }
}
