//! Estimator selection
//!
//! Every estimator shares one contract: `fn(&[f64], u32) -> Option<f64>`,
//! taking a mono buffer and its sample rate and returning a frequency in Hz,
//! or `None` when no period could be found.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::mpm::{mpm_type1, mpm_type2, nsd_type2};
use crate::yin::{
    cumulative_mean_normalized_difference, difference_type2, yin_nsd_type1, yin_nsd_type2,
    yin_type1, yin_type2,
};

/// Common signature of every pitch estimator
pub type EstimatorFn = fn(&[f64], u32) -> Option<f64>;

/// Error returned when parsing an unknown estimator name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown estimator '{0}' (expected mpm1, mpm2, yin1, yin2, yin-nsd1 or yin-nsd2)")]
pub struct UnknownEstimator(pub String);

/// Available pitch estimation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Estimator {
    /// MPM over circular autocorrelation
    MpmType1,
    /// MPM over linear autocorrelation
    #[default]
    MpmType2,
    /// YIN, circular difference, fixed threshold
    YinType1,
    /// YIN, linear difference, threshold relative to the deepest dip
    YinType2,
    /// YIN threshold search over the inverted circular NSD
    YinNsdType1,
    /// YIN threshold search over the inverted linear NSD
    YinNsdType2,
}

impl Estimator {
    pub const ALL: [Estimator; 6] = [
        Estimator::MpmType1,
        Estimator::MpmType2,
        Estimator::YinType1,
        Estimator::YinType2,
        Estimator::YinNsdType1,
        Estimator::YinNsdType2,
    ];

    /// Short name used in configuration and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Estimator::MpmType1 => "mpm1",
            Estimator::MpmType2 => "mpm2",
            Estimator::YinType1 => "yin1",
            Estimator::YinType2 => "yin2",
            Estimator::YinNsdType1 => "yin-nsd1",
            Estimator::YinNsdType2 => "yin-nsd2",
        }
    }

    /// The estimator as a plain function
    pub fn function(self) -> EstimatorFn {
        match self {
            Estimator::MpmType1 => mpm_type1,
            Estimator::MpmType2 => mpm_type2,
            Estimator::YinType1 => yin_type1,
            Estimator::YinType2 => yin_type2,
            Estimator::YinNsdType1 => yin_nsd_type1,
            Estimator::YinNsdType2 => yin_nsd_type2,
        }
    }

    /// Estimate the fundamental frequency of `signal`
    pub fn estimate(self, signal: &[f64], sample_rate: u32) -> Option<f64> {
        (self.function())(signal, sample_rate)
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Estimator {
    type Err = UnknownEstimator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Estimator::ALL
            .into_iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| UnknownEstimator(s.to_string()))
    }
}

/// A frequency estimate together with the estimator that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReading {
    /// Estimated fundamental frequency in Hz
    pub frequency: f64,
    /// Estimator that produced the estimate
    pub estimator: Estimator,
}

/// Estimate with MPM type 2, falling back to YIN type 2
///
/// Returns `None` only when both estimators come up empty.
pub fn estimate_with_fallback(signal: &[f64], sample_rate: u32) -> Option<PitchReading> {
    for estimator in [Estimator::MpmType2, Estimator::YinType2] {
        if let Some(frequency) = estimator.estimate(signal, sample_rate) {
            debug!(%estimator, frequency, "pitch reading");
            return Some(PitchReading {
                frequency,
                estimator,
            });
        }
    }
    warn!(samples = signal.len(), "no pitch estimate from MPM or YIN");
    None
}

/// Leading lags of the curves the type 2 estimators search
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCurves {
    /// Linear normalized square difference
    pub nsd: Vec<f64>,
    /// Cumulative mean normalized linear difference
    pub cmnd: Vec<f64>,
}

impl DiagnosticCurves {
    /// Compute both curves, keeping at most `max_lags` leading lags
    pub fn compute(signal: &[f64], max_lags: usize) -> Self {
        let mut nsd = nsd_type2(signal);
        let mut cmnd = cumulative_mean_normalized_difference(difference_type2(signal));
        nsd.truncate(max_lags);
        cmnd.truncate(max_lags);
        Self { nsd, cmnd }
    }

    /// Number of lags held
    pub fn len(&self) -> usize {
        self.nsd.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nsd.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(frequency: f64, sample_rate: u32, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 0.8 * (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn test_names_round_trip() {
        for estimator in Estimator::ALL {
            assert_eq!(estimator.name().parse::<Estimator>(), Ok(estimator));
        }
        assert_eq!(" MPM2 ".parse::<Estimator>(), Ok(Estimator::MpmType2));
    }

    #[test]
    fn test_unknown_name() {
        let err = "crepe".parse::<Estimator>().unwrap_err();
        assert_eq!(err, UnknownEstimator("crepe".to_string()));
        assert!(err.to_string().contains("crepe"));
    }

    #[test]
    fn test_all_estimators_share_contract() {
        let signal = sine(440.0, 48000, 2048);
        for estimator in Estimator::ALL {
            let f: EstimatorFn = estimator.function();
            assert_eq!(f(&signal, 48000), estimator.estimate(&signal, 48000));
        }
    }

    #[test]
    fn test_fallback_prefers_mpm() {
        let signal = sine(440.0, 48000, 2048);
        let reading = estimate_with_fallback(&signal, 48000).unwrap();
        assert_eq!(reading.estimator, Estimator::MpmType2);
        assert!((reading.frequency - 440.0).abs() < 5.0);
    }

    #[test]
    fn test_fallback_on_silence() {
        assert_eq!(estimate_with_fallback(&[0.0; 1024], 48000), None);
    }

    #[test]
    fn test_diagnostic_curves_truncate() {
        let signal = sine(440.0, 48000, 2048);
        let curves = DiagnosticCurves::compute(&signal, 1000);
        assert_eq!(curves.len(), 1000);
        assert_eq!(curves.cmnd.len(), 1000);
        assert_eq!(curves.cmnd[0], 1.0);

        let short = DiagnosticCurves::compute(&signal[..10], 1000);
        assert_eq!(short.len(), 10);
        assert!(DiagnosticCurves::compute(&[], 1000).is_empty());
    }
}
