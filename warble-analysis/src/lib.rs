//! Pitch estimation for Warble
//!
//! Estimates the fundamental frequency of a buffered monophonic signal with
//! two estimator families built on FFT autocorrelation:
//! - MPM: key maximum of the normalized square difference
//! - YIN: absolute threshold on the cumulative mean normalized difference
//!
//! Every estimator returns `None` when no valid period is found; callers
//! must check before use (for example by falling back from MPM to YIN).

mod autocorr;
mod estimator;
mod mpm;
mod peak;
mod yin;

pub use autocorr::{autocorrelation_type1, autocorrelation_type2, reverse_energy};
pub use estimator::{
    estimate_with_fallback, DiagnosticCurves, Estimator, EstimatorFn, PitchReading,
    UnknownEstimator,
};
pub use mpm::{key_maximum, mpm_type1, mpm_type2, nsd_type1, nsd_type2, MPM_K};
pub use peak::parabolic_interpolation;
pub use yin::{
    absolute_threshold, cumulative_mean_normalized_difference, difference_type1,
    difference_type2, invert_nsd, yin_nsd_type1, yin_nsd_type2, yin_type1, yin_type2,
    YIN_THRESHOLD,
};
