//! Error types for resynthesis
//!
//! Only invalid configuration is an error. Degenerate input (empty buffers,
//! silence, frames running past the end of a buffer) is handled by fallback.

use thiserror::Error;

/// Errors raised before any processing starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),
    #[error("Stretch rate must be finite and positive, got {0}")]
    InvalidRate(f64),
    #[error("Pitch ratio must be finite and positive, got {0}")]
    InvalidPitchRatio(f64),
    #[error("Invalid period range: need 0 < min ({min}) < max ({max})")]
    InvalidPeriodRange { min: usize, max: usize },
    #[error("Reference pitch must be finite and positive, got {0} Hz")]
    InvalidReferencePitch(f64),
    #[error("Output of {requested} samples exceeds the limit of {limit}")]
    OutputTooLong { requested: f64, limit: usize },
}

pub type Result<T> = std::result::Result<T, AudioError>;

/// Longest buffer any stage will produce, in samples
pub const MAX_OUTPUT_LEN: usize = 1 << 28;

/// Round a requested output length up, rejecting anything past [`MAX_OUTPUT_LEN`]
pub(crate) fn checked_output_len(requested: f64) -> Result<usize> {
    if !(requested <= MAX_OUTPUT_LEN as f64) {
        return Err(AudioError::OutputTooLong {
            requested,
            limit: MAX_OUTPUT_LEN,
        });
    }
    Ok(requested.max(0.0).ceil() as usize)
}

/// Reject anything that is not a finite, strictly positive factor
pub(crate) fn is_positive_factor(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
