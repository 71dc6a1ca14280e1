//! Duration-preserving pitch shift
//!
//! Resampling by the pitch ratio changes pitch and duration together; the
//! time stretch by the inverse ratio then restores the original duration.

use crate::error::{checked_output_len, is_positive_factor, AudioError, Result};
use crate::resampler::resample;
use crate::stretch::time_stretch;
use tracing::debug;

/// Largest shift accepted by [`PitchShifter`], in semitones either way
pub const MAX_SEMITONES: f64 = 12.0;

/// Shift the perceived pitch of `signal` by `pitch_ratio`, keeping its duration
///
/// `pitch_ratio > 1` raises the pitch. `kernel_half_width` is the resampler
/// half width.
pub fn pitch_shift(
    signal: &[f64],
    sample_rate: u32,
    pitch_ratio: f64,
    kernel_half_width: usize,
) -> Result<Vec<f64>> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate(sample_rate));
    }
    if !is_positive_factor(pitch_ratio) {
        return Err(AudioError::InvalidPitchRatio(pitch_ratio));
    }
    // The resampled intermediate is the longest buffer in the chain
    checked_output_len(signal.len() as f64 / pitch_ratio)?;

    let resampled = resample(signal, pitch_ratio, kernel_half_width);
    let output = time_stretch(&resampled, sample_rate, 1.0 / pitch_ratio)?;

    debug!(
        pitch_ratio,
        input_len = signal.len(),
        resampled_len = resampled.len(),
        output_len = output.len(),
        "pitch shift"
    );
    Ok(output)
}

/// Pitch shifter driven by a semitone setting
#[derive(Debug, Clone)]
pub struct PitchShifter {
    sample_rate: u32,
    kernel_half_width: usize,
    /// Pitch shift in semitones
    semitones: f64,
}

impl PitchShifter {
    /// Create a shifter with no shift applied
    pub fn new(sample_rate: u32, kernel_half_width: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            kernel_half_width,
            semitones: 0.0,
        })
    }

    /// Set pitch shift in semitones (-12 to +12)
    pub fn set_semitones(&mut self, semitones: f64) {
        if semitones.is_nan() {
            return;
        }
        self.semitones = semitones.clamp(-MAX_SEMITONES, MAX_SEMITONES);
    }

    /// Get current pitch shift
    pub fn semitones(&self) -> f64 {
        self.semitones
    }

    /// Frequency ratio: 2^(semitones/12)
    pub fn pitch_ratio(&self) -> f64 {
        2.0f64.powf(self.semitones / 12.0)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Shift `signal` by the current setting
    pub fn process(&self, signal: &[f64]) -> Result<Vec<f64>> {
        pitch_shift(
            signal,
            self.sample_rate,
            self.pitch_ratio(),
            self.kernel_half_width,
        )
    }
}
