//! Melody rendering from a single recorded tone
//!
//! Each note re-pitches a prefix of the source buffer by
//! `target / reference` and the results are concatenated. Rests are silence
//! of the same nominal duration.

use crate::error::{is_positive_factor, AudioError, Result};
use crate::shift::pitch_shift;
use tracing::{debug, info};

/// One entry of a melody
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Target frequency in Hz, `None` for a rest
    pub frequency: Option<f64>,
    /// Note-value divisor: 2 = half, 4 = quarter, 8 = eighth
    pub length: f64,
}

impl Note {
    pub const fn tone(frequency: f64, length: f64) -> Self {
        Self {
            frequency: Some(frequency),
            length,
        }
    }

    pub const fn rest(length: f64) -> Self {
        Self {
            frequency: None,
            length,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.frequency.is_none()
    }

    /// Nominal duration in samples: `floor(sample_rate / length) * 2`
    ///
    /// Non-positive or non-finite lengths last zero samples.
    pub fn duration_samples(&self, sample_rate: u32) -> usize {
        if !is_positive_factor(self.length) {
            return 0;
        }
        ((sample_rate as f64 / self.length).floor() as usize).saturating_mul(2)
    }
}

const C4: f64 = 261.62;
const D4: f64 = 293.66;
const E4: f64 = 329.62;
const F4: f64 = 349.22;
const G4: f64 = 391.99;
const A4: f64 = 440.0;

/// A short C-major children's round
pub const DEMO_MELODY: [Note; 31] = [
    Note::tone(C4, 4.0),
    Note::tone(D4, 4.0),
    Note::tone(E4, 4.0),
    Note::tone(F4, 4.0),
    Note::tone(E4, 4.0),
    Note::tone(D4, 4.0),
    Note::tone(C4, 2.0),
    Note::tone(E4, 4.0),
    Note::tone(F4, 4.0),
    Note::tone(G4, 4.0),
    Note::tone(A4, 4.0),
    Note::tone(F4, 4.0),
    Note::tone(E4, 2.0),
    Note::tone(C4, 4.0),
    Note::rest(4.0),
    Note::tone(C4, 4.0),
    Note::rest(4.0),
    Note::tone(C4, 4.0),
    Note::rest(4.0),
    Note::tone(C4, 4.0),
    Note::rest(4.0),
    Note::tone(C4, 8.0),
    Note::tone(C4, 8.0),
    Note::tone(D4, 8.0),
    Note::tone(D4, 8.0),
    Note::tone(E4, 8.0),
    Note::tone(E4, 8.0),
    Note::tone(F4, 8.0),
    Note::tone(E4, 4.0),
    Note::tone(D4, 4.0),
    Note::tone(C4, 4.0),
];

/// Render `notes` by pitch-shifting `source`, recorded at `reference_hz`
pub fn render_melody(
    source: &[f64],
    sample_rate: u32,
    reference_hz: f64,
    notes: &[Note],
    kernel_half_width: usize,
) -> Result<Vec<f64>> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate(sample_rate));
    }
    if !is_positive_factor(reference_hz) {
        return Err(AudioError::InvalidReferencePitch(reference_hz));
    }

    let mut output = Vec::new();
    for note in notes {
        let duration = note.duration_samples(sample_rate);
        match note.frequency {
            None => output.resize(output.len() + duration, 0.0),
            Some(target) => {
                let tone = &source[..duration.min(source.len())];
                let ratio = target / reference_hz;
                debug!(target, ratio, samples = tone.len(), "render note");
                output.extend(pitch_shift(tone, sample_rate, ratio, kernel_half_width)?);
            }
        }
    }

    info!(
        notes = notes.len(),
        reference_hz,
        samples = output.len(),
        "melody rendered"
    );
    Ok(output)
}
