//! Resynthesis for Warble - resampling, time stretching, and pitch shifting
//!
//! This module provides the buffer-level processing pipeline:
//! - Resampler: windowed-sinc fractional resampling
//! - Period: local periodicity by normalized cross-correlation
//! - Stretch: pitch-synchronous overlap-add time stretching
//! - Shift: duration-preserving pitch shift (resample + stretch)
//! - Melody: render a note sequence from one recorded tone
//! - PCM: 16-bit little-endian encoding for playback

mod error;
mod melody;
mod pcm;
mod period;
mod resampler;
mod shift;
mod stretch;

pub use error::{AudioError, Result, MAX_OUTPUT_LEN};
pub use melody::{render_melody, Note, DEMO_MELODY};
pub use pcm::{decode_pcm16_le, encode_pcm16_le, sample_to_i16};
pub use period::{estimate_period, PeriodSearch, CORRELATION_EPSILON};
pub use resampler::{resample, resample_to_rate, sinc, DEFAULT_HALF_WIDTH};
pub use shift::{pitch_shift, PitchShifter, MAX_SEMITONES};
pub use stretch::{hann_window, time_stretch, RATE_TOLERANCE};
