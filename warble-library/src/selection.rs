//! Region selection with re-normalization

use thiserror::Error;
use tracing::debug;

/// Errors that can occur when cutting a region
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("Nothing to select from an empty buffer")]
    EmptyBuffer,
    #[error("Region start {start} is past the end of a {len}-sample buffer")]
    StartOutOfRange { start: usize, len: usize },
    #[error("Region end {end} is before start {start}")]
    Inverted { start: usize, end: usize },
    #[error("Invalid time {0} s")]
    InvalidTime(f64),
}

/// Cut `[start, end]` (inclusive) and rescale it to span [-1, 1]
///
/// `end` is clamped to the last sample. A constant region maps to zeros.
pub fn select_region(samples: &[f64], start: usize, end: usize) -> Result<Vec<f64>, SelectionError> {
    if samples.is_empty() {
        return Err(SelectionError::EmptyBuffer);
    }
    if start >= samples.len() {
        return Err(SelectionError::StartOutOfRange {
            start,
            len: samples.len(),
        });
    }
    if end < start {
        return Err(SelectionError::Inverted { start, end });
    }

    let end = end.min(samples.len() - 1);
    let region = &samples[start..=end];

    let (min, max) = region
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    let span = max - min;
    debug!(start, end, min, max, "select region");

    if span <= 0.0 || !span.is_finite() {
        return Ok(vec![0.0; region.len()]);
    }
    Ok(region.iter().map(|&s| 2.0 * (s - min) / span - 1.0).collect())
}

/// Convert a time in seconds to a sample index
pub fn seconds_to_index(seconds: f64, sample_rate: u32) -> Result<usize, SelectionError> {
    if !(seconds.is_finite() && seconds >= 0.0) {
        return Err(SelectionError::InvalidTime(seconds));
    }
    Ok((seconds * sample_rate as f64).floor() as usize)
}
