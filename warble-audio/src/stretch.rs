//! Pitch-synchronous overlap-add time stretching
//!
//! Changes duration without changing pitch. The input is walked one detected
//! period at a time, and every splice is a Hann cross-fade between two
//! adjacent periods, so splice points stay aligned to waveform cycles.
//!
//! - **Compression** (`rate > 1`): two periods are blended into one, then
//!   untouched input is appended. Each step drops one period.
//! - **Expansion** (`rate < 1`): a period is emitted, then emitted again
//!   blended with the next one, then untouched input is appended. Each step
//!   repeats one period.

use std::f64::consts::PI;

use crate::error::{checked_output_len, is_positive_factor, AudioError, Result};
use crate::period::PeriodSearch;
use tracing::{debug, trace};

/// Rates this close to 1 return the input verbatim
pub const RATE_TOLERANCE: f64 = 1e-12;

/// Symmetric Hann window of `len` samples
pub fn hann_window(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
                .collect()
        }
    }
}

/// Stretch `signal` so its duration is divided by `rate`
///
/// `rate > 1` shortens (speeds up), `rate < 1` lengthens (slows down). The
/// local pitch is preserved. The output holds about `len / rate` samples,
/// every one of them derived from the input; a result longer than
/// [`MAX_OUTPUT_LEN`](crate::MAX_OUTPUT_LEN) is rejected.
pub fn time_stretch(signal: &[f64], sample_rate: u32, rate: f64) -> Result<Vec<f64>> {
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate(sample_rate));
    }
    if !is_positive_factor(rate) {
        return Err(AudioError::InvalidRate(rate));
    }
    if signal.is_empty() {
        return Ok(Vec::new());
    }
    if (rate - 1.0).abs() < RATE_TOLERANCE {
        return Ok(signal.to_vec());
    }

    let nominal = checked_output_len(signal.len() as f64 / rate)?;
    let search = PeriodSearch::for_sample_rate(sample_rate)?;
    let margin = 2 * search.max_period();

    // Zero tail so the period search never runs out of lags near the end
    let mut padded = Vec::with_capacity(signal.len() + margin);
    padded.extend_from_slice(signal);
    padded.resize(signal.len() + margin, 0.0);

    let mut output = Output::with_len(nominal + margin);
    let mut in_pos = 0usize;
    let mut out_pos = 0usize;
    let mut frames = 0usize;

    while in_pos < signal.len() && out_pos < nominal {
        let period = search.estimate(&padded, in_pos);
        let remaining = signal.len() - in_pos;

        if remaining < 2 * period {
            // Too short for a splice: emit the rest at the target rate
            let target = round_count(remaining as f64 / rate);
            let copied = target.min(remaining);
            output.copy(signal, in_pos, out_pos, copied);
            output.repeat_period(out_pos + copied, target - copied, period);
            out_pos = out_pos.saturating_add(target);
            trace!(in_pos, out_pos, period, "stretch tail");
            break;
        }

        let window = hann_window(2 * period);
        if rate >= 1.0 {
            // Blend this period out while the next fades in, then append input
            output.cross_fade(signal, in_pos, in_pos + period, out_pos, &window);
            let skip = round_count(period as f64 / (rate - 1.0));
            output.copy(signal, in_pos + period, out_pos + period, skip);

            in_pos = in_pos.saturating_add(period).saturating_add(skip);
            out_pos = out_pos.saturating_add(skip);
        } else {
            // Emit the period, repeat it blended into the next, then append input
            output.copy(signal, in_pos, out_pos, period);
            output.cross_fade(signal, in_pos + period, in_pos, out_pos + period, &window);
            let repeat = round_count(period as f64 * rate / (1.0 - rate));
            output.copy(signal, in_pos, out_pos + 2 * period, repeat);

            in_pos = in_pos.saturating_add(repeat);
            out_pos = out_pos.saturating_add(period).saturating_add(repeat);
        }

        trace!(in_pos, out_pos, period, "stretch frame");
        frames += 1;
    }

    let output = output.finish(out_pos.min(nominal));
    debug!(
        rate,
        frames,
        input_len = signal.len(),
        output_len = output.len(),
        "time stretch"
    );
    Ok(output)
}

/// Round a non-negative sample count; infinities saturate
fn round_count(count: f64) -> usize {
    count.round() as usize
}

/// Output buffer that remembers how far it has been written
struct Output {
    samples: Vec<f64>,
    written_end: usize,
}

impl Output {
    fn with_len(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
            written_end: 0,
        }
    }

    fn mark(&mut self, dst: usize, written: usize) {
        if written > 0 {
            self.written_end = self.written_end.max(dst + written);
        }
    }

    /// Copy up to `count` samples, stopping at the end of either buffer
    fn copy(&mut self, source: &[f64], src: usize, dst: usize, count: usize) {
        let (Some(source), Some(dest)) = (source.get(src..), self.samples.get_mut(dst..)) else {
            return;
        };
        let mut written = 0;
        for (slot, &sample) in dest.iter_mut().zip(source).take(count) {
            *slot = sample;
            written += 1;
        }
        self.mark(dst, written);
    }

    /// Hann cross-fade of one period into `samples[dst..]`
    ///
    /// `fading_out` is weighted by the falling half of the window, `fading_in`
    /// by the rising half. Stops at the first index past either buffer.
    fn cross_fade(
        &mut self,
        source: &[f64],
        fading_out: usize,
        fading_in: usize,
        dst: usize,
        window: &[f64],
    ) {
        let period = window.len() / 2;
        let (rising, falling) = window.split_at(period);

        let mut written = 0;
        for n in 0..period {
            let (Some(&out_sample), Some(&in_sample), Some(slot)) = (
                source.get(fading_out + n),
                source.get(fading_in + n),
                self.samples.get_mut(dst + n),
            ) else {
                break;
            };
            *slot = out_sample * falling[n] + in_sample * rising[n];
            written = n + 1;
        }
        self.mark(dst, written);
    }

    /// Extend by repeating the last `period` samples already in place
    fn repeat_period(&mut self, dst: usize, count: usize, period: usize) {
        let mut written = 0;
        for k in dst..dst.saturating_add(count) {
            if period == 0 || k < period || k >= self.samples.len() {
                break;
            }
            self.samples[k] = self.samples[k - period];
            written += 1;
        }
        self.mark(dst, written);
    }

    /// Samples up to `end`, never past the last written one
    fn finish(mut self, end: usize) -> Vec<f64> {
        self.samples.truncate(end.min(self.written_end));
        self.samples
    }
}
