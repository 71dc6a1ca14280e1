//! FFT-based autocorrelation and energy envelopes
//!
//! Both estimator families build on the same substrate:
//! - Type 1: circular autocorrelation of the signal as-is (length N)
//! - Type 2: linear autocorrelation, zero-padded to 2N then truncated to N
//!
//! Autocorrelation is computed as `IFFT(X · conj(X))` and rescaled by the
//! transform length, so lag 0 equals the signal energy `Σ x²`.

use rustfft::{num_complex::Complex, FftPlanner};

/// Circular autocorrelation (type 1)
///
/// Lags wrap around the end of the buffer. Cheap, but periodic content that
/// does not fit a whole number of cycles into the buffer leaks into every lag.
pub fn autocorrelation_type1(signal: &[f64]) -> Vec<f64> {
    power_spectrum_autocorrelation(signal, signal.len())
}

/// Linear autocorrelation (type 2)
///
/// Zero-pads to twice the signal length before transforming so that no lag
/// wraps around. This is the numerically correct variant.
pub fn autocorrelation_type2(signal: &[f64]) -> Vec<f64> {
    power_spectrum_autocorrelation(signal, signal.len() * 2)
}

fn power_spectrum_autocorrelation(signal: &[f64], fft_size: usize) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let mut buffer: Vec<Complex<f64>> = signal
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_size)
        .collect();

    forward.process(&mut buffer);

    // Power spectrum
    for bin in buffer.iter_mut() {
        *bin = *bin * bin.conj();
    }

    inverse.process(&mut buffer);

    // rustfft leaves the inverse unnormalized
    let scale = 1.0 / fft_size as f64;
    buffer
        .iter()
        .take(signal.len())
        .map(|c| c.re * scale)
        .collect()
}

/// Reverse-cumulative energy: `energy[τ] = Σ_{i≥τ} signal[i]²`
pub fn reverse_energy(signal: &[f64]) -> Vec<f64> {
    let mut energy = vec![0.0; signal.len()];
    let mut running = 0.0;
    for (slot, &sample) in energy.iter_mut().zip(signal).rev() {
        running += sample * sample;
        *slot = running;
    }
    energy
}

/// True when the buffer carries no energy at all
pub(crate) fn is_silent(signal: &[f64]) -> bool {
    signal.iter().all(|&s| s == 0.0)
}
