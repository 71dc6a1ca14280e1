//! End-to-end: estimate a tone, shift it an octave, estimate again

use std::f64::consts::PI;

use warble_analysis::{estimate_with_fallback, mpm_type2, yin_type2};
use warble_audio::{pitch_shift, render_melody, time_stretch, Note, PeriodSearch};

const SAMPLE_RATE: u32 = 48000;

fn sine(frequency: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.8 * (2.0 * PI * frequency * i as f64 / SAMPLE_RATE as f64).sin())
        .collect()
}

#[test]
fn test_estimators_agree_on_a4() {
    let signal = sine(440.0, 2048);

    let mpm = mpm_type2(&signal, SAMPLE_RATE).expect("MPM estimate");
    let yin = yin_type2(&signal, SAMPLE_RATE).expect("YIN estimate");
    assert!((mpm - 440.0).abs() < 5.0, "MPM reported {mpm}");
    assert!((yin - 440.0).abs() < 5.0, "YIN reported {yin}");
}

#[test]
fn test_octave_shift_keeps_duration() {
    let signal = sine(440.0, 2048);
    let shifted = pitch_shift(&signal, SAMPLE_RATE, 2.0, 30).unwrap();

    // Duration holds to within the longest period, with no silent tail
    let max_period = PeriodSearch::for_sample_rate(SAMPLE_RATE).unwrap().max_period();
    let error = shifted.len().abs_diff(signal.len());
    assert!(error <= max_period, "shifted length {}", shifted.len());
    let silent_tail = shifted.iter().rev().take_while(|&&s| s == 0.0).count();
    assert!(silent_tail < 4, "{silent_tail} trailing zeros");

    let frequency = mpm_type2(&shifted, SAMPLE_RATE).expect("estimate after shift");
    assert!((frequency - 880.0).abs() < 10.0, "shifted tone at {frequency}");
}

#[test]
fn test_unit_ratio_round_trip() {
    let signal = sine(440.0, 2048);
    let shifted = pitch_shift(&signal, SAMPLE_RATE, 1.0, 30).unwrap();
    assert_eq!(shifted.len(), signal.len());
    assert_eq!(time_stretch(&signal, SAMPLE_RATE, 1.0).unwrap(), signal);
}

#[test]
fn test_melody_from_estimated_reference() {
    let source = sine(440.0, 24000);
    let reading = estimate_with_fallback(&source[..2048], SAMPLE_RATE).expect("reference pitch");

    let notes = [Note::tone(880.0, 8.0), Note::rest(8.0)];
    let output = render_melody(&source, SAMPLE_RATE, reading.frequency, &notes, 30).unwrap();

    // The rest is exact; the shifted note lands within a stretch frame
    let note_len = notes[0].duration_samples(SAMPLE_RATE);
    assert!(output.len() >= note_len);
    assert!(output[output.len() - note_len..].iter().all(|&s| s == 0.0));
}
