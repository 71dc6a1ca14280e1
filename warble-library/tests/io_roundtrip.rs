//! File round trips through the writer and the Symphonia loader

use std::f64::consts::PI;
use std::fs;

use approx::assert_abs_diff_eq;
use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;
use warble_analysis::mpm_type2;
use warble_audio::decode_pcm16_le;
use warble_library::{
    select_region, write_audio, write_pcm, write_wav, AudioLoader, Config, LoadError,
};

fn sine(frequency: f64, sample_rate: u32, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.6 * (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin())
        .collect()
}

#[test]
fn test_wav_write_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let samples = sine(440.0, 48000, 4800);

    write_wav(&path, &samples, 48000).unwrap();
    let loaded = AudioLoader::new().load(&path).unwrap();

    assert_eq!(loaded.sample_rate, 48000);
    assert_eq!(loaded.source_sample_rate, 48000);
    assert_eq!(loaded.channels, 1);
    assert_eq!(loaded.title, "tone");
    assert_eq!(loaded.samples.len(), samples.len());
    assert_abs_diff_eq!(loaded.duration_secs, 0.1, epsilon = 1e-9);
    for (a, b) in loaded.samples.iter().zip(&samples) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
    }
}

#[test]
fn test_load_resamples_to_working_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("low.wav");
    write_wav(&path, &sine(440.0, 24000, 2400), 24000).unwrap();

    let loaded = AudioLoader::with_sample_rate(48000).load(&path).unwrap();
    assert_eq!(loaded.source_sample_rate, 24000);
    assert_eq!(loaded.sample_rate, 48000);
    assert_eq!(loaded.samples.len(), 4800);

    let frequency = mpm_type2(&loaded.samples[1000..3048], 48000).expect("pitch after resampling");
    assert!((frequency - 440.0).abs() < 5.0, "got {frequency}");
}

#[test]
fn test_stereo_is_mixed_down() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stereo.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for _ in 0..100 {
        writer.write_sample(16384i16).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let loaded = AudioLoader::new().load(&path).unwrap();
    assert_eq!(loaded.channels, 2);
    assert_eq!(loaded.samples.len(), 100);
    for sample in &loaded.samples {
        assert_abs_diff_eq!(*sample, 0.25, epsilon = 1e-6);
    }
}

#[test]
fn test_raw_pcm_output() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.pcm");
    let samples = [0.5, -0.5, 0.0, 1.5];

    write_pcm(&path, &samples).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);

    let decoded = decode_pcm16_le(&bytes);
    assert_abs_diff_eq!(decoded[0], 0.5, epsilon = 1e-4);
    assert_abs_diff_eq!(decoded[1], -0.5, epsilon = 1e-4);
    assert_eq!(decoded[2], 0.0);
    assert_abs_diff_eq!(decoded[3], 1.0, epsilon = 1e-4);
}

#[test]
fn test_write_audio_picks_format() {
    let dir = TempDir::new().unwrap();
    let samples = sine(220.0, 8000, 800);

    let raw = dir.path().join("melody.raw");
    write_audio(&raw, &samples, 8000).unwrap();
    assert_eq!(fs::metadata(&raw).unwrap().len(), 1600);

    let wav = dir.path().join("melody.wav");
    write_audio(&wav, &samples, 8000).unwrap();
    assert_eq!(&fs::read(&wav).unwrap()[..4], b"RIFF");
}

#[test]
fn test_load_rejects_non_audio() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "not audio at all").unwrap();

    let result = AudioLoader::new().load(&path);
    assert!(matches!(
        result,
        Err(LoadError::UnsupportedFormat(_)) | Err(LoadError::NoAudioTrack)
    ));
}

#[test]
fn test_selected_region_estimates() {
    let samples = sine(330.0, 48000, 9600);
    let region = select_region(&samples, 2000, 4047).unwrap();
    assert_eq!(region.len(), 2048);

    let frequency = mpm_type2(&region, 48000).unwrap();
    assert!((frequency - 330.0).abs() < 5.0, "got {frequency}");
}

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.txt");

    let config = Config {
        sample_rate: 44100,
        estimator: None,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
    assert!(Config::load_from(&dir.path().join("missing.txt")).is_err());
}
