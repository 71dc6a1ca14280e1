//! WAV and raw PCM output

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;
use tracing::info;
use warble_audio::{encode_pcm16_le, sample_to_i16};

/// Errors that can occur while writing audio
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Output container, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wav,
    /// Headerless 16-bit little-endian mono
    RawPcm,
}

impl OutputFormat {
    /// `.pcm` and `.raw` are raw PCM, everything else is WAV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pcm") | Some("raw") => OutputFormat::RawPcm,
            _ => OutputFormat::Wav,
        }
    }
}

/// Write a 16-bit mono WAV file
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<(), WriteError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample_to_i16(sample))?;
    }
    writer.finalize()?;

    info!(path = %path.display(), samples = samples.len(), sample_rate, "wrote WAV");
    Ok(())
}

/// Write headerless 16-bit little-endian mono PCM
pub fn write_pcm(path: &Path, samples: &[f64]) -> Result<(), WriteError> {
    fs::write(path, encode_pcm16_le(samples))?;
    info!(path = %path.display(), samples = samples.len(), "wrote raw PCM");
    Ok(())
}

/// Write in the format implied by the extension of `path`
pub fn write_audio(path: &Path, samples: &[f64], sample_rate: u32) -> Result<(), WriteError> {
    match OutputFormat::from_path(path) {
        OutputFormat::Wav => write_wav(path, samples, sample_rate),
        OutputFormat::RawPcm => write_pcm(path, samples),
    }
}
