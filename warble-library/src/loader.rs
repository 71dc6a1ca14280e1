//! Audio file loading and decoding

use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, StandardTagKey};
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::{debug, info, warn};
use warble_audio::{resample_to_rate, DEFAULT_HALF_WIDTH};

use crate::config::DEFAULT_SAMPLE_RATE;

/// Errors that can occur during loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

/// A decoded mono buffer at the working sample rate
#[derive(Debug, Clone)]
pub struct LoadedAudio {
    /// Mono samples, normalized to -1.0 to 1.0
    pub samples: Vec<f64>,
    /// Sample rate of `samples` in Hz
    pub sample_rate: u32,
    /// Sample rate of the file
    pub source_sample_rate: u32,
    /// Channel count of the file before mixdown
    pub channels: u16,
    pub duration_secs: f64,
    /// Title tag, or the file stem
    pub title: String,
}

/// Audio file loader using Symphonia
#[derive(Debug, Clone)]
pub struct AudioLoader {
    target_sample_rate: u32,
    kernel_half_width: usize,
}

impl Default for AudioLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioLoader {
    /// Create a loader with the default 48kHz working rate
    pub fn new() -> Self {
        Self::with_sample_rate(DEFAULT_SAMPLE_RATE)
    }

    /// Create a loader with a specific working rate
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self {
            target_sample_rate,
            kernel_half_width: DEFAULT_HALF_WIDTH,
        }
    }

    /// Set the resampler half width used when rates differ
    pub fn with_kernel_half_width(mut self, kernel_half_width: usize) -> Self {
        self.kernel_half_width = kernel_half_width;
        self
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Load, decode and mix an audio file down to mono
    pub fn load(&self, path: &Path) -> Result<LoadedAudio, LoadError> {
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::UnsupportedFormat(e.to_string()))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| LoadError::Decode("missing sample rate".to_string()))?;
        let mut channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(1);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let title = Self::extract_title(&mut format, path);

        let mut samples: Vec<f64> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    debug!(%e, "stopping at unreadable packet");
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(e, "skipping corrupt packet");
                    continue;
                }
                Err(e) => return Err(LoadError::Decode(e.to_string())),
            };

            let spec = *decoded.spec();
            channels = spec.channels.count() as u16;

            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            mix_to_mono(sample_buf.samples(), channels as usize, &mut samples);
        }

        let duration_secs = samples.len() as f64 / source_sample_rate as f64;

        let (samples, sample_rate) = if source_sample_rate != self.target_sample_rate {
            debug!(
                from = source_sample_rate,
                to = self.target_sample_rate,
                "resampling to working rate"
            );
            (
                resample_to_rate(
                    &samples,
                    source_sample_rate,
                    self.target_sample_rate,
                    self.kernel_half_width,
                ),
                self.target_sample_rate,
            )
        } else {
            (samples, source_sample_rate)
        };

        info!(
            path = %path.display(),
            channels,
            source_sample_rate,
            samples = samples.len(),
            "loaded audio"
        );

        Ok(LoadedAudio {
            samples,
            sample_rate,
            source_sample_rate,
            channels,
            duration_secs,
            title,
        })
    }

    /// Title tag if present, else the file stem
    fn extract_title(format: &mut Box<dyn FormatReader>, path: &Path) -> String {
        let tagged = format.metadata().current().and_then(|meta| {
            meta.tags()
                .iter()
                .find(|tag| tag.std_key == Some(StandardTagKey::TrackTitle))
                .map(|tag| tag.value.to_string())
        });

        tagged.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
                .to_string()
        })
    }
}

/// Average interleaved frames into `out`
fn mix_to_mono(interleaved: &[f32], channels: usize, out: &mut Vec<f64>) {
    let channels = channels.max(1);
    let scale = 1.0 / channels as f64;
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() * scale),
    );
}
