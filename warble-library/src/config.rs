//! Simple configuration persistence for Warble
//!
//! Stores the working sample rate, resampler width, preferred estimator and
//! the last analyzed file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use warble_analysis::Estimator;
use warble_audio::DEFAULT_HALF_WIDTH;

/// Working sample rate when none is configured
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Estimator name meaning MPM type 2 with YIN type 2 fallback
pub const AUTO_ESTIMATOR: &str = "auto";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Rate decoded audio is resampled to
    pub sample_rate: u32,
    /// Resampler half width used for pitch shifting
    pub kernel_half_width: usize,
    /// Fixed estimator, `None` for automatic fallback
    pub estimator: Option<Estimator>,
    /// Last file that was analyzed
    pub last_input: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            kernel_half_width: DEFAULT_HALF_WIDTH,
            estimator: Some(Estimator::default()),
            last_input: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("warble")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    ///
    /// Unknown keys are ignored; malformed values keep the default.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "sample_rate" => match value.parse::<u32>() {
                    Ok(rate) if rate > 0 => config.sample_rate = rate,
                    _ => warn!(value, "ignoring invalid sample_rate"),
                },
                "kernel_half_width" => match value.parse() {
                    Ok(width) => config.kernel_half_width = width,
                    Err(_) => warn!(value, "ignoring invalid kernel_half_width"),
                },
                "estimator" => {
                    if value.eq_ignore_ascii_case(AUTO_ESTIMATOR) {
                        config.estimator = None;
                    } else {
                        match value.parse() {
                            Ok(estimator) => config.estimator = Some(estimator),
                            Err(e) => warn!(%e, "ignoring estimator"),
                        }
                    }
                }
                "last_input" => {
                    if !value.is_empty() {
                        config.last_input = Some(PathBuf::from(value));
                    }
                }
                _ => {}
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    pub fn serialize(&self) -> String {
        let mut lines = vec![
            "# Warble Configuration".to_string(),
            format!("sample_rate={}", self.sample_rate),
            format!("kernel_half_width={}", self.kernel_half_width),
        ];

        match self.estimator {
            Some(estimator) => lines.push(format!("estimator={estimator}")),
            None => lines.push(format!("estimator={AUTO_ESTIMATOR}")),
        }

        if let Some(ref input) = self.last_input {
            lines.push(format!("last_input={}", input.display()));
        }

        lines.join("\n")
    }
}
