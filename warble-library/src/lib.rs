//! Audio I/O for Warble - loading, region selection, output, and settings

mod config;
mod loader;
mod selection;
mod writer;

pub use config::{Config, AUTO_ESTIMATOR, DEFAULT_SAMPLE_RATE};
pub use loader::{AudioLoader, LoadError, LoadedAudio};
pub use selection::{seconds_to_index, select_region, SelectionError};
pub use writer::{write_audio, write_pcm, write_wav, OutputFormat, WriteError};
