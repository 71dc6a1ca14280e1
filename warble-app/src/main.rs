//! Warble - pitch estimation and pitch shifting
//!
//! Estimates the pitch of a recorded tone, re-pitches it, or sings the demo
//! melody with it.

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Action, Invocation};
use warble_analysis::{estimate_with_fallback, DiagnosticCurves, Estimator, PitchReading};
use warble_audio::{pitch_shift, render_melody, DEMO_MELODY};
use warble_library::{
    seconds_to_index, select_region, write_audio, AudioLoader, Config, LoadedAudio,
    AUTO_ESTIMATOR,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let invocation = cli::parse_args(std::env::args().skip(1))?;
    if invocation.action == Action::Help {
        println!("{}", cli::USAGE);
        return Ok(());
    }

    let mut config = Config::load();
    run(&invocation, &mut config)
}

fn run(invocation: &Invocation, config: &mut Config) -> Result<()> {
    let input = resolve_input(invocation.input.as_deref(), config)?;
    let loader = AudioLoader::with_sample_rate(config.sample_rate)
        .with_kernel_half_width(config.kernel_half_width);
    let audio = loader
        .load(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    // Remember the input for the next run
    config.last_input = Some(input.clone());
    if let Err(e) = config.save() {
        warn!(%e, "could not save config");
    }

    let signal = region(&audio, invocation.start, invocation.end)?;
    let estimator = resolve_estimator(invocation.estimator.as_deref(), config)?;

    match &invocation.action {
        Action::Estimate { curves } => {
            match estimate(&signal, audio.sample_rate, estimator) {
                Some(reading) => println!(
                    "{:.2} Hz ({}, {} samples)",
                    reading.frequency,
                    reading.estimator,
                    signal.len()
                ),
                None => println!("no estimate"),
            }
            if let Some(lags) = curves {
                print_curves(&DiagnosticCurves::compute(&signal, *lags));
            }
        }
        Action::Shift { ratio, out } => {
            let shifted = pitch_shift(&signal, audio.sample_rate, *ratio, config.kernel_half_width)
                .context("pitch shift failed")?;
            write_audio(out, &shifted, audio.sample_rate)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        Action::Melody { out } => {
            let Some(reading) = estimate(&signal, audio.sample_rate, estimator) else {
                bail!("no pitch found in {}; try selecting a steadier region", input.display());
            };
            info!(
                reference_hz = reading.frequency,
                estimator = %reading.estimator,
                "reference pitch"
            );
            let melody = render_melody(
                &signal,
                audio.sample_rate,
                reading.frequency,
                &DEMO_MELODY,
                config.kernel_half_width,
            )
            .context("melody rendering failed")?;
            write_audio(out, &melody, audio.sample_rate)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        Action::Help => {}
    }

    Ok(())
}

fn resolve_input(input: Option<&Path>, config: &Config) -> Result<PathBuf> {
    match (input, &config.last_input) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(last)) => {
            info!(path = %last.display(), "using last input");
            Ok(last.clone())
        }
        (None, None) => bail!("no input file given\n\n{}", cli::USAGE),
    }
}

/// `None` means MPM type 2 with YIN type 2 fallback
fn resolve_estimator(name: Option<&str>, config: &Config) -> Result<Option<Estimator>> {
    match name {
        None => Ok(config.estimator),
        Some(name) if name.trim().eq_ignore_ascii_case(AUTO_ESTIMATOR) => Ok(None),
        Some(name) => Ok(Some(name.parse()?)),
    }
}

fn estimate(signal: &[f64], sample_rate: u32, estimator: Option<Estimator>) -> Option<PitchReading> {
    match estimator {
        None => estimate_with_fallback(signal, sample_rate),
        Some(estimator) => estimator
            .estimate(signal, sample_rate)
            .map(|frequency| PitchReading {
                frequency,
                estimator,
            }),
    }
}

/// The selected region, re-normalized, or the whole buffer
fn region(audio: &LoadedAudio, start: Option<f64>, end: Option<f64>) -> Result<Vec<f64>> {
    if start.is_none() && end.is_none() {
        return Ok(audio.samples.clone());
    }
    let start = seconds_to_index(start.unwrap_or(0.0), audio.sample_rate)?;
    let end = match end {
        Some(end) => seconds_to_index(end, audio.sample_rate)?,
        None => audio.samples.len().saturating_sub(1),
    };
    Ok(select_region(&audio.samples, start, end)?)
}

fn print_curves(curves: &DiagnosticCurves) {
    println!("lag,nsd,cmnd");
    for (lag, (nsd, cmnd)) in curves.nsd.iter().zip(&curves.cmnd).enumerate() {
        println!("{lag},{nsd},{cmnd}");
    }
}
