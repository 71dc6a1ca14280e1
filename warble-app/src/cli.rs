//! Command-line parsing

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

pub const USAGE: &str = "\
Usage:
  warble estimate [FILE] [--start S] [--end S] [--estimator NAME] [--curves N]
  warble shift [FILE] --ratio R --out PATH [--start S] [--end S]
  warble melody [FILE] --out PATH [--start S] [--end S] [--estimator NAME]

FILE defaults to the last analyzed input. Times are in seconds.
Estimators: mpm1, mpm2, yin1, yin2, yin-nsd1, yin-nsd2, auto.
Output ending in .pcm or .raw is headerless 16-bit PCM, anything else WAV.";

/// What to do with the input
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Estimate { curves: Option<usize> },
    Shift { ratio: f64, out: PathBuf },
    Melody { out: PathBuf },
    Help,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub action: Action,
    pub input: Option<PathBuf>,
    /// Region start in seconds
    pub start: Option<f64>,
    /// Region end in seconds, inclusive
    pub end: Option<f64>,
    /// Estimator override, as written
    pub estimator: Option<String>,
}

impl Invocation {
    fn help() -> Self {
        Self {
            action: Action::Help,
            input: None,
            start: None,
            end: None,
            estimator: None,
        }
    }
}

/// Parse arguments, excluding the program name
pub fn parse_args<I>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Invocation::help());
    };
    if matches!(command.as_str(), "-h" | "--help" | "help") {
        return Ok(Invocation::help());
    }

    let mut input = None;
    let mut start = None;
    let mut end = None;
    let mut estimator = None;
    let mut curves = None;
    let mut ratio = None;
    let mut out = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Invocation::help()),
            "--start" => start = Some(parse_value(&arg, args.next())?),
            "--end" => end = Some(parse_value(&arg, args.next())?),
            "--estimator" => estimator = Some(take_value(&arg, args.next())?),
            "--curves" => curves = Some(parse_value(&arg, args.next())?),
            "--ratio" => ratio = Some(parse_value(&arg, args.next())?),
            "--out" | "-o" => out = Some(PathBuf::from(take_value(&arg, args.next())?)),
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'"),
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument '{arg}'"),
        }
    }

    let action = match command.as_str() {
        "estimate" => Action::Estimate { curves },
        "shift" => Action::Shift {
            ratio: ratio.ok_or_else(|| anyhow!("shift needs --ratio"))?,
            out: out.ok_or_else(|| anyhow!("shift needs --out"))?,
        },
        "melody" => Action::Melody {
            out: out.ok_or_else(|| anyhow!("melody needs --out"))?,
        },
        other => bail!("unknown command '{other}'"),
    };

    Ok(Invocation {
        action,
        input,
        start,
        end,
        estimator,
    })
}

fn take_value(flag: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn parse_value<T>(flag: &str, value: Option<String>) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = take_value(flag, value)?;
    value
        .parse()
        .with_context(|| format!("invalid value '{value}' for {flag}"))
}
