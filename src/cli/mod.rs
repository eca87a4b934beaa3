//! CLI interface for pomotone

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Procedural notification sounds for Pomodoro timers
#[derive(Parser)]
#[command(name = "pomotone")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a sound through the output device
    Play {
        /// Sound to play: bell, chime or notification
        kind: String,

        /// Volume 0.0-1.0 (defaults to the configured volume)
        #[arg(long)]
        volume: Option<f32>,

        /// Number of times to play the sound
        #[arg(long, default_value = "1")]
        repeat: u32,

        /// Seconds of silence between repeats
        #[arg(long, default_value = "0.5")]
        interval: f64,

        /// Configuration file path
        #[arg(short, long, default_value = "pomotone.yaml")]
        config: PathBuf,
    },

    /// Render a sound to a WAV file
    Render {
        /// Sound to render: bell, chime or notification
        kind: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Duration in seconds (defaults to the configured or built-in length)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Sample rate in Hz (defaults to the configured rate)
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Configuration file path
        #[arg(short, long, default_value = "pomotone.yaml")]
        config: PathBuf,
    },

    /// Show the partial tables behind each sound
    Presets {
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// List available audio devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "pomotone.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

/// Convert `--interval` seconds to a duration; negative or NaN means no pause
pub fn interval_duration(secs: f64) -> Result<Duration> {
    let secs = if secs.is_nan() { 0.0 } else { secs.max(0.0) };
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("interval of {} seconds is too long", secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_duration() {
        assert_eq!(interval_duration(0.5).unwrap(), Duration::from_millis(500));
        assert_eq!(interval_duration(-3.0).unwrap(), Duration::ZERO);
        assert_eq!(interval_duration(f64::NAN).unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_interval_too_long_is_an_error() {
        assert!(interval_duration(1e20).is_err());
        assert!(interval_duration(f64::INFINITY).is_err());
    }

    #[test]
    fn test_render_args_parse() {
        let cli = Cli::try_parse_from([
            "pomotone", "render", "bell", "-o", "bell.wav", "--sample-rate", "48000",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { kind, sample_rate, .. } => {
                assert_eq!(kind, "bell");
                assert_eq!(sample_rate, Some(48000));
            }
            _ => panic!("expected render"),
        }
    }
}
