//! Pomotone - Procedural notification sounds for Pomodoro timers

use anyhow::{Context, Result};
use clap::Parser;
use pomotone::config::{self, PomotoneConfig};
use pomotone::engine::{self, AudioContext, CpalBackend, PlaybackOutcome, Player};
use pomotone::synth::{self, SoundKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "pomotone=debug" } else { "pomotone=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Sleep for `duration`, returning early once `interrupted` is set
async fn wait_unless_interrupted(duration: Duration, interrupted: &AtomicBool) {
    let step = Duration::from_millis(50);
    let mut remaining = duration;
    while !remaining.is_zero() && !interrupted.load(Ordering::SeqCst) {
        let chunk = remaining.min(step);
        tokio::time::sleep(chunk).await;
        remaining -= chunk;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Play {
            kind,
            volume,
            repeat,
            interval,
            config: config_path,
        } => {
            let cfg = config::load_or_default(&config_path)?;

            let context = Arc::new(AudioContext::new(CpalBackend::new(cfg.audio.device.clone())));
            let player = Player::new(context).with_default_volume(cfg.sounds.volume);

            let interrupted = Arc::new(AtomicBool::new(false));
            let flag = interrupted.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
                .context("failed to install Ctrl-C handler")?;

            let length = kind
                .parse::<SoundKind>()
                .map(|k| synth::preset(k).default_duration)
                .unwrap_or(0.0);
            let pause = cli::interval_duration(interval)?;

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                for i in 0..repeat.max(1) {
                    if interrupted.load(Ordering::SeqCst) {
                        break;
                    }
                    if i > 0 {
                        wait_unless_interrupted(pause, &interrupted).await;
                    }

                    match player.play_named(&kind, volume).await {
                        PlaybackOutcome::Played { kind, gain, sample_rate, .. } => {
                            println!("Playing {} at {:.0}% ({} Hz)", kind, gain * 100.0, sample_rate);
                        }
                        PlaybackOutcome::Skipped { failure, .. } => {
                            println!("No sound played: {}", failure);
                            break;
                        }
                    }

                    // Playback is fire-and-forget; keep the device open until it has finished
                    wait_unless_interrupted(Duration::from_secs_f64(length + 0.1), &interrupted).await;
                }

                player.shutdown().await;
            });
        }

        Commands::Render {
            kind,
            output,
            duration,
            sample_rate,
            config: config_path,
        } => {
            let cfg = config::load_or_default(&config_path)?;
            let kind: SoundKind = kind.parse()?;
            let duration = duration.unwrap_or_else(|| cfg.sounds.duration_for(kind));
            let sample_rate = sample_rate.unwrap_or(cfg.audio.sample_rate);
            config::validate_sample_rate(sample_rate)?;

            let buffer = synth::synthesize(kind, duration, sample_rate)
                .with_context(|| format!("failed to synthesize {}", kind))?;
            if buffer.is_empty() {
                warn!(duration, "rendering an empty sound");
            }

            engine::render_to_wav(&output, &buffer)?;
            info!(path = ?output, samples = buffer.len(), "rendered {}", kind);
            println!(
                "Rendered {} ({:.2}s, {} Hz, peak {:.3}) to {:?}",
                kind,
                buffer.duration_secs(),
                buffer.sample_rate(),
                buffer.peak(),
                output
            );
        }

        Commands::Presets { json } => {
            let presets: Vec<_> = SoundKind::ALL.into_iter().map(synth::preset).collect();
            let text = if json {
                serde_json::to_string_pretty(&presets)?
            } else {
                serde_yaml::to_string(&presets)?
            };
            println!("{}", text);
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (no output devices found)");
            }
            for device in devices {
                println!(
                    "  - {} ({} Hz, {} ch){}",
                    device.name,
                    device.sample_rate,
                    device.channels,
                    if device.is_default { " [default]" } else { "" }
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    print_summary(&cfg);
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../pomotone.example.yaml");

            let path = "pomotone.yaml";
            if std::path::Path::new(path).exists() {
                println!("pomotone.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created pomotone.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

fn print_summary(cfg: &PomotoneConfig) {
    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
    println!(
        "  Device: {}",
        cfg.audio.device.as_deref().unwrap_or("(system default)")
    );
    println!("  Volume: {:.0}%", cfg.sounds.volume * 100.0);
    for kind in SoundKind::ALL {
        println!("    - {}: {:.2}s", kind, cfg.sounds.duration_for(kind));
    }
}
