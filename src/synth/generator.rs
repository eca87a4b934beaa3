//! Offline rendering of presets into sample buffers

use thiserror::Error;
use tracing::{debug, warn};

use super::preset::preset;
use super::{SampleBuffer, SoundKind};

/// Longest sound the synthesizer will render, in seconds
pub const MAX_DURATION_SECS: f64 = 60.0;

/// Largest buffer the synthesizer will allocate: a full-length sound at 192 kHz
pub const MAX_SAMPLES: u64 = 60 * 192_000;

/// Errors raised before any sample is produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthError {
    #[error("unknown sound kind '{0}' (expected bell, chime or notification)")]
    InvalidSoundKind(String),

    #[error("duration must be finite, got {0}")]
    NonFiniteDuration(f64),

    #[error("duration {0}s exceeds the {max}s limit", max = MAX_DURATION_SECS)]
    DurationTooLong(f64),

    #[error("sample rate must be positive")]
    InvalidSampleRate,

    #[error("{0} samples exceeds the {max} sample limit", max = MAX_SAMPLES)]
    TooManySamples(u64),
}

/// Render `kind` for `duration` seconds at `sample_rate`
///
/// The buffer holds exactly `round(duration * sample_rate)` samples, each
/// clamped into [-1, 1]. Zero or negative durations give an empty buffer.
pub fn synthesize(kind: SoundKind, duration: f64, sample_rate: u32) -> Result<SampleBuffer, SynthError> {
    if sample_rate == 0 {
        return Err(SynthError::InvalidSampleRate);
    }
    if !duration.is_finite() {
        return Err(SynthError::NonFiniteDuration(duration));
    }
    if duration > MAX_DURATION_SECS {
        return Err(SynthError::DurationTooLong(duration));
    }
    if duration <= 0.0 {
        return Ok(SampleBuffer::empty(sample_rate));
    }

    let preset = preset(kind);
    let rate = sample_rate as f64;
    let length = (duration * rate).round() as u64;
    if length > MAX_SAMPLES {
        return Err(SynthError::TooManySamples(length));
    }
    let length = length as usize;

    let samples = (0..length)
        .map(|i| {
            let t = i as f64 / rate;
            let value = preset.sample_at(t, duration);
            if value.is_finite() {
                value.clamp(-1.0, 1.0) as f32
            } else {
                0.0
            }
        })
        .collect();

    debug!(%kind, duration, sample_rate, length, "synthesized sound");
    Ok(SampleBuffer::new(samples, sample_rate))
}

/// Render `kind` at its default duration
pub fn generate_sound(kind: SoundKind, sample_rate: u32) -> Result<SampleBuffer, SynthError> {
    synthesize(kind, preset(kind).default_duration, sample_rate)
}

/// Render a sound chosen by name, logging and returning `None` on any failure
pub fn generate_named(name: &str, sample_rate: u32) -> Option<SampleBuffer> {
    let result = name
        .parse::<SoundKind>()
        .and_then(|kind| generate_sound(kind, sample_rate));

    match result {
        Ok(buffer) => Some(buffer),
        Err(e) => {
            warn!(name, "could not generate sound: {}", e);
            None
        }
    }
}
