//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::engine::DEFAULT_VOLUME;
use crate::synth::{preset, SoundKind};

/// Longest duration a config file may ask a sound to be rendered at
pub const MAX_CONFIG_DURATION: f64 = 10.0;

/// Check a render sample rate, from a config file or the command line
pub fn validate_sample_rate(sample_rate: u32) -> Result<()> {
    if !(8000..=192000).contains(&sample_rate) {
        bail!("Sample rate must be between 8000 and 192000");
    }
    Ok(())
}

/// Main configuration for pomotone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PomotoneConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Sound settings (volume, durations)
    #[serde(default)]
    pub sounds: SoundsConfig,
}

impl PomotoneConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.audio.sample_rate)?;

        if !(0.0..=1.0).contains(&self.sounds.volume) {
            bail!("Sound volume must be between 0.0 and 1.0");
        }

        for kind in SoundKind::ALL {
            if let Some(duration) = self.sounds.durations.get(kind) {
                if !duration.is_finite() || duration <= 0.0 || duration > MAX_CONFIG_DURATION {
                    bail!(
                        "Duration for '{}' must be greater than 0 and at most {} seconds",
                        kind,
                        MAX_CONFIG_DURATION
                    );
                }
            }
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz for rendered files (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }

/// Sound settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundsConfig {
    /// Playback volume 0.0-1.0 (default: 0.5)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Per-sound duration overrides for rendering
    #[serde(default)]
    pub durations: DurationOverrides,
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            durations: DurationOverrides::default(),
        }
    }
}

impl SoundsConfig {
    /// Duration to render `kind` at: the override if set, else the preset default
    pub fn duration_for(&self, kind: SoundKind) -> f64 {
        self.durations
            .get(kind)
            .unwrap_or(preset(kind).default_duration)
    }
}

fn default_volume() -> f32 { DEFAULT_VOLUME }

/// Optional duration in seconds for each sound
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationOverrides {
    pub bell: Option<f64>,
    pub chime: Option<f64>,
    pub notification: Option<f64>,
}

impl DurationOverrides {
    pub fn get(&self, kind: SoundKind) -> Option<f64> {
        match kind {
            SoundKind::Bell => self.bell,
            SoundKind::Chime => self.chime,
            SoundKind::Notification => self.notification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_audio_config() {
        let yaml = "device: Speakers";
        let config: AudioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sample_rate, 44100); // default
        assert_eq!(config.device.as_deref(), Some("Speakers"));
    }

    #[test]
    fn test_sounds_config() {
        let yaml = r#"
volume: 0.8
durations:
  chime: 1.2
"#;
        let config: SoundsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.volume, 0.8);
        assert_eq!(config.duration_for(SoundKind::Chime), 1.2);
        assert_eq!(config.duration_for(SoundKind::Bell), 0.5);
        assert_eq!(config.duration_for(SoundKind::Notification), 0.3);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: PomotoneConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.sounds.volume, DEFAULT_VOLUME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_rate_bounds() {
        assert!(validate_sample_rate(8000).is_ok());
        assert!(validate_sample_rate(192000).is_ok());
        assert!(validate_sample_rate(7999).is_err());
        assert!(validate_sample_rate(4_000_000_000).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PomotoneConfig::default();
        assert!(config.validate().is_ok());

        config.audio.sample_rate = 4000;
        assert!(config.validate().is_err());
        config.audio.sample_rate = 48000;

        config.sounds.volume = 1.5;
        assert!(config.validate().is_err());
        config.sounds.volume = 0.5;

        config.sounds.durations.bell = Some(0.0);
        assert!(config.validate().is_err());
        config.sounds.durations.bell = Some(11.0);
        assert!(config.validate().is_err());
        config.sounds.durations.bell = Some(f64::NAN);
        assert!(config.validate().is_err());
        config.sounds.durations.bell = Some(2.0);
        assert!(config.validate().is_ok());
    }
}
