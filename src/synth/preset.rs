//! Static partial tables for each sound
//!
//! Every partial is a sine running on the buffer clock, shaped by an
//! exponential decay measured from the partial's own onset.

use serde::Serialize;

use super::envelope::Envelope;
use super::oscillator::sine;
use super::SoundKind;

/// One sine component of a sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Partial {
    /// Frequency in Hz
    pub frequency: f64,
    /// Peak amplitude at onset
    pub weight: f64,
    /// Onset in seconds from the start of the buffer
    pub offset: f64,
}

impl Partial {
    const fn new(frequency: f64, weight: f64, offset: f64) -> Self {
        Self {
            frequency,
            weight,
            offset,
        }
    }
}

/// How the partials of a preset are laid out in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Arrangement {
    /// Partials sound together from their offsets to the end of the buffer
    Additive,
    /// Each partial is audible only for `window` seconds after its offset
    Staggered { window: f64 },
    /// Partials split the duration into equal consecutive segments, one at a time
    Sequential,
}

/// Synthesis parameters for one sound kind
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Preset {
    pub kind: SoundKind,
    pub partials: &'static [Partial],
    /// Envelope decay rate per second
    pub decay: f64,
    pub arrangement: Arrangement,
    /// Duration in seconds used when the caller does not ask for one
    pub default_duration: f64,
}

// C5 / E5 / G5, each an octave-step quieter than the last
const BELL_PARTIALS: [Partial; 3] = [
    Partial::new(523.25, 0.3, 0.0),
    Partial::new(659.25, 0.3 / 2.0, 0.0),
    Partial::new(783.99, 0.3 / 3.0, 0.0),
];

// C4 D4 E4 G4 A4
const CHIME_PARTIALS: [Partial; 5] = [
    Partial::new(261.63, 0.2, 0.0),
    Partial::new(293.66, 0.2, 0.15),
    Partial::new(329.63, 0.2, 0.30),
    Partial::new(392.00, 0.2, 0.45),
    Partial::new(440.00, 0.2, 0.60),
];

// Offsets are derived from the duration at synthesis time
const NOTIFICATION_PARTIALS: [Partial; 2] = [
    Partial::new(800.0, 0.3, 0.0),
    Partial::new(600.0, 0.3, 0.0),
];

static BELL: Preset = Preset {
    kind: SoundKind::Bell,
    partials: &BELL_PARTIALS,
    decay: 3.0,
    arrangement: Arrangement::Additive,
    default_duration: 0.5,
};

static CHIME: Preset = Preset {
    kind: SoundKind::Chime,
    partials: &CHIME_PARTIALS,
    decay: 2.0,
    arrangement: Arrangement::Staggered { window: 0.4 },
    default_duration: 0.8,
};

static NOTIFICATION: Preset = Preset {
    kind: SoundKind::Notification,
    partials: &NOTIFICATION_PARTIALS,
    decay: 8.0,
    arrangement: Arrangement::Sequential,
    default_duration: 0.3,
};

/// Look up the preset for a sound kind
pub fn preset(kind: SoundKind) -> &'static Preset {
    match kind {
        SoundKind::Bell => &BELL,
        SoundKind::Chime => &CHIME,
        SoundKind::Notification => &NOTIFICATION,
    }
}

impl Preset {
    fn envelope(&self) -> Envelope {
        Envelope::new(self.decay)
    }

    /// Partials audible at time `t`, each paired with its time since onset
    fn active(&self, t: f64, duration: f64) -> impl Iterator<Item = (&'static Partial, f64)> + '_ {
        let partials = self.partials;
        let segment = if partials.is_empty() {
            0.0
        } else {
            duration / partials.len() as f64
        };

        partials.iter().enumerate().filter_map(move |(i, partial)| {
            match self.arrangement {
                Arrangement::Additive => {
                    let local = t - partial.offset;
                    (local >= 0.0).then_some((partial, local))
                }
                Arrangement::Staggered { window } => {
                    let local = t - partial.offset;
                    (local >= 0.0 && local <= window).then_some((partial, local))
                }
                Arrangement::Sequential => {
                    if segment <= 0.0 {
                        return None;
                    }
                    let current = ((t / segment).floor() as usize).min(partials.len() - 1);
                    (current == i).then(|| (partial, t - segment * i as f64))
                }
            }
        })
    }

    /// Summed envelope amplitude at `t`, ignoring oscillator phase
    pub fn amplitude_at(&self, t: f64, duration: f64) -> f64 {
        let envelope = self.envelope();
        self.active(t, duration)
            .map(|(partial, local)| partial.weight * envelope.level_at(local))
            .sum()
    }

    /// Raw (unclamped) sample value at `t` for a sound lasting `duration`
    pub fn sample_at(&self, t: f64, duration: f64) -> f64 {
        let envelope = self.envelope();
        self.active(t, duration)
            .map(|(partial, local)| {
                sine(partial.frequency, t) * partial.weight * envelope.level_at(local)
            })
            .sum()
    }

    /// Contribution of a single partial at `t`; zero when it is not sounding
    pub fn partial_at(&self, index: usize, t: f64, duration: f64) -> f64 {
        let envelope = self.envelope();
        let Some(target) = self.partials.get(index) else {
            return 0.0;
        };
        self.active(t, duration)
            .find(|(partial, _)| std::ptr::eq(*partial, target))
            .map(|(partial, local)| {
                sine(partial.frequency, t) * partial.weight * envelope.level_at(local)
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_lookup_matches_kind() {
        for kind in SoundKind::ALL {
            assert_eq!(preset(kind).kind, kind);
        }
    }

    #[test]
    fn test_default_durations() {
        assert_eq!(preset(SoundKind::Bell).default_duration, 0.5);
        assert_eq!(preset(SoundKind::Chime).default_duration, 0.8);
        assert_eq!(preset(SoundKind::Notification).default_duration, 0.3);
    }

    #[test]
    fn test_bell_weights_fall_off_by_index() {
        let bell = preset(SoundKind::Bell);
        for (i, partial) in bell.partials.iter().enumerate() {
            assert!((partial.weight - 0.3 / (i as f64 + 1.0)).abs() < 1e-12);
            assert_eq!(partial.offset, 0.0);
        }
    }

    #[test]
    fn test_bell_onset_amplitude() {
        let bell = preset(SoundKind::Bell);
        assert!((bell.amplitude_at(0.0, 0.5) - 0.55).abs() < 1e-12);
        // Phase zero everywhere, so the first sample is silent
        assert_eq!(bell.sample_at(0.0, 0.5), 0.0);
    }

    #[test]
    fn test_chime_offsets_are_staggered() {
        let chime = preset(SoundKind::Chime);
        for (i, partial) in chime.partials.iter().enumerate() {
            assert!((partial.offset - i as f64 * 0.15).abs() < 1e-12);
        }
    }

    #[test]
    fn test_chime_partial_silent_before_onset_and_after_window() {
        let chime = preset(SoundKind::Chime);
        assert_eq!(chime.partial_at(2, 0.29, 0.8), 0.0);
        assert_ne!(chime.partial_at(2, 0.31, 0.8), 0.0);
        assert_eq!(chime.partial_at(0, 0.41, 0.8), 0.0);
    }

    #[test]
    fn test_delayed_partial_keeps_buffer_phase() {
        let chime = preset(SoundKind::Chime);
        let t = 0.2;
        let expected = (2.0 * std::f64::consts::PI * 293.66 * t).sin() * (-(t - 0.15) * 2.0).exp() * 0.2;
        assert!((chime.partial_at(1, t, 0.8) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_notification_segments() {
        let n = preset(SoundKind::Notification);
        let first: Vec<_> = n.active(0.075, 0.3).map(|(p, _)| p.frequency).collect();
        let second: Vec<_> = n.active(0.225, 0.3).map(|(p, _)| p.frequency).collect();
        assert_eq!(first, vec![800.0]);
        assert_eq!(second, vec![600.0]);
    }

    #[test]
    fn test_notification_envelope_restarts_at_half() {
        let n = preset(SoundKind::Notification);
        let late_first = n.amplitude_at(0.149, 0.3);
        let early_second = n.amplitude_at(0.151, 0.3);
        assert!(early_second > late_first);
        assert!((early_second - 0.3 * (-8.0f64 * 0.001).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_partial_at_out_of_range_index() {
        assert_eq!(preset(SoundKind::Bell).partial_at(9, 0.1, 0.5), 0.0);
    }
}
