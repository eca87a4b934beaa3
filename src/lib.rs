//! Pomotone - Procedural notification sounds for Pomodoro timers
//!
//! Synthesizes bell, chime and notification sounds from sine partials and
//! decay envelopes, and plays them one-shot through the audio device.

pub mod config;
pub mod synth;
pub mod engine;

pub use config::PomotoneConfig;
pub use engine::{AudioContext, PlaybackOutcome, PlaybackRequest, Player};
pub use synth::{SampleBuffer, SoundKind};
