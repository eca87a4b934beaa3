//! Procedural synthesis of notification sounds
//!
//! Pure and device-independent: a sound kind, a duration and a sample rate
//! go in, a mono sample buffer comes out. Each sound is a small set of sine
//! partials shaped by exponential decay envelopes.

mod buffer;
mod envelope;
mod generator;
mod kind;
mod oscillator;
mod preset;

pub use buffer::SampleBuffer;
pub use envelope::Envelope;
pub use generator::{
    generate_named, generate_sound, synthesize, SynthError, MAX_DURATION_SECS, MAX_SAMPLES,
};
pub use kind::SoundKind;
pub use oscillator::sine;
pub use preset::{preset, Arrangement, Partial, Preset};
