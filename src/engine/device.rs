//! Audio device contract
//!
//! Anything that can hold a running output, resume it, close it and accept
//! one-shot playback graphs can back the player.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::synth::SampleBuffer;

/// Lifecycle state of an output device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Output is flowing
    Running,
    /// Constructed or paused; must be resumed before it is audible
    Suspended,
    /// Released for good
    Closed,
}

/// Device-level failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("audio device unavailable: {0}")]
    Unavailable(String),

    #[error("audio context has been released")]
    Released,

    #[error("audio device is closed")]
    Closed,

    #[error("failed to resume audio device: {0}")]
    Resume(String),

    #[error("failed to start playback: {0}")]
    Playback(String),
}

/// Clamp a requested volume into [0, 1]; NaN is silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Source node: carries one buffer and can be started once
#[derive(Debug)]
pub struct SourceNode {
    buffer: SampleBuffer,
}

/// Gain node with a scalar gain in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainNode {
    gain: f32,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: clamp_volume(gain),
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

/// A one-shot `source -> gain -> output` chain
///
/// Handing the graph to [`AudioDevice::schedule`] consumes it, so a graph
/// can only ever be started once.
#[derive(Debug)]
pub struct PlaybackGraph {
    source: SourceNode,
    gain: GainNode,
}

impl PlaybackGraph {
    pub fn new(buffer: SampleBuffer, gain: f32) -> Self {
        Self {
            source: SourceNode { buffer },
            gain: GainNode::new(gain),
        }
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.source.buffer
    }

    pub fn gain(&self) -> f32 {
        self.gain.gain()
    }

    /// Split into the raw samples and the gain to apply to them
    pub fn into_parts(self) -> (SampleBuffer, f32) {
        (self.source.buffer, self.gain.gain())
    }
}

/// A live audio output
#[async_trait]
pub trait AudioDevice: Send + Sync {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Current lifecycle state
    fn state(&self) -> DeviceState;

    /// Bring a suspended device to `Running`
    async fn resume(&self) -> Result<(), DeviceError>;

    /// Stop all output and release the device; idempotent
    async fn close(&self) -> Result<(), DeviceError>;

    /// Start a graph immediately without waiting for it to finish
    fn schedule(&self, graph: PlaybackGraph) -> Result<(), DeviceError>;
}

/// Constructs devices on demand
pub trait DeviceFactory: Send + Sync {
    fn open(&self) -> Result<Arc<dyn AudioDevice>, DeviceError>;
}
