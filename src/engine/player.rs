//! Fire-and-forget playback of notification sounds
//!
//! A play call never fails from the caller's point of view: every problem
//! is logged and reported back as [`PlaybackOutcome::Skipped`].

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::context::AudioContext;
use super::device::{clamp_volume, DeviceError, DeviceState, PlaybackGraph};
use crate::synth::{generate_sound, SoundKind, SynthError};

/// Volume used when the caller does not give one
pub const DEFAULT_VOLUME: f32 = 0.5;

/// A sound to play and how loud
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRequest {
    pub kind: SoundKind,
    volume: f32,
}

impl PlaybackRequest {
    /// Out-of-range volumes are clamped into [0, 1]
    pub fn new(kind: SoundKind, volume: f32) -> Self {
        Self {
            kind,
            volume: clamp_volume(volume),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

/// Steps of a single play call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStage {
    Idle,
    ResolvingDevice,
    Resuming,
    Synthesizing,
    Playing,
    Done,
}

/// Why a sound did not play
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackFailure {
    #[error("no audio device: {0}")]
    DeviceUnavailable(#[source] DeviceError),

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthError),

    #[error("playback failed: {0}")]
    Playback(#[source] DeviceError),
}

/// Result of a play call
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    /// The graph was started on the device
    Played {
        kind: SoundKind,
        gain: f32,
        samples: usize,
        sample_rate: u32,
    },
    /// Nothing was scheduled
    Skipped {
        stage: PlaybackStage,
        failure: PlaybackFailure,
    },
}

impl PlaybackOutcome {
    pub fn is_played(&self) -> bool {
        matches!(self, PlaybackOutcome::Played { .. })
    }
}

/// Plays synthesized sounds through a shared [`AudioContext`]
pub struct Player {
    context: Arc<AudioContext>,
    default_volume: f32,
}

impl Player {
    pub fn new(context: Arc<AudioContext>) -> Self {
        Self {
            context,
            default_volume: DEFAULT_VOLUME,
        }
    }

    /// Volume used by [`play_generated_sound`](Self::play_generated_sound) when none is given
    pub fn with_default_volume(mut self, volume: f32) -> Self {
        self.default_volume = clamp_volume(volume);
        self
    }

    pub fn context(&self) -> &Arc<AudioContext> {
        &self.context
    }

    /// Play `kind` at its default duration
    pub async fn play_generated_sound(&self, kind: SoundKind, volume: Option<f32>) -> PlaybackOutcome {
        let volume = volume.unwrap_or(self.default_volume);
        self.play(PlaybackRequest::new(kind, volume)).await
    }

    /// Play a sound chosen by name; unknown names are skipped with a warning
    pub async fn play_named(&self, name: &str, volume: Option<f32>) -> PlaybackOutcome {
        match name.parse::<SoundKind>() {
            Ok(kind) => self.play_generated_sound(kind, volume).await,
            Err(e) => {
                warn!(name, "notification sound skipped: {}", e);
                PlaybackOutcome::Skipped {
                    stage: PlaybackStage::Idle,
                    failure: e.into(),
                }
            }
        }
    }

    /// Synthesize and start one sound; never waits for it to finish
    pub async fn play(&self, request: PlaybackRequest) -> PlaybackOutcome {
        let mut stage = PlaybackStage::Idle;

        match self.try_play(request, &mut stage).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(kind = %request.kind, ?stage, "notification sound skipped: {}", failure);
                PlaybackOutcome::Skipped { stage, failure }
            }
        }
    }

    async fn try_play(
        &self,
        request: PlaybackRequest,
        stage: &mut PlaybackStage,
    ) -> Result<PlaybackOutcome, PlaybackFailure> {
        *stage = PlaybackStage::ResolvingDevice;
        let device = self
            .context
            .acquire()
            .map_err(PlaybackFailure::DeviceUnavailable)?;

        if device.state() == DeviceState::Suspended {
            *stage = PlaybackStage::Resuming;
        }
        let device = self
            .context
            .ensure_running()
            .await
            .map_err(PlaybackFailure::DeviceUnavailable)?;

        *stage = PlaybackStage::Synthesizing;
        let buffer = generate_sound(request.kind, device.sample_rate())?;
        let samples = buffer.len();
        let sample_rate = buffer.sample_rate();

        *stage = PlaybackStage::Playing;
        let graph = PlaybackGraph::new(buffer, request.volume());
        let gain = graph.gain();
        device.schedule(graph).map_err(PlaybackFailure::Playback)?;

        *stage = PlaybackStage::Done;
        debug!(kind = %request.kind, gain, samples, "notification sound started");

        Ok(PlaybackOutcome::Played {
            kind: request.kind,
            gain,
            samples,
            sample_rate,
        })
    }

    /// Release the audio device; later plays are skipped
    pub async fn shutdown(&self) {
        if let Err(e) = self.context.release().await {
            warn!("closing audio device failed: {}", e);
        }
    }
}
