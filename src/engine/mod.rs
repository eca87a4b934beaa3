//! Audio engine for pomotone
//!
//! Owns the output device lifecycle and turns sound requests into
//! one-shot playback on that device.

mod context;
mod device;
mod mixer;
mod output;
mod player;
mod recorder;

#[cfg(test)]
mod testing;

pub use context::AudioContext;
pub use device::{
    clamp_volume, AudioDevice, DeviceError, DeviceFactory, DeviceState, GainNode, PlaybackGraph,
    SourceNode,
};
pub use mixer::Mixer;
pub use output::{default_device_name, list_output_devices, CpalBackend, OutputDeviceInfo};
pub use player::{
    PlaybackFailure, PlaybackOutcome, PlaybackRequest, PlaybackStage, Player, DEFAULT_VOLUME,
};
pub use recorder::{render_to_wav, Recorder};
