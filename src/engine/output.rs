//! Hardware output through cpal
//!
//! The cpal stream lives on a dedicated thread and is driven by commands,
//! so the device handle itself can be shared across tasks. The stream is
//! built paused and only starts producing audio after a resume.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use async_trait::async_trait;

use super::device::{AudioDevice, DeviceError, DeviceFactory, DeviceState, PlaybackGraph};
use super::Mixer;

enum Command {
    Resume(oneshot::Sender<Result<(), DeviceError>>),
    Close(oneshot::Sender<()>),
}

fn unavailable(err: impl std::fmt::Display) -> DeviceError {
    DeviceError::Unavailable(err.to_string())
}

/// Opens the default (or a named) cpal output device
#[derive(Debug, Clone, Default)]
pub struct CpalBackend {
    device_name: Option<String>,
}

impl CpalBackend {
    /// `None` selects the host's default output device
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

impl DeviceFactory for CpalBackend {
    fn open(&self) -> Result<Arc<dyn AudioDevice>, DeviceError> {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let device_name = self.device_name.clone();
        let stream_mixer = mixer.clone();
        thread::Builder::new()
            .name("pomotone-output".to_string())
            .spawn(move || run_output(device_name, stream_mixer, command_rx, ready_tx))
            .map_err(unavailable)?;

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| unavailable("output thread exited before the stream was ready"))??;

        Ok(Arc::new(CpalDevice {
            commands: command_tx,
            mixer,
            sample_rate,
            state: Mutex::new(DeviceState::Suspended),
        }))
    }
}

fn run_output(
    device_name: Option<String>,
    mixer: Arc<Mutex<Mixer>>,
    commands: mpsc::Receiver<Command>,
    ready: mpsc::Sender<Result<u32, DeviceError>>,
) {
    let stream = match open_stream(device_name.as_deref(), mixer) {
        Ok((stream, sample_rate)) => {
            let _ = ready.send(Ok(sample_rate));
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while let Ok(command) = commands.recv() {
        match command {
            Command::Resume(reply) => {
                let result = stream
                    .play()
                    .map_err(|e| DeviceError::Resume(e.to_string()));
                let _ = reply.send(result);
            }
            Command::Close(reply) => {
                if let Err(e) = stream.pause() {
                    debug!("pausing stream before close failed: {}", e);
                }
                drop(stream);
                let _ = reply.send(());
                return;
            }
        }
    }
}

fn find_device(name: Option<&str>) -> Result<Device, DeviceError> {
    let host = cpal::default_host();
    match name {
        Some(name) => host
            .output_devices()
            .map_err(unavailable)?
            .find(|device| device.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| unavailable(format!("no output device named '{}'", name))),
        None => host
            .default_output_device()
            .ok_or_else(|| unavailable("no output device available")),
    }
}

fn open_stream(name: Option<&str>, mixer: Arc<Mutex<Mixer>>) -> Result<(Stream, u32), DeviceError> {
    let device = find_device(name)?;
    let config = device.default_output_config().map_err(unavailable)?;
    let sample_format = config.sample_format();
    let stream_config: StreamConfig = config.into();
    let sample_rate = stream_config.sample_rate.0;

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer)?,
        other => return Err(unavailable(format!("unsupported sample format {:?}", other))),
    };

    // Some hosts start streams on creation
    if let Err(e) = stream.pause() {
        debug!("stream could not be created paused: {}", e);
    }

    Ok((stream, sample_rate))
}

fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
    device: &Device,
    config: &StreamConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<Stream, DeviceError> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if let Ok(mut mixer) = mixer.try_lock() {
                    for frame in data.chunks_mut(channels) {
                        let sample = mixer.process();
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = T::from_sample(sample);
                        }
                    }
                } else {
                    // Being scheduled into; skip this block rather than block the callback
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0f32);
                    }
                }
            },
            |err| {
                warn!("audio stream error: {}", err);
            },
            None,
        )
        .map_err(unavailable)
}

/// A cpal output stream seen through the [`AudioDevice`] contract
struct CpalDevice {
    commands: mpsc::Sender<Command>,
    mixer: Arc<Mutex<Mixer>>,
    sample_rate: u32,
    state: Mutex<DeviceState>,
}

impl CpalDevice {
    fn set_state(&self, state: DeviceState) {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Closed is terminal
        if *current != DeviceState::Closed {
            *current = state;
        }
    }
}

#[async_trait]
impl AudioDevice for CpalDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> DeviceState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn resume(&self) -> Result<(), DeviceError> {
        match self.state() {
            DeviceState::Running => return Ok(()),
            DeviceState::Closed => return Err(DeviceError::Closed),
            DeviceState::Suspended => {}
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Resume(reply_tx))
            .map_err(|_| DeviceError::Closed)?;
        reply_rx.await.map_err(|_| DeviceError::Closed)??;

        self.set_state(DeviceState::Running);
        debug!("output stream running");
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state == DeviceState::Closed {
                return Ok(());
            }
            *state = DeviceState::Closed;
        }

        self.mixer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let (reply_tx, reply_rx) = oneshot::channel();
        if self.commands.send(Command::Close(reply_tx)).is_ok() {
            // The thread may already be gone; either way the stream is dropped
            let _ = reply_rx.await;
        }
        Ok(())
    }

    fn schedule(&self, graph: PlaybackGraph) -> Result<(), DeviceError> {
        if self.state() == DeviceState::Closed {
            return Err(DeviceError::Closed);
        }
        if graph.buffer().sample_rate() != self.sample_rate {
            warn!(
                buffer_rate = graph.buffer().sample_rate(),
                device_rate = self.sample_rate,
                "buffer sample rate differs from device; pitch will shift"
            );
        }

        self.mixer
            .lock()
            .map_err(|_| DeviceError::Playback("mixer lock poisoned".to_string()))?
            .add(graph);
        Ok(())
    }
}

/// Summary of an output device for listings
#[derive(Debug, Clone)]
pub struct OutputDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub is_default: bool,
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<OutputDeviceInfo> {
    let host = cpal::default_host();
    let default_name = default_device_name();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push(OutputDeviceInfo {
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    devices
}
