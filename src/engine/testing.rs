//! In-memory device used by the engine tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::device::{AudioDevice, DeviceError, DeviceFactory, DeviceState, PlaybackGraph};

/// What a scheduled graph looked like when it reached the device
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub gain: f32,
    pub samples: usize,
    pub sample_rate: u32,
}

pub struct FakeDevice {
    sample_rate: u32,
    state: Mutex<DeviceState>,
    pub scheduled: Mutex<Vec<Scheduled>>,
    pub resumes: AtomicUsize,
    pub closes: AtomicUsize,
    pub fail_resume: AtomicBool,
    pub fail_schedule: AtomicBool,
}

impl FakeDevice {
    pub fn new(sample_rate: u32, state: DeviceState) -> Self {
        Self {
            sample_rate,
            state: Mutex::new(state),
            scheduled: Mutex::new(Vec::new()),
            resumes: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_resume: AtomicBool::new(false),
            fail_schedule: AtomicBool::new(false),
        }
    }

    pub fn set_state(&self, state: DeviceState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn scheduled(&self) -> Vec<Scheduled> {
        self.scheduled.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioDevice for FakeDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn state(&self) -> DeviceState {
        *self.state.lock().unwrap()
    }

    async fn resume(&self) -> Result<(), DeviceError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_resume.load(Ordering::SeqCst) {
            return Err(DeviceError::Resume("blocked by policy".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        if *state == DeviceState::Closed {
            return Err(DeviceError::Closed);
        }
        *state = DeviceState::Running;
        Ok(())
    }

    async fn close(&self) -> Result<(), DeviceError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.set_state(DeviceState::Closed);
        Ok(())
    }

    fn schedule(&self, graph: PlaybackGraph) -> Result<(), DeviceError> {
        if self.state() == DeviceState::Closed {
            return Err(DeviceError::Closed);
        }
        if self.fail_schedule.load(Ordering::SeqCst) {
            return Err(DeviceError::Playback("source refused to start".to_string()));
        }
        self.scheduled.lock().unwrap().push(Scheduled {
            gain: graph.gain(),
            samples: graph.buffer().len(),
            sample_rate: graph.buffer().sample_rate(),
        });
        Ok(())
    }
}

/// Factory handing out `FakeDevice`s and counting constructions
pub struct FakeFactory {
    sample_rate: u32,
    initial: DeviceState,
    fail: bool,
    pub opens: Arc<AtomicUsize>,
    pub last: Arc<Mutex<Option<Arc<FakeDevice>>>>,
}

impl FakeFactory {
    pub fn new(sample_rate: u32, initial: DeviceState) -> Self {
        Self {
            sample_rate,
            initial,
            fail: false,
            opens: Arc::new(AtomicUsize::new(0)),
            last: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(44100, DeviceState::Suspended)
        }
    }
}

impl DeviceFactory for FakeFactory {
    fn open(&self) -> Result<Arc<dyn AudioDevice>, DeviceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        // Widen the window for racing constructors
        std::thread::sleep(Duration::from_millis(10));
        if self.fail {
            return Err(DeviceError::Unavailable("no output device".to_string()));
        }
        let device = Arc::new(FakeDevice::new(self.sample_rate, self.initial));
        *self.last.lock().unwrap() = Some(device.clone());
        Ok(device)
    }
}
