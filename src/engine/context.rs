//! Owner of the single output device
//!
//! The device is built lazily on first use and at most once: the slot lock
//! is held across construction so concurrent callers share one device.
//! A failed construction is remembered and never retried, and a released
//! context never opens another device.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::device::{AudioDevice, DeviceError, DeviceFactory, DeviceState};

enum Slot {
    Empty,
    Live(Arc<dyn AudioDevice>),
    Unavailable(String),
    Released,
}

/// Lazily constructed, explicitly released audio device holder
pub struct AudioContext {
    factory: Box<dyn DeviceFactory>,
    slot: Mutex<Slot>,
}

impl AudioContext {
    /// Create a holder; no device is opened until [`acquire`](Self::acquire)
    pub fn new(factory: impl DeviceFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            slot: Mutex::new(Slot::Empty),
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live device, opening it on the first call
    pub fn acquire(&self) -> Result<Arc<dyn AudioDevice>, DeviceError> {
        let mut slot = self.lock_slot();

        match &*slot {
            Slot::Live(device) if device.state() == DeviceState::Closed => {
                return Err(DeviceError::Closed)
            }
            Slot::Live(device) => return Ok(device.clone()),
            Slot::Unavailable(reason) => return Err(DeviceError::Unavailable(reason.clone())),
            Slot::Released => return Err(DeviceError::Released),
            Slot::Empty => {}
        }

        match self.factory.open() {
            Ok(device) => {
                info!(
                    sample_rate = device.sample_rate(),
                    state = ?device.state(),
                    "audio device opened"
                );
                *slot = Slot::Live(device.clone());
                Ok(device)
            }
            Err(e) => {
                let reason = match e {
                    DeviceError::Unavailable(reason) => reason,
                    other => other.to_string(),
                };
                warn!("audio device could not be opened, sounds disabled: {}", reason);
                *slot = Slot::Unavailable(reason.clone());
                Err(DeviceError::Unavailable(reason))
            }
        }
    }

    /// Acquire the device and resume it if it is suspended
    ///
    /// This is the only await point on the playback path.
    pub async fn ensure_running(&self) -> Result<Arc<dyn AudioDevice>, DeviceError> {
        let device = self.acquire()?;

        match device.state() {
            DeviceState::Running => {}
            DeviceState::Suspended => {
                debug!("resuming suspended audio device");
                device.resume().await?;
            }
            DeviceState::Closed => return Err(DeviceError::Closed),
        }

        Ok(device)
    }

    /// Close the device and retire this context; calling again is a no-op
    pub async fn release(&self) -> Result<(), DeviceError> {
        let previous = {
            let mut slot = self.lock_slot();
            std::mem::replace(&mut *slot, Slot::Released)
        };

        match previous {
            Slot::Live(device) => {
                device.close().await?;
                info!("audio device released");
                Ok(())
            }
            Slot::Released => Ok(()),
            Slot::Empty | Slot::Unavailable(_) => {
                debug!("audio context released without a device");
                Ok(())
            }
        }
    }

    /// True once [`release`](Self::release) has been called
    pub fn is_released(&self) -> bool {
        matches!(*self.lock_slot(), Slot::Released)
    }

    /// State of the device, if one is open
    pub fn device_state(&self) -> Option<DeviceState> {
        match &*self.lock_slot() {
            Slot::Live(device) => Some(device.state()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FakeFactory;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_acquire_is_lazy_and_idempotent() {
        let factory = FakeFactory::new(48000, DeviceState::Suspended);
        let opens = factory.opens.clone();
        let context = AudioContext::new(factory);

        assert_eq!(opens.load(Ordering::SeqCst), 0);
        assert_eq!(context.device_state(), None);

        let a = context.acquire().unwrap();
        let b = context.acquire().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.sample_rate(), 48000);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(context.device_state(), Some(DeviceState::Suspended));
    }

    #[test]
    fn test_concurrent_acquire_constructs_once() {
        let factory = FakeFactory::new(44100, DeviceState::Suspended);
        let opens = factory.opens.clone();
        let context = AudioContext::new(factory);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    context.acquire().unwrap();
                });
            }
        });

        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_construction_failure_is_remembered() {
        let factory = FakeFactory::failing();
        let opens = factory.opens.clone();
        let context = AudioContext::new(factory);

        assert!(matches!(context.acquire(), Err(DeviceError::Unavailable(_))));
        assert!(matches!(context.acquire(), Err(DeviceError::Unavailable(_))));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ensure_running_resumes_suspended_device() {
        let factory = FakeFactory::new(44100, DeviceState::Suspended);
        let last = factory.last.clone();
        let context = AudioContext::new(factory);

        let device = context.ensure_running().await.unwrap();
        assert_eq!(device.state(), DeviceState::Running);

        let fake = last.lock().unwrap().clone().unwrap();
        assert_eq!(fake.resumes.load(Ordering::SeqCst), 1);

        // Already running: no second resume
        context.ensure_running().await.unwrap();
        assert_eq!(fake.resumes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ensure_running_reports_resume_failure() {
        let factory = FakeFactory::new(44100, DeviceState::Suspended);
        let last = factory.last.clone();
        let context = AudioContext::new(factory);

        context.acquire().unwrap();
        let fake = last.lock().unwrap().clone().unwrap();
        fake.fail_resume.store(true, Ordering::SeqCst);

        assert!(matches!(
            context.ensure_running().await,
            Err(DeviceError::Resume(_))
        ));
    }

    #[tokio::test]
    async fn test_release_closes_once_and_retires_context() {
        let factory = FakeFactory::new(44100, DeviceState::Running);
        let last = factory.last.clone();
        let opens = factory.opens.clone();
        let context = AudioContext::new(factory);

        context.acquire().unwrap();
        context.release().await.unwrap();
        context.release().await.unwrap();

        let fake = last.lock().unwrap().clone().unwrap();
        assert_eq!(fake.closes.load(Ordering::SeqCst), 1);
        assert!(context.is_released());
        assert_eq!(context.device_state(), None);

        assert_eq!(context.acquire().err(), Some(DeviceError::Released));
        assert!(matches!(
            context.ensure_running().await,
            Err(DeviceError::Released)
        ));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_release_before_acquire_never_opens() {
        let factory = FakeFactory::new(44100, DeviceState::Running);
        let opens = factory.opens.clone();
        let context = AudioContext::new(factory);

        context.release().await.unwrap();
        assert!(context.acquire().is_err());
        assert_eq!(opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_externally_closed_device_is_not_reused() {
        let factory = FakeFactory::new(44100, DeviceState::Running);
        let last = factory.last.clone();
        let context = AudioContext::new(factory);

        context.acquire().unwrap();
        last.lock().unwrap().clone().unwrap().set_state(DeviceState::Closed);
        assert_eq!(context.acquire().err(), Some(DeviceError::Closed));
    }
}
