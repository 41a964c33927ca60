//! Shared device handle
//!
//! The device is used from two places at once: the driver writes key images
//! and brightness, and the input thread polls for key reports. Every access
//! goes through [`DeckHandle::lock`], whose guard releases the device on
//! every exit path.

use std::sync::{Arc, Mutex, MutexGuard};

use log::error;

use crate::device::{DeckDevice, DeviceError};

/// Cloneable, lock-protected handle to a device
pub struct DeckHandle<D> {
    inner: Arc<Mutex<D>>,
}

impl<D> Clone for DeckHandle<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: DeckDevice> DeckHandle<D> {
    /// Wrap an opened device
    pub fn new(device: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Acquire exclusive access to the device
    ///
    /// The returned guard derefs to the device; dropping it releases the lock.
    pub fn lock(&self) -> Result<MutexGuard<'_, D>, DeviceError> {
        self.inner.lock().map_err(|_| {
            error!("Device lock poisoned by a panicking thread");
            DeviceError::Poisoned
        })
    }

    /// Run `f` with exclusive access to the device
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut D) -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let mut device = self.lock()?;
        f(&mut device)
    }
}
