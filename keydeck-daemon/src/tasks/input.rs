//! Key input
//!
//! The device only offers a blocking read, so a reader thread polls it and
//! forwards press/release edges over [`INPUT_CHANNEL`]. The input task
//! hands them to the driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use keydeck_hal::{DeckDevice, DeckHandle, DeviceError, KeyEvent, KeyTracker};
use log::{debug, error, info, trace, warn};

use super::SharedDriver;
use crate::channels::{Shutdown, INPUT_CHANNEL, SHUTDOWN};

/// Time spent waiting for input while holding the device
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Pause between polls with the device released
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Pause after a failed read
const ERROR_BACKOFF: Duration = Duration::from_millis(500);

/// Input task - applies key events to the driver
#[embassy_executor::task]
pub async fn input_task(driver: &'static SharedDriver) {
    info!("Input task started");

    loop {
        let event = INPUT_CHANNEL.receive().await;
        trace!("Key event: {:?}", event);

        let mut driver = driver.lock().await;
        if let Err(e) = driver.on_key(&event, std::time::Instant::now()) {
            error!("Key handling failed: {}", e);
            SHUTDOWN.signal(Shutdown::Failed);
            return;
        }
    }
}

/// Device reader thread
pub struct KeyReader {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl KeyReader {
    /// Start polling `handle` for key transitions
    pub fn spawn<D>(handle: DeckHandle<D>) -> Result<Self, DeviceError>
    where
        D: DeckDevice + Send + 'static,
    {
        let serial = handle.lock()?.serial_number().to_string();
        let stop = Arc::new(AtomicBool::new(false));

        let thread = {
            let stop = stop.clone();
            thread::Builder::new()
                .name("key-reader".into())
                .spawn(move || read_keys(handle, serial, &stop))
                .map_err(|e| DeviceError::Transport(e.to_string()))?
        };

        Ok(Self { stop, thread })
    }

    /// Stop polling and wait for the thread to finish
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.thread.join().is_err() {
            warn!("Key reader thread panicked");
        }
    }
}

fn read_keys<D: DeckDevice>(handle: DeckHandle<D>, serial: String, stop: &AtomicBool) {
    info!("Key reader started for {}", serial);
    let mut tracker = KeyTracker::new();

    while !stop.load(Ordering::SeqCst) {
        match handle.with(|device| device.poll_keys(POLL_TIMEOUT)) {
            Ok(Some(states)) => {
                for (key, pressed) in tracker.update(&states) {
                    let event = KeyEvent {
                        device: serial.clone(),
                        key,
                        pressed,
                    };
                    if INPUT_CHANNEL.try_send(event).is_err() {
                        warn!("Input channel full, dropping key {}", key);
                    }
                }
            }
            Ok(None) => {}
            Err(DeviceError::Closed) => {
                debug!("Device closed, key reader exiting");
                break;
            }
            Err(e) => {
                warn!("Key read failed: {}", e);
                thread::sleep(ERROR_BACKOFF);
                continue;
            }
        }
        thread::sleep(POLL_INTERVAL);
    }

    info!("Key reader stopped");
}
