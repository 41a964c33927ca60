//! Termination signal watcher
//!
//! SIGINT and SIGTERM are received on a dedicated thread and turned into a
//! [`SHUTDOWN`] request for the main task.

use std::io;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

use crate::channels::{Shutdown, SHUTDOWN};

pub struct SignalWatcher {
    handle: Handle,
    thread: JoinHandle<()>,
}

impl SignalWatcher {
    pub fn spawn() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signals".into())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    info!("Received signal {}, shutting down", signal);
                    SHUTDOWN.signal(Shutdown::Requested);
                }
            })?;

        Ok(Self { handle, thread })
    }

    /// Stop listening and wait for the thread to finish
    pub fn stop(self) {
        self.handle.close();
        if self.thread.join().is_err() {
            warn!("Signal thread panicked");
        }
    }
}
