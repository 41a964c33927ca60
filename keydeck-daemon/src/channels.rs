//! Inter-task communication channels
//!
//! Key events arrive from the reader thread; shutdown requests arrive from
//! the signal thread or from a task hitting a fatal error.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use keydeck_hal::KeyEvent;

/// Channel capacity for key events
const INPUT_CHANNEL_SIZE: usize = 16;

/// Why the daemon is stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// SIGINT or SIGTERM
    Requested,
    /// Unrecoverable driver error
    Failed,
}

impl Shutdown {
    /// Process exit code
    pub fn exit_code(self) -> i32 {
        match self {
            Shutdown::Requested => 0,
            Shutdown::Failed => 1,
        }
    }
}

/// Key transitions from the device reader thread
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, KeyEvent, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Raised once to stop the daemon
pub static SHUTDOWN: Signal<CriticalSectionRawMutex, Shutdown> = Signal::new();
