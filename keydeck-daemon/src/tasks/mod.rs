//! Embassy async tasks and the device reader thread
//!
//! Tasks share the driver through an async mutex, which serializes refresh
//! ticks against key handling.

pub mod input;
pub mod tick;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use keydeck_display::Driver;
use keydeck_drivers::HidDeck;

pub use input::{input_task, KeyReader};
pub use tick::tick_task;

/// Driver shared between tasks
pub type SharedDriver = Mutex<CriticalSectionRawMutex, Driver<HidDeck>>;
