//! Keydeck - Stream Deck switch panel daemon
//!
//! Shows one remote switch per key and toggles it on press. Screen
//! blanking, rotation and icon theming come from a TOML file.
//!
//! ```text
//!  key-reader thread ──► INPUT_CHANNEL ──► input_task ─┐
//!                                                      ├─► Driver ──► device
//!                       1 s Ticker ────►  tick_task  ──┘
//!  signals thread ──► SHUTDOWN ──► main: close driver, join threads, exit
//! ```

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use embassy_executor::Spawner;
use embassy_sync::mutex::Mutex;
use log::{error, info, warn};
use static_cell::StaticCell;

use keydeck_display::Driver;
use keydeck_drivers::HidDeck;
use keydeck_hal::{DeckDevice, DeckHandle, DeviceError};
use keydeck_protocol::DeckStatus;

use crate::channels::SHUTDOWN;
use crate::config::{build_buttons, driver_settings, load_config};
use crate::error::SetupError;
use crate::monitor::Monitor;
use crate::signals::SignalWatcher;
use crate::tasks::{KeyReader, SharedDriver};

mod channels;
mod config;
mod error;
mod monitor;
mod signals;
mod tasks;

/// Stream Deck switch panel daemon
#[derive(Parser, Debug)]
#[command(name = "keydeck")]
#[command(version)]
#[command(about = "Stream Deck switch panel daemon", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "KEYDECK_CONFIG", default_value = "keydeck.toml")]
    config: PathBuf,
}

// Lives for the whole process so tasks can borrow it
static DRIVER: StaticCell<SharedDriver> = StaticCell::new();

/// Everything that has to be stopped on shutdown
struct Daemon {
    driver: &'static SharedDriver,
    reader: KeyReader,
    monitor: Option<Monitor>,
    signals: SignalWatcher,
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Keydeck starting...");

    let daemon = match start(spawner, &args) {
        Ok(daemon) => daemon,
        Err(SetupError::Device(DeviceError::NotFound)) => {
            error!("No visual device found");
            process::exit(1);
        }
        Err(e) => {
            error!("Startup failed: {}", e);
            process::exit(1);
        }
    };

    info!("All tasks spawned, keydeck running");

    let reason = SHUTDOWN.wait().await;
    info!("Shutting down ({:?})", reason);

    daemon.driver.lock().await.close();
    daemon.reader.stop();
    if let Some(monitor) = daemon.monitor {
        monitor.stop();
    }
    daemon.signals.stop();

    info!("Keydeck stopped");
    process::exit(reason.exit_code());
}

/// Open the device, set up the driver and start every task and thread
fn start(spawner: Spawner, args: &Args) -> Result<Daemon, SetupError> {
    // Installed ahead of the blocking device and remote switch setup
    let signals = SignalWatcher::spawn()?;

    let config = load_config(&args.config)?;
    let settings = driver_settings(&config)?;

    let handle = DeckHandle::new(HidDeck::open_first()?);
    let status = {
        let device = handle.lock()?;
        DeckStatus {
            kind: device.model().to_string(),
            serial: device.serial_number().to_string(),
            version: device.firmware_version().to_string(),
        }
    };

    let mut driver = Driver::new(handle.clone(), settings, Instant::now())?;

    let monitoring = &config.homeassistant.monitoring;
    let monitor = if monitoring.enabled {
        match Monitor::spawn(monitoring.port, &status) {
            Ok(monitor) => {
                info!("Status endpoint on port {}", monitor.port());
                Some(monitor)
            }
            Err(e) => {
                warn!("Monitoring disabled, cannot serve port {}: {}", monitoring.port, e);
                None
            }
        }
    } else {
        None
    };

    let buttons = build_buttons(&config.homeassistant);
    info!("Configured {} button(s)", buttons.len());
    driver.add_buttons(buttons, Instant::now())?;

    let driver: &'static SharedDriver = DRIVER.init(Mutex::new(driver));

    let reader = KeyReader::spawn(handle)?;

    spawner.spawn(tasks::tick_task(driver).map_err(SetupError::Spawn)?);
    spawner.spawn(tasks::input_task(driver).map_err(SetupError::Spawn)?);

    Ok(Daemon {
        driver,
        reader,
        monitor,
        signals,
    })
}
