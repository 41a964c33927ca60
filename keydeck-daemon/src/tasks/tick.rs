//! Periodic refresh task
//!
//! Re-polls every switch and advances the screen power state.

use embassy_time::{Duration, Ticker};
use log::{error, info};

use super::SharedDriver;
use crate::channels::{Shutdown, SHUTDOWN};

/// Refresh interval in seconds
pub const REFRESH_INTERVAL_S: u64 = 1;

#[embassy_executor::task]
pub async fn tick_task(driver: &'static SharedDriver) {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_secs(REFRESH_INTERVAL_S));

    loop {
        ticker.next().await;

        let mut driver = driver.lock().await;
        if driver.is_closed() {
            return;
        }
        if let Err(e) = driver.refresh(std::time::Instant::now()) {
            error!("Refresh failed: {}", e);
            SHUTDOWN.signal(Shutdown::Failed);
            return;
        }
    }
}
