//! Screen power state machine
//!
//! ```text
//!            idle > timeout (refresh)
//!   ┌───────┐ ─────────────────────────► ┌─────────┐
//!   │ Awake │                            │ Blanked │
//!   └───────┘ ◄───────────────────────── └─────────┘
//!                  any key press
//! ```
//!
//! Some firmware does not fully darken the panel at brightness 0. On those
//! devices blanking also forces every key to a black image, and waking
//! redraws all keys from the last known states so nothing waits on the
//! remote source.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info};

/// Model name of the only device family with the brightness quirk
const QUIRKY_MODEL: &str = "Stream Deck XL";

/// Whether setting brightness 0 leaves the panel visibly lit
///
/// Known XL firmware versions are listed explicitly; any other XL firmware
/// is assumed to be affected.
pub fn has_brightness_quirk(model: &str, firmware: &str) -> bool {
    if model != QUIRKY_MODEL {
        return false;
    }
    !matches!(firmware, "1.01.000" | "1.00.006")
}

/// Screen power states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    /// Normal operation at configured brightness
    #[default]
    Awake,
    /// Brightness 0 after the idle timeout
    Blanked,
}

/// Events driving [`ScreenState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    /// Refresh observed the idle timeout elapsed
    IdleTimeout,
    /// A key was pressed
    KeyPress,
}

impl ScreenState {
    /// Process an event and return the next state
    pub fn transition(self, event: PowerEvent) -> Self {
        use PowerEvent::*;
        use ScreenState::*;

        match (self, event) {
            (Awake, IdleTimeout) => Blanked,
            (Blanked, KeyPress) => Awake,
            _ => self,
        }
    }
}

/// What a periodic refresh should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Redraw keys at normal brightness
    Normal,
    /// Send brightness 0, then redraw (forced black under the quirk)
    Blanked,
}

/// How a key press is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// The press woke the screen and must not toggle anything
    Wake {
        /// Redraw every key from last known states
        redraw_cached: bool,
    },
    /// Normal press on an awake screen
    Interact,
}

/// Power bookkeeping owned by the driver
#[derive(Debug, Clone)]
pub struct PowerState {
    state: ScreenState,
    timeout: Option<Duration>,
    quirky: bool,
    quirk_active: bool,
    last_interaction: Instant,
    last_known: HashMap<usize, bool>,
}

impl PowerState {
    /// Create an awake power state
    ///
    /// A `timeout_secs` of zero or less disables blanking.
    pub fn new(timeout_secs: i64, quirky: bool, now: Instant) -> Self {
        let timeout = u64::try_from(timeout_secs)
            .ok()
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        Self {
            state: ScreenState::Awake,
            timeout,
            quirky,
            quirk_active: false,
            last_interaction: now,
            last_known: HashMap::new(),
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Whether the device needs black keys to look blank
    pub fn is_quirky(&self) -> bool {
        self.quirky
    }

    /// Whether the idle timeout has elapsed at `now`
    pub fn timed_out(&self, now: Instant) -> bool {
        self.timeout.is_some_and(|timeout| {
            now.saturating_duration_since(self.last_interaction) > timeout
        })
    }

    /// Advance the machine for a periodic refresh
    pub fn on_refresh(&mut self, now: Instant) -> RefreshMode {
        if !self.timed_out(now) {
            return RefreshMode::Normal;
        }

        if self.state == ScreenState::Awake {
            info!("Idle timeout, blanking screen");
        }
        self.state = self.state.transition(PowerEvent::IdleTimeout);
        self.quirk_active = self.quirky;
        RefreshMode::Blanked
    }

    /// Advance the machine for a key press
    pub fn on_press(&mut self, now: Instant) -> PressOutcome {
        let waking = self.state == ScreenState::Blanked || self.timed_out(now);
        self.last_interaction = now;

        if !waking {
            return PressOutcome::Interact;
        }

        info!("Key press, waking screen");
        self.state = ScreenState::Blanked.transition(PowerEvent::KeyPress);
        let redraw_cached = self.quirk_active;
        self.quirk_active = false;
        PressOutcome::Wake { redraw_cached }
    }

    /// Whether every key must be drawn black
    pub fn forced_blank(&self) -> bool {
        self.state == ScreenState::Blanked && self.quirk_active
    }

    /// Record a sampled state; unknown states keep the previous value
    pub fn remember(&mut self, key: usize, state: Option<bool>) {
        match state {
            Some(on) => {
                self.last_known.insert(key, on);
            }
            None => debug!("Key {} state unknown, keeping cached value", key),
        }
    }

    /// Last sampled state of a key
    pub fn last_known(&self, key: usize) -> Option<bool> {
        self.last_known.get(&key).copied()
    }
}
