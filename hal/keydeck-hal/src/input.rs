//! Key input events
//!
//! Devices report the full pressed/released vector on every change. The
//! [`KeyTracker`] turns those snapshots into per-key edges.

/// A single key transition on a physical key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Serial number of the device that produced the event
    pub device: String,
    /// Physical key index
    pub key: usize,
    /// True on the press edge, false on release
    pub pressed: bool,
}

/// Edge detector over key state snapshots
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    previous: Vec<bool>,
}

impl KeyTracker {
    /// Create a tracker with every key released
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a new snapshot, returning `(key, pressed)` for every key that changed
    ///
    /// Keys missing from the previous snapshot count as released.
    pub fn update(&mut self, states: &[bool]) -> Vec<(usize, bool)> {
        let mut edges = Vec::new();
        for (key, &now) in states.iter().enumerate() {
            let before = self.previous.get(key).copied().unwrap_or(false);
            if before != now {
                edges.push((key, now));
            }
        }

        self.previous.clear();
        self.previous.extend_from_slice(states);
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_then_release() {
        let mut tracker = KeyTracker::new();

        assert_eq!(tracker.update(&[false, true, false]), vec![(1, true)]);
        // Unchanged snapshot produces nothing
        assert!(tracker.update(&[false, true, false]).is_empty());
        assert_eq!(tracker.update(&[false, false, false]), vec![(1, false)]);
    }

    #[test]
    fn test_simultaneous_edges() {
        let mut tracker = KeyTracker::new();
        tracker.update(&[true, false, false, false]);

        let edges = tracker.update(&[false, true, false, true]);
        assert_eq!(edges, vec![(0, false), (1, true), (3, true)]);
    }

    #[test]
    fn test_first_snapshot_all_released() {
        let mut tracker = KeyTracker::new();
        assert!(tracker.update(&[false; 15]).is_empty());
    }
}
