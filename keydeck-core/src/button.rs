//! Button model
//!
//! A button is either an inert placeholder, optionally showing a decorative
//! icon, or a switch whose state lives on a remote service. Remote access is
//! behind the [`SwitchSource`] trait so the driver never sees HTTP.

use core::fmt;
use std::sync::Arc;

use log::warn;

/// State and metadata reported by a remote switch source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteState {
    /// Whether the switch is on
    pub on: bool,
    /// Human readable name, replaces the button label when present
    pub label: Option<String>,
    /// Glyph key (already lower-cased), replaces the icon hint when present
    pub icon: Option<String>,
}

/// Remote switch failures
///
/// These never reach the display; the button reports an unknown state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection failed or timed out
    Unreachable(String),
    /// Server answered with a non-success status
    Status(u16),
    /// Response body could not be decoded
    Malformed(String),
    /// Response described a different entity
    EntityMismatch { expected: String, got: String },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Unreachable(msg) => write!(f, "unreachable: {msg}"),
            RemoteError::Status(code) => write!(f, "HTTP status {code}"),
            RemoteError::Malformed(msg) => write!(f, "malformed response: {msg}"),
            RemoteError::EntityMismatch { expected, got } => {
                write!(f, "expected entity {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for RemoteError {}

/// Source of truth for remote switches
pub trait SwitchSource: Send + Sync {
    /// Read the current state of `entity`
    fn fetch(&self, entity: &str) -> Result<RemoteState, RemoteError>;

    /// Ask the remote side to turn `entity` on or off
    fn push(&self, entity: &str, on: bool) -> Result<(), RemoteError>;
}

/// Switch backed by a [`SwitchSource`]
#[derive(Clone)]
pub struct RemoteSwitch {
    entity: String,
    label: String,
    icon: Option<String>,
    source: Arc<dyn SwitchSource>,
}

impl RemoteSwitch {
    /// Create a switch for `entity`; the label starts out as the entity id
    pub fn new(entity: impl Into<String>, source: Arc<dyn SwitchSource>) -> Self {
        let entity = entity.into();
        Self {
            label: entity.clone(),
            entity,
            icon: None,
            source,
        }
    }

    /// Remote entity identifier
    pub fn entity(&self) -> &str {
        &self.entity
    }

    fn fetch(&mut self) -> Option<bool> {
        match self.source.fetch(&self.entity) {
            Ok(remote) => {
                if let Some(label) = remote.label {
                    self.label = label;
                }
                if let Some(icon) = remote.icon {
                    self.icon = Some(icon);
                }
                Some(remote.on)
            }
            Err(e) => {
                warn!("Failed to fetch {} state: {}", self.entity, e);
                None
            }
        }
    }

    fn push(&self, on: bool) {
        if let Err(e) = self.source.push(&self.entity, on) {
            warn!("Failed to update {} state: {}", self.entity, e);
        }
    }
}

impl fmt::Debug for RemoteSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSwitch")
            .field("entity", &self.entity)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .finish_non_exhaustive()
    }
}

/// A key's behavior
#[derive(Debug, Clone)]
pub enum Button {
    /// Always off, cannot be toggled; may carry a decorative icon hint
    Placeholder { icon: Option<String> },
    /// Remotely backed switch
    Remote(RemoteSwitch),
}

impl Button {
    /// Placeholder without an icon
    pub fn empty() -> Self {
        Button::Placeholder { icon: None }
    }

    /// Placeholder showing `icon` (an `image:` reference or glyph key)
    pub fn decoration(icon: impl Into<String>) -> Self {
        Button::Placeholder {
            icon: Some(icon.into()),
        }
    }

    /// Current state
    ///
    /// `None` when the remote side could not be reached. Reading a remote
    /// switch also refreshes its label and icon from the remote metadata.
    pub fn state(&mut self) -> Option<bool> {
        match self {
            Button::Placeholder { .. } => Some(false),
            Button::Remote(switch) => switch.fetch(),
        }
    }

    /// Request a new state; a no-op for placeholders
    pub fn set_state(&mut self, on: bool) {
        if let Button::Remote(switch) = self {
            switch.push(on);
        }
    }

    /// Display label (empty for placeholders)
    pub fn label(&self) -> &str {
        match self {
            Button::Placeholder { .. } => "",
            Button::Remote(switch) => &switch.label,
        }
    }

    /// Icon hint, if any
    pub fn icon(&self) -> Option<&str> {
        match self {
            Button::Placeholder { icon } => icon.as_deref(),
            Button::Remote(switch) => switch.icon.as_deref(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Button::Placeholder { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeSource {
        reply: Result<RemoteState, RemoteError>,
        pushed: Mutex<Vec<(String, bool)>>,
    }

    impl FakeSource {
        fn new(reply: Result<RemoteState, RemoteError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                pushed: Mutex::new(Vec::new()),
            })
        }
    }

    impl SwitchSource for FakeSource {
        fn fetch(&self, _entity: &str) -> Result<RemoteState, RemoteError> {
            self.reply.clone()
        }

        fn push(&self, entity: &str, on: bool) -> Result<(), RemoteError> {
            self.pushed.lock().unwrap().push((entity.to_string(), on));
            Ok(())
        }
    }

    #[test]
    fn test_placeholder_is_always_off() {
        let mut button = Button::decoration("mdi:home");
        assert_eq!(button.state(), Some(false));
        button.set_state(true);
        assert_eq!(button.state(), Some(false));
        assert_eq!(button.label(), "");
        assert_eq!(button.icon(), Some("mdi:home"));
        assert!(button.is_placeholder());
    }

    #[test]
    fn test_remote_metadata_replaces_label_and_icon() {
        let source = FakeSource::new(Ok(RemoteState {
            on: true,
            label: Some("Desk Lamp".into()),
            icon: Some("mdi:lamp".into()),
        }));
        let mut button = Button::Remote(RemoteSwitch::new("switch.desk", source));

        assert_eq!(button.label(), "switch.desk");
        assert_eq!(button.icon(), None);

        assert_eq!(button.state(), Some(true));
        assert_eq!(button.label(), "Desk Lamp");
        assert_eq!(button.icon(), Some("mdi:lamp"));
    }

    #[test]
    fn test_remote_failure_is_unknown() {
        let source = FakeSource::new(Err(RemoteError::Status(500)));
        let mut button = Button::Remote(RemoteSwitch::new("switch.fan", source));

        assert_eq!(button.state(), None);
        assert_eq!(button.label(), "switch.fan");
    }

    #[test]
    fn test_set_state_pushes() {
        let source = FakeSource::new(Ok(RemoteState {
            on: false,
            label: None,
            icon: None,
        }));
        let mut button = Button::Remote(RemoteSwitch::new("switch.fan", source.clone()));

        button.set_state(true);
        assert_eq!(
            *source.pushed.lock().unwrap(),
            vec![("switch.fan".to_string(), true)]
        );
    }
}
