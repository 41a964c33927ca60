//! Remote switch REST API bodies

use serde::{Deserialize, Serialize};

/// Path of the state query for `entity`, relative to the API base
pub fn state_path(entity: &str) -> String {
    format!("api/states/{entity}")
}

/// Path of the switch service call, relative to the API base
pub fn service_path(on: bool) -> &'static str {
    if on {
        "api/services/switch/turn_on"
    } else {
        "api/services/switch/turn_off"
    }
}

/// Response of a state query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    /// `"on"`, `"off"`, `"unavailable"`, ...
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: EntityAttributes,
}

/// Entity metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl EntityState {
    /// Whether the switch is on (case-insensitive `"on"`)
    pub fn is_on(&self) -> bool {
        self.state.eq_ignore_ascii_case("on")
    }

    /// Icon attribute as reported, if any
    pub fn icon(&self) -> Option<&str> {
        self.attributes.icon.as_deref()
    }
}

/// Body of a switch service call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub entity_id: String,
}

impl ServiceCall {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity_id: entity.into(),
        }
    }
}
