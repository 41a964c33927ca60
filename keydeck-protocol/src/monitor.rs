//! Status endpoint body

use serde::{Deserialize, Serialize};

/// Identity of the attached device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStatus {
    /// Model name
    #[serde(rename = "type")]
    pub kind: String,
    pub serial: String,
    /// Firmware version
    pub version: String,
}

impl DeckStatus {
    /// JSON body
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_json_fields() {
        let status = DeckStatus {
            kind: "Stream Deck XL".into(),
            serial: "CL12345".into(),
            version: "1.00.010".into(),
        };
        let value: serde_json::Value = serde_json::from_str(&status.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "Stream Deck XL");
        assert_eq!(value["serial"], "CL12345");
        assert_eq!(value["version"], "1.00.010");
        assert_eq!(value.as_object().map(|o| o.len()), Some(3));
    }
}
