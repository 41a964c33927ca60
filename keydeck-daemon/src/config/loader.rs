//! Configuration loader
//!
//! Loads the configuration file, or the embedded defaults when the file
//! does not exist.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use keydeck_core::button::{Button, RemoteSwitch, SwitchSource};
use keydeck_core::config::{DeckConfig, EntityBinding, HomeAssistantConfig};
use keydeck_core::{ConfigError, IconTheme};
use keydeck_display::{DriverSettings, GlyphFont, GlyphMap, GlyphSet, LabelFont};
use keydeck_drivers::HomeAssistant;
use log::{info, warn};

use crate::error::SetupError;

/// Embedded default configuration
const EMBEDDED_CONFIG: &str = include_str!("../../keydeck.toml");

/// Load the configuration at `path`
///
/// A missing file selects the embedded defaults; any other read or parse
/// failure is an error.
pub fn load_config(path: &Path) -> Result<DeckConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let config = parse_config(&text)?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No configuration at {}, using embedded defaults", path.display());
            parse_config(EMBEDDED_CONFIG)
        }
        Err(e) => Err(ConfigError::Io(format!("{}: {}", path.display(), e))),
    }
}

/// Parse TOML configuration text
pub fn parse_config(text: &str) -> Result<DeckConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Validate `config` and derive the driver settings
///
/// Glyph icons are enabled only when both the stylesheet and the font are
/// configured.
pub fn driver_settings(config: &DeckConfig) -> Result<DriverSettings, SetupError> {
    let rotation = config.validate()?;
    let theme = IconTheme::from(&config.icon);

    let glyphs = match (&config.icon.glyph.css, &config.icon.glyph.face) {
        (Some(css), Some(face)) => {
            let font = GlyphFont::load(&theme.assets.join(face))?;
            let map = GlyphMap::load(&theme.assets.join(css))?;
            Some(GlyphSet { font, map })
        }
        (None, None) => None,
        _ => {
            warn!("Glyph icons need both icon.glyph.css and icon.glyph.face, disabled");
            None
        }
    };

    Ok(DriverSettings {
        brightness: config.screen.brightness,
        timeout_secs: config.screen.timeout,
        rotation,
        theme,
        label_font: LabelFont::select(config.font.face, config.font.size),
        glyphs,
    })
}

/// One button per configured entity, in order
///
/// All remote switches share one client.
pub fn build_buttons(config: &HomeAssistantConfig) -> Vec<Button> {
    let credentials = config.credentials();
    if credentials.is_none() {
        info!("No remote switch credentials, entities become empty keys");
    }

    let mut client: Option<Arc<dyn SwitchSource>> = None;

    config
        .entities
        .iter()
        .map(|entry| match EntityBinding::parse(entry, credentials) {
            EntityBinding::Decoration(hint) => Button::decoration(hint),
            EntityBinding::Remote { entity, url, token } => {
                let source = client
                    .get_or_insert_with(|| {
                        Arc::new(HomeAssistant::new(url, token)) as Arc<dyn SwitchSource>
                    })
                    .clone();
                Button::Remote(RemoteSwitch::new(entity, source))
            }
            EntityBinding::Empty => Button::empty(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydeck_core::config::FontFace;
    use keydeck_display::GlyphFontError;
    use keydeck_core::{ColorSpec, Rotation};

    #[test]
    fn test_embedded_config_parses() {
        let config = parse_config(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.validate(), Ok(Rotation::Deg0));
        assert_eq!(config.screen.brightness, 30);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let config = parse_config(
            r#"
[screen]
rotation = -90

[icon.color]
off = "#123"
"#,
        )
        .unwrap();

        assert_eq!(config.screen.rotation, -90);
        assert_eq!(config.screen.brightness, 30);
        assert_eq!(config.screen.timeout, 60);
        assert_eq!(config.icon.color.off, ColorSpec::rgb(0x11, 0x22, 0x33));
        assert_eq!(config.icon.color.on, ColorSpec::WHITE);
        assert_eq!(config.font.face, FontFace::Regular);
        assert!(config.homeassistant.entities.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
[homeassistant]
url = "http://hass.local:8123"
token = "secret"
entities = ["switch.lamp", "mdi:home", "", "image:logo.png"]

[homeassistant.monitoring]
enabled = true
port = 9000

[font]
face = "bold"
size = 16

[screen]
brightness = 80
timeout = 0
rotation = 180
"#,
        )
        .unwrap();

        assert_eq!(config.homeassistant.entities.len(), 4);
        assert!(config.homeassistant.monitoring.enabled);
        assert_eq!(config.homeassistant.monitoring.port, 9000);
        assert_eq!(config.font.face, FontFace::Bold);
        assert_eq!(config.validate(), Ok(Rotation::Deg180));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(matches!(
            parse_config("[icon.color]\non = \"red\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_config("[screen]\nbrightness = 300"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            parse_config("[font]\nface = \"italic\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_rotation_rejected() {
        let config = parse_config("[screen]\nrotation = 45").unwrap();
        assert!(matches!(
            driver_settings(&config),
            Err(SetupError::Config(ConfigError::InvalidRotation(45)))
        ));
    }

    #[test]
    fn test_missing_file_uses_embedded() {
        let config = load_config(Path::new("/nonexistent/keydeck.toml")).unwrap();
        assert_eq!(config, parse_config(EMBEDDED_CONFIG).unwrap());
    }

    fn glyph_assets(test: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "keydeck-glyphs-{}-{}",
            std::process::id(),
            test
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("icons.css"),
            r#".mdi-home::before { content: "\F02DC"; }"#,
        )
        .unwrap();
        dir
    }

    fn glyph_config(assets: &Path, face: &str) -> DeckConfig {
        let mut config = DeckConfig::default();
        config.icon.assets = assets.display().to_string();
        config.icon.glyph.css = Some("icons.css".into());
        config.icon.glyph.face = Some(face.into());
        config
    }

    #[test]
    fn test_missing_glyph_font_file() {
        let dir = glyph_assets("missing");
        assert!(matches!(
            driver_settings(&glyph_config(&dir, "icons.ttf")),
            Err(SetupError::GlyphFont(GlyphFontError::Io { .. }))
        ));
    }

    #[test]
    fn test_invalid_glyph_font_file() {
        let dir = glyph_assets("invalid");
        fs::write(dir.join("icons.ttf"), b"not a font").unwrap();
        assert!(matches!(
            driver_settings(&glyph_config(&dir, "icons.ttf")),
            Err(SetupError::GlyphFont(GlyphFontError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_glyphs_need_both_files() {
        let mut config = DeckConfig::default();
        config.icon.glyph.css = Some("icons.css".into());
        assert!(driver_settings(&config).unwrap().glyphs.is_none());
    }

    #[test]
    fn test_build_buttons() {
        let config = HomeAssistantConfig {
            url: Some("http://hass.local:8123".into()),
            token: Some("secret".into()),
            entities: vec![
                "switch.lamp".into(),
                "mdi:home".into(),
                String::new(),
                "switch.fan".into(),
            ],
            ..Default::default()
        };

        let buttons = build_buttons(&config);
        assert_eq!(buttons.len(), 4);
        assert_eq!(buttons[0].label(), "switch.lamp");
        assert!(!buttons[0].is_placeholder());
        assert_eq!(buttons[1].icon(), Some("mdi:home"));
        assert!(buttons[1].is_placeholder());
        assert!(buttons[2].is_placeholder());
        assert_eq!(buttons[2].icon(), None);
        assert_eq!(buttons[3].label(), "switch.fan");
    }

    #[test]
    fn test_build_buttons_without_credentials() {
        let config = HomeAssistantConfig {
            entities: vec!["switch.lamp".into(), "image:logo.png".into()],
            ..Default::default()
        };

        let buttons = build_buttons(&config);
        assert!(buttons[0].is_placeholder());
        assert_eq!(buttons[0].icon(), None);
        assert_eq!(buttons[1].icon(), Some("image:logo.png"));
    }
}
