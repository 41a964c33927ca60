//! Per-key style resolution
//!
//! Evaluated for every key on every redraw, in this order:
//!
//! 1. Screen blanked on a quirky device: black blank icon, no label. The
//!    button state is still sampled so a wake can redraw instantly.
//! 2. No button, or a placeholder: the blank icon in the blank color,
//!    unless the placeholder carries a decorative icon hint.
//! 3. Remote switch: on/off icon and color picked from its state, or its
//!    glyph icon when the hint names a known glyph.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::button::Button;
use crate::color::ColorSpec;
use crate::config::IconConfig;
use crate::power::PowerState;

/// Icon hint prefix naming an image file in the assets directory
pub const IMAGE_PREFIX: &str = "image:";

/// Glyph key prefix
pub const GLYPH_PREFIX: &str = "mdi:";

/// Where a key's icon comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IconRef {
    /// Image file
    Image(PathBuf),
    /// Glyph mapping key (e.g. `mdi:lightbulb`)
    Glyph(String),
}

/// Fully resolved appearance of one key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyStyle {
    pub icon: IconRef,
    pub color: ColorSpec,
    pub label: Option<String>,
}

/// Whether a redraw may query remote state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Query each button
    Live,
    /// Use last known states only
    CachedOnly,
}

/// Configured icons and colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTheme {
    pub assets: PathBuf,
    pub image_on: String,
    pub image_off: String,
    pub image_blank: String,
    pub color_on: ColorSpec,
    pub color_off: ColorSpec,
    pub color_blank: ColorSpec,
}

impl IconTheme {
    fn asset(&self, name: &str) -> IconRef {
        IconRef::Image(self.assets.join(name))
    }
}

impl From<&IconConfig> for IconTheme {
    fn from(config: &IconConfig) -> Self {
        Self {
            assets: PathBuf::from(&config.assets),
            image_on: config.image.on.clone(),
            image_off: config.image.off.clone(),
            image_blank: config.image.blank.clone(),
            color_on: config.color.on,
            color_off: config.color.off,
            color_blank: config.color.blank,
        }
    }
}

/// Maps button and power state to a [`KeyStyle`]
#[derive(Debug, Clone)]
pub struct StyleResolver {
    theme: IconTheme,
    glyph_keys: HashSet<String>,
}

impl StyleResolver {
    /// Create a resolver
    ///
    /// `glyph_keys` are the glyph names that can be rendered; pass an empty
    /// set when no glyph font is loaded.
    pub fn new(theme: IconTheme, glyph_keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            theme,
            glyph_keys: glyph_keys.into_iter().collect(),
        }
    }

    pub fn theme(&self) -> &IconTheme {
        &self.theme
    }

    /// Style drawn on every key while blanked on a quirky device
    pub fn forced_blank_style(&self) -> KeyStyle {
        KeyStyle {
            icon: self.theme.asset(&self.theme.image_blank),
            color: ColorSpec::BLACK,
            label: None,
        }
    }

    /// Resolve the style of virtual key `key`
    pub fn resolve(
        &self,
        key: usize,
        button: Option<&mut Button>,
        power: &mut PowerState,
        fetch: Fetch,
    ) -> KeyStyle {
        if power.forced_blank() {
            if let Some(button) = button.filter(|b| !b.is_placeholder()) {
                if fetch == Fetch::Live {
                    power.remember(key, button.state());
                }
            }
            return self.forced_blank_style();
        }

        match button {
            Some(button) if !button.is_placeholder() => {
                self.switch_style(key, button, power, fetch)
            }
            other => self.placeholder_style(other.and_then(|b| b.icon())),
        }
    }

    fn placeholder_style(&self, hint: Option<&str>) -> KeyStyle {
        let icon = match hint {
            Some(hint) if self.glyph_keys.contains(hint) => IconRef::Glyph(hint.to_string()),
            Some(hint) if has_prefix(hint, IMAGE_PREFIX) => {
                self.theme.asset(&hint[IMAGE_PREFIX.len()..])
            }
            _ => self.theme.asset(&self.theme.image_blank),
        };

        KeyStyle {
            icon,
            color: self.theme.color_blank,
            label: None,
        }
    }

    fn switch_style(
        &self,
        key: usize,
        button: &mut Button,
        power: &mut PowerState,
        fetch: Fetch,
    ) -> KeyStyle {
        let state = match fetch {
            Fetch::Live => {
                let state = button.state();
                power.remember(key, state);
                state
            }
            Fetch::CachedOnly => power.last_known(key),
        };
        let on = state.unwrap_or(false);

        let icon = match button.icon() {
            Some(hint) if self.glyph_keys.contains(hint) => IconRef::Glyph(hint.to_string()),
            _ if on => self.theme.asset(&self.theme.image_on),
            _ => self.theme.asset(&self.theme.image_off),
        };

        KeyStyle {
            icon,
            color: if on {
                self.theme.color_on
            } else {
                self.theme.color_off
            },
            label: Some(button.label().to_string()),
        }
    }
}

/// Case-insensitive ASCII prefix test
pub fn has_prefix(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::{RemoteError, RemoteState, RemoteSwitch, SwitchSource};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Switch whose state can be flipped from the test
    struct Toggle {
        on: AtomicBool,
        reachable: AtomicBool,
        fetches: AtomicUsize,
    }

    impl Toggle {
        fn new(on: bool) -> Arc<Self> {
            Arc::new(Self {
                on: AtomicBool::new(on),
                reachable: AtomicBool::new(true),
                fetches: AtomicUsize::new(0),
            })
        }
    }

    impl SwitchSource for Toggle {
        fn fetch(&self, _entity: &str) -> Result<RemoteState, RemoteError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if !self.reachable.load(Ordering::SeqCst) {
                return Err(RemoteError::Unreachable("timed out".into()));
            }
            Ok(RemoteState {
                on: self.on.load(Ordering::SeqCst),
                label: Some("Lamp".into()),
                icon: None,
            })
        }

        fn push(&self, _entity: &str, on: bool) -> Result<(), RemoteError> {
            self.on.store(on, Ordering::SeqCst);
            Ok(())
        }
    }

    fn theme() -> IconTheme {
        IconTheme {
            assets: PathBuf::from("Assets"),
            image_on: "On.png".into(),
            image_off: "Off.png".into(),
            image_blank: "Blank.png".into(),
            color_on: ColorSpec::rgb(0xFF, 0xFF, 0xFF),
            color_off: ColorSpec::rgb(0x77, 0x77, 0x77),
            color_blank: ColorSpec::rgb(0x55, 0x55, 0x55),
        }
    }

    fn resolver() -> StyleResolver {
        StyleResolver::new(theme(), ["mdi:home".to_string()])
    }

    fn image(name: &str) -> IconRef {
        IconRef::Image(Path::new("Assets").join(name))
    }

    #[test]
    fn test_missing_key_is_blank() {
        let mut power = PowerState::new(60, false, Instant::now());
        let style = resolver().resolve(7, None, &mut power, Fetch::Live);

        assert_eq!(style.icon, image("Blank.png"));
        assert_eq!(style.color, ColorSpec::rgb(0x55, 0x55, 0x55));
        assert_eq!(style.label, None);
    }

    #[test]
    fn test_decorations_keep_their_icon() {
        let mut power = PowerState::new(60, false, Instant::now());
        let resolver = resolver();

        let mut glyph = Button::decoration("mdi:home");
        let style = resolver.resolve(0, Some(&mut glyph), &mut power, Fetch::Live);
        assert_eq!(style.icon, IconRef::Glyph("mdi:home".into()));
        assert_eq!(style.color, ColorSpec::rgb(0x55, 0x55, 0x55));

        let mut logo = Button::decoration("IMAGE:logo.png");
        let style = resolver.resolve(1, Some(&mut logo), &mut power, Fetch::Live);
        assert_eq!(style.icon, image("logo.png"));

        // Unknown glyph falls back to the blank icon
        let mut unknown = Button::decoration("mdi:nope");
        let style = resolver.resolve(2, Some(&mut unknown), &mut power, Fetch::Live);
        assert_eq!(style.icon, image("Blank.png"));
    }

    #[test]
    fn test_switch_style_follows_state() {
        let mut power = PowerState::new(60, false, Instant::now());
        let source = Toggle::new(true);
        let mut button = Button::Remote(RemoteSwitch::new("switch.lamp", source.clone()));

        let style = resolver().resolve(0, Some(&mut button), &mut power, Fetch::Live);
        assert_eq!(style.icon, image("On.png"));
        assert_eq!(style.color, ColorSpec::rgb(0xFF, 0xFF, 0xFF));
        assert_eq!(style.label.as_deref(), Some("Lamp"));
        assert_eq!(power.last_known(0), Some(true));

        source.on.store(false, Ordering::SeqCst);
        let style = resolver().resolve(0, Some(&mut button), &mut power, Fetch::Live);
        assert_eq!(style.icon, image("Off.png"));
        assert_eq!(style.color, ColorSpec::rgb(0x77, 0x77, 0x77));
    }

    #[test]
    fn test_unknown_state_draws_off_but_keeps_cache() {
        let mut power = PowerState::new(60, false, Instant::now());
        let source = Toggle::new(true);
        let mut button = Button::Remote(RemoteSwitch::new("switch.lamp", source.clone()));
        resolver().resolve(0, Some(&mut button), &mut power, Fetch::Live);

        source.reachable.store(false, Ordering::SeqCst);
        let style = resolver().resolve(0, Some(&mut button), &mut power, Fetch::Live);
        assert_eq!(style.icon, image("Off.png"));
        assert_eq!(power.last_known(0), Some(true));
    }

    #[test]
    fn test_forced_blank_samples_state() {
        let start = Instant::now();
        let mut power = PowerState::new(5, true, start);
        let source = Toggle::new(false);
        let mut button = Button::Remote(RemoteSwitch::new("switch.lamp", source.clone()));
        let resolver = resolver();

        power.on_refresh(start + Duration::from_secs(6));
        source.on.store(true, Ordering::SeqCst);

        let style = resolver.resolve(0, Some(&mut button), &mut power, Fetch::Live);
        assert_eq!(style, resolver.forced_blank_style());
        assert_eq!(style.color, ColorSpec::BLACK);
        assert_eq!(power.last_known(0), Some(true));

        // Decorations are blacked out too
        let mut logo = Button::decoration("image:logo.png");
        let style = resolver.resolve(1, Some(&mut logo), &mut power, Fetch::Live);
        assert_eq!(style, resolver.forced_blank_style());
    }

    #[test]
    fn test_cached_redraw_does_not_fetch() {
        let start = Instant::now();
        let mut power = PowerState::new(5, true, start);
        let source = Toggle::new(true);
        let mut button = Button::Remote(RemoteSwitch::new("switch.lamp", source.clone()));
        let resolver = resolver();

        resolver.resolve(0, Some(&mut button), &mut power, Fetch::Live);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let style = resolver.resolve(0, Some(&mut button), &mut power, Fetch::CachedOnly);
        assert_eq!(style.icon, image("On.png"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert!(has_prefix("MDI:home", GLYPH_PREFIX));
        assert!(has_prefix("image:x.png", IMAGE_PREFIX));
        assert!(!has_prefix("img", IMAGE_PREFIX));
        assert!(!has_prefix("äimage:", IMAGE_PREFIX));
    }
}
