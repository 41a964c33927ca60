//! Glyph mapping loader
//!
//! Reads icon stylesheets of the form
//!
//! ```css
//! .mdi-lightbulb::before {
//!   content: "\F0335";
//! }
//! ```
//!
//! into `mdi:lightbulb -> "\u{F0335}"`. Rules that do not match this shape
//! exactly are skipped. Code points the glyph font lacks are dropped when
//! the compositor is built.

use core::fmt;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};

const CLASS_PREFIX: &str = "mdi-";
const KEY_PREFIX: &str = "mdi:";

/// Glyph mapping load errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphMapError {
    /// Stylesheet could not be read
    Io { path: String, message: String },
}

impl fmt::Display for GlyphMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphMapError::Io { path, message } => {
                write!(f, "cannot read glyph stylesheet {path}: {message}")
            }
        }
    }
}

impl std::error::Error for GlyphMapError {}

/// Glyph key to glyph string lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMap {
    entries: HashMap<String, String>,
}

impl GlyphMap {
    /// Load and parse a stylesheet
    pub fn load(path: &Path) -> Result<Self, GlyphMapError> {
        let css = fs::read_to_string(path).map_err(|e| GlyphMapError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let map = Self::parse(&css);
        info!("Loaded {} glyphs from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parse stylesheet text
    pub fn parse(css: &str) -> Self {
        let css = strip_comments(css);
        let mut entries = HashMap::new();

        for rule in css.split('}') {
            let Some((selector, body)) = rule.split_once('{') else {
                continue;
            };
            let Some(name) = class_name(selector) else {
                continue;
            };
            match content_value(body) {
                Some(glyph) => {
                    entries.insert(format!("{KEY_PREFIX}{name}"), glyph);
                }
                None => debug!("Skipping glyph rule for {}", name),
            }
        }

        Self { entries }
    }

    /// Glyph string for `key` (e.g. `mdi:home`)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Glyph keys with their glyph strings
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, text)| (key.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

/// Lower-cased name from a `.mdi-NAME...` selector
fn class_name(selector: &str) -> Option<String> {
    let ident = selector.trim().strip_prefix('.')?;
    let end = ident
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(ident.len());
    let ident = ident[..end].to_lowercase();
    let name = ident.strip_prefix(CLASS_PREFIX)?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Decoded string from a body consisting of exactly `content: "...";`
fn content_value(body: &str) -> Option<String> {
    let rest = body.trim().strip_prefix("content")?;
    let rest = rest.trim_start().strip_prefix(':')?;
    let (value, rest) = quoted(rest.trim_start())?;
    (rest.trim() == ";").then_some(value)
}

/// Parse a quoted CSS string, returning it and the remaining input
fn quoted(input: &str) -> Option<(String, &str)> {
    let mut chars = input.char_indices();
    let (_, quote) = chars.next().filter(|(_, c)| *c == '"' || *c == '\'')?;
    let mut value = String::new();

    while let Some((index, c)) = chars.next() {
        match c {
            c if c == quote => return Some((value, &input[index + c.len_utf8()..])),
            '\\' => {
                let escaped: String = chars
                    .clone()
                    .map(|(_, c)| c)
                    .take_while(char::is_ascii_hexdigit)
                    .take(6)
                    .collect();

                if escaped.is_empty() {
                    let (_, literal) = chars.next()?;
                    value.push(literal);
                    continue;
                }

                for _ in 0..escaped.len() {
                    chars.next();
                }
                let code = u32::from_str_radix(&escaped, 16).ok()?;
                value.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));

                // A single whitespace terminates the escape
                if chars.clone().next().is_some_and(|(_, c)| c.is_whitespace()) {
                    chars.next();
                }
            }
            c => value.push(c),
        }
    }

    None
}
