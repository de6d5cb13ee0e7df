//! Global display preferences
//!
//! Preferences are not scoped to a user. Each one is stored as a raw
//! string under its own `drafty-{name}` key; a missing key means the
//! default applies.

use serde::Serialize;
use thiserror::Error;

use crate::color::{DEFAULT_FONT_FAMILY, Rgb};
use crate::storage::{KeyValueStore, StorageError, StorageKey, StorageResult};
use crate::theme::{find_theme, resolve_theme, theme_names, ResolvedTheme, ThemeMode, DEFAULT_THEME};

pub const DEFAULT_TEXT_COLOR: &str = "#cdd6f4";
pub const DEFAULT_FONT_SIZE: &str = "16";

/// Names of the preference keys, as accepted by [`Preferences::set`]
pub const PREFERENCE_NAMES: [&str; 7] = [
    "theme",
    "theme-mode",
    "accent",
    "text-color",
    "font-size",
    "font-family",
    "demo-mode",
];

/// Errors raised when changing a preference
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("Unknown preference '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Display preferences shared by every user on this device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: String,
    pub theme_mode: ThemeMode,
    /// Accent override; `None` uses the theme's accent
    pub accent: Option<String>,
    pub text_color: String,
    pub font_size: String,
    pub font_family: String,
    pub demo_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            theme_mode: ThemeMode::Dark,
            accent: None,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            demo_mode: false,
        }
    }
}

impl Preferences {
    /// Read every preference, substituting defaults for missing or empty keys
    pub fn load(store: &impl KeyValueStore) -> StorageResult<Self> {
        let defaults = Self::default();
        let read = |name: &str| -> StorageResult<Option<String>> {
            Ok(store
                .get(&StorageKey::global(name))?
                .filter(|v| !v.is_empty()))
        };

        Ok(Self {
            theme: read("theme")?.unwrap_or(defaults.theme),
            // An unrecognized stored mode is treated like a missing one
            theme_mode: read("theme-mode")?
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
            accent: read("accent")?,
            text_color: read("text-color")?.unwrap_or(defaults.text_color),
            font_size: read("font-size")?.unwrap_or(defaults.font_size),
            font_family: read("font-family")?.unwrap_or(defaults.font_family),
            demo_mode: read("demo-mode")?.is_some_and(|v| v == "true"),
        })
    }

    /// Write every preference back to its key
    pub fn save(&self, store: &mut impl KeyValueStore) -> StorageResult<()> {
        store.set(&StorageKey::global("theme"), &self.theme)?;
        store.set(&StorageKey::global("theme-mode"), self.theme_mode.as_str())?;
        match &self.accent {
            Some(accent) => store.set(&StorageKey::global("accent"), accent)?,
            None => store.remove(&StorageKey::global("accent"))?,
        }
        store.set(&StorageKey::global("text-color"), &self.text_color)?;
        store.set(&StorageKey::global("font-size"), &self.font_size)?;
        store.set(&StorageKey::global("font-family"), &self.font_family)?;
        if self.demo_mode {
            store.set(&StorageKey::global("demo-mode"), "true")?;
        } else {
            store.remove(&StorageKey::global("demo-mode"))?;
        }
        Ok(())
    }

    /// Change one preference by name, validating the value
    ///
    /// An empty accent clears the override.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), PreferenceError> {
        let invalid = |message: String| PreferenceError::InvalidValue {
            key: name.to_string(),
            message,
        };
        let value = value.trim();

        match name {
            "theme" => {
                let theme = find_theme(&value.to_lowercase()).ok_or_else(|| {
                    invalid(format!(
                        "unknown theme '{}' (available: {})",
                        value,
                        theme_names().collect::<Vec<_>>().join(", ")
                    ))
                })?;
                self.theme = theme.key.to_string();
            }
            "theme-mode" => self.theme_mode = value.parse().map_err(invalid)?,
            "accent" => {
                self.accent = if value.is_empty() {
                    None
                } else {
                    Some(normalize_hex(value).ok_or_else(|| invalid(hex_message(value)))?)
                };
            }
            "text-color" => {
                self.text_color = normalize_hex(value).ok_or_else(|| invalid(hex_message(value)))?;
            }
            "font-size" => {
                let size: u32 = value
                    .parse()
                    .map_err(|_| invalid(format!("'{}' is not a whole number of pixels", value)))?;
                if size == 0 {
                    return Err(invalid("font size must be positive".to_string()));
                }
                self.font_size = size.to_string();
            }
            "font-family" => {
                if value.is_empty() {
                    return Err(invalid("font family cannot be empty".to_string()));
                }
                self.font_family = value.to_string();
            }
            "demo-mode" => {
                self.demo_mode = match value {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" => false,
                    _ => return Err(invalid(format!("'{}' is not true or false", value))),
                };
            }
            _ => return Err(PreferenceError::UnknownKey(name.to_string())),
        }
        Ok(())
    }

    /// Name/value pairs for display; an unset accent shows as empty
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.clone()),
            ("theme-mode", self.theme_mode.to_string()),
            ("accent", self.accent.clone().unwrap_or_default()),
            ("text-color", self.text_color.clone()),
            ("font-size", self.font_size.clone()),
            ("font-family", self.font_family.clone()),
            ("demo-mode", self.demo_mode.to_string()),
        ]
    }

    /// Resolve the stored theme, mode and accent into display colors
    pub fn resolved_theme(&self) -> ResolvedTheme {
        resolve_theme(&self.theme, self.theme_mode, self.accent.as_deref())
    }
}

fn normalize_hex(value: &str) -> Option<String> {
    Rgb::from_hex(value).map(Rgb::to_hex)
}

fn hex_message(value: &str) -> String {
    format!("'{}' is not a #rrggbb color", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_on_empty_store() {
        let store = MemoryStore::new();
        let prefs = Preferences::load(&store).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.theme, "mocha");
        assert_eq!(prefs.theme_mode, ThemeMode::Dark);
        assert_eq!(prefs.text_color, "#cdd6f4");
        assert_eq!(prefs.font_size, "16");
    }

    #[test]
    fn test_reads_raw_strings() {
        let mut store = MemoryStore::new();
        store.set(&StorageKey::global("theme"), "latte").unwrap();
        store.set(&StorageKey::global("theme-mode"), "light").unwrap();
        store.set(&StorageKey::global("accent"), "#ff8800").unwrap();
        store.set(&StorageKey::global("demo-mode"), "true").unwrap();
        store.set(&StorageKey::global("font-size"), "").unwrap();

        let prefs = Preferences::load(&store).unwrap();
        assert_eq!(prefs.theme, "latte");
        assert_eq!(prefs.theme_mode, ThemeMode::Light);
        assert_eq!(prefs.accent.as_deref(), Some("#ff8800"));
        assert!(prefs.demo_mode);
        // Empty falls back to default
        assert_eq!(prefs.font_size, "16");
    }

    #[test]
    fn test_save_round_trip() {
        let mut store = MemoryStore::new();
        let mut prefs = Preferences::default();
        prefs.set("theme", "Teal").unwrap();
        prefs.set("theme-mode", "light").unwrap();
        prefs.set("accent", "FF0000").unwrap();
        prefs.set("font-size", "18").unwrap();
        prefs.save(&mut store).unwrap();

        assert_eq!(
            store.get(&StorageKey::global("theme-mode")).unwrap().as_deref(),
            Some("light")
        );
        let loaded = Preferences::load(&store).unwrap();
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.theme, "teal");
        assert_eq!(loaded.accent.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_clearing_accent_removes_key() {
        let mut store = MemoryStore::new();
        let mut prefs = Preferences::default();
        prefs.set("accent", "#00ff00").unwrap();
        prefs.save(&mut store).unwrap();

        prefs.set("accent", "").unwrap();
        prefs.save(&mut store).unwrap();
        assert!(!store.contains(&StorageKey::global("accent")).unwrap());
        assert!(!store.contains(&StorageKey::global("demo-mode")).unwrap());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut prefs = Preferences::default();
        assert!(matches!(
            prefs.set("theme", "solarized"),
            Err(PreferenceError::InvalidValue { .. })
        ));
        assert!(prefs.set("theme-mode", "dim").is_err());
        assert!(prefs.set("accent", "#12345").is_err());
        assert!(prefs.set("font-size", "big").is_err());
        assert!(prefs.set("font-size", "0").is_err());
        assert!(matches!(
            prefs.set("wallpaper", "x"),
            Err(PreferenceError::UnknownKey(_))
        ));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_resolved_theme_uses_accent() {
        let mut prefs = Preferences::default();
        prefs.set("accent", "#123456").unwrap();
        let resolved = prefs.resolved_theme();
        assert_eq!(resolved.theme, "mocha");
        assert_eq!(resolved.accent, "#123456");
    }

    #[test]
    fn test_entries_cover_all_names() {
        let prefs = Preferences::default();
        let names: Vec<&str> = prefs.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, PREFERENCE_NAMES.to_vec());
    }
}
