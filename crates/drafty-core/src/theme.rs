//! Theme engine
//!
//! Maps a theme name, a light/dark mode and an optional accent override to
//! a concrete set of display colors. Light mode is derived from the dark
//! palettes: backgrounds are lightened, body text is forced to dark grays,
//! and the accent is darkened when it would be too pale to read on a light
//! background.
//!
//! The resolved colors are published as CSS custom properties through a
//! [`StyleSink`].

use serde::{Deserialize, Serialize};

use crate::color::{darken, lighten, relative_luminance, tint_towards};

/// Theme used when a name is unknown or no preference is stored
pub const DEFAULT_THEME: &str = MOCHA.key;

/// Channel multiplier used to derive light backgrounds
const LIGHT_MODE_FACTOR: f64 = 1.35;
/// Accents at or below this luminance are left untouched in light mode
const READABLE_LUMINANCE: f64 = 0.62;
/// Accents above this luminance get the strong darkening pass
const VERY_LIGHT_LUMINANCE: f64 = 0.78;
const DARKEN_LIGHT: f64 = 0.28;
const DARKEN_VERY_LIGHT: f64 = 0.42;
const ACCENT_HOVER_DARKEN: f64 = 0.12;
const ACCENT_LIGHT_TINT: f64 = 0.86;

const LIGHT_TEXT: &str = "#111111";
const LIGHT_SUBTEXT: &str = "#444444";

/// Light or dark display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, ThemeMode::Light)
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            _ => Err(format!("Unknown theme mode: '{}' (expected dark or light)", s)),
        }
    }
}

/// Base colors of a named theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub base: &'static str,
    pub surface: &'static str,
    pub overlay: &'static str,
    pub text: &'static str,
    pub subtext: &'static str,
    pub accent: &'static str,
    pub accent_hover: &'static str,
    pub accent_light: &'static str,
}

/// Typography shared by every theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    pub family: &'static str,
    pub size: &'static str,
    pub line_height: &'static str,
}

const DEFAULT_FONT: FontSpec = FontSpec {
    family: crate::color::DEFAULT_FONT_FAMILY,
    size: "16px",
    line_height: "1.6",
};

/// A named theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Lookup key (`mocha`, `latte`, ...)
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    pub colors: Palette,
    pub font: FontSpec,
}

/// The default theme
const MOCHA: Theme = Theme {
    key: "mocha",
    name: "Mocha",
    colors: Palette {
        base: "#1e1e2e",
        surface: "#313244",
        overlay: "#45475a",
        text: "#cdd6f4",
        subtext: "#a6adc8",
        accent: "#cba6f7",
        accent_hover: "#b794e6",
        accent_light: "#3e3650",
    },
    font: DEFAULT_FONT,
};

/// Catppuccin-based palettes
pub static THEMES: [Theme; 6] = [
    Theme {
        key: "latte",
        name: "Latte",
        colors: Palette {
            base: "#eff1f5",
            surface: "#e6e9ef",
            overlay: "#ccd0da",
            text: "#4c4f69",
            subtext: "#6c6f85",
            accent: "#8839ef",
            accent_hover: "#7c3aed",
            accent_light: "#e6d9f5",
        },
        font: DEFAULT_FONT,
    },
    Theme {
        key: "frappe",
        name: "Frappé",
        colors: Palette {
            base: "#303446",
            surface: "#414559",
            overlay: "#51576d",
            text: "#c6d0f5",
            subtext: "#a5adce",
            accent: "#ca9ee6",
            accent_hover: "#b584d9",
            accent_light: "#4a4059",
        },
        font: DEFAULT_FONT,
    },
    Theme {
        key: "macchiato",
        name: "Macchiato",
        colors: Palette {
            base: "#24273a",
            surface: "#363a4f",
            overlay: "#494d64",
            text: "#cad3f5",
            subtext: "#a5adcb",
            accent: "#c6a0f6",
            accent_hover: "#b38de6",
            accent_light: "#463854",
        },
        font: DEFAULT_FONT,
    },
    MOCHA,
    Theme {
        key: "rosewater",
        name: "Rosewater",
        colors: Palette {
            base: "#1e1e2e",
            surface: "#313244",
            overlay: "#45475a",
            text: "#cdd6f4",
            subtext: "#a6adc8",
            accent: "#f5e0dc",
            accent_hover: "#e6cfca",
            accent_light: "#4a3f3d",
        },
        font: DEFAULT_FONT,
    },
    Theme {
        key: "teal",
        name: "Teal",
        colors: Palette {
            base: "#1e1e2e",
            surface: "#313244",
            overlay: "#45475a",
            text: "#cdd6f4",
            subtext: "#a6adc8",
            accent: "#94e2d5",
            accent_hover: "#80d5c4",
            accent_light: "#2d4a45",
        },
        font: DEFAULT_FONT,
    },
];

/// Keys of all known themes, in display order
pub fn theme_names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|t| t.key)
}

/// Look up a theme by key
pub fn find_theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.key == name)
}

static FALLBACK_THEME: Theme = MOCHA;

/// Look up a theme by key, falling back to the default theme
pub fn get_theme(name: &str) -> &'static Theme {
    find_theme(name).unwrap_or(&FALLBACK_THEME)
}

/// Receives resolved theme values (the page's styling variables)
pub trait StyleSink {
    /// Set a document attribute such as `data-theme-mode`
    fn set_attribute(&mut self, name: &str, value: &str);
    /// Set a CSS custom property such as `--bg-primary`
    fn set_property(&mut self, name: &str, value: &str);
}

/// Collects published values in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssVariables {
    pub attributes: Vec<(String, String)>,
    pub properties: Vec<(String, String)>,
}

impl CssVariables {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .chain(self.attributes.iter())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl StyleSink for CssVariables {
    fn set_attribute(&mut self, name: &str, value: &str) {
        upsert(&mut self.attributes, name, value);
    }

    fn set_property(&mut self, name: &str, value: &str) {
        upsert(&mut self.properties, name, value);
    }
}

fn upsert(entries: &mut Vec<(String, String)>, name: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((name.to_string(), value.to_string())),
    }
}

/// Concrete colors for one theme/mode/accent combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTheme {
    pub theme: String,
    pub mode: ThemeMode,
    pub bg_primary: String,
    pub bg_secondary: String,
    pub bg_hover: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub accent: String,
    pub accent_hover: String,
    pub accent_light: String,
    pub font_family: String,
    pub font_size: String,
    pub line_height: String,
}

impl ResolvedTheme {
    /// CSS custom properties, in publication order
    pub fn css_variables(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("--bg-primary", self.bg_primary.as_str()),
            ("--bg-secondary", self.bg_secondary.as_str()),
            ("--bg-hover", self.bg_hover.as_str()),
            ("--text-primary", self.text_primary.as_str()),
            ("--text-secondary", self.text_secondary.as_str()),
            ("--text-tertiary", self.text_secondary.as_str()),
            ("--border-color", self.bg_hover.as_str()),
            ("--accent-color", self.accent.as_str()),
            ("--accent-hover", self.accent_hover.as_str()),
            ("--accent-light", self.accent_light.as_str()),
            ("--font-family", self.font_family.as_str()),
            ("--font-size", self.font_size.as_str()),
            ("--line-height", self.line_height.as_str()),
        ]
    }

    /// Push the mode attribute and every CSS property into `sink`
    pub fn publish(&self, sink: &mut impl StyleSink) {
        sink.set_attribute("data-theme-mode", self.mode.as_str());
        for (name, value) in self.css_variables() {
            sink.set_property(name, value);
        }
    }

    /// Render as a `:root` CSS block
    pub fn to_css(&self) -> String {
        let mut css = format!(":root[data-theme-mode=\"{}\"] {{\n", self.mode);
        for (name, value) in self.css_variables() {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push_str("}\n");
        css
    }
}

/// Derive the display colors for a theme
///
/// Unknown theme names fall back to [`DEFAULT_THEME`]. An empty accent
/// override is treated as no override.
pub fn resolve_theme(name: &str, mode: ThemeMode, accent_override: Option<&str>) -> ResolvedTheme {
    let theme = get_theme(name);
    let colors = &theme.colors;
    let is_light = mode.is_light();

    let accent_raw = accent_override
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(colors.accent);

    let (bg_primary, bg_secondary, bg_hover, text_primary, text_secondary) = if is_light {
        (
            lighten(colors.base, LIGHT_MODE_FACTOR).unwrap_or_else(|| "#ffffff".to_string()),
            lighten(colors.surface, LIGHT_MODE_FACTOR).unwrap_or_else(|| "#ffffff".to_string()),
            lighten(colors.overlay, LIGHT_MODE_FACTOR).unwrap_or_else(|| "#f6f6f6".to_string()),
            LIGHT_TEXT.to_string(),
            LIGHT_SUBTEXT.to_string(),
        )
    } else {
        (
            colors.base.to_string(),
            colors.surface.to_string(),
            colors.overlay.to_string(),
            colors.text.to_string(),
            colors.subtext.to_string(),
        )
    };

    let (accent, accent_hover, accent_light) = if is_light {
        let accent = ensure_readable_accent_on_light(accent_raw);
        let hover = darken(&accent, ACCENT_HOVER_DARKEN);
        let light = tint_towards(&accent, "#ffffff", ACCENT_LIGHT_TINT);
        (accent, hover, light)
    } else {
        (
            accent_raw.to_string(),
            colors.accent_hover.to_string(),
            colors.accent_light.to_string(),
        )
    };

    ResolvedTheme {
        theme: theme.key.to_string(),
        mode,
        bg_primary,
        bg_secondary,
        bg_hover,
        text_primary,
        text_secondary,
        accent,
        accent_hover,
        accent_light,
        font_family: theme.font.family.to_string(),
        font_size: theme.font.size.to_string(),
        line_height: theme.font.line_height.to_string(),
    }
}

/// Resolve a theme and publish it to `sink`
pub fn apply_theme(
    sink: &mut impl StyleSink,
    name: &str,
    mode: ThemeMode,
    accent_override: Option<&str>,
) -> ResolvedTheme {
    let resolved = resolve_theme(name, mode, accent_override);
    resolved.publish(sink);
    resolved
}

/// Darken pale accents so they stay visible on light backgrounds
///
/// Colors with relative luminance at or below 0.62 are returned unchanged.
/// Brighter colors are darkened by 28%, or by 42% above 0.78. Malformed
/// input is returned unchanged.
pub fn ensure_readable_accent_on_light(hex: &str) -> String {
    let Some(luminance) = relative_luminance(hex) else {
        return hex.to_string();
    };
    if luminance <= READABLE_LUMINANCE {
        return hex.to_string();
    }
    let strength = if luminance > VERY_LIGHT_LUMINANCE {
        DARKEN_VERY_LIGHT
    } else {
        DARKEN_LIGHT
    };
    darken(hex, strength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_unknown_theme_falls_back_to_mocha() {
        assert_eq!(get_theme("does-not-exist").key, "mocha");
        let resolved = resolve_theme("nope", ThemeMode::Dark, None);
        assert_eq!(resolved.theme, "mocha");
        assert_eq!(resolved.bg_primary, "#1e1e2e");
    }

    #[test]
    fn test_default_theme_is_listed() {
        let listed = find_theme(DEFAULT_THEME).unwrap();
        assert_eq!(listed, get_theme("does-not-exist"));
        assert_eq!(listed.colors.base, "#1e1e2e");
    }

    #[test]
    fn test_theme_names() {
        let names: Vec<_> = theme_names().collect();
        assert_eq!(
            names,
            vec!["latte", "frappe", "macchiato", "mocha", "rosewater", "teal"]
        );
    }

    #[test]
    fn test_dark_mode_passes_palette_through() {
        let resolved = resolve_theme("teal", ThemeMode::Dark, None);
        assert_eq!(resolved.bg_primary, "#1e1e2e");
        assert_eq!(resolved.text_primary, "#cdd6f4");
        assert_eq!(resolved.accent, "#94e2d5");
        assert_eq!(resolved.accent_hover, "#80d5c4");
        assert_eq!(resolved.accent_light, "#2d4a45");
    }

    #[test]
    fn test_dark_mode_accent_override() {
        let resolved = resolve_theme("mocha", ThemeMode::Dark, Some("#ff0000"));
        assert_eq!(resolved.accent, "#ff0000");
        // Hover and light variants stay on the theme's values in dark mode
        assert_eq!(resolved.accent_hover, "#b794e6");

        let empty = resolve_theme("mocha", ThemeMode::Dark, Some(""));
        assert_eq!(empty.accent, "#cba6f7");
    }

    #[test]
    fn test_light_mode_derivation() {
        let resolved = resolve_theme("mocha", ThemeMode::Light, None);
        assert_eq!(resolved.bg_primary, "#28283e");
        assert_eq!(resolved.text_primary, LIGHT_TEXT);
        assert_eq!(resolved.text_secondary, LIGHT_SUBTEXT);
        assert_eq!(
            resolved.accent,
            ensure_readable_accent_on_light("#cba6f7")
        );
        assert_eq!(resolved.accent_hover, darken(&resolved.accent, 0.12));
        assert_eq!(
            resolved.accent_light,
            tint_towards(&resolved.accent, "#ffffff", 0.86)
        );
    }

    #[test]
    fn test_readable_accent_white_is_darkened() {
        let out = ensure_readable_accent_on_light("#ffffff");
        assert_ne!(out, "#ffffff");
        assert!(relative_luminance(&out).unwrap() <= READABLE_LUMINANCE);
    }

    #[test]
    fn test_readable_accent_dark_unchanged() {
        assert_eq!(ensure_readable_accent_on_light("#8839ef"), "#8839ef");
        assert_eq!(ensure_readable_accent_on_light("#000000"), "#000000");
    }

    #[test]
    fn test_readable_accent_malformed_unchanged() {
        assert_eq!(ensure_readable_accent_on_light("#fff"), "#fff");
        assert_eq!(ensure_readable_accent_on_light("purple"), "purple");
    }

    #[test]
    fn test_readable_accent_idempotent() {
        for v in (0..=255u8).step_by(5) {
            let hex = Rgb::new(v, v, v).to_hex();
            let once = ensure_readable_accent_on_light(&hex);
            let twice = ensure_readable_accent_on_light(&once);
            assert_eq!(once, twice, "not idempotent for {}", hex);
        }
        for hex in ["#f5e0dc", "#94e2d5", "#f9e2af", "#a6e3a1", "#ffff00"] {
            let once = ensure_readable_accent_on_light(hex);
            assert_eq!(ensure_readable_accent_on_light(&once), once);
        }
    }

    #[test]
    fn test_publish_to_sink() {
        let mut sink = CssVariables::default();
        let resolved = apply_theme(&mut sink, "latte", ThemeMode::Dark, None);

        assert_eq!(sink.get("data-theme-mode"), Some("dark"));
        assert_eq!(sink.get("--bg-primary"), Some("#eff1f5"));
        assert_eq!(sink.get("--border-color"), Some(resolved.bg_hover.as_str()));
        assert_eq!(sink.get("--font-size"), Some("16px"));
        assert_eq!(sink.properties.len(), 13);

        // Re-publishing overwrites instead of duplicating
        apply_theme(&mut sink, "latte", ThemeMode::Light, None);
        assert_eq!(sink.get("data-theme-mode"), Some("light"));
        assert_eq!(sink.properties.len(), 13);
    }

    #[test]
    fn test_to_css() {
        let css = resolve_theme("mocha", ThemeMode::Dark, None).to_css();
        assert!(css.starts_with(":root[data-theme-mode=\"dark\"] {"));
        assert!(css.contains("  --accent-color: #cba6f7;\n"));
        assert!(css.trim_end().ends_with('}'));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("light".parse::<ThemeMode>().unwrap(), ThemeMode::Light);
        assert_eq!(" Dark ".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!("sepia".parse::<ThemeMode>().is_err());
    }
}
