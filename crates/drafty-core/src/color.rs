//! Color utilities
//!
//! Conversions between `#rrggbb` strings and RGB triples, plus the small
//! amount of color math the theme engine needs (luminance, darkening,
//! lightening, tinting).
//!
//! Functions that take a hex string fail soft: malformed input (wrong
//! length, non-hex characters) is returned unchanged.

/// System font stack used when no font preference is stored
pub const DEFAULT_FONT_FAMILY: &str =
    "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif";

/// Text color swatches offered by the notebook editor
pub const COLOR_PRESETS: [&str; 7] = [
    "#cdd6f4", "#f38ba8", "#fab387", "#f9e2af", "#a6e3a1", "#89b4fa", "#cba6f7",
];

/// An 8-bit-per-channel RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from floating point channels, rounding and clamping
    /// each one into `0..=255`
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        Self::new(clamp_byte(r), clamp_byte(g), clamp_byte(b))
    }

    /// Parse `#rrggbb` (the leading `#` and surrounding whitespace are
    /// optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let h = hex.trim();
        let h = h.strip_prefix('#').unwrap_or(h);
        if h.len() != 6 || !h.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&h[0..2], 16).ok()?;
        let g = u8::from_str_radix(&h[2..4], 16).ok()?;
        let b = u8::from_str_radix(&h[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    /// Format as lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// WCAG relative luminance in `[0, 1]`
    pub fn relative_luminance(self) -> f64 {
        let r = srgb_to_linear(f64::from(self.r) / 255.0);
        let g = srgb_to_linear(f64::from(self.g) / 255.0);
        let b = srgb_to_linear(f64::from(self.b) / 255.0);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// Scale every channel toward black by `amount` (clamped to `[0, 1]`)
    pub fn darken(self, amount: f64) -> Self {
        let keep = 1.0 - clamp01(amount);
        Self::from_channels(
            f64::from(self.r) * keep,
            f64::from(self.g) * keep,
            f64::from(self.b) * keep,
        )
    }

    /// Multiply every channel by `factor`, truncating and capping at 255
    pub fn scale(self, factor: f64) -> Self {
        let channel = |c: u8| (f64::from(c) * factor).floor().clamp(0.0, 255.0) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Linear interpolation toward `target`; `weight` is clamped to `[0, 1]`
    pub fn mix(self, target: Rgb, weight: f64) -> Self {
        let w = clamp01(weight);
        let lerp = |a: u8, b: u8| f64::from(a) * (1.0 - w) + f64::from(b) * w;
        Self::from_channels(
            lerp(self.r, target.r),
            lerp(self.g, target.g),
            lerp(self.b, target.b),
        )
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Round and clamp a channel value into a byte
pub fn clamp_byte(n: f64) -> u8 {
    if n.is_nan() {
        return 0;
    }
    n.round().clamp(0.0, 255.0) as u8
}

/// Clamp into `[0, 1]`
pub fn clamp01(n: f64) -> f64 {
    if n.is_nan() {
        return 0.0;
    }
    n.clamp(0.0, 1.0)
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of a hex color, or `None` if it is malformed
pub fn relative_luminance(hex: &str) -> Option<f64> {
    Rgb::from_hex(hex).map(Rgb::relative_luminance)
}

/// Darken a hex color by `amount`
pub fn darken(hex: &str, amount: f64) -> String {
    match Rgb::from_hex(hex) {
        Some(rgb) => rgb.darken(amount).to_hex(),
        None => hex.to_string(),
    }
}

/// Lighten a hex color by multiplying each channel by `factor`
///
/// Returns `None` for malformed input so callers can pick their own
/// fallback.
pub fn lighten(hex: &str, factor: f64) -> Option<String> {
    Rgb::from_hex(hex).map(|rgb| rgb.scale(factor).to_hex())
}

/// Blend `hex` toward `target` by `weight`
pub fn tint_towards(hex: &str, target: &str, weight: f64) -> String {
    match (Rgb::from_hex(hex), Rgb::from_hex(target)) {
        (Some(a), Some(b)) => a.mix(b, weight).to_hex(),
        _ => hex.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex("#cba6f7"), Some(Rgb::new(0xcb, 0xa6, 0xf7)));
        assert_eq!(Rgb::from_hex("CBA6F7"), Some(Rgb::new(0xcb, 0xa6, 0xf7)));
        assert_eq!(Rgb::from_hex("  #ffffff "), Some(Rgb::WHITE));
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#fffffff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#0g0000"), None);
        assert_eq!(Rgb::from_hex(""), None);
        assert_eq!(Rgb::from_hex("#ééé"), None);
    }

    #[test]
    fn test_to_hex_pads_and_lowercases() {
        assert_eq!(Rgb::new(1, 2, 255).to_hex(), "#0102ff");
        assert_eq!(Rgb::from_channels(205.0, 214.0, 244.0).to_hex(), "#cdd6f4");
    }

    #[test]
    fn test_clamp_byte() {
        assert_eq!(clamp_byte(-10.0), 0);
        assert_eq!(clamp_byte(300.0), 255);
        assert_eq!(clamp_byte(127.5), 128);
        assert_eq!(clamp_byte(f64::NAN), 0);
    }

    #[test]
    fn test_luminance_extremes() {
        assert!((Rgb::WHITE.relative_luminance() - 1.0).abs() < 1e-9);
        assert!(Rgb::BLACK.relative_luminance().abs() < 1e-9);
    }

    #[test]
    fn test_darken() {
        assert_eq!(darken("#ffffff", 0.42), "#949494");
        assert_eq!(darken("#ffffff", 0.0), "#ffffff");
        assert_eq!(darken("#ffffff", 2.0), "#000000");
        assert_eq!(darken("nope", 0.5), "nope");
    }

    #[test]
    fn test_lighten_truncates_and_caps() {
        // 0x1e * 1.35 = 40.5 -> 40, 0x2e * 1.35 = 62.1 -> 62
        assert_eq!(lighten("#1e1e2e", 1.35).as_deref(), Some("#28283e"));
        assert_eq!(lighten("#eff1f5", 1.35).as_deref(), Some("#ffffff"));
        assert_eq!(lighten("#12345", 1.35), None);
    }

    #[test]
    fn test_tint_towards() {
        assert_eq!(tint_towards("#000000", "#ffffff", 0.5), "#808080");
        assert_eq!(tint_towards("#000000", "#ffffff", 1.5), "#ffffff");
        assert_eq!(tint_towards("#000000", "#ffffff", -1.0), "#000000");
        assert_eq!(tint_towards("bad", "#ffffff", 0.5), "bad");
        assert_eq!(tint_towards("#000000", "bad", 0.5), "#000000");
    }

    #[test]
    fn test_mixer_round_trip() {
        for hex in COLOR_PRESETS {
            let rgb = Rgb::from_hex(hex).unwrap();
            assert_eq!(rgb.to_hex(), hex);
        }
    }
}
