//! Colour theme derivation and CSS variable generation.
//!
//! The day's colour is classified as light or dark by perceived brightness
//! and turned into two gradient stops that stay legible behind white cards:
//! light colours are darkened a little, dark colours lightened a lot.

use daily_api::Color;
use std::fmt;

/// Brightness above which a colour counts as light.
pub const LIGHTNESS_THRESHOLD: f64 = 128.0;

/// Stop adjustments for light colours (darken).
pub const LIGHT_STOPS: (f64, f64) = (-0.15, -0.25);

/// Stop adjustments for dark colours (lighten).
pub const DARK_STOPS: (f64, f64) = (0.4, 0.2);

/// Parse a strict 6-digit hex colour with an optional leading `#`.
///
/// Shorthand (`#abc`), names, and anything with non-hex characters return `None`.
pub fn hex_to_rgb(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// BT.601 luma of an RGB triple, in `0.0..=255.0`.
pub fn perceived_brightness(rgb: [u8; 3]) -> f64 {
    let [r, g, b] = rgb.map(f64::from);
    (r * 299.0 + g * 587.0 + b * 114.0) / 1000.0
}

/// Light/dark classification of a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lightness {
    /// Brightness strictly above the threshold.
    Light,
    /// Everything else, including the threshold itself.
    Dark,
}

impl Lightness {
    /// Classify a brightness value.
    pub fn classify(brightness: f64) -> Self {
        if brightness > LIGHTNESS_THRESHOLD {
            Self::Light
        } else {
            Self::Dark
        }
    }

    /// Background alpha of the white content container.
    pub fn container_alpha(self) -> f32 {
        match self {
            Self::Light => 0.95,
            Self::Dark => 0.98,
        }
    }

    fn stop_percents(self) -> (f64, f64) {
        match self {
            Self::Light => LIGHT_STOPS,
            Self::Dark => DARK_STOPS,
        }
    }
}

impl fmt::Display for Lightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Scale every channel by `1 + percent`, rounded and clamped to `0..=255`.
pub fn adjust_rgb(rgb: [u8; 3], percent: f64) -> [u8; 3] {
    rgb.map(|c| {
        let c = f64::from(c);
        (c + c * percent).round().clamp(0.0, 255.0) as u8
    })
}

/// Lighten (`percent > 0`) or darken (`percent < 0`) a hex colour.
///
/// Returns a CSS `rgb(r, g, b)` string, or the input unchanged when it is
/// not a valid hex colour.
pub fn adjust_brightness(hex: &str, percent: f64) -> String {
    match hex_to_rgb(hex) {
        Some(rgb) => css_rgb(adjust_rgb(rgb, percent)),
        None => hex.to_owned(),
    }
}

/// Format an RGB triple as `rgb(r, g, b)`.
pub fn css_rgb(rgb: [u8; 3]) -> String {
    format!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2])
}

/// The two gradient stops derived from a base colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    /// Classification that picked the stop adjustments.
    pub lightness: Lightness,
    /// Brightness the classification was based on.
    pub brightness: f64,
    /// First stop.
    pub start: [u8; 3],
    /// Second stop.
    pub end: [u8; 3],
}

/// Derive gradient stops for `color`.
///
/// Brightness comes from `color.rgb` when the backend supplied it; the stops
/// are always computed from `color.hex`. Returns `None` when `hex` does not
/// parse.
pub fn derive_gradient(color: &Color) -> Option<Gradient> {
    let base = hex_to_rgb(&color.hex)?;
    let brightness = perceived_brightness(color.rgb.unwrap_or(base));
    let lightness = Lightness::classify(brightness);
    let (first, second) = lightness.stop_percents();
    Some(Gradient {
        lightness,
        brightness,
        start: adjust_rgb(base, first),
        end: adjust_rgb(base, second),
    })
}

/// Style values for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeVars {
    /// Original colour, shown verbatim on the swatch.
    pub color: String,
    /// Channels shown by `--theme-rgb`.
    pub rgb: [u8; 3],
    /// Derived gradient.
    pub gradient: Gradient,
}

impl ThemeVars {
    /// Build theme variables for `color`, or `None` if its hex is malformed.
    pub fn from_color(color: &Color) -> Option<Self> {
        let gradient = derive_gradient(color)?;
        let rgb = match color.rgb {
            Some(rgb) => rgb,
            None => hex_to_rgb(&color.hex)?,
        };
        Some(Self {
            color: color.hex.clone(),
            rgb,
            gradient,
        })
    }

    /// First gradient stop as CSS.
    pub fn gradient_1(&self) -> String {
        css_rgb(self.gradient.start)
    }

    /// Second gradient stop as CSS.
    pub fn gradient_2(&self) -> String {
        css_rgb(self.gradient.end)
    }

    /// Container background alpha for this theme.
    pub fn container_alpha(&self) -> f32 {
        self.gradient.lightness.container_alpha()
    }

    /// Custom properties in the order they are written.
    pub fn css_properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--theme-color", self.color.clone()),
            ("--theme-gradient-1", self.gradient_1()),
            ("--theme-gradient-2", self.gradient_2()),
            (
                "--theme-rgb",
                format!("{}, {}, {}", self.rgb[0], self.rgb[1], self.rgb[2]),
            ),
        ]
    }

    /// Page background declaration.
    pub fn background(&self) -> String {
        format!(
            "linear-gradient(135deg, {} 0%, {} 100%)",
            self.gradient_1(),
            self.gradient_2()
        )
    }

    /// Container background declaration.
    pub fn container_background(&self) -> String {
        format!("rgba(255, 255, 255, {})", self.container_alpha())
    }

    /// Full `:root` stylesheet block.
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in self.css_properties() {
            css.push_str(&format!("  {name}: {value};\n"));
        }
        css.push_str("}\n");
        css.push_str(&format!("body {{ background: {}; }}\n", self.background()));
        css.push_str(&format!(
            ".container {{ background-color: {}; }}\n",
            self.container_background()
        ));
        css
    }
}

/// The theme currently in effect.
#[derive(Debug, Clone, Default)]
pub struct ThemeState {
    current: Option<ThemeVars>,
}

impl ThemeState {
    /// Apply `color`. A malformed colour leaves the previous theme in place.
    ///
    /// Returns `true` when the theme changed.
    pub fn apply(&mut self, color: &Color) -> bool {
        match ThemeVars::from_color(color) {
            Some(vars) => {
                tracing::debug!(
                    hex = %vars.color,
                    lightness = %vars.gradient.lightness,
                    brightness = vars.gradient.brightness,
                    "theme applied"
                );
                self.current = Some(vars);
                true
            }
            None => {
                tracing::debug!(hex = %color.hex, "unparsable colour, keeping previous theme");
                false
            }
        }
    }

    /// Active theme variables, if any colour has been applied.
    pub fn current(&self) -> Option<&ThemeVars> {
        self.current.as_ref()
    }
}
