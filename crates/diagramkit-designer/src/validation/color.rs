//! Color syntax checks.

use regex::Regex;
use std::sync::OnceLock;

/// Named colors accepted besides hex and `rgb()`/`rgba()` syntax.
pub const NAMED_COLORS: &[&str] = &[
    "black",
    "white",
    "red",
    "green",
    "blue",
    "yellow",
    "orange",
    "purple",
    "gray",
    "grey",
    "transparent",
];

fn hex_regex() -> Option<&'static Regex> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").ok())
        .as_ref()
}

fn rgb_regex() -> Option<&'static Regex> {
    static RGB: OnceLock<Option<Regex>> = OnceLock::new();
    RGB.get_or_init(|| {
        Regex::new(
            r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(0|1|0?\.\d+|1\.0+)\s*)?\)$",
        )
        .ok()
    })
    .as_ref()
}

/// True if `value` is `#RGB`, `#RRGGBB`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
/// or one of [`NAMED_COLORS`]. Channel values must be in 0..=255 and alpha in 0..=1.
pub fn is_valid_color(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if value.starts_with('#') {
        return hex_regex().is_some_and(|re| re.is_match(value));
    }

    let lower = value.to_ascii_lowercase();
    if lower.starts_with("rgb") {
        let Some(caps) = rgb_regex().and_then(|re| re.captures(&lower)) else {
            return false;
        };
        // rgb() takes exactly three channels, rgba() exactly four
        let has_alpha = caps.get(4).is_some();
        if lower.starts_with("rgba(") != has_alpha {
            return false;
        }
        return (1..=3).all(|i| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<u16>().ok())
                .is_some_and(|channel| channel <= 255)
        });
    }

    NAMED_COLORS.contains(&lower.as_str())
}
