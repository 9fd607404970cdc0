//! Colors shared by the battle screens.

use eframe::egui::Color32;

pub const ARENA_BG: Color32 = Color32::from_rgb(18, 20, 28);
pub const CARD_BG: Color32 = Color32::from_rgb(32, 35, 48);
pub const CARD_SELECTED_BG: Color32 = Color32::from_rgb(44, 52, 74);
pub const HP_FILL: Color32 = Color32::from_rgb(220, 68, 68);
pub const STAMINA_FILL: Color32 = Color32::from_rgb(240, 190, 60);
pub const XP_FILL: Color32 = Color32::from_rgb(88, 101, 242);
pub const BUFF_FILL: Color32 = Color32::from_rgb(35, 120, 80);
pub const DEBUFF_FILL: Color32 = Color32::from_rgb(120, 40, 60);
pub const LOG_TEXT: Color32 = Color32::from_rgb(200, 204, 214);
pub const ACCENT: Color32 = Color32::from_rgb(0, 255, 0);

/// Parses `#rrggbb` or `#rgb`. Anything else yields `None`.
pub fn parse_hex_color(text: &str) -> Option<Color32> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        3 => {
            let short = |i: usize| channel(hex.get(i..i + 1)?).map(|v| v * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

/// Bot or agent color, falling back to the accent for malformed values.
pub fn color_or_accent(text: &str) -> Color32 {
    parse_hex_color(text).unwrap_or(ACCENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(parse_hex_color("#00aaff"), Some(Color32::from_rgb(0, 170, 255)));
        assert_eq!(parse_hex_color("#fa0"), Some(Color32::from_rgb(255, 170, 0)));
    }

    #[test]
    fn malformed_colors_fall_back() {
        assert_eq!(parse_hex_color("00ff00"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#ä0"), None);
        assert_eq!(color_or_accent("red"), ACCENT);
    }
}
