use ratatui::style::Color;

use crate::config::ColorConfig;

/// Readout colors, in the same order as `Records::formatted_spans`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Palette {
    pub spans: [Color; 3],
    pub back: Color,
}

impl Palette {
    pub(super) fn from_config(colors: &ColorConfig) -> Self {
        let defaults = ColorConfig::default();
        let pick = |value: &str, fallback: &str| {
            parse_hex_color(value)
                .or_else(|| parse_hex_color(fallback))
                .unwrap_or(Color::White)
        };

        Self {
            spans: [
                pick(&colors.session, &defaults.session),
                pick(&colors.total, &defaults.total),
                pick(&colors.remain, &defaults.remain),
            ],
            back: pick(&colors.back, &defaults.back),
        }
    }
}

/// Parses `#RRGGBB`.
pub(super) fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub(super) fn text_color_for_bg(bg_color: Color) -> Color {
    if let Color::Rgb(r, g, b) = bg_color {
        let brightness = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if brightness > 128 {
            Color::Black
        } else {
            Color::White
        }
    } else {
        Color::White
    }
}
