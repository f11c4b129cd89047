use std::str::FromStr;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than "dark" renders with the light palette.
    pub fn from_param(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// Named button colours accepted by `primaryColor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Swatch {
    Purple,
    Blue,
    Orange,
    Pink,
    Green,
    Red,
    Teal,
    Cyan,
    Yellow,
}

impl Swatch {
    pub fn hex(self) -> &'static str {
        match self {
            Swatch::Purple => "#7C3AED",
            Swatch::Blue => "#3B82F6",
            Swatch::Orange => "#F59E0B",
            Swatch::Pink => "#EC4899",
            Swatch::Green => "#10B981",
            Swatch::Red => "#EF4444",
            Swatch::Teal => "#14B8A6",
            Swatch::Cyan => "#22D3EE",
            Swatch::Yellow => "#FBBF24",
        }
    }
}

impl FromStr for Swatch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "purple" => Swatch::Purple,
            "blue" => Swatch::Blue,
            "orange" => Swatch::Orange,
            "pink" => Swatch::Pink,
            "green" => Swatch::Green,
            "red" => Swatch::Red,
            "teal" => Swatch::Teal,
            "cyan" => Swatch::Cyan,
            "yellow" => Swatch::Yellow,
            _ => return Err(()),
        })
    }
}

/// Action button colour: a named swatch, or any raw colour value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PrimaryColor {
    Swatch(Swatch),
    Raw(String),
}

impl PrimaryColor {
    pub fn from_param(raw: &str) -> Self {
        raw.parse()
            .map(PrimaryColor::Swatch)
            .unwrap_or_else(|_| PrimaryColor::Raw(raw.to_string()))
    }

    /// RGB triple when the colour is a swatch or a `#rgb` / `#rrggbb` value.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            PrimaryColor::Swatch(s) => parse_hex_color(s.hex()),
            PrimaryColor::Raw(raw) => parse_hex_color(raw),
        }
    }
}

pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}
