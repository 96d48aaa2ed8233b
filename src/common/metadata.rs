use std::fmt::{Display, Formatter};
use std::str::FromStr;

use image::Rgba;

use super::error::{QRError, QRResult};

pub const MIN_VERSION: u8 = 1;
pub const MAX_VERSION: u8 = 40;

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum ECLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ECLevel {
    /// Parses a level name, falling back to [`ECLevel::M`] for anything unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "L" | "l" => Self::L,
            "M" | "m" => Self::M,
            "Q" | "q" => Self::Q,
            "H" | "h" => Self::H,
            other => {
                tracing::debug!(level = other, "Unrecognized error level, using M");
                Self::M
            }
        }
    }
}

impl Display for ECLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(s)
    }
}

impl From<ECLevel> for qrcode::EcLevel {
    fn from(ecl: ECLevel) -> Self {
        match ecl {
            ECLevel::L => qrcode::EcLevel::L,
            ECLevel::M => qrcode::EcLevel::M,
            ECLevel::Q => qrcode::EcLevel::Q,
            ECLevel::H => qrcode::EcLevel::H,
        }
    }
}

// Version
//------------------------------------------------------------------------------

/// Version selection. `Normal(n)` is a lower bound: the smallest version >= n that holds the
/// payload is used.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum Version {
    #[default]
    Auto,
    Normal(u8),
}

impl Version {
    pub fn checked(v: i64) -> QRResult<Self> {
        if v < MIN_VERSION as i64 || v > MAX_VERSION as i64 {
            return Err(QRError::InvalidVersion(v));
        }
        Ok(Self::Normal(v as u8))
    }

    pub fn start(self) -> u8 {
        match self {
            Self::Auto => MIN_VERSION,
            Self::Normal(v) => v,
        }
    }

    /// Symbol width in modules.
    pub fn width(v: u8) -> u32 {
        v as u32 * 4 + 17
    }
}

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    pub fn rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }

    fn named(name: &str) -> Option<Self> {
        let rgb = match name {
            "black" => [0, 0, 0],
            "white" => [255, 255, 255],
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "orange" => [255, 165, 0],
            "purple" => [128, 0, 128],
            "navy" => [0, 0, 128],
            "gray" | "grey" => [128, 128, 128],
            "transparent" => return Some(Self([0, 0, 0, 0])),
            _ => return None,
        };
        Some(Self([rgb[0], rgb[1], rgb[2], 255]))
    }

    fn hex(digits: &str) -> Option<Self> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match digits.len() {
            3 => Some(Self([nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255])),
            6 => Some(Self([byte(0)?, byte(2)?, byte(4)?, 255])),
            8 => Some(Self([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
            _ => None,
        }
    }
}

impl FromStr for Color {
    type Err = QRError;

    fn from_str(s: &str) -> QRResult<Self> {
        let s = s.trim();
        let parsed = match s.strip_prefix('#') {
            Some(digits) => Self::hex(digits),
            None => Self::named(&s.to_ascii_lowercase()),
        };
        parsed.ok_or_else(|| QRError::InvalidColor(s.to_string()))
    }
}

#[cfg(test)]
mod metadata_tests {
    use test_case::test_case;

    use super::{Color, ECLevel, Version};
    use crate::common::error::QRError;

    #[test_case("L", ECLevel::L)]
    #[test_case("q", ECLevel::Q)]
    #[test_case(" H ", ECLevel::H)]
    #[test_case("M", ECLevel::M)]
    #[test_case("X", ECLevel::M)]
    #[test_case("", ECLevel::M)]
    #[test_case("high", ECLevel::M)]
    fn test_parse_lenient(s: &str, exp: ECLevel) {
        assert_eq!(ECLevel::parse_lenient(s), exp);
    }

    #[test_case(1, Ok(Version::Normal(1)))]
    #[test_case(40, Ok(Version::Normal(40)))]
    #[test_case(0, Err(QRError::InvalidVersion(0)))]
    #[test_case(41, Err(QRError::InvalidVersion(41)))]
    #[test_case(-3, Err(QRError::InvalidVersion(-3)))]
    fn test_version_checked(v: i64, exp: Result<Version, QRError>) {
        assert_eq!(Version::checked(v), exp);
    }

    #[test]
    fn test_version_width() {
        assert_eq!(Version::width(1), 21);
        assert_eq!(Version::width(40), 177);
    }

    #[test_case("black", [0, 0, 0, 255])]
    #[test_case("White", [255, 255, 255, 255])]
    #[test_case("#f80", [255, 136, 0, 255])]
    #[test_case("#1E90FF", [30, 144, 255, 255])]
    #[test_case("#00000080", [0, 0, 0, 128])]
    #[test_case("transparent", [0, 0, 0, 0])]
    fn test_color_parse(s: &str, exp: [u8; 4]) {
        assert_eq!(s.parse::<Color>(), Ok(Color(exp)));
    }

    #[test_case("#12345")]
    #[test_case("#ggg")]
    #[test_case("chartreuse-ish")]
    #[test_case("#ééé")]
    #[test_case("#+f+f+f")]
    #[test_case("#-1-1-1")]
    #[test_case("#ff+0")]
    fn test_color_parse_invalid(s: &str) {
        assert!(matches!(s.parse::<Color>(), Err(QRError::InvalidColor(_))));
    }
}
