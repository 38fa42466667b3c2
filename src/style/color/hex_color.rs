use crate::style::color::ColorLike;
use std::borrow::Cow;

/// A `#`-prefixed hex color literal, validated once at construction.
pub struct HexColor<'a> {
    raw: Cow<'a, str>,
    value: [u8; 4],
}

impl<'a> HexColor<'a> {
    pub fn new(hex: impl Into<Cow<'a, str>>) -> Self {
        let raw = hex.into();
        let bytes = raw.as_bytes();
        if !Self::validate(bytes) {
            return HexColor {
                raw,
                value: [0, 0, 0, 0],
            };
        }

        let value = match bytes.len() {
            4 | 5 => {
                let r = hex_1_to_u8(bytes[1]) * 17;
                let g = hex_1_to_u8(bytes[2]) * 17;
                let b = hex_1_to_u8(bytes[3]) * 17;
                let a = if bytes.len() == 5 {
                    hex_1_to_u8(bytes[4]) * 17
                } else {
                    255
                };
                [r, g, b, a]
            }
            _ => {
                let r = hex_2_to_u8(bytes[1], bytes[2]);
                let g = hex_2_to_u8(bytes[3], bytes[4]);
                let b = hex_2_to_u8(bytes[5], bytes[6]);
                let a = if bytes.len() == 9 {
                    hex_2_to_u8(bytes[7], bytes[8])
                } else {
                    255
                };
                [r, g, b, a]
            }
        };

        HexColor { raw, value }
    }

    fn validate(bytes: &[u8]) -> bool {
        let length = bytes.len();
        if length == 0 || bytes[0] != b'#' {
            return false;
        }
        if length != 4 && length != 5 && length != 7 && length != 9 {
            return false;
        }
        bytes[1..].iter().all(u8::is_ascii_hexdigit)
    }

    pub fn get_raw(&self) -> &str {
        &self.raw
    }
}

impl ColorLike for HexColor<'_> {
    fn to_rgba_u8(&self) -> [u8; 4] {
        self.value
    }
}

fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}
