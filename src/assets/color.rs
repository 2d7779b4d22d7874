use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{MixdeckError, MixdeckResult};

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
pub fn parse_hex_color(s: &str) -> MixdeckResult<Rgba8Premul> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> MixdeckResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| MixdeckError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    fn hex_nibble(c: &str) -> MixdeckResult<u8> {
        let v = hex_byte(c)?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err(MixdeckError::validation("hex color must be ascii"));
    }

    let (r, g, b, a) = match s.len() {
        3 => (
            hex_nibble(&s[0..1])?,
            hex_nibble(&s[1..2])?,
            hex_nibble(&s[2..3])?,
            255,
        ),
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err(MixdeckError::validation(
                "hex color must be #RGB, #RRGGBB or #RRGGBBAA",
            ));
        }
    };

    Ok(Rgba8Premul::from_straight_rgba(r, g, b, a))
}

/// Format a color as `#rrggbb` (opaque) or `#rrggbbaa`, un-premultiplying first.
pub fn to_hex_color(c: Rgba8Premul) -> String {
    fn unpremul(v: u8, a: u8) -> u8 {
        if a == 0 {
            return 0;
        }
        ((u16::from(v) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
    }

    let (r, g, b) = (unpremul(c.r, c.a), unpremul(c.g, c.a), unpremul(c.b, c.a));
    if c.a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{:02x}", c.a)
    }
}

/// Serde adapter storing [`Rgba8Premul`] as a hex string.
pub(crate) mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::foundation::core::Rgba8Premul;

    pub(crate) fn serialize<S: Serializer>(c: &Rgba8Premul, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::to_hex_color(*c))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Rgba8Premul, D::Error> {
        let s = String::deserialize(d)?;
        super::parse_hex_color(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
