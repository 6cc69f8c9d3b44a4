use crate::foundation::core::Rgba8Premul;

/// Straight (non-premultiplied) 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Parse a strict `#rrggbb` color (case-insensitive). Anything else returns `None`.
pub fn hex_to_rgb(s: &str) -> Option<Rgb> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Rgb {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
    })
}

/// Format channels as lowercase `#rrggbb`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Blend two `#rrggbb` colors channel by channel at `t`.
///
/// Each channel is interpolated in 0..255 space, rounded and clamped. When either side fails the
/// strict pattern the blend degrades to a step: `start` before the midpoint, `end` from it on.
pub fn lerp_hex(start: &str, end: &str, t: f64) -> String {
    let (Some(a), Some(b)) = (hex_to_rgb(start), hex_to_rgb(end)) else {
        return if t < 0.5 {
            start.to_owned()
        } else {
            end.to_owned()
        };
    };

    fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
        let a = f64::from(a);
        let b = f64::from(b);
        (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
    }

    rgb_to_hex(lerp_u8(a.r, b.r, t), lerp_u8(a.g, b.g, t), lerp_u8(a.b, b.b, t))
}

/// Parse a paint color for rasterization.
///
/// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`. `transparent`, `none` and unparseable strings yield
/// `None`, which painters treat as "no paint".
pub fn parse_paint(s: &str) -> Option<[u8; 4]> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("transparent") || s.eq_ignore_ascii_case("none") {
        return None;
    }
    let digits = s.strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |pair: &str| u8::from_str_radix(pair, 16).ok();
    match digits.len() {
        3 => {
            let nib = |i: usize| byte(&digits[i..i + 1]).map(|v| v * 17);
            Some([nib(0)?, nib(1)?, nib(2)?, 255])
        }
        6 => Some([
            byte(&digits[0..2])?,
            byte(&digits[2..4])?,
            byte(&digits[4..6])?,
            255,
        ]),
        8 => Some([
            byte(&digits[0..2])?,
            byte(&digits[2..4])?,
            byte(&digits[4..6])?,
            byte(&digits[6..8])?,
        ]),
        _ => None,
    }
}

/// [`parse_paint`] converted to premultiplied form.
pub fn parse_paint_premul(s: &str) -> Option<Rgba8Premul> {
    parse_paint(s).map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/color.rs"]
mod tests;
