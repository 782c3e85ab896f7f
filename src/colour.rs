// Copyright Kyler Chin <kyler@catenarymaps.org>

use rgb::RGB;

pub const WHITE_RGB: RGB<u8> = RGB::new(255, 255, 255);
pub const BLACK_RGB: RGB<u8> = RGB::new(0, 0, 0);
pub const DEFAULT_ROUTE_RGB: RGB<u8> = RGB::new(14, 165, 233);

/// Accepts `RRGGBB` with or without a leading `#`.
pub fn parse_hex_colour(raw: &str) -> Option<RGB<u8>> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGB::new(r, g, b))
}

/// White and black lines disappear on light and dark basemaps.
pub fn fix_background_colour_rgb(background: RGB<u8>) -> RGB<u8> {
    if background == WHITE_RGB || background == BLACK_RGB {
        DEFAULT_ROUTE_RGB
    } else {
        background
    }
}

pub fn route_colour(raw: &str) -> RGB<u8> {
    match parse_hex_colour(raw) {
        Some(colour) => fix_background_colour_rgb(colour),
        None => DEFAULT_ROUTE_RGB,
    }
}

pub fn to_hex(colour: RGB<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", colour.r, colour.g, colour.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_hash() {
        assert_eq!(parse_hex_colour("1772AC"), Some(RGB::new(23, 114, 172)));
        assert_eq!(parse_hex_colour("#1772ac"), Some(RGB::new(23, 114, 172)));
        assert_eq!(parse_hex_colour("12345"), None);
        assert_eq!(parse_hex_colour("zzzzzz"), None);
    }

    #[test]
    fn test_unusable_colours_fall_back() {
        assert_eq!(route_colour(""), DEFAULT_ROUTE_RGB);
        assert_eq!(route_colour("FFFFFF"), DEFAULT_ROUTE_RGB);
        assert_eq!(route_colour("000000"), DEFAULT_ROUTE_RGB);
        assert_eq!(to_hex(route_colour("1772AC")), "#1772ac");
    }
}
