// SPDX-License-Identifier: Apache-2.0

//! Translation of OpenWeatherMap icon codes to Meteocons font glyphs.

/// Three-byte icon codes, back to back. Entry `i` maps to `ICON_GLYPHS[i]`.
pub(crate) const ICON_CODES: &[u8] = b"01d01n02d02n03d03n04d04n09d09n10d10n11d11n13d13n50d50n";
pub(crate) const ICON_GLYPHS: &[u8] = b"BCH4N5Y%R8Q7P6W#MM";

/// Glyph returned for codes missing from the table.
pub const UNKNOWN_GLYPH: char = ')';

/// Maps an icon code such as `"09d"` to its single-character glyph.
///
/// Only the first three bytes are compared.
pub fn meteocon_glyph(icon: &str) -> char {
    let Some(icon) = icon.as_bytes().get(..3) else {
        return UNKNOWN_GLYPH;
    };
    ICON_CODES
        .chunks_exact(3)
        .zip(ICON_GLYPHS)
        .find(|(code, _)| *code == icon)
        .map_or(UNKNOWN_GLYPH, |(_, &glyph)| glyph as char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;

    macro_rules! glyph_tests {
        ($($name:ident: $code:literal => $glyph:literal),* $(,)?) => {
            paste! {
                $(
                    #[test]
                    fn [<test_glyph_ $name>]() {
                        assert_eq!(meteocon_glyph($code), $glyph);
                    }
                )*
            }
        };
    }

    glyph_tests! {
        clear_day: "01d" => 'B',
        clear_night: "01n" => 'C',
        few_clouds_day: "02d" => 'H',
        few_clouds_night: "02n" => '4',
        scattered_clouds_day: "03d" => 'N',
        scattered_clouds_night: "03n" => '5',
        broken_clouds_day: "04d" => 'Y',
        broken_clouds_night: "04n" => '%',
        shower_rain_day: "09d" => 'R',
        shower_rain_night: "09n" => '8',
        rain_day: "10d" => 'Q',
        rain_night: "10n" => '7',
        thunderstorm_day: "11d" => 'P',
        thunderstorm_night: "11n" => '6',
        snow_day: "13d" => 'W',
        snow_night: "13n" => '#',
        mist_day: "50d" => 'M',
        mist_night: "50n" => 'M',
    }

    #[test]
    fn test_tables_are_parallel() {
        assert_eq!(ICON_CODES.len(), ICON_GLYPHS.len() * 3);
    }

    #[test]
    fn test_unknown_codes() {
        for code in ["", "0", "01", "01x", "01D", "99d", "ä1d", "x01d"] {
            assert_eq!(meteocon_glyph(code), UNKNOWN_GLYPH, "{code:?}");
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        assert_eq!(meteocon_glyph("01d "), 'B');
        assert_eq!(meteocon_glyph("10nx"), '7');
        assert_eq!(meteocon_glyph("50d@2x"), 'M');
    }

    #[test]
    fn test_deterministic() {
        for code in ICON_CODES.chunks_exact(3) {
            let code = core::str::from_utf8(code).unwrap();
            assert_eq!(meteocon_glyph(code), meteocon_glyph(code));
            assert_ne!(meteocon_glyph(code), UNKNOWN_GLYPH);
        }
    }
}
