// SPDX-License-Identifier: Apache-2.0

//! Static catalogs of the field names each response schema recognises.
//!
//! A catalog is a single byte string of NUL-terminated names closed by an
//! empty entry, e.g. `b"all\0country\0deg\0\0"`. A name's ordinal is its
//! position in that run, and each catalog is paired with a `#[repr(u8)]` enum
//! whose discriminants are those ordinals. Lookups scan the run linearly and
//! never allocate.

/// Returns the ordinal of the catalog entry equal to `candidate`.
///
/// Matching is exact and case-sensitive: a candidate only matches an entry
/// when both end at the same byte, so `"temp"` never resolves to `"temp_max"`
/// and `"te"` never resolves to `"temp"`.
pub fn ordinal_of(candidate: &str, catalog: &[u8]) -> Option<usize> {
    let candidate = candidate.as_bytes();
    let mut rest = catalog;
    let mut ordinal = 0;
    while let Some(end) = rest.iter().position(|&b| b == 0) {
        let entry = &rest[..end];
        if entry.is_empty() {
            break;
        }
        if entry == candidate {
            return Some(ordinal);
        }
        ordinal += 1;
        rest = &rest[end + 1..];
    }
    None
}

/// Length of the longest entry in a catalog.
pub const fn longest_entry(catalog: &[u8]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut i = 0;
    while i < catalog.len() {
        if catalog[i] == 0 {
            if current > longest {
                longest = current;
            }
            current = 0;
        } else {
            current += 1;
        }
        i += 1;
    }
    longest
}

macro_rules! key_catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $catalog:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        #[doc = concat!("NUL-terminated names of [`", stringify!($name), "`], in ordinal order.")]
        $vis const $catalog: &[u8] = concat!($($text, "\0",)+ "\0").as_bytes();

        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            /// Every key, indexed by ordinal.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Resolves a JSON key against the catalog.
            pub fn resolve(key: &str) -> Option<Self> {
                ordinal_of(key, $catalog).and_then(|ordinal| Self::ALL.get(ordinal).copied())
            }

            /// The key as it appears in the JSON.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Position of the key in its catalog.
            pub const fn ordinal(self) -> usize {
                self as usize
            }
        }
    };
}

key_catalog! {
    /// Fields of a `/data/2.5/weather` response.
    pub enum CurrentKey in CURRENT_CATALOG {
        All => "all",
        Country => "country",
        Deg => "deg",
        Description => "description",
        Dt => "dt",
        Humidity => "humidity",
        Icon => "icon",
        Id => "id",
        Lat => "lat",
        Lon => "lon",
        Main => "main",
        Name => "name",
        Pressure => "pressure",
        Speed => "speed",
        Sunrise => "sunrise",
        Sunset => "sunset",
        Temp => "temp",
        TempMax => "temp_max",
        TempMin => "temp_min",
        Visibility => "visibility",
    }
}

key_catalog! {
    /// Fields of one entry in a `/data/2.5/forecast` response.
    pub enum ForecastKey in FORECAST_CATALOG {
        ThreeHours => "3h",
        Description => "description",
        Icon => "icon",
        Id => "id",
        Main => "main",
        All => "all",
        Deg => "deg",
        Dt => "dt",
        DtTxt => "dt_txt",
        FeelsLike => "feels_like",
        GrndLevel => "grnd_level",
        Humidity => "humidity",
        Pressure => "pressure",
        SeaLevel => "sea_level",
        Speed => "speed",
        Temp => "temp",
        TempMax => "temp_max",
        TempMin => "temp_min",
    }
}
