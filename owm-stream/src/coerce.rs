// SPDX-License-Identifier: Apache-2.0

//! Permissive conversion of JSON scalar text into record fields.
//!
//! Upstream adds and changes fields without notice, so nothing here fails:
//! numbers are read from the longest numeric prefix of the text and anything
//! unparseable becomes zero. Integers saturate at the bounds of the target
//! type.

use heapless::String;

/// Reads an optionally signed decimal integer prefix, ignoring anything after
/// it (`"1013.25"` is `1013`, `"Rain"` is `0`).
pub fn to_int(text: &str) -> i64 {
    let (negative, digits) = match text.trim_start().as_bytes() {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        bytes => (false, bytes),
    };

    let mut result: i64 = 0;
    for &byte in digits.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i64::from(byte - b'0');
        result = if negative {
            result.saturating_mul(10).saturating_sub(digit)
        } else {
            result.saturating_mul(10).saturating_add(digit)
        };
    }
    result
}

/// Reads the longest prefix shaped like a JSON number (`"226.505"`,
/// `"-1e3xyz"`). Returns `0.0` when there is none.
pub fn to_float(text: &str) -> f32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    end = digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end = digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'-' | b'+')) {
            exponent += 1;
        }
        let exponent_end = digits_from(exponent);
        if exponent_end > exponent {
            end = exponent_end;
        }
    }

    text.get(..end)
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0.0)
}

macro_rules! define_narrowing {
    ($($fn_name:ident => $int_ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("[`to_int`] clamped to the range of `", stringify!($int_ty), "`.")]
            pub fn $fn_name(text: &str) -> $int_ty {
                to_int(text).clamp(<$int_ty>::MIN.into(), <$int_ty>::MAX.into()) as $int_ty
            }
        )*
    };
}

define_narrowing! {
    to_u8 => u8,
    to_u16 => u16,
    to_u32 => u32,
    to_i32 => i32,
}

/// Replaces `dst` with `src`, truncated on a character boundary if needed.
pub fn copy_text<const N: usize>(dst: &mut String<N>, src: &str) {
    dst.clear();
    for c in src.chars() {
        if dst.push(c).is_err() {
            break;
        }
    }
}
