// SPDX-License-Identifier: Apache-2.0

//! Compile-time capacity validation
//!
//! Keys longer than the context buffer would be truncated and then fail to
//! resolve, so every catalog entry must fit. The tokenizer buffer must hold
//! any key as well.

use crate::client::TOKEN_LEN;
use crate::context::KEY_LEN;
use crate::icons::{ICON_CODES, ICON_GLYPHS};
use crate::keys::{longest_entry, CURRENT_CATALOG, FORECAST_CATALOG};
use crate::model::{ICON_LEN, TIME_TEXT_LEN};
use crate::request::REQUEST_LEN;

const _: () = assert!(
    longest_entry(CURRENT_CATALOG) <= KEY_LEN,
    "current-weather key longer than KEY_LEN"
);
const _: () = assert!(
    longest_entry(FORECAST_CATALOG) <= KEY_LEN,
    "forecast key longer than KEY_LEN"
);
const _: () = assert!(KEY_LEN <= TOKEN_LEN, "tokenizer buffer smaller than KEY_LEN");

// Icon codes are three bytes, one glyph each
const _: () = assert!(ICON_CODES.len() == ICON_GLYPHS.len() * 3);
const _: () = assert!(ICON_LEN >= 3);

// "YYYY-MM-DD hh:mm:ss"
const _: () = assert!(TIME_TEXT_LEN >= 19);

const _: () = assert!(
    REQUEST_LEN >= 128,
    "request buffer cannot hold the fixed request text"
);
