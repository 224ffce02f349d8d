// SPDX-License-Identifier: Apache-2.0

use heapless::String;
use log::debug;
use time::OffsetDateTime;

use crate::coerce::copy_text;

/// Capacity of the key and parent buffers.
pub(crate) const KEY_LEN: usize = 32;

/// Key whose objects carry weather conditions.
pub(crate) const WEATHER_PARENT: &str = "weather";

/// Shallow nesting state shared by both dispatchers.
///
/// Only one level of parent is tracked: entering an object records the key
/// that introduced it, and leaving any object forgets it. Items of the
/// `weather` list after the first therefore see a stale parent, and are
/// recognised only through [`Self::weather_items_seen`].
#[derive(Debug, Default)]
pub(crate) struct ParseContext {
    current_key: String<KEY_LEN>,
    current_parent: String<KEY_LEN>,
    weather_items: u8,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: &str) {
        copy_text(&mut self.current_key, key);
    }

    pub fn key(&self) -> &str {
        &self.current_key
    }

    pub fn parent(&self) -> &str {
        &self.current_parent
    }

    pub fn enter_object(&mut self) {
        self.current_parent.clone_from(&self.current_key);
    }

    pub fn exit_object(&mut self) {
        if self.in_condition_list() {
            self.weather_items = self.weather_items.saturating_add(1);
        }
        self.current_parent.clear();
    }

    /// Whether values currently belong to a `weather` object.
    pub fn in_condition_list(&self) -> bool {
        self.parent() == WEATHER_PARENT
    }

    /// Number of `weather` objects closed so far.
    pub fn weather_items_seen(&self) -> u8 {
        self.weather_items
    }
}

/// Set of UTC hours of day a forecast entry may fall on.
///
/// The empty set accepts everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourFilter {
    mask: u32,
}

impl HourFilter {
    /// Accepts every entry.
    pub const fn any() -> Self {
        Self { mask: 0 }
    }

    /// Builds a filter from hours of day. Values of 24 and above are ignored.
    pub const fn from_hours(hours: &[u8]) -> Self {
        let mut filter = Self::any();
        let mut i = 0;
        while i < hours.len() {
            filter = filter.with_hour(hours[i]);
            i += 1;
        }
        filter
    }

    pub const fn with_hour(self, hour: u8) -> Self {
        if hour < 24 {
            Self {
                mask: self.mask | 1 << hour,
            }
        } else {
            self
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.mask == 0
    }

    pub const fn contains(&self, hour: u8) -> bool {
        hour < 24 && self.mask & 1 << hour != 0
    }

    /// Whether an entry stamped `timestamp` (Unix seconds) passes the filter.
    pub fn accepts(&self, timestamp: i64) -> bool {
        if self.is_empty() {
            return true;
        }
        match utc_hour(timestamp) {
            Some(hour) => self.contains(hour),
            None => false,
        }
    }
}

impl FromIterator<u8> for HourFilter {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        iter.into_iter().fold(Self::any(), Self::with_hour)
    }
}

/// Hour of day in UTC, or `None` outside the representable date range.
pub(crate) fn utc_hour(timestamp: i64) -> Option<u8> {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .map(|at| at.hour())
}

/// Where the forecast dispatcher writes next.
#[derive(Debug)]
pub(crate) struct ForecastCursor {
    /// Slot receiving fields; also the number of completed entries.
    pub index: usize,
    /// Whether the entry being read passed the hour filter.
    pub accepted: bool,
}

impl ForecastCursor {
    /// Without an hour filter every field is accepted, even before the
    /// first `dt`.
    pub fn new(hours: &HourFilter) -> Self {
        Self {
            index: 0,
            accepted: hours.is_empty(),
        }
    }

    /// Decides on a new entry from its `dt` value.
    pub fn begin_entry(&mut self, timestamp: i64, hours: &HourFilter) {
        self.accepted = hours.accepts(timestamp);
        if !self.accepted {
            debug!("Skipping forecast at {timestamp}");
        }
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_is_one_level() {
        let mut context = ParseContext::new();
        context.set_key("weather");
        context.enter_object();
        assert!(context.in_condition_list());
        context.set_key("icon");
        assert_eq!(context.parent(), "weather");
        context.exit_object();
        assert_eq!(context.parent(), "");
        assert_eq!(context.weather_items_seen(), 1);

        // Second item of the list sees the last key, not "weather".
        context.enter_object();
        assert_eq!(context.parent(), "icon");
        assert!(!context.in_condition_list());
        context.exit_object();
        assert_eq!(context.weather_items_seen(), 1);
    }

    #[test]
    fn test_nested_object_forgets_parent() {
        let mut context = ParseContext::new();
        context.set_key("list");
        context.enter_object();
        context.set_key("main");
        context.enter_object();
        assert_eq!(context.parent(), "main");
        context.exit_object();
        assert_eq!(context.parent(), "");
        assert_eq!(context.key(), "main");
    }

    #[test]
    fn test_long_keys_truncate() {
        let mut context = ParseContext::new();
        let long = "k".repeat(KEY_LEN + 8);
        context.set_key(&long);
        assert_eq!(context.key().len(), KEY_LEN);
    }

    #[test]
    fn test_hour_filter() {
        let filter = HourFilter::from_hours(&[0, 12, 23, 24, 200]);
        assert!(filter.contains(0));
        assert!(filter.contains(12));
        assert!(filter.contains(23));
        assert!(!filter.contains(1));
        assert!(!filter.contains(24));
        assert!(!filter.is_empty());
        let collected: HourFilter = [0u8, 12, 23].into_iter().collect();
        assert_eq!(filter, collected);
        assert!(HourFilter::from_hours(&[24]).is_empty());
    }

    #[test]
    fn test_accepts() {
        // 2018-05-23 09:00:00 UTC
        let nine = 1_527_066_000;
        assert_eq!(utc_hour(nine), Some(9));
        assert_eq!(utc_hour(nine + 3 * 3600), Some(12));
        assert_eq!(utc_hour(0), Some(0));
        assert!(HourFilter::any().accepts(nine));
        assert!(HourFilter::any().accepts(i64::MAX));
        assert!(HourFilter::from_hours(&[9]).accepts(nine));
        assert!(!HourFilter::from_hours(&[12]).accepts(nine));
        assert!(!HourFilter::from_hours(&[9]).accepts(i64::MAX));
    }

    #[test]
    fn test_cursor_starts_open_without_filter() {
        assert!(ForecastCursor::new(&HourFilter::any()).accepted);
        assert!(!ForecastCursor::new(&HourFilter::from_hours(&[6])).accepted);
    }

    #[test]
    fn test_cursor() {
        let evening = HourFilter::from_hours(&[18]);
        let mut cursor = ForecastCursor::new(&evening);
        cursor.begin_entry(1_527_066_000, &evening);
        assert!(!cursor.accepted);
        cursor.begin_entry(1_527_066_000 + 9 * 3600, &evening);
        assert!(cursor.accepted);
        cursor.advance();
        assert_eq!(cursor.index, 1);
    }
}
