// SPDX-License-Identifier: Apache-2.0

//! Caller-owned records the decoders write into.

use heapless::String;

use crate::coerce::copy_text;
use crate::icons::{meteocon_glyph, UNKNOWN_GLYPH};

pub const CITY_NAME_LEN: usize = 32;
pub const COUNTRY_LEN: usize = 4;
pub const DESCRIPTION_LEN: usize = 32;
pub const ICON_LEN: usize = 4;
/// Fits `"2018-05-23 09:00:00"`.
pub const TIME_TEXT_LEN: usize = 20;

/// One entry of a response's `weather` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub weather_id: u16,
    /// The `main` category (`"Rain"`, `"Clouds"`) read as an integer, which
    /// is zero for every value the service currently sends.
    pub main: i32,
    pub description: String<DESCRIPTION_LEN>,
    pub icon: String<ICON_LEN>,
    /// Meteocons glyph for `icon`.
    pub icon_glyph: char,
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            weather_id: 0,
            main: 0,
            description: String::new(),
            icon: String::new(),
            icon_glyph: UNKNOWN_GLYPH,
        }
    }
}

impl Condition {
    pub(crate) fn set_description(&mut self, text: &str) {
        copy_text(&mut self.description, text);
    }

    /// Stores the icon code together with its glyph.
    pub(crate) fn set_icon(&mut self, code: &str) {
        copy_text(&mut self.icon, code);
        self.icon_glyph = meteocon_glyph(code);
    }
}

/// Decoded `/data/2.5/weather` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentWeather {
    pub lon: f32,
    pub lat: f32,
    pub condition: Condition,
    pub temp: f32,
    pub temp_min: f32,
    pub temp_max: f32,
    pub pressure: u16,
    pub humidity: u8,
    pub visibility: u16,
    pub wind_speed: f32,
    pub wind_deg: f32,
    /// Cloud cover in percent.
    pub clouds: u8,
    /// Unix seconds.
    pub observation_time: u32,
    pub sunrise: u32,
    pub sunset: u32,
    pub city_name: String<CITY_NAME_LEN>,
    pub country: String<COUNTRY_LEN>,
}

impl CurrentWeather {
    /// Resets every field, as after a failed update.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One three-hour step of a `/data/2.5/forecast` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    /// Unix seconds.
    pub observation_time: u32,
    pub temp: f32,
    pub feels_like: f32,
    pub temp_min: f32,
    pub temp_max: f32,
    pub pressure: f32,
    pub pressure_sea_level: f32,
    pub pressure_ground_level: f32,
    pub humidity: u8,
    pub condition: Condition,
    pub clouds: u8,
    pub wind_speed: f32,
    pub wind_deg: f32,
    /// Precipitation over the last three hours.
    pub rain: f32,
    /// Server-formatted `dt_txt`, e.g. `"2018-05-23 09:00:00"`.
    pub observation_time_text: String<TIME_TEXT_LEN>,
}
