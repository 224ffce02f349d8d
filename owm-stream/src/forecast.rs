// SPDX-License-Identifier: Apache-2.0

use jsonlex::JsonListener;
use log::debug;

use crate::coerce::{copy_text, to_float, to_i32, to_int, to_u16, to_u32, to_u8};
use crate::context::{ForecastCursor, HourFilter, ParseContext};
use crate::keys::ForecastKey;
use crate::model::Forecast;

/// Fills forecast slots from the `list` of a forecast response.
///
/// With an hour filter, each entry must start with `dt`, which decides
/// whether the entry passes. Every entry must end with `dt_txt`, which moves
/// on to the next slot.
/// An entry without `dt_txt` is merged into the slot of the one after it.
pub(crate) struct ForecastListener<'a> {
    slots: &'a mut [Forecast],
    hours: HourFilter,
    context: ParseContext,
    cursor: ForecastCursor,
}

impl<'a> ForecastListener<'a> {
    pub fn new(slots: &'a mut [Forecast], hours: &HourFilter) -> Self {
        Self {
            slots,
            hours: *hours,
            context: ParseContext::new(),
            cursor: ForecastCursor::new(hours),
        }
    }

    /// Number of slots written so far.
    pub fn filled(&self) -> usize {
        self.cursor.index.min(self.slots.len())
    }
}

impl JsonListener for ForecastListener<'_> {
    fn start_object(&mut self) {
        self.context.enter_object();
    }

    fn end_object(&mut self) {
        self.context.exit_object();
    }

    fn key(&mut self, key: &str) {
        self.context.set_key(key);
    }

    fn value(&mut self, value: &str) {
        let Some(slot) = self.slots.get_mut(self.cursor.index) else {
            return;
        };
        let Some(key) = ForecastKey::resolve(self.context.key()) else {
            return;
        };

        if key == ForecastKey::Dt {
            self.cursor.begin_entry(to_int(value), &self.hours);
            if self.cursor.accepted {
                slot.observation_time = to_u32(value);
            }
            return;
        }
        if !self.cursor.accepted {
            return;
        }
        debug!("[{}] {}: {}", self.cursor.index, key.name(), value);

        let condition = self.context.in_condition_list();
        match key {
            ForecastKey::Temp => {
                slot.rain = 0.0;
                slot.temp = to_float(value);
            }
            ForecastKey::FeelsLike => slot.feels_like = to_float(value),
            ForecastKey::TempMin => slot.temp_min = to_float(value),
            ForecastKey::TempMax => slot.temp_max = to_float(value),
            ForecastKey::Pressure => slot.pressure = to_float(value),
            ForecastKey::SeaLevel => slot.pressure_sea_level = to_float(value),
            ForecastKey::GrndLevel => slot.pressure_ground_level = to_float(value),
            ForecastKey::Humidity => slot.humidity = to_u8(value),
            ForecastKey::Id if condition => slot.condition.weather_id = to_u16(value),
            ForecastKey::Main if condition => slot.condition.main = to_i32(value),
            ForecastKey::Description if condition => slot.condition.set_description(value),
            ForecastKey::Icon if condition => slot.condition.set_icon(value),
            ForecastKey::Id | ForecastKey::Main | ForecastKey::Description | ForecastKey::Icon => {}
            ForecastKey::All => slot.clouds = to_u8(value),
            ForecastKey::Speed => slot.wind_speed = to_float(value),
            ForecastKey::Deg => slot.wind_deg = to_float(value),
            ForecastKey::ThreeHours => slot.rain = to_float(value),
            ForecastKey::DtTxt => {
                copy_text(&mut slot.observation_time_text, value);
                self.cursor.advance();
            }
            ForecastKey::Dt => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonlex::Tokenizer;
    use test_log::test;

    fn decode(json: &str, slots: &mut [Forecast], hours: HourFilter) -> usize {
        let mut listener = ForecastListener::new(slots, &hours);
        let mut tokenizer: Tokenizer = Tokenizer::new();
        tokenizer.parse_full(json.as_bytes(), &mut listener).unwrap();
        listener.filled()
    }

    const TWO_ENTRIES: &str = r#"{"cod":"200","cnt":2,"list":[
        {"dt":1527066000,"main":{"temp":17.5,"feels_like":16.9,"pressure":1012.3,"sea_level":1020.1,"grnd_level":960.4,"humidity":71},
         "weather":[{"id":500,"main":"Rain","description":"light rain","icon":"10d"}],
         "clouds":{"all":88},"wind":{"speed":3.2,"deg":250},"rain":{"3h":0.6},"dt_txt":"2018-05-23 09:00:00"},
        {"dt":1527098400,"main":{"temp":12.25,"humidity":90},
         "weather":[{"id":800,"main":"Clear","description":"clear sky","icon":"01n"}],
         "clouds":{"all":0},"wind":{"speed":1.1,"deg":90},"dt_txt":"2018-05-23 18:00:00"}
    ],"city":{"id":2657896,"name":"Zurich","country":"CH","sunrise":1527046573}}"#;

    #[test]
    fn test_fills_entries_in_order() {
        let mut slots: [Forecast; 4] = Default::default();
        assert_eq!(decode(TWO_ENTRIES, &mut slots, HourFilter::any()), 2);

        let first = &slots[0];
        assert_eq!(first.observation_time, 1_527_066_000);
        assert_eq!(first.temp, 17.5);
        assert_eq!(first.feels_like, 16.9);
        assert_eq!(first.pressure, 1012.3);
        assert_eq!(first.pressure_sea_level, 1020.1);
        assert_eq!(first.pressure_ground_level, 960.4);
        assert_eq!(first.humidity, 71);
        assert_eq!(first.condition.weather_id, 500);
        assert_eq!(first.condition.description, "light rain");
        assert_eq!(first.condition.icon_glyph, 'Q');
        assert_eq!(first.clouds, 88);
        assert_eq!(first.wind_speed, 3.2);
        assert_eq!(first.wind_deg, 250.0);
        assert_eq!(first.rain, 0.6);
        assert_eq!(first.observation_time_text, "2018-05-23 09:00:00");

        let second = &slots[1];
        assert_eq!(second.observation_time, 1_527_098_400);
        assert_eq!(second.temp, 12.25);
        assert_eq!(second.rain, 0.0);
        assert_eq!(second.condition.icon, "01n");
        assert_eq!(second.observation_time_text, "2018-05-23 18:00:00");

        assert_eq!(slots[2], Forecast::default());
    }

    #[test]
    fn test_capacity_one_takes_first() {
        let mut slots: [Forecast; 1] = Default::default();
        assert_eq!(decode(TWO_ENTRIES, &mut slots, HourFilter::any()), 1);
        assert_eq!(slots[0].observation_time, 1_527_066_000);
        assert_eq!(slots[0].condition.weather_id, 500);
    }

    #[test]
    fn test_hour_filter_keeps_second() {
        let mut slots: [Forecast; 2] = Default::default();
        let filled = decode(TWO_ENTRIES, &mut slots, HourFilter::from_hours(&[18]));
        assert_eq!(filled, 1);
        assert_eq!(slots[0].observation_time, 1_527_098_400);
        assert_eq!(slots[0].temp, 12.25);
        assert_eq!(slots[0].condition.weather_id, 800);
        assert_eq!(slots[0].clouds, 0);
        assert_eq!(slots[0].observation_time_text, "2018-05-23 18:00:00");
        assert_eq!(slots[1], Forecast::default());
    }

    #[test]
    fn test_zero_capacity() {
        let mut slots: [Forecast; 0] = [];
        assert_eq!(decode(TWO_ENTRIES, &mut slots, HourFilter::any()), 0);
    }

    #[test]
    fn test_rain_reset_on_temp() {
        let mut slots: [Forecast; 1] = Default::default();
        slots[0].rain = 4.0;
        decode(
            r#"{"list":[{"dt":1527066000,"main":{"temp":1.0},"dt_txt":"x"}]}"#,
            &mut slots,
            HourFilter::any(),
        );
        assert_eq!(slots[0].rain, 0.0);
    }
}
