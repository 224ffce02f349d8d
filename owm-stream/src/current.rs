// SPDX-License-Identifier: Apache-2.0

use jsonlex::JsonListener;
use log::debug;

use crate::coerce::{copy_text, to_float, to_i32, to_u16, to_u32, to_u8};
use crate::context::ParseContext;
use crate::keys::CurrentKey;
use crate::model::CurrentWeather;

/// Writes recognised fields of a current-weather response into a record.
pub(crate) struct CurrentListener<'a> {
    record: &'a mut CurrentWeather,
    context: ParseContext,
}

impl<'a> CurrentListener<'a> {
    pub fn new(record: &'a mut CurrentWeather) -> Self {
        Self {
            record,
            context: ParseContext::new(),
        }
    }

    /// Only the first item of the `weather` list describes the conditions.
    fn in_first_condition(&self) -> bool {
        self.context.in_condition_list() && self.context.weather_items_seen() == 0
    }
}

impl JsonListener for CurrentListener<'_> {
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
        let Some(key) = CurrentKey::resolve(self.context.key()) else {
            return;
        };
        debug!("{}: {}", key.name(), value);

        let first = self.in_first_condition();
        let record = &mut *self.record;
        match key {
            CurrentKey::Id if first => record.condition.weather_id = to_u16(value),
            CurrentKey::Main if first => record.condition.main = to_i32(value),
            CurrentKey::Description if first => record.condition.set_description(value),
            CurrentKey::Icon if first => record.condition.set_icon(value),
            CurrentKey::Id | CurrentKey::Main | CurrentKey::Description | CurrentKey::Icon => {}
            CurrentKey::Lon => record.lon = to_float(value),
            CurrentKey::Lat => record.lat = to_float(value),
            CurrentKey::Temp => record.temp = to_float(value),
            CurrentKey::TempMin => record.temp_min = to_float(value),
            CurrentKey::TempMax => record.temp_max = to_float(value),
            CurrentKey::Pressure => record.pressure = to_u16(value),
            CurrentKey::Humidity => record.humidity = to_u8(value),
            CurrentKey::Visibility => record.visibility = to_u16(value),
            CurrentKey::Speed => record.wind_speed = to_float(value),
            CurrentKey::Deg => record.wind_deg = to_float(value),
            CurrentKey::All => record.clouds = to_u8(value),
            CurrentKey::Dt => record.observation_time = to_u32(value),
            CurrentKey::Sunrise => record.sunrise = to_u32(value),
            CurrentKey::Sunset => record.sunset = to_u32(value),
            CurrentKey::Name => copy_text(&mut record.city_name, value),
            CurrentKey::Country => copy_text(&mut record.country, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonlex::Tokenizer;
    use test_log::test;

    fn decode(json: &str) -> CurrentWeather {
        let mut record = CurrentWeather::default();
        let mut tokenizer: Tokenizer = Tokenizer::new();
        tokenizer
            .parse_full(json.as_bytes(), &mut CurrentListener::new(&mut record))
            .unwrap();
        record
    }

    #[test]
    fn test_first_condition_wins() {
        let record = decode(
            r#"{"weather":[
                {"id":521,"main":"Rain","description":"shower rain","icon":"09d"},
                {"id":701,"main":"Mist","description":"mist","icon":"50d"}
            ]}"#,
        );
        assert_eq!(record.condition.weather_id, 521);
        assert_eq!(record.condition.description, "shower rain");
        assert_eq!(record.condition.icon, "09d");
        assert_eq!(record.condition.icon_glyph, 'R');
        assert_eq!(record.condition.main, 0);
    }

    #[test]
    fn test_condition_fields_outside_weather_ignored() {
        let record = decode(r#"{"id":2657896,"sys":{"id":6016,"icon":"01d"}}"#);
        assert_eq!(record.condition.weather_id, 0);
        assert_eq!(record.condition.icon, "");
    }

    #[test]
    fn test_nested_fields() {
        let record = decode(
            r#"{"coord":{"lon":8.55,"lat":47.37},
                "main":{"temp":290.56,"pressure":1013,"humidity":87,"temp_min":289.15,"temp_max":292.15},
                "visibility":10000,"wind":{"speed":1.5,"deg":30},"clouds":{"all":75},
                "dt":1527015000,"sys":{"country":"CH","sunrise":1526959920,"sunset":1527016271},
                "name":"Zurich"}"#,
        );
        assert_eq!(record.lon, 8.55);
        assert_eq!(record.lat, 47.37);
        assert_eq!(record.temp, 290.56);
        assert_eq!(record.temp_min, 289.15);
        assert_eq!(record.temp_max, 292.15);
        assert_eq!(record.pressure, 1013);
        assert_eq!(record.humidity, 87);
        assert_eq!(record.visibility, 10000);
        assert_eq!(record.wind_speed, 1.5);
        assert_eq!(record.wind_deg, 30.0);
        assert_eq!(record.clouds, 75);
        assert_eq!(record.observation_time, 1_527_015_000);
        assert_eq!(record.sunrise, 1_526_959_920);
        assert_eq!(record.sunset, 1_527_016_271);
        assert_eq!(record.country, "CH");
        assert_eq!(record.city_name, "Zurich");
    }

    #[test]
    fn test_unknown_and_malformed() {
        let record = decode(r#"{"cod":200,"base":"stations","main":{"temp":"warm","humidity":null}}"#);
        assert_eq!(record.temp, 0.0);
        assert_eq!(record.humidity, 0);
    }
}
