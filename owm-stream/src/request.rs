// SPDX-License-Identifier: Apache-2.0

//! HTTP request text for the two supported endpoints.

use core::fmt::Write as _;

use heapless::String;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::ClientConfig;
use crate::error::FetchError;

pub(crate) const REQUEST_LEN: usize = 384;

const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/data/2.5/weather`
    Current,
    /// `/data/2.5/forecast`
    Forecast,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "/data/2.5/weather",
            Endpoint::Forecast => "/data/2.5/forecast",
        }
    }
}

/// Where to report the weather for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    /// City name, optionally with country code: `"Zurich,CH"`.
    Name(&'a str),
    /// Numeric city id from the service's city list.
    Id(&'a str),
}

impl Location<'_> {
    fn parameter(&self) -> (&'static str, &str) {
        match *self {
            Location::Name(name) => ("q", name),
            Location::Id(id) => ("id", id),
        }
    }
}

/// Writes the full request for `endpoint`, headers included.
pub(crate) fn build_request(
    endpoint: Endpoint,
    location: Location<'_>,
    app_id: &str,
    config: &ClientConfig<'_>,
) -> Result<String<REQUEST_LEN>, FetchError> {
    let mut request = String::new();
    let (name, value) = location.parameter();
    write!(
        request,
        "GET {}?{}={}&appid={}&units={}&lang={} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        endpoint.path(),
        name,
        utf8_percent_encode(value, QUERY_ENCODE_SET),
        utf8_percent_encode(app_id, QUERY_ENCODE_SET),
        config.units().as_str(),
        utf8_percent_encode(config.language(), QUERY_ENCODE_SET),
        config.host(),
    )
    .map_err(|_| FetchError::RequestTooLong)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Units;

    #[test]
    fn test_current_by_name() {
        let request = build_request(
            Endpoint::Current,
            Location::Name("Zurich,CH"),
            "0123abcd",
            &ClientConfig::default(),
        )
        .unwrap();
        assert_eq!(
            request,
            "GET /data/2.5/weather?q=Zurich%2CCH&appid=0123abcd&units=metric&lang=en HTTP/1.1\r\n\
             Host: api.openweathermap.org\r\n\
             Connection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_forecast_by_id() {
        let config = ClientConfig::default()
            .with_host("localhost")
            .with_units(Units::Imperial)
            .with_language("de");
        let request = build_request(Endpoint::Forecast, Location::Id("2657896"), "k", &config).unwrap();
        assert!(request.starts_with(
            "GET /data/2.5/forecast?id=2657896&appid=k&units=imperial&lang=de HTTP/1.1\r\n"
        ));
        assert!(request.contains("\r\nHost: localhost\r\n"));
    }

    #[test]
    fn test_location_is_encoded() {
        let request = build_request(
            Endpoint::Current,
            Location::Name("São Paulo&x=1"),
            "k",
            &ClientConfig::default(),
        )
        .unwrap();
        assert!(request.contains("?q=S%C3%A3o%20Paulo%26x%3D1&appid=k"));
    }

    #[test]
    fn test_too_long() {
        let long = "x".repeat(REQUEST_LEN);
        assert_eq!(
            build_request(Endpoint::Current, Location::Name(&long), "k", &ClientConfig::default()),
            Err(FetchError::RequestTooLong)
        );
    }
}
