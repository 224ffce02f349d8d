// SPDX-License-Identifier: Apache-2.0

use jsonlex::{JsonListener, Tokenizer};
use log::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::context::HourFilter;
use crate::current::CurrentListener;
use crate::error::{FetchError, ForecastError};
use crate::forecast::ForecastListener;
use crate::model::{CurrentWeather, Forecast};
use crate::request::{build_request, Endpoint, Location};
use crate::transport::{Clock, Transport};

/// Capacity of the tokenizer's key/value buffer.
pub(crate) const TOKEN_LEN: usize = 64;

/// Skips everything before the first `{` or `[` (the HTTP status line and
/// headers), then lexes exactly one JSON document and ignores what follows.
struct BodyFeeder {
    tokenizer: Tokenizer<u32, TOKEN_LEN>,
    started: bool,
}

impl BodyFeeder {
    fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            started: false,
        }
    }

    fn feed<L>(&mut self, byte: u8, listener: &mut L) -> Result<(), FetchError>
    where
        L: JsonListener,
    {
        if !self.started {
            if byte != b'{' && byte != b'[' {
                return Ok(());
            }
            debug!("JSON body started");
            self.started = true;
        }
        if self.tokenizer.is_finished() {
            return Ok(());
        }
        self.tokenizer.feed(byte, listener).map_err(|e| {
            warn!("Malformed JSON: {e}");
            FetchError::from(e)
        })
    }

    fn feed_slice<L>(&mut self, data: &[u8], listener: &mut L) -> Result<(), FetchError>
    where
        L: JsonListener,
    {
        data.iter().try_for_each(|&byte| self.feed(byte, listener))
    }

    /// Checks that a complete document was seen.
    fn finish<L>(&mut self, listener: &mut L) -> Result<(), FetchError>
    where
        L: JsonListener,
    {
        if !self.started {
            warn!("No JSON body in response");
            return Err(FetchError::Incomplete);
        }
        self.tokenizer.finish(listener).map(|_| ()).map_err(|e| {
            warn!("Response ended early: {e}");
            FetchError::Incomplete
        })
    }
}

/// Fetches weather over a [`Transport`] and decodes it while it streams in.
pub struct WeatherClient<'a, T, C> {
    transport: T,
    clock: C,
    config: ClientConfig<'a>,
}

impl<'a, T: Transport, C: Clock> WeatherClient<'a, T, C> {
    pub fn new(transport: T, clock: C, config: ClientConfig<'a>) -> Self {
        Self {
            transport,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig<'a> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig<'a> {
        &mut self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.clock)
    }

    /// Fetches current conditions into `record`.
    ///
    /// On any failure `record` is reset to its default.
    pub fn update_current(
        &mut self,
        record: &mut CurrentWeather,
        app_id: &str,
        location: Location<'_>,
    ) -> Result<(), FetchError> {
        let result = self.fetch(
            Endpoint::Current,
            location,
            app_id,
            &mut CurrentListener::new(record),
        );
        if let Err(e) = result {
            error!("Current weather update failed: {e}");
            record.clear();
        }
        result
    }

    /// Fetches forecast entries into `slots`, keeping only those whose UTC
    /// hour is in `hours`. Returns the number of slots filled.
    ///
    /// On failure the slots filled so far stay valid and their count is
    /// reported in the error.
    pub fn update_forecasts(
        &mut self,
        slots: &mut [Forecast],
        app_id: &str,
        location: Location<'_>,
        hours: &HourFilter,
    ) -> Result<usize, ForecastError> {
        let mut listener = ForecastListener::new(slots, hours);
        let result = self.fetch(Endpoint::Forecast, location, app_id, &mut listener);
        let filled = listener.filled();
        match result {
            Ok(()) => {
                info!("Decoded {filled} forecasts");
                Ok(filled)
            }
            Err(e) => {
                error!("Forecast update failed after {filled} entries: {e}");
                Err(ForecastError::new(filled, e))
            }
        }
    }

    fn fetch<L>(
        &mut self,
        endpoint: Endpoint,
        location: Location<'_>,
        app_id: &str,
        listener: &mut L,
    ) -> Result<(), FetchError>
    where
        L: JsonListener,
    {
        let started_at = self.clock.now_ms();
        let request = build_request(endpoint, location, app_id, &self.config)?;
        let (host, port) = (self.config.host(), self.config.port());

        info!("Requesting {} from {}:{}", endpoint.path(), host, port);
        if !self.transport.open(host, port) {
            return Err(FetchError::ConnectFailed);
        }
        if !self.transport.write(request.as_bytes()) {
            self.transport.close();
            return Err(FetchError::WriteFailed);
        }

        let result = self.pump(listener, started_at);
        self.transport.close();
        result
    }

    /// Reads until the peer closes. `last_byte_at` starts the idle timer.
    fn pump<L>(&mut self, listener: &mut L, mut last_byte_at: u64) -> Result<(), FetchError>
    where
        L: JsonListener,
    {
        let timeout = self.config.idle_timeout_ms();
        let mut body = BodyFeeder::new();

        while self.transport.is_alive() || self.transport.has_buffered_data() {
            if self.clock.now_ms().saturating_sub(last_byte_at) > timeout {
                warn!("No data for {timeout} ms");
                return Err(FetchError::IdleTimeout);
            }
            let mut received = false;
            while let Some(byte) = self.transport.read_byte() {
                received = true;
                body.feed(byte, listener)?;
            }
            if received {
                last_byte_at = self.clock.now_ms();
            }
            self.transport.yield_now();
        }
        body.finish(listener)
    }
}

/// Decodes a current-weather response that is already in memory.
///
/// `payload` may include the HTTP headers. On failure `record` is reset to
/// its default.
pub fn decode_current(payload: &[u8], record: &mut CurrentWeather) -> Result<(), FetchError> {
    let mut listener = CurrentListener::new(record);
    let mut body = BodyFeeder::new();
    let result = body
        .feed_slice(payload, &mut listener)
        .and_then(|()| body.finish(&mut listener));
    if result.is_err() {
        record.clear();
    }
    result
}

/// Decodes a forecast response that is already in memory. Returns the number
/// of slots filled.
pub fn decode_forecasts(
    payload: &[u8],
    slots: &mut [Forecast],
    hours: &HourFilter,
) -> Result<usize, ForecastError> {
    let mut listener = ForecastListener::new(slots, hours);
    let mut body = BodyFeeder::new();
    let result = body
        .feed_slice(payload, &mut listener)
        .and_then(|()| body.finish(&mut listener));
    let filled = listener.filled();
    result
        .map(|()| filled)
        .map_err(|e| ForecastError::new(filled, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonlex::ErrKind;
    use test_log::test;

    #[test]
    fn test_headers_are_skipped() {
        let payload = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"name\":\"Bern\"}";
        let mut record = CurrentWeather::default();
        decode_current(payload, &mut record).unwrap();
        assert_eq!(record.city_name, "Bern");
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut record = CurrentWeather::default();
        decode_current(b"{\"name\":\"Bern\"}\r\n0\r\n\r\n{garbage", &mut record).unwrap();
        assert_eq!(record.city_name, "Bern");
    }

    #[test]
    fn test_no_body() {
        let mut record = CurrentWeather::default();
        assert_eq!(
            decode_current(b"HTTP/1.1 204 No Content\r\n\r\n", &mut record),
            Err(FetchError::Incomplete)
        );
    }

    #[test]
    fn test_malformed_clears() {
        let mut record = CurrentWeather::default();
        let result = decode_current(b"{\"name\":\"Bern\",}", &mut record);
        match result {
            Err(FetchError::Json(e)) => assert_eq!(e.kind(), ErrKind::TrailingComma),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(record, CurrentWeather::default());
    }

    #[test]
    fn test_truncated_forecast_keeps_count() {
        let mut slots: [Forecast; 3] = Default::default();
        let result = decode_forecasts(
            br#"{"list":[{"dt":1527066000,"dt_txt":"a"},{"dt":1527076800,"main":{"te"#,
            &mut slots,
            &HourFilter::any(),
        );
        assert_eq!(result, Err(ForecastError::new(1, FetchError::Incomplete)));
        assert_eq!(slots[0].observation_time_text, "a");
    }
}
