// SPDX-License-Identifier: Apache-2.0

//! Client settings.

pub const DEFAULT_HOST: &str = "api.openweathermap.org";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 10_000;

/// Unit system requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Units {
    /// Celsius, metres per second.
    #[default]
    Metric,
    /// Fahrenheit, miles per hour.
    Imperial,
}

impl Units {
    pub const fn as_str(self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// Everything a [`WeatherClient`](crate::WeatherClient) needs besides the
/// API key and the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig<'a> {
    host: &'a str,
    port: u16,
    units: Units,
    language: &'a str,
    idle_timeout_ms: u64,
}

impl Default for ClientConfig<'_> {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            units: Units::Metric,
            language: DEFAULT_LANGUAGE,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

impl<'a> ClientConfig<'a> {
    pub fn with_host(mut self, host: &'a str) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Two-letter code for `description` texts, e.g. `"de"`.
    pub fn with_language(mut self, language: &'a str) -> Self {
        self.language = language;
        self
    }

    /// Longest silence tolerated while waiting for response bytes.
    pub fn with_idle_timeout_ms(mut self, idle_timeout_ms: u64) -> Self {
        self.idle_timeout_ms = idle_timeout_ms;
        self
    }

    pub fn host(&self) -> &'a str {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn language(&self) -> &'a str {
        self.language
    }

    pub fn idle_timeout_ms(&self) -> u64 {
        self.idle_timeout_ms
    }
}
