// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// Why an update did not produce a complete response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// The transport could not reach the host.
    ConnectFailed,
    /// The request line does not fit the request buffer.
    RequestTooLong,
    /// The transport rejected the request bytes.
    WriteFailed,
    /// No byte arrived within the configured idle timeout.
    IdleTimeout,
    /// The body is not valid JSON.
    Json(jsonlex::Error),
    /// The connection closed before the JSON document was complete.
    Incomplete,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::ConnectFailed => f.write_str("connection failed"),
            FetchError::RequestTooLong => f.write_str("request too long"),
            FetchError::WriteFailed => f.write_str("failed to send request"),
            FetchError::IdleTimeout => f.write_str("timed out waiting for data"),
            FetchError::Json(e) => write!(f, "malformed response: {e}"),
            FetchError::Incomplete => f.write_str("response ended early"),
        }
    }
}

impl From<jsonlex::Error> for FetchError {
    fn from(e: jsonlex::Error) -> Self {
        FetchError::Json(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FetchError {}

/// A failed forecast update. Slots before `filled` hold complete entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastError {
    pub filled: usize,
    pub kind: FetchError,
}

impl ForecastError {
    pub(crate) fn new(filled: usize, kind: FetchError) -> Self {
        Self { filled, kind }
    }
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} forecasts", self.kind, self.filled)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ForecastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonlex::{JsonListener, Tokenizer};

    struct Ignore;

    impl JsonListener for Ignore {
        fn key(&mut self, _: &str) {}
        fn value(&mut self, _: &str) {}
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::IdleTimeout.to_string(), "timed out waiting for data");
        assert_eq!(
            ForecastError::new(3, FetchError::Incomplete).to_string(),
            "response ended early after 3 forecasts"
        );
    }

    #[test]
    fn test_from_json_error() {
        let mut tokenizer: Tokenizer = Tokenizer::new();
        let e = tokenizer.parse_full(b"{]", &mut Ignore).unwrap_err();
        let fetch: FetchError = e.into();
        assert_eq!(fetch, FetchError::Json(e));
        assert!(fetch.to_string().starts_with("malformed response: "));
    }
}
