use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from the geocoding service")]
    UnexpectedStatus { status: u16 },

    #[error("invalid geocoder base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to deserialize geocoder response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("geocoder returned unparseable coordinate '{value}'")]
    InvalidCoordinates { value: String },

    /// The service answered but found nothing for the query.
    #[error("no match for address '{query}'")]
    NoMatch { query: String },
}

impl GeoError {
    /// Returns `true` for errors worth another attempt after a back-off
    /// delay. A clean "no match" answer is final; a server hiccup is not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::UnexpectedStatus { status } => *status >= 500 || *status == 429,
            Self::InvalidBaseUrl { .. }
            | Self::Deserialize { .. }
            | Self::InvalidCoordinates { .. }
            | Self::NoMatch { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_transient() {
        assert!(GeoError::UnexpectedStatus { status: 503 }.is_transient());
        assert!(GeoError::UnexpectedStatus { status: 429 }.is_transient());
        assert!(!GeoError::UnexpectedStatus { status: 403 }.is_transient());
    }

    #[test]
    fn no_match_is_final() {
        let err = GeoError::NoMatch {
            query: "Nirgendwo 1".to_owned(),
        };
        assert!(!err.is_transient());
    }
}
