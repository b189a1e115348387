use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::FetchError;

/// Thin wrapper over `reqwest` for parameterized GET requests against the
/// dispatch website. Authentication and cookie lifecycle live outside this
/// crate; the session only performs requests.
#[derive(Debug)]
pub struct Session {
    client: Client,
    base_url: Url,
}

impl Session {
    /// Creates a session pointed at `base_url` (production site or a mock
    /// server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be constructed,
    /// or [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure exactly one trailing slash so joined paths land under the
        // base rather than replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| FetchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Sends a GET request for `path` with the given query parameters and
    /// returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] on network failure or
    /// [`FetchError::UnexpectedStatus`] on a non-2xx response.
    pub async fn get_text(&self, path: &str, params: &[(&str, &str)]) -> Result<String, FetchError> {
        let url = self.build_url(path, params);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_appends_encoded_query_params() {
        let session = Session::new("http://bamboo-mec.de", 30, "test-agent").unwrap();
        let url = session.build_url("ll.php5", &[("status", "delivered"), ("datum", "06.05.2014")]);
        assert_eq!(
            url.as_str(),
            "http://bamboo-mec.de/ll.php5?status=delivered&datum=06.05.2014"
        );
    }

    #[test]
    fn trailing_slash_on_base_url_is_tolerated() {
        let session = Session::new("http://bamboo-mec.de/", 30, "test-agent").unwrap();
        let url = session.build_url("ll_detail.php5", &[("uuid", "1234567")]);
        assert_eq!(
            url.as_str(),
            "http://bamboo-mec.de/ll_detail.php5?uuid=1234567"
        );
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        let err = Session::new("not a url", 30, "test-agent").unwrap_err();
        assert!(matches!(err, FetchError::InvalidBaseUrl { .. }), "{err}");
    }
}
