//! Authenticated HTTP client for the Jamf Pro Classic API.
//!
//! `JamfClient` pairs a `reqwest::Client` with the normalized server URL
//! and the session headers obtained from [`crate::auth::obtain_session`].
//! Every request is awaited to completion before the next one starts; no
//! request is retried.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;

use crate::auth::SessionHeaders;
use crate::error::{JamfError, Result};

/// Connect timeout covering TCP + TLS handshake only. Reading the response
/// body is left unbounded, as large script bodies can be slow to stream.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Strips trailing slashes so paths can be joined with a single `/`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Builds the transport shared by the token exchange and the API client.
pub(crate) fn build_http_client() -> Result<Client> {
    Ok(Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?)
}

/// Authenticated client for `{base_url}/JSSResource/...` requests.
pub struct JamfClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl JamfClient {
    /// Creates a client for `base_url` (trailing slash optional) that sends
    /// `session`'s headers on every request.
    pub fn new(base_url: &str, session: &SessionHeaders) -> Result<Self> {
        Ok(JamfClient {
            client: build_http_client()?,
            base_url: normalize_base_url(base_url),
            headers: session.header_map()?,
        })
    }

    /// The server URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the server root.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends an authenticated GET and returns the body as text.
    ///
    /// The body is read before the status check so a failure keeps the
    /// server's diagnostic in [`JamfError::Fetch`].
    pub async fn get_text(&self, path: &str) -> Result<String> {
        let url = self.url_for(path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(JamfError::Fetch { url, status, body });
        }
        Ok(body)
    }
}
