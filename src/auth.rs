//! Bearer-token authentication against the Jamf Pro API.
//!
//! A single `POST /api/v1/auth/token` with HTTP basic credentials yields a
//! bearer token. The token is wrapped in [`SessionHeaders`] and reused
//! unchanged for every Classic API request of the run; there is no
//! refresh or expiry tracking.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::client::{build_http_client, normalize_base_url};
use crate::error::{JamfError, Result};

/// Token endpoint, relative to the normalized server URL.
const TOKEN_PATH: &str = "api/v1/auth/token";

/// Media type requested from the Classic API.
pub const ACCEPT_XML: &str = "application/xml";

/// Body returned by the token endpoint.
///
/// Both fields are optional so that a 200 response without a token is
/// reported as "no token obtained" rather than as a JSON error.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// ISO 8601 expiry timestamp. Parsed but never acted on.
    #[serde(default)]
    pub expires: Option<String>,
}

/// The header set proving an authenticated session.
///
/// Immutable once obtained. `Debug` never prints the token itself.
#[derive(Clone)]
pub struct SessionHeaders {
    token: String,
}

impl std::fmt::Debug for SessionHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHeaders")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl SessionHeaders {
    /// Wraps an already-issued token, bypassing the token endpoint.
    /// Used by tests and by callers that obtained a token elsewhere.
    pub fn from_token(token: &str) -> Self {
        SessionHeaders {
            token: token.to_string(),
        }
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Builds the `Authorization` + `Accept` header map sent on every request.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut bearer =
            HeaderValue::from_str(&self.authorization()).map_err(|e| JamfError::Auth {
                message: "token contains characters not allowed in a header".to_string(),
                source: Some(Box::new(e)),
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_XML));
        Ok(headers)
    }
}

/// Exchanges a username and password for a bearer session.
///
/// `base_url` may carry a trailing slash. The response body is read before
/// the status check so that the server's explanation is kept in the error.
///
/// # Errors
///
/// `JamfError::Auth` when the request cannot be sent, the server answers
/// with a non-success status, the body is not JSON, or the JSON carries no
/// usable `token`.
pub async fn obtain_session(base_url: &str, user: &str, password: &str) -> Result<SessionHeaders> {
    let url = format!("{}/{}", normalize_base_url(base_url), TOKEN_PATH);
    let client = build_http_client()?;

    tracing::debug!(%url, %user, "requesting bearer token");
    let response = client
        .post(&url)
        .basic_auth(user, Some(password))
        .send()
        .await
        .map_err(|e| auth_error("token request could not be sent", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| auth_error("failed to read token response", e))?;

    if !status.is_success() {
        return Err(JamfError::Auth {
            message: format!("token request failed ({status}): {body}"),
            source: None,
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&body).map_err(|e| auth_error("failed to parse token response", e))?;

    match parsed.token {
        Some(token) if !token.is_empty() => Ok(SessionHeaders { token }),
        _ => Err(JamfError::Auth {
            message: "no token obtained".to_string(),
            source: None,
        }),
    }
}

fn auth_error<E>(message: &str, source: E) -> JamfError
where
    E: std::error::Error + Send + Sync + 'static,
{
    JamfError::Auth {
        message: message.to_string(),
        source: Some(Box::new(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_deserializes_from_jamf_format() {
        let json = r#"{"token": "eyJhbGciOi.test", "expires": "2026-10-19T21:00:00.000Z"}"#;
        let resp: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.as_deref(), Some("eyJhbGciOi.test"));
        assert_eq!(resp.expires.as_deref(), Some("2026-10-19T21:00:00.000Z"));
    }

    #[test]
    fn token_response_without_token_still_deserializes() {
        let resp: TokenResponse = serde_json::from_str(r#"{"httpStatus": 200}"#).unwrap();
        assert!(resp.token.is_none());
    }

    #[test]
    fn header_map_carries_bearer_and_xml_accept() {
        let headers = SessionHeaders::from_token("abc").header_map().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/xml");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn header_map_rejects_control_characters() {
        let result = SessionHeaders::from_token("bad\ntoken").header_map();
        assert!(matches!(result, Err(JamfError::Auth { .. })));
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", SessionHeaders::from_token("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("redacted"));
    }
}
