//! Typed error hierarchy for the jamf-search crate.
//!
//! Every variant maps to a real system boundary: the token endpoint
//! (`Auth`), the Classic API (`Fetch`, `MalformedResponse`, `Network`),
//! and the local filesystem or console (`Io`). All of them are fatal for
//! the run; the only recoverable condition (a detail document that does
//! not parse after being archived) never becomes an error value at all.
//!
//! `#[source]` fields let callers walk the cause chain with
//! `Error::source()`, which `main` uses to print the full chain on exit.

use std::path::PathBuf;

use reqwest::StatusCode;

use crate::xml::XmlError;

/// Unified error type for all jamf-search operations.
#[derive(Debug, thiserror::Error)]
pub enum JamfError {
    /// The credential exchange at `/api/v1/auth/token` failed.
    ///
    /// Covers both a non-success HTTP status (the message carries the
    /// status and response body) and a success response that did not
    /// contain a usable `token` field.
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description of the failure.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A listing or detail request returned a non-success status code.
    ///
    /// The response body is preserved because Jamf Pro puts its
    /// diagnostic HTML/XML there (e.g. "The server has not found anything
    /// matching the request URI").
    #[error("request to {url} failed with {status}: {body}")]
    Fetch {
        /// The full URL that was requested.
        url: String,
        /// The HTTP status code returned by the server.
        status: StatusCode,
        /// The raw response body text, or an empty string if unreadable.
        body: String,
    },

    /// A collection listing came back but is not well-formed XML.
    #[error("malformed XML in response from {url}")]
    MalformedResponse {
        /// The listing URL whose body failed to parse.
        url: String,
        /// The parser diagnostic.
        #[source]
        source: XmlError,
    },

    /// A transport-level failure (DNS, TCP, TLS) with no HTTP status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Writing an archived document or the console report failed.
    #[error("I/O error on {}", path.display())]
    Io {
        /// The file or directory being written. Empty for console writes.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, JamfError>;
