//! Download Jamf Pro scripts and policies and search them for a keyword.
//!
//! Authenticates against the Jamf Pro API with a bearer token, lists the
//! Classic API `scripts` and `policies` collections, archives every
//! resource's XML locally, and reports where a keyword occurs along with a
//! deep link into the Jamf Pro console.
//!
//! # Modules
//!
//! - [`archive`] — Sanitized on-disk storage of downloaded documents.
//! - [`auth`] — Username/password to bearer-token exchange.
//! - [`client`] — Authenticated HTTP wrapper for the Classic API.
//! - [`error`] — Typed error hierarchy (`JamfError`).
//! - [`pipeline`] — The fetch, archive and search run over both collections.
//! - [`resources`] — Collection listing and per-id detail retrieval.
//! - [`search`] — Script and policy keyword matchers and their reports.
//! - [`xml`] — Owned XML tree with by-tag navigation.
//!
//! # Quick Start
//!
//! ```ignore
//! use jamf_search::pipeline::{SearchJob, run};
//! use jamf_search::search::SearchOptions;
//!
//! let job = SearchJob {
//!     base_url: "https://jamf.example.com".to_string(),
//!     user: "api-reader".to_string(),
//!     password: "secret".to_string(),
//!     options: SearchOptions::new("curl", false),
//!     output_dir: "output".into(),
//! };
//! run(&job, &mut std::io::stdout().lock()).await?;
//! ```

#![warn(missing_docs)]

pub mod archive;
pub mod auth;
pub mod client;
pub mod error;
pub mod pipeline;
pub mod resources;
pub mod search;
pub mod xml;
