//! HTTP client for the news backend.
//!
//! Three endpoints are consumed:
//!
//! | Endpoint | Method | Purpose |
//! |---|---|---|
//! | `/apps/news/fetch` | GET | Articles for a category, optionally filtered by search term or sourced from an alternate URL |
//! | `/apps/news/admin/fetch_source` | GET | Admin lookup of a source record by id |
//! | `/apps/news/import` | POST (form) | Admin import of an opaque base64 payload |
//!
//! All of them answer with a JSON envelope carrying a boolean `success` flag
//! and either a payload or an `error` message. [`NewsClient`] turns those
//! envelopes into `Result`s with a [`FetchError`] taxonomy. Requests are
//! never retried, never timed out and never cancelled.

mod client;
mod request;

pub use client::NewsClient;
pub use request::{FetchRequest, SOURCE_PARAM};

use thiserror::Error;

use crate::util::UrlValidationError;

pub const FETCH_PATH: &str = "apps/news/fetch";
pub const FETCH_SOURCE_PATH: &str = "apps/news/admin/fetch_source";
pub const IMPORT_PATH: &str = "apps/news/import";

/// Maximum accepted response body (5 MB).
pub const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

/// Errors from a backend request.
///
/// `Display` yields the human-readable cause shown inline in the UI.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never completed (DNS, connect, TLS, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx status. `message` comes from the body's `error` field when
    /// present, else `HTTP error! Status: <code>`.
    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    /// 2xx response whose `success` flag was not `true`.
    #[error("{0}")]
    Application(String),

    /// 2xx response whose body is not JSON.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),

    /// The custom source URL was refused before any request was made.
    #[error("Invalid custom source URL: {0}")]
    InvalidSourceUrl(#[from] UrlValidationError),

    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),

    /// Required user input was empty; no request was made.
    #[error("{0}")]
    EmptyInput(&'static str),

    /// User input exceeded the accepted length; no request was made.
    #[error("Input too long (max {0} characters)")]
    InputTooLong(usize),
}

impl FetchError {
    /// HTTP status for `HttpStatus` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
