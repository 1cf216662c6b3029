//! Error types for the Hostnine API client.
//!
//! # Design
//! The upstream API answers almost everything with HTTP 200 and reports
//! failures in prose, so `ApiError` distinguishes only four cases: the
//! exchange never completed, the reply was not a usable envelope, the
//! module was unknown, or the key was missing or rejected. There is no
//! transient/permanent split: every error ends the call.

use thiserror::Error;

/// Boxed cause of a transport failure.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `HostnineClient::parse_*` and `Gateway` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP exchange completed.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// Non-200 status, missing body, or a body that is not a JSON object.
    #[error("invalid response received (HTTP {status})")]
    MalformedResponse { status: u16, body: String },

    /// The upstream rejected the module name.
    #[error("invalid module requested: {message}")]
    InvalidEndpoint { message: String },

    /// The upstream reported a missing or invalid API key.
    #[error("invalid API key provided: {message}")]
    InvalidCredential { message: String },
}

/// Discriminant of `ApiError`, for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    MalformedResponse,
    InvalidEndpoint,
    InvalidCredential,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ApiError::InvalidEndpoint { .. } => ErrorKind::InvalidEndpoint,
            ApiError::InvalidCredential { .. } => ErrorKind::InvalidCredential,
        }
    }
}

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL {0:?} cannot carry a query string")]
    UnsupportedBaseUrl(String),

    #[error("API key is empty")]
    MissingApiKey,

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}
