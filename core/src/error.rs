//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `HttpError` with the raw
//! status code and body for debugging. `EmptyTitle` never reaches the
//! network: it is raised before a request is built.

use std::fmt;

/// Errors returned by `TodoClient` parse methods and `TodoStore` operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404; the requested todo does not exist.
    NotFound,

    /// The server returned a non-2xx status other than 404.
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// No response was obtained: connection refused, DNS failure, timeout.
    Transport(String),

    /// A create or update was attempted with a blank title.
    EmptyTitle,
}

impl ApiError {
    /// Whether the failure happened before anything was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, ApiError::EmptyTitle | ApiError::SerializationError(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::HttpError { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::Transport(msg) => write!(f, "request failed: {msg}"),
            ApiError::EmptyTitle => write!(f, "title must not be empty"),
        }
    }
}

impl std::error::Error for ApiError {}
