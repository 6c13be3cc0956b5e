//! Error types for the animal API client.
//!
//! # Design
//! The store collapses every variant into a single failure outcome, but the
//! distinction is kept here so logs can say what actually went wrong.

use thiserror::Error;

/// Errors returned by `AnimalClient` parse methods and by transports.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 404: the requested animal does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status outside the operation's success set.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
