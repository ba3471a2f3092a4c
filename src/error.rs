//! Unified client error model.
//! Every fallible operation in the library returns `ClientResult<T>`; the variants map
//! the ways an exchange with the backend can go wrong (rejection, undecodable body,
//! transport failure) plus the local failures of token decoding and persistence.

use serde::Deserialize;
use thiserror::Error;

/// Body shape the backend uses for every non-success response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpError {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a status outside 200..=299.
    #[error("remote rejected request ({status}): {message}")]
    RemoteRejection { status: u16, message: String },

    /// A success response whose body did not match the expected shape.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized; nothing was sent.
    #[error("failed to encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    TokenDecode(#[from] TokenDecodeError),

    #[error("no usable credentials; login required")]
    Unauthenticated,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Failures while reading the unverified payload of a bearer token.
#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("token must have three dot-separated segments, found {0}")]
    Segments(usize),

    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Stable snake_case code, suitable for logs and for the CLI's exit messages.
    pub fn code_str(&self) -> &'static str {
        match self {
            ClientError::RemoteRejection { .. } => "remote_rejection",
            ClientError::Decode { .. } => "decode_error",
            ClientError::Encode { .. } => "encode_error",
            ClientError::TokenDecode(_) => "token_decode_error",
            ClientError::Unauthenticated => "unauthenticated",
            ClientError::Transport(_) => "transport_error",
            ClientError::InvalidUrl { .. } => "invalid_url",
            ClientError::Config(_) => "config_error",
            ClientError::Store(_) => "store_error",
        }
    }

    /// True when the caller should surface a login prompt.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ClientError::Unauthenticated => true,
            ClientError::RemoteRejection { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Message carried by a backend rejection, if this is one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ClientError::RemoteRejection { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn store<S: Into<String>>(msg: S) -> Self { ClientError::Store(msg.into()) }
    pub fn config<S: Into<String>>(msg: S) -> Self { ClientError::Config(msg.into()) }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
