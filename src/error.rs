//! Unified error type.

use crate::method::Method;
use crate::token::TokenError;

/// The error type returned by carebox's fallible operations.
///
/// Application-level outcomes (401, 404, 400, ...) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding a port, talking to the session cache,
/// building the route table, loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session cache: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("token: {0}")]
    Token(#[from] TokenError),

    #[error("background task: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("password hashing: {0}")]
    Password(#[from] bcrypt::BcryptError),

    /// Two routes share `(segment_count, action, method)`.
    #[error("duplicate route: {method} {action} ({segment_count} segments)")]
    DuplicateRoute {
        method: Method,
        segment_count: usize,
        action: String,
    },

    #[error("invalid route `{pattern}`: {reason}")]
    InvalidRoute { pattern: String, reason: String },

    #[error("config: {0}")]
    Config(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),
}
