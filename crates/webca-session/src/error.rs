//! Error types for session operations.

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The record carries no session identifier and cannot be stored.
    #[error("Session record has no identifier")]
    MissingId,

    /// Callers may not write or remove reserved record keys.
    #[error("Reserved session key: {0}")]
    ReservedKey(String),

    /// The random source failed or returned a short read.
    #[error("Entropy source failure: {0}")]
    Entropy(String),

    /// The session cookie header could not be parsed.
    #[error("Malformed cookie header: {0}")]
    Cookie(#[from] CookieError),
}

/// Failure reading a cookie from an inbound request.
///
/// An absent cookie is not an error; readers report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    /// Header bytes are not valid text.
    #[error("cookie header is not valid text")]
    InvalidHeader,

    /// A cookie pair failed to parse.
    #[error("invalid cookie pair: {0}")]
    InvalidPair(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
