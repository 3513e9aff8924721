use thiserror::Error;

// ── TokenError ──────────────────────────────────────────────────────

/// Why a bearer token could not be turned into claims.
///
/// Every variant is treated the same way downstream: the session counts as
/// invalid and the user is sent back to the login page. The variants only
/// exist so logs and the CLI can say what went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No token was supplied.
    #[error("missing token")]
    Missing,

    /// Fewer than two `.`-delimited segments.
    #[error("token has {0} segment(s), expected at least 2")]
    Malformed(usize),

    /// Payload segment is not valid base64url.
    #[error("payload is not base64: {0}")]
    Base64(String),

    /// Decoded payload bytes are not UTF-8.
    #[error("payload is not utf-8")]
    Utf8,

    /// Decoded payload is not JSON.
    #[error("payload is not json: {0}")]
    Json(String),

    /// Payload is JSON, but not an object.
    #[error("payload is not a json object")]
    NotAnObject,
}

// ── ConfigError ─────────────────────────────────────────────────────

/// Invalid session configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `--session-check-interval` is not a whole number of seconds.
    #[error("invalid check interval: {0}")]
    InvalidInterval(String),

    /// A zero polling interval would spin.
    #[error("check interval must be at least one second")]
    ZeroInterval,
}
