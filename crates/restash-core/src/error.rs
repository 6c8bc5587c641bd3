// ── Handler error types ──
//
// Two error classes with different propagation rules: configuration
// errors are returned synchronously before any action is dispatched and
// are never swallowed; request errors are always dispatched as `*Error`
// actions and only returned to the caller when the handler's rethrow
// policy says so. The `From<restash_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum HandlerError {
    // ── Configuration errors (pre-dispatch, never swallowed) ─────────
    /// The archive key was never registered with the handler.
    #[error("Unknown archive: {key}")]
    UnknownArchive { key: String },

    /// An update payload carried no `id` field.
    #[error("Entity has no id field")]
    MissingId,

    /// Handler construction failed (bad base URL, TLS setup, etc.).
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Request errors (dispatched, conditionally rethrown) ──────────
    /// Structured error decoded from a non-success response.
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Server-reported error code, or the `__unknown` sentinel.
        code: String,
        status: Option<u16>,
    },

    /// Transport or decode failure below the API error layer.
    #[error("Request failed: {0}")]
    Request(String),
}

impl HandlerError {
    /// Returns `true` for errors raised before any action was dispatched.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownArchive { .. } | Self::MissingId | Self::Config { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<restash_api::Error> for HandlerError {
    fn from(err: restash_api::Error) -> Self {
        match err {
            restash_api::Error::Api {
                message,
                code,
                status,
                body: _,
            } => HandlerError::Api {
                message,
                code,
                status: Some(status),
            },
            restash_api::Error::InvalidUrl(e) => HandlerError::Config {
                message: format!("Invalid URL: {e}"),
            },
            restash_api::Error::Tls(msg) => HandlerError::Config {
                message: format!("TLS error: {msg}"),
            },
            restash_api::Error::Transport(e) => HandlerError::Request(e.to_string()),
            restash_api::Error::Deserialization { message, body: _ } => {
                HandlerError::Request(format!("Deserialization error: {message}"))
            }
        }
    }
}
