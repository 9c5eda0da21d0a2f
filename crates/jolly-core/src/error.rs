//! Error types for jolly-core

use std::time::Duration;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the engine or reported by a [`Session`](crate::Session).
#[derive(Debug, Error)]
pub enum Error {
    #[error("channel '{0}' not found in guild")]
    ChannelNotFound(String),

    #[error("Rate limited: retry after {0:?}")]
    RateLimited(Duration),

    #[error("Permanent platform error (HTTP {status}): {message}")]
    Permanent { status: u16, message: String },

    #[error("Transient platform error: {0}")]
    Transient(String),
}

impl Error {
    /// Permanent failures will not succeed on a later attempt.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Error::ChannelNotFound(_) | Error::Permanent { .. })
    }
}

/// Log a failed platform call: permanent errors at `error`, everything
/// else at `warn`. Extra tracing fields and the message follow the error.
macro_rules! log_failure {
    ($err:expr, $($arg:tt)+) => {{
        let err = &$err;
        if err.is_permanent() {
            ::tracing::error!(error = %err, $($arg)+);
        } else {
            ::tracing::warn!(error = %err, $($arg)+);
        }
    }};
}

pub(crate) use log_failure;
