//! Discord-specific error handling for the bot.
//!
//! Converts serenity errors into the engine's error taxonomy so the engine
//! can log them at the right level: permanent failures as errors,
//! rate limits and transient failures as warnings.

use std::time::Duration;

use jolly_core::Error;
use serenity::http::HttpError;
use tracing::debug;

/// Classify a serenity `Error` into a `jolly_core::Error`.
pub fn classify(op: &str, err: &serenity::Error) -> Error {
    match err {
        serenity::Error::Http(http_err) => classify_http(op, http_err),
        _ => {
            debug!("Non-HTTP serenity error on '{}': {}", op, err);
            Error::Transient(err.to_string())
        }
    }
}

fn classify_http(op: &str, http_err: &HttpError) -> Error {
    match http_err {
        HttpError::UnsuccessfulRequest(resp) => {
            let status = resp.status_code.as_u16();
            debug!(
                "Discord error on '{}' (HTTP {} / code {}): {}",
                op, status, resp.error.code, resp.error.message
            );
            from_status(status, &resp.error.message)
        }

        // Network / request-level failures (not Discord API errors)
        _ => {
            debug!("Network-level HTTP error on '{}': {}", op, http_err);
            Error::Transient(http_err.to_string())
        }
    }
}

/// Map an HTTP status from the Discord API to an engine error.
fn from_status(status: u16, message: &str) -> Error {
    match status {
        // Real value is in the JSON body; serenity's ratelimiter has
        // already waited by the time we see this.
        429 => Error::RateLimited(Duration::from_secs(1)),
        400 | 401 | 403 | 404 => Error::Permanent {
            status,
            message: message.to_string(),
        },
        _ => Error::Transient(format!("HTTP {}: {}", status, message)),
    }
}
