//! Retry policy for downloads with error classification.

use reqwest::StatusCode;

/// Maximum number of attempts for a download.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Download failures that another attempt will not fix.
#[derive(Debug, thiserror::Error)]
pub enum NonRetryableError {
    /// HTTP 401
    #[error("Release archive requires authentication: {0}")]
    Unauthorized(String),
    /// HTTP 403
    #[error("Access to release archive forbidden: {0}")]
    Forbidden(String),
    /// HTTP 404
    #[error("Not found: no release archive at {0}")]
    NotFound(String),
    /// HTTP 429
    #[error("Download host is throttling requests for {0}. Try again later.")]
    TooManyRequests(String),
    /// Any other 4xx
    #[error("Request for {url} failed with HTTP {status}")]
    ClientError { url: String, status: u16 },
}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable, Err with a user-friendly message if not.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let Some(status) = error.status() else {
        // Connection errors, timeouts, etc.
        return Ok(());
    };

    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "unknown URL".to_string());

    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::Unauthorized(url)),
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden(url)),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(url)),
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::TooManyRequests(url)),
        s if s.is_client_error() => Err(NonRetryableError::ClientError {
            url,
            status: s.as_u16(),
        }),
        // 5xx server errors are retryable
        _ => Ok(()),
    }
}

/// Checks if an error from `error_for_status()` should be retried.
/// Returns the original error if retryable, or a user-friendly NonRetryableError if not.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
