use thiserror::Error;

/// Transport-level request failures.
///
/// Domain-level absences (an agency the API has never heard of) are not
/// errors; they surface as failed records in the run summary instead.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request timed out after all retries")]
    Timeout,

    #[error("connection failed after all retries: {0}")]
    Connect(String),

    #[error("server error {status} after all retries")]
    Server { status: u16 },

    #[error("HTTP error {status}")]
    Status { status: u16 },

    #[error("received HTML response, API is blocking or rate limiting requests")]
    Blocked,

    #[error("invalid JSON response: {0}")]
    Json(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(#[from] reqwest::Error),
}
