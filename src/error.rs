use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("upstream authentication failed: HTTP {0}")]
    UpstreamAuthFailed(StatusCode),
    #[error("upstream rejected request: HTTP {status}: {body}")]
    UpstreamRejected { status: StatusCode, body: String },
    #[error("upstream stream failed: {0}")]
    Stream(String),
    #[error("invalid event data: {0}")]
    InvalidEventData(String),
    #[error("failed to encode chunk: {0}")]
    Encode(#[from] serde_json::Error),
}
