use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    /// An upstream source failed entirely for one postal code.
    /// Non-fatal: the orchestrator records it and continues with the rest.
    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Upstream throttling that survived the retry budget.
    #[error("rate limited by upstream")]
    RateLimited,

    #[error("unexpected upstream status: {0}")]
    UpstreamStatus(u16),

    #[error("host not in allowlist for URL {0}")]
    HostNotAllowed(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single malformed record inside an otherwise good payload.
    #[error("malformed record: {0}")]
    Parse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScoutError {
    /// Demote any fetch-path failure to `SourceUnavailable` for `source`.
    pub fn into_unavailable(self, source: &str) -> ScoutError {
        match self {
            e @ ScoutError::SourceUnavailable { .. } => e,
            other => ScoutError::SourceUnavailable {
                source_name: source.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
