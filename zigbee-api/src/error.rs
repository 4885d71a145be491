use time::error::Parse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request could not complete at all
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend asks for a new login
    #[error("authentication required")]
    Unauthenticated,

    /// Any other non-2xx answer
    #[error("#{status_code} {status_text} ({body})")]
    Rejected {
        status_code: u16,
        status_text: String,
        body: String,
    },
}

impl ApiError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }

    /// Status line without the response body.
    pub fn summary(&self) -> String {
        match self {
            ApiError::Rejected {
                status_code,
                status_text,
                ..
            } => format!("#{status_code} {status_text}"),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp too short: {0:?}")]
    TooShort(String),

    #[error("invalid timestamp {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: Parse,
    },
}
