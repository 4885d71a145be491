use zigbee_api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("Error while loading: {}", .0.summary())]
    Load(ApiError),

    #[error("Error while saving: {0}")]
    Save(ApiError),

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Invalid date and time: {0:?}")]
    InvalidTimestamp(String),

    #[error("Invalid rule selection: {0}")]
    InvalidSelection(usize),
}

impl PanelError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            PanelError::Load(e) | PanelError::Save(e) => Some(e),
            _ => None,
        }
    }

    /// Authentication failures are terminal regardless of the operation.
    pub fn is_unauthenticated(&self) -> bool {
        self.api().is_some_and(ApiError::is_unauthenticated)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid auth cookie: {0}")]
    Header(String),

    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
}
