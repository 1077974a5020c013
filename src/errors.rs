#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("notification error: {0}")]
    Notification(String),
}

// Rejected carries the provider's wording, shown to the patient unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("scheduling service unreachable: {0}")]
    Transport(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response from scheduling service: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected { .. })
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
