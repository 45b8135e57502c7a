use thiserror::Error;

/// Errors raised by the core library
#[derive(Debug, Error)]
pub enum PromptsmithError {
    #[error("Could not reach the generation service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation service error {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Unexpected response from generation service: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PromptsmithError {
    /// True for failures where the service was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, PromptsmithError::Transport(_))
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, PromptsmithError>;
