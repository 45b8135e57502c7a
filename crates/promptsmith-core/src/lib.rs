pub mod client;
pub mod clipboard;
pub mod config;
pub mod conversation;
pub mod error;
pub mod presentation;
pub mod render;
pub mod state;
pub mod store;
pub mod template;

// Re-export main types for convenience
pub use client::{GenerationBackend, GenerationClient};
pub use config::Config;
pub use conversation::{Conversation, Phase, Turn, TurnOutcome};
pub use error::{PromptsmithError, Result};
pub use presentation::{CopyFeedback, ResultView};
pub use state::{
    ChatMessage, ChatRole, ConnectionStatus, GenerationMode, PromptRequest, PromptResult,
};
pub use store::PromptStore;
