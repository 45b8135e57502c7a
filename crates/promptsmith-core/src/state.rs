//! UI-agnostic data types
//!
//! These structures are shared between the conversation controller, the
//! result store and whatever front-end renders them. None of them depend on a
//! specific UI framework.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What the user asked for, plus the fields filled in by inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub business_name: String,
    pub industry: String,
    pub target_audience: String,
    pub use_case: String,
    pub additional_context: String,
}

impl PromptRequest {
    /// A fresh request carrying only the raw description.
    pub fn from_use_case(use_case: impl Into<String>) -> Self {
        Self {
            use_case: use_case.into(),
            ..Self::default()
        }
    }
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptResult {
    pub title: String,
    pub prompt: String,
    pub description: String,
    /// RFC 3339 / ISO-8601 creation time
    pub timestamp: String,
}

/// Format a timestamp the way results carry it.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A message in the prompt conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

/// Where generations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Keyword inference and the built-in template, no network.
    #[default]
    Local,
    /// The external HTTP generation service.
    Remote,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Local => "local",
            GenerationMode::Remote => "remote",
        }
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(GenerationMode::Local),
            "remote" => Ok(GenerationMode::Remote),
            other => Err(format!(
                "Unknown generation mode '{}' (expected local or remote)",
                other
            )),
        }
    }
}

/// Last known reachability of the generation service, for passive display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Unknown => "not connected yet",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}
