//! Error types for the homehub domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum; [`ExchangeError`]
//! is the only one a caller of the orchestrator ever sees.

use thiserror::Error;

/// Failures that end an exchange before a reply is produced.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The inbound utterance was empty or whitespace only.
    #[error("No message")]
    EmptyUtterance,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// A cancellation signal was observed between rounds.
    #[error("Exchange cancelled after {completed_rounds} round(s)")]
    Cancelled { completed_rounds: u32 },
}

/// Result type alias for a whole exchange.
pub type Result<T> = std::result::Result<T, ExchangeError>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Completion timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Tab not found: {0}")]
    TabNotFound(String),

    #[error("Row {row} is out of range for tab {tab}")]
    RowOutOfRange { tab: String, row: usize },

    #[error("Column {column} not found in tab {tab}")]
    ColumnNotFound { tab: String, column: String },

    #[error("Store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Request(String),

    #[error("Weather response missing field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("Tool results must follow an assistant turn")]
    ResultsWithoutAssistantTurn,

    #[error("Tool result references unknown request id: {0}")]
    UnknownRequestId(String),

    #[error("Tool request {0} has no matching result")]
    MissingResult(String),

    #[error("Tool request {0} has more than one result")]
    DuplicateResult(String),

    #[error("Tool results may only appear in a user turn")]
    MisplacedToolResult,

    #[error("Tool result turn must not be empty")]
    EmptyResultTurn,

    #[error("Assistant turn must not be empty")]
    EmptyAssistantTurn,

    #[error("Turn roles must alternate, got two {0} turns in a row")]
    RoleOrder(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ExchangeError::Provider(ProviderError::ApiError {
            status_code: 529,
            message: "Overloaded".into(),
        });
        assert!(err.to_string().contains("529"));
        assert!(err.to_string().contains("Overloaded"));
    }

    #[test]
    fn empty_utterance_matches_wire_error() {
        assert_eq!(ExchangeError::EmptyUtterance.to_string(), "No message");
    }

    #[test]
    fn store_error_lifts_into_tool_error() {
        let err: ToolError = StoreError::TabNotFound("Chores".into()).into();
        assert!(err.to_string().contains("Chores"));
    }
}
