//! Transcript domain types.
//!
//! A [`Transcript`] is the ordered turn history of one exchange:
//! user utterance → assistant turn (text and/or tool requests) →
//! user turn carrying tool results → assistant turn → ...
//!
//! The transcript owns its structural invariants. Appends that would break
//! them are rejected with a [`TranscriptError`] instead of being sent to the
//! completion service and failing there.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::TranscriptError;
use crate::tool::{ToolRequest, ToolResult};

/// The role of a turn in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The household member (or tool results relayed on their behalf)
    User,
    /// The completion service
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One piece of a turn's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolRequest(ToolRequest),
    ToolResult(ToolResult),
    /// A block the service returned that this crate does not interpret
    /// (e.g. `thinking`). Kept verbatim so it is sent back unchanged.
    Opaque { raw: serde_json::Value },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        match self {
            ContentBlock::ToolRequest(request) => Some(request),
            _ => None,
        }
    }
}

/// A single turn: a role and its ordered content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub blocks: Vec<ContentBlock>,
}

impl Turn {
    /// Concatenated text blocks, ignoring tool traffic.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool requests carried by this turn, in emitted order.
    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.blocks
            .iter()
            .filter_map(ContentBlock::as_tool_request)
            .collect()
    }

    /// Tool results carried by this turn, in appended order.
    pub fn tool_results(&self) -> Vec<&ToolResult> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}

/// Append-only turn history for one exchange.
///
/// Always starts with exactly one user turn holding the seed utterance.
/// Never shared between exchanges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript from the user's utterance.
    pub fn seed(utterance: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn {
                role: Role::User,
                blocks: vec![ContentBlock::text(utterance)],
            }],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Append the assistant's content for one round, exactly as returned.
    pub fn push_assistant(&mut self, blocks: Vec<ContentBlock>) -> Result<(), TranscriptError> {
        if blocks.is_empty() {
            return Err(TranscriptError::EmptyAssistantTurn);
        }
        if self.last().is_some_and(|t| t.role == Role::Assistant) {
            return Err(TranscriptError::RoleOrder("assistant"));
        }
        if blocks
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolResult(_)))
        {
            return Err(TranscriptError::MisplacedToolResult);
        }

        self.turns.push(Turn {
            role: Role::Assistant,
            blocks,
        });
        Ok(())
    }

    /// Append a user turn holding one result per request of the preceding
    /// assistant turn.
    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) -> Result<(), TranscriptError> {
        if results.is_empty() {
            return Err(TranscriptError::EmptyResultTurn);
        }

        let previous = match self.last() {
            Some(turn) if turn.role == Role::Assistant => turn,
            _ => return Err(TranscriptError::ResultsWithoutAssistantTurn),
        };

        let requested: HashSet<&str> = previous
            .tool_requests()
            .iter()
            .map(|r| r.id.as_str())
            .collect();

        let mut answered: HashSet<&str> = HashSet::with_capacity(results.len());
        for result in &results {
            let id = result.request_id.as_str();
            if !requested.contains(id) {
                return Err(TranscriptError::UnknownRequestId(id.to_string()));
            }
            if !answered.insert(id) {
                return Err(TranscriptError::DuplicateResult(id.to_string()));
            }
        }

        if let Some(missing) = requested.iter().find(|id| !answered.contains(*id)) {
            return Err(TranscriptError::MissingResult(missing.to_string()));
        }

        self.turns.push(Turn {
            role: Role::User,
            blocks: results.into_iter().map(ContentBlock::ToolResult).collect(),
        });
        Ok(())
    }
}
