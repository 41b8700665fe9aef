//! Provider trait: the abstraction over the remote completion service.
//!
//! A Provider makes exactly one round trip per [`Provider::complete`] call:
//! it sends the transcript, system prompt and tool catalog, and reports
//! whether the exchange is finished or which tools must run first. It never
//! retries or loops; looping belongs to the orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ContentBlock, Transcript};
use crate::tool::{ToolRequest, ToolSpec};

/// Everything one completion call needs.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub transcript: &'a Transcript,
    pub system_prompt: &'a str,
    pub catalog: &'a [ToolSpec],
}

/// Why the completion service stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopReason {
    /// Natural end of the answer.
    #[default]
    EndTurn,
    /// The service wants tools run before it continues.
    ToolUse,
    /// Hit the token limit.
    MaxTokens,
    /// Hit a configured stop sequence.
    StopSequence,
    /// Unknown reason (forward compatibility).
    Other(String),
}

impl StopReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// The result of one completion round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// The exchange is finished.
    Final { text: String },

    /// Tools must run before the service can continue.
    ///
    /// `blocks` is everything the service returned this round, in order,
    /// and becomes the assistant turn verbatim. `requests` are the tool
    /// requests among those blocks, in emitted order.
    ToolCalls {
        blocks: Vec<ContentBlock>,
        requests: Vec<ToolRequest>,
    },
}

impl CompletionOutcome {
    /// Classify the blocks of one response using the service's stop reason.
    ///
    /// Tool requests always win over text so execution is never skipped.
    /// A final answer uses the first text block, or the empty string.
    pub fn from_blocks(stop_reason: &StopReason, blocks: Vec<ContentBlock>) -> Self {
        let requests: Vec<ToolRequest> = blocks
            .iter()
            .filter_map(ContentBlock::as_tool_request)
            .cloned()
            .collect();

        if !requests.is_empty() {
            if *stop_reason != StopReason::ToolUse {
                tracing::debug!(?stop_reason, "Tool requests present despite non tool_use stop reason");
            }
            return CompletionOutcome::ToolCalls { blocks, requests };
        }

        if *stop_reason == StopReason::ToolUse {
            tracing::warn!("tool_use stop reason without any tool requests, treating as final");
        }

        let text = blocks
            .into_iter()
            .find_map(|b| match b {
                ContentBlock::Text { text } => Some(text),
                _ => None,
            })
            .unwrap_or_default();

        CompletionOutcome::Final { text }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, CompletionOutcome::Final { .. })
    }
}

/// The completion client trait.
///
/// The orchestrator calls `complete()` without knowing which remote service
/// sits behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Send one request and classify the response.
    async fn complete(
        &self,
        request: CompletionRequest<'_>,
    ) -> std::result::Result<CompletionOutcome, ProviderError>;
}
