//! Anthropic native provider implementation.
//!
//! Uses Anthropic's Messages API directly.
//!
//! Features:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field
//! - Native tool use with `tool_use` / `tool_result` content blocks

use async_trait::async_trait;
use homehub_core::error::ProviderError;
use homehub_core::message::{ContentBlock, Transcript};
use homehub_core::provider::{CompletionOutcome, CompletionRequest, Provider, StopReason};
use homehub_core::tool::{ToolRequest, ToolSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Anthropic native Messages API provider.
pub struct AnthropicProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider for one model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert the transcript to Anthropic API messages, one per turn.
    fn to_api_messages(transcript: &Transcript) -> Vec<AnthropicMessage> {
        transcript
            .turns()
            .iter()
            .map(|turn| AnthropicMessage {
                role: turn.role.as_str().into(),
                content: turn.blocks.iter().map(WireBlock::from_block).collect(),
            })
            .collect()
    }

    /// Convert tool specs to Anthropic format, preserving catalog order.
    fn to_api_tools(tools: &[ToolSpec]) -> Vec<AnthropicTool> {
        tools
            .iter()
            .map(|t| AnthropicTool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    fn build_body(&self, request: &CompletionRequest<'_>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": Self::to_api_messages(request.transcript),
        });

        if !request.system_prompt.is_empty() {
            body["system"] = serde_json::json!(request.system_prompt);
        }

        if !request.catalog.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(request.catalog));
        }

        body
    }

    /// Classify an Anthropic response into a completion outcome.
    fn response_to_outcome(
        resp: AnthropicResponse,
    ) -> std::result::Result<CompletionOutcome, ProviderError> {
        if let Some(usage) = &resp.usage {
            debug!(
                provider = "anthropic",
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Completion usage"
            );
        }

        let mut blocks = Vec::with_capacity(resp.content.len());
        for raw in resp.content {
            let known = matches!(
                raw.get("type").and_then(serde_json::Value::as_str),
                Some("text" | "tool_use")
            );
            if !known {
                blocks.push(ContentBlock::Opaque { raw });
                continue;
            }

            let block: ResponseContentBlock = serde_json::from_value(raw).map_err(|e| {
                ProviderError::MalformedResponse(format!("Unreadable content block: {e}"))
            })?;
            match block {
                ResponseContentBlock::Text { text } => blocks.push(ContentBlock::Text { text }),
                ResponseContentBlock::ToolUse { id, name, input } => {
                    let arguments = match input {
                        serde_json::Value::Object(map) => map,
                        serde_json::Value::Null => serde_json::Map::new(),
                        other => {
                            return Err(ProviderError::MalformedResponse(format!(
                                "tool_use input for '{name}' is not an object: {other}"
                            )));
                        }
                    };
                    blocks.push(ContentBlock::ToolRequest(ToolRequest {
                        id,
                        name,
                        arguments,
                    }));
                }
            }
        }

        let stop_reason = resp
            .stop_reason
            .as_deref()
            .map(StopReason::parse)
            .unwrap_or_default();

        Ok(CompletionOutcome::from_blocks(&stop_reason, blocks))
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: CompletionRequest<'_>,
    ) -> std::result::Result<CompletionOutcome, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_body(&request);

        debug!(
            provider = "anthropic",
            model = %self.model,
            turns = request.transcript.len(),
            tools = request.catalog.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Anthropic API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: AnthropicResponse = response.json().await.map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse Anthropic response: {e}"))
        })?;

        Self::response_to_outcome(api_resp)
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<WireBlock>,
}

/// One outbound content block: a typed block or one passed through as received.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WireBlock {
    Known(ApiBlock),
    Raw(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum ApiBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl WireBlock {
    fn from_block(block: &ContentBlock) -> Self {
        let known = match block {
            ContentBlock::Text { text } => ApiBlock::Text { text: text.clone() },
            ContentBlock::ToolRequest(request) => ApiBlock::ToolUse {
                id: request.id.clone(),
                name: request.name.clone(),
                input: serde_json::Value::Object(request.arguments.clone()),
            },
            ContentBlock::ToolResult(result) => ApiBlock::ToolResult {
                tool_use_id: result.request_id.clone(),
                content: result.content.clone(),
                is_error: result.is_error,
            },
            ContentBlock::Opaque { raw } => return WireBlock::Raw(raw.clone()),
        };
        WireBlock::Known(known)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    /// Kept raw so unknown block types survive the round trip.
    #[serde(default)]
    content: Vec<serde_json::Value>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
