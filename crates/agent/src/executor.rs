//! Tool executor: runs one tool request against the registry.
//!
//! Every request produces exactly one [`ToolResult`]. Unknown tools, tool
//! failures and timeouts all become results the model can read and react
//! to; nothing raised by a tool escapes this boundary.

use homehub_core::error::{StoreError, ToolError};
use homehub_core::tool::{ToolRegistry, ToolRequest, ToolResult};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Bound each tool call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one request. Performs at most one tool call and never retries.
    pub async fn execute(&self, request: &ToolRequest) -> ToolResult {
        let Some(tool) = self.registry.lookup(&request.name) else {
            warn!(tool = %request.name, request_id = %request.id, "Unknown tool requested");
            return ToolResult::error(&request.id, unknown_tool(&request.name));
        };

        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, tool.call(&request.arguments)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolError::Timeout {
                tool_name: request.name.clone(),
                timeout_secs: self.timeout.as_secs(),
            }),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(content) => {
                debug!(tool = %request.name, request_id = %request.id, duration_ms, "Tool executed");
                ToolResult::success(&request.id, content)
            }
            Err(e) => {
                warn!(
                    tool = %request.name,
                    request_id = %request.id,
                    duration_ms,
                    error = %e,
                    "Tool execution failed"
                );
                ToolResult::error(&request.id, describe_failure(&request.name, &e))
            }
        }
    }
}

/// The diagnostic returned for a name missing from the registry.
pub fn unknown_tool(name: &str) -> String {
    format!("Unknown tool: {name}")
}

/// Plain-language description of a tool failure for the model.
///
/// Backend error text stays in the logs.
pub fn describe_failure(tool: &str, error: &ToolError) -> String {
    match error {
        ToolError::InvalidArguments(reason) => {
            format!("The {tool} tool was called with invalid arguments: {reason}")
        }
        ToolError::Timeout { timeout_secs, .. } => format!(
            "The {tool} tool timed out after {timeout_secs}s. The change may or may not have been made."
        ),
        ToolError::Store(StoreError::TabNotFound(tab)) => {
            format!("The household spreadsheet has no '{tab}' tab, so {tool} could not run.")
        }
        ToolError::Store(StoreError::ColumnNotFound { tab, column }) => {
            format!("The '{tab}' sheet has no '{column}' column, so {tool} could not run.")
        }
        ToolError::Store(_) => format!(
            "The household spreadsheet could not be reached, so {tool} did not complete."
        ),
        ToolError::NotFound(_) | ToolError::ExecutionFailed { .. } => {
            format!("The {tool} tool failed and did not complete.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use homehub_core::tool::{Arguments, FnTool, ToolSpec};

    fn request(id: &str, name: &str) -> ToolRequest {
        ToolRequest {
            id: id.into(),
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::builder()
            .register(FnTool::new(ToolSpec::new("get_chores", "List chores"), |_| {
                async { Ok("[]".to_string()) }.boxed()
            }))
            .unwrap()
            .register(FnTool::new(ToolSpec::new("get_meals", "Meal plan"), |_| {
                async {
                    Err(ToolError::Store(StoreError::Backend(
                        "503 from sheets: <html>internal</html>".into(),
                    )))
                }
                .boxed()
            }))
            .unwrap()
            .register(FnTool::new(ToolSpec::new("slow", "Never returns"), |_| {
                async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("late".to_string())
                }
                .boxed()
            }))
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn success_carries_request_id() {
        let executor = ToolExecutor::new(registry());
        let result = executor.execute(&request("abc", "get_chores")).await;
        assert_eq!(result, ToolResult::success("abc", "[]"));
    }

    #[tokio::test]
    async fn unknown_tool_is_idempotent_diagnostic() {
        let executor = ToolExecutor::new(registry());
        let first = executor.execute(&request("a", "launch_rockets")).await;
        let second = executor.execute(&request("b", "launch_rockets")).await;
        assert_eq!(first.content, "Unknown tool: launch_rockets");
        assert_eq!(first.content, second.content);
        assert!(first.is_error);
        assert_eq!(second.request_id, "b");
    }

    #[tokio::test]
    async fn failure_becomes_plain_language_result() {
        let executor = ToolExecutor::new(registry());
        let result = executor.execute(&request("m1", "get_meals")).await;
        assert!(result.is_error);
        assert_eq!(result.request_id, "m1");
        assert!(result.content.contains("could not be reached"));
        assert!(!result.content.contains("<html>"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let executor = ToolExecutor::new(registry()).with_timeout(Duration::from_secs(2));
        let result = executor.execute(&request("s1", "slow")).await;
        assert!(result.is_error);
        assert!(result.content.contains("timed out after 2s"));
    }

    #[test]
    fn invalid_arguments_keep_reason() {
        let text = describe_failure(
            "update_meal",
            &ToolError::InvalidArguments("Missing 'day_date' argument".into()),
        );
        assert_eq!(
            text,
            "The update_meal tool was called with invalid arguments: Missing 'day_date' argument"
        );
    }
}
