//! Shared fakes for the agent tests.

use async_trait::async_trait;
use futures::FutureExt;
use homehub_core::error::ProviderError;
use homehub_core::message::{ContentBlock, Transcript};
use homehub_core::provider::{CompletionOutcome, CompletionRequest, Provider};
use homehub_core::tool::{Arguments, FnTool, ToolRequest, ToolSpec};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A provider that replays a fixed script and records what it was sent.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<CompletionOutcome, ProviderError>>>,
    transcripts: Mutex<Vec<Transcript>>,
    system_prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<CompletionOutcome, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            transcripts: Mutex::new(Vec::new()),
            system_prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The transcript as sent on each call.
    pub fn transcripts(&self) -> Vec<Transcript> {
        self.transcripts.lock().unwrap().clone()
    }

    pub fn system_prompts(&self) -> Vec<String> {
        self.system_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest<'_>,
    ) -> Result<CompletionOutcome, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcripts
            .lock()
            .unwrap()
            .push(request.transcript.clone());
        self.system_prompts
            .lock()
            .unwrap()
            .push(request.system_prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(CompletionOutcome::Final { text: "(script exhausted)".into() }))
    }
}

pub fn request(id: &str, name: &str) -> ToolRequest {
    ToolRequest {
        id: id.into(),
        name: name.into(),
        arguments: Arguments::new(),
    }
}

/// A `ToolCalls` outcome requesting `(id, tool)` pairs in order.
pub fn tool_calls(calls: &[(&str, &str)]) -> CompletionOutcome {
    let requests: Vec<ToolRequest> = calls.iter().map(|(id, name)| request(id, name)).collect();
    CompletionOutcome::ToolCalls {
        blocks: requests.iter().cloned().map(ContentBlock::ToolRequest).collect(),
        requests,
    }
}

/// A tool that returns `output` and bumps `count` on every call.
pub fn counting_tool(name: &str, output: &'static str, count: Arc<AtomicUsize>) -> FnTool {
    FnTool::new(ToolSpec::new(name, "test tool"), move |_| {
        count.fetch_add(1, Ordering::SeqCst);
        async move { Ok(output.to_string()) }.boxed()
    })
}
