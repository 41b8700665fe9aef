//! The exchange loop: one utterance in, one reply out.
//!
//! ```text
//! seed ─▶ complete ─┬─ Final ─────────────▶ reply
//!                   └─ ToolCalls ─▶ execute ─▶ append ─▶ complete ...
//! ```
//!
//! The loop is bounded by `max_rounds` completion calls. Running out of
//! rounds is not an error: the exchange ends with [`FALLBACK_REPLY`].

use chrono::NaiveDate;
use homehub_core::error::{ExchangeError, ProviderError, Result};
use homehub_core::message::Transcript;
use homehub_core::provider::{CompletionOutcome, CompletionRequest, Provider};
use homehub_core::tool::{ToolRegistry, ToolSpec};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::executor::ToolExecutor;
use crate::prompt::Persona;

/// Reply given when the round budget runs out before a final answer.
pub const FALLBACK_REPLY: &str = "Done.";

pub const DEFAULT_MAX_ROUNDS: u32 = 5;
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// How an exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// The completion service gave a final answer.
    Answered,
    /// The round budget ran out; the reply is [`FALLBACK_REPLY`].
    BudgetExhausted,
}

/// The outcome of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Completion calls made.
    pub rounds: u32,
    pub finish: Finish,
}

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Drives exchanges between the completion service and the tool registry.
///
/// Holds no per-exchange state, so one instance serves any number of
/// concurrent exchanges.
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    executor: ToolExecutor,
    persona: Persona,
    max_rounds: u32,
    completion_timeout: Duration,
    today: Today,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Provider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            executor: ToolExecutor::new(registry),
            persona: Persona::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Build with limits and persona from configuration.
    pub fn from_config(
        config: &homehub_config::AppConfig,
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
    ) -> Self {
        Self::new(provider, registry)
            .with_max_rounds(config.exchange.max_rounds)
            .with_completion_timeout(config.exchange.completion_timeout())
            .with_tool_timeout(config.exchange.tool_timeout())
            .with_persona(Persona::from_config(&config.persona))
    }

    /// Set the round budget. Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Override the date used in the system prompt.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Arc::new(today);
        self
    }

    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.executor.registry().catalog()
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Turn one utterance into a reply.
    pub async fn run(&self, utterance: &str) -> Result<Reply> {
        self.exchange(utterance, None).await
    }

    /// Like [`run`](Self::run), but stops before the next round once
    /// `cancel` reads `true`. A round already in flight, tool calls
    /// included, always finishes.
    pub async fn run_with_cancel(
        &self,
        utterance: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<Reply> {
        self.exchange(utterance, Some(cancel)).await
    }

    async fn exchange(
        &self,
        utterance: &str,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<Reply> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ExchangeError::EmptyUtterance);
        }

        let exchange_id = Uuid::new_v4();
        let system_prompt = self.persona.system_prompt((self.today)());
        let catalog = self.catalog();
        let mut transcript = Transcript::seed(utterance);

        info!(
            exchange_id = %exchange_id,
            chars = utterance.len(),
            max_rounds = self.max_rounds,
            "Starting exchange"
        );

        for round in 1..=self.max_rounds {
            if cancel.as_ref().is_some_and(|c| *c.borrow()) {
                info!(exchange_id = %exchange_id, round, "Exchange cancelled");
                return Err(ExchangeError::Cancelled {
                    completed_rounds: round - 1,
                });
            }

            debug!(
                exchange_id = %exchange_id,
                round,
                turns = transcript.len(),
                "Requesting completion"
            );

            let request = CompletionRequest {
                transcript: &transcript,
                system_prompt: &system_prompt,
                catalog: &catalog,
            };
            let outcome =
                match tokio::time::timeout(self.completion_timeout, self.provider.complete(request))
                    .await
                {
                    Ok(outcome) => outcome.inspect_err(|e| {
                        warn!(exchange_id = %exchange_id, round, error = %e, "Completion failed");
                    })?,
                    Err(_) => {
                        warn!(exchange_id = %exchange_id, round, "Completion timed out");
                        return Err(ProviderError::Timeout {
                            timeout_secs: self.completion_timeout.as_secs(),
                        }
                        .into());
                    }
                };

            match outcome {
                CompletionOutcome::Final { text } => {
                    info!(exchange_id = %exchange_id, rounds = round, "Exchange answered");
                    return Ok(Reply {
                        text,
                        rounds: round,
                        finish: Finish::Answered,
                    });
                }
                CompletionOutcome::ToolCalls { blocks, requests } => {
                    debug!(
                        exchange_id = %exchange_id,
                        round,
                        tool_count = requests.len(),
                        "Executing tool requests"
                    );
                    transcript.push_assistant(blocks)?;

                    let mut results = Vec::with_capacity(requests.len());
                    for request in &requests {
                        results.push(self.executor.execute(request).await);
                    }
                    transcript.push_tool_results(results)?;
                }
            }
        }

        warn!(
            exchange_id = %exchange_id,
            rounds = self.max_rounds,
            "Round budget exhausted without a final answer"
        );
        Ok(Reply {
            text: FALLBACK_REPLY.to_string(),
            rounds: self.max_rounds,
            finish: Finish::BudgetExhausted,
        })
    }
}
