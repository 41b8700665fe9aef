//! `homehub ask`: one exchange from the terminal.
//!
//! Ctrl-C stops the exchange before its next round.

use homehub_agent::Finish;
use homehub_core::ExchangeError;
use tokio::sync::watch;

pub async fn run(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let orchestrator = super::build_orchestrator(&config)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n  Cancelling after the current round...");
            let _ = cancel_tx.send(true);
        }
    });

    eprint!("  Thinking...");
    let outcome = orchestrator.run_with_cancel(message, cancel_rx).await;
    eprint!("\r              \r");

    match outcome {
        Ok(reply) => {
            println!("{}", reply.text);
            if reply.finish == Finish::BudgetExhausted {
                tracing::info!(rounds = reply.rounds, "Round budget used up");
            }
            Ok(())
        }
        Err(ExchangeError::Cancelled { completed_rounds }) => {
            eprintln!("  Cancelled after {completed_rounds} round(s).");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
