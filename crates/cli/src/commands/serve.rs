//! `homehub serve`: start the HTTP API server.

use std::sync::Arc;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let orchestrator = super::build_orchestrator(&config)?;

    println!("homehub gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.model);
    println!(
        "   Sheets:    {}",
        if config.has_sheets() { "Google Sheets" } else { "in-memory" }
    );

    homehub_gateway::start(&config.gateway, Arc::new(orchestrator)).await?;

    Ok(())
}
