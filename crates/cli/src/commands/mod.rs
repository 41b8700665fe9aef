pub mod ask;
pub mod init;
pub mod serve;
pub mod status;
pub mod tools;

use homehub_agent::Orchestrator;
use homehub_config::AppConfig;
use homehub_core::tool::ToolRegistry;
use std::sync::Arc;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The six household tools wired to the configured sheet store and weather source.
pub fn build_registry(config: &AppConfig) -> Result<ToolRegistry, Box<dyn std::error::Error>> {
    let store = homehub_tools::sheet_store_from_config(&config.sheets);
    let weather = homehub_tools::weather_from_config(&config.weather);
    Ok(homehub_tools::household_registry(
        store,
        weather,
        &config.sheets.tabs,
    )?)
}

/// Everything an exchange needs, built once from configuration.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, Box<dyn std::error::Error>> {
    let provider = homehub_providers::build_from_config(config).map_err(|e| {
        format!(
            "{e}\n  Config file: {}",
            AppConfig::config_dir().join("config.toml").display()
        )
    })?;
    let registry = build_registry(config)?;
    Ok(Orchestrator::from_config(config, Arc::new(provider), registry))
}
