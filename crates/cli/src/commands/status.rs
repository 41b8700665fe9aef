//! `homehub status`: show the effective configuration.

use homehub_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    println!("homehub status");
    println!("==============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Model:        {}", config.model);
    println!("  Max tokens:   {}", config.max_tokens);
    println!("  API key:      {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Assistant:    {} for {}", config.persona.assistant_name, config.persona.household);
    println!(
        "  Exchange:     {} rounds, {}s completion, {}s per tool",
        config.exchange.max_rounds,
        config.exchange.completion_timeout_secs,
        config.exchange.tool_timeout_secs
    );
    let sheets = if !config.has_sheets() {
        "in-memory (not configured)"
    } else if config.sheets.refresh_credentials().is_some() {
        "Google Sheets (refresh token)"
    } else {
        "Google Sheets (static token, expires)"
    };
    println!("  Sheets:       {sheets}");
    println!(
        "  Tabs:         {} / {} / {}",
        config.sheets.tabs.meals, config.sheets.tabs.chores, config.sheets.tabs.reminders
    );
    println!(
        "  Weather:      {:.4}, {:.4}",
        config.weather.latitude, config.weather.longitude
    );
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, run `homehub init` first");
    }

    Ok(())
}
