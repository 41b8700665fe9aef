//! `homehub init`: first-time setup.

use homehub_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set ANTHROPIC_API_KEY or api_key in the config file");
    println!("  2. Set [sheets] spreadsheet_id plus client_id, client_secret and refresh_token");
    println!("     for Google Sheets (a bare access_token also works but expires after ~1 hour)");
    println!("  3. Run `homehub ask -m \"What's for dinner tonight?\"`");

    Ok(())
}
