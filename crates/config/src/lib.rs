//! Configuration loading, validation, and management for homehub.
//!
//! Loads configuration from `~/.homehub/config.toml` (or the file named by
//! `HOMEHUB_CONFIG`) with environment variable overrides. Validates all
//! settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.homehub/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// Max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Override the Anthropic base URL (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default)]
    pub exchange: ExchangeConfig,

    #[serde(default)]
    pub persona: PersonaConfig,

    #[serde(default)]
    pub sheets: SheetsConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_model() -> String {
    "claude-3-haiku-20240307".into()
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_url", &self.api_url)
            .field("exchange", &self.exchange)
            .field("persona", &self.persona)
            .field("sheets", &self.sheets)
            .field("weather", &self.weather)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Bounds on a single exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Maximum completion round trips per exchange
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,

    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

fn default_max_rounds() -> u32 {
    5
}
fn default_completion_timeout() -> u64 {
    60
}
fn default_tool_timeout() -> u64 {
    15
}

impl ExchangeConfig {
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            completion_timeout_secs: default_completion_timeout(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

/// Who the assistant is and whom it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    #[serde(default = "default_household")]
    pub household: String,

    #[serde(default)]
    pub members: Vec<String>,
}

fn default_assistant_name() -> String {
    "Q".into()
}
fn default_household() -> String {
    "the household".into()
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            household: default_household(),
            members: vec![],
        }
    }
}

/// Google Sheets backing store.
#[derive(Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// OAuth access token with the spreadsheets scope. Expires after
    /// about an hour; prefer the refresh-token fields for `serve`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// OAuth client and refresh token, exchanged for access tokens as needed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_sheets_url")]
    pub base_url: String,

    #[serde(default)]
    pub tabs: TabNames,
}

fn default_sheets_url() -> String {
    "https://sheets.googleapis.com".into()
}
fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// Everything the refresh-token grant needs.
pub struct RefreshCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub refresh_token: &'a str,
    pub token_url: &'a str,
}

impl SheetsConfig {
    /// The refresh-token credentials, when all three are set.
    pub fn refresh_credentials(&self) -> Option<RefreshCredentials<'_>> {
        Some(RefreshCredentials {
            client_id: self.client_id.as_deref()?,
            client_secret: self.client_secret.as_deref()?,
            refresh_token: self.refresh_token.as_deref()?,
            token_url: &self.token_url,
        })
    }
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("access_token", &redact(&self.access_token))
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("token_url", &self.token_url)
            .field("base_url", &self.base_url)
            .field("tabs", &self.tabs)
            .finish()
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            access_token: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            token_url: default_token_url(),
            base_url: default_sheets_url(),
            tabs: TabNames::default(),
        }
    }
}

/// Tab names inside the spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabNames {
    #[serde(default = "default_meals_tab")]
    pub meals: String,
    #[serde(default = "default_chores_tab")]
    pub chores: String,
    #[serde(default = "default_reminders_tab")]
    pub reminders: String,
}

fn default_meals_tab() -> String {
    "Weekly Meal Plan".into()
}
fn default_chores_tab() -> String {
    "Chores".into()
}
fn default_reminders_tab() -> String {
    "Reminders".into()
}

impl Default for TabNames {
    fn default() -> Self {
        Self {
            meals: default_meals_tab(),
            chores: default_chores_tab(),
            reminders: default_reminders_tab(),
        }
    }
}

/// Open-Meteo lookup location and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
}

// Fort Collins, CO
fn default_latitude() -> f64 {
    40.5853
}
fn default_longitude() -> f64 {
    -105.0844
}
fn default_weather_timeout() -> u64 {
    8
}
fn default_weather_url() -> String {
    "https://api.open-meteo.com".into()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            timeout_secs: default_weather_timeout(),
            base_url: default_weather_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `HOMEHUB_CONFIG` or `~/.homehub/config.toml`.
    ///
    /// Environment variables override file values:
    /// - `ANTHROPIC_API_KEY`
    /// - `HOMEHUB_MODEL`
    /// - `HOMEHUB_SHEET_ID`
    /// - `HOMEHUB_SHEETS_TOKEN`
    /// - `HOMEHUB_SHEETS_CLIENT_ID`, `HOMEHUB_SHEETS_CLIENT_SECRET`,
    ///   `HOMEHUB_SHEETS_REFRESH_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("HOMEHUB_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("config.toml"));
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("ANTHROPIC_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = var("HOMEHUB_MODEL") {
            self.model = model;
        }
        if let Some(id) = var("HOMEHUB_SHEET_ID") {
            self.sheets.spreadsheet_id = Some(id);
        }
        if let Some(token) = var("HOMEHUB_SHEETS_TOKEN") {
            self.sheets.access_token = Some(token);
        }
        if let Some(id) = var("HOMEHUB_SHEETS_CLIENT_ID") {
            self.sheets.client_id = Some(id);
        }
        if let Some(secret) = var("HOMEHUB_SHEETS_CLIENT_SECRET") {
            self.sheets.client_secret = Some(secret);
        }
        if let Some(token) = var("HOMEHUB_SHEETS_REFRESH_TOKEN") {
            self.sheets.refresh_token = Some(token);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".homehub")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.exchange.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "exchange.max_rounds must be at least 1".into(),
            ));
        }
        if self.exchange.completion_timeout_secs == 0 || self.exchange.tool_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "exchange timeouts must be greater than zero".into(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than zero".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.weather.latitude)
            || !(-180.0..=180.0).contains(&self.weather.longitude)
        {
            return Err(ConfigError::ValidationError(
                "weather latitude/longitude out of range".into(),
            ));
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Whether the Google Sheets store has everything it needs.
    pub fn has_sheets(&self) -> bool {
        self.sheets.spreadsheet_id.is_some()
            && (self.sheets.access_token.is_some() || self.sheets.refresh_credentials().is_some())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_url: None,
            exchange: ExchangeConfig::default(),
            persona: PersonaConfig::default(),
            sheets: SheetsConfig::default(),
            weather: WeatherConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
