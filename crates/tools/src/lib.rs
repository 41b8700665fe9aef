//! Household tool implementations for homehub.
//!
//! Tools give the assistant the ability to act on the household's data:
//! read and change the meal plan, list and tick off chores, add reminders,
//! and check the weather. Spreadsheet access goes through a
//! [`SheetStore`], so every tool runs the same against Google Sheets or
//! the in-memory store.

pub mod args;
pub mod chores;
pub mod meals;
pub mod reminders;
pub mod sheets;
pub mod weather;

use homehub_config::{SheetsConfig, TabNames, WeatherConfig};
use homehub_core::error::RegistryError;
use homehub_core::sheet::SheetStore;
use homehub_core::tool::ToolRegistry;
use homehub_core::weather::WeatherSource;
use std::sync::Arc;
use std::time::Duration;

pub use chores::{Clock, GetChoresTool, MarkChoreDoneTool};
pub use meals::{GetMealsTool, UpdateMealTool};
pub use reminders::AddReminderTool;
pub use sheets::{GoogleSheetsStore, InMemorySheetStore, RefreshingToken, SheetsAuth};
pub use weather::{GetWeatherTool, OpenMeteoSource};

/// Build the registry of the six household tools, in catalog order.
pub fn household_registry(
    store: Arc<dyn SheetStore>,
    weather: Arc<dyn WeatherSource>,
    tabs: &TabNames,
) -> Result<ToolRegistry, RegistryError> {
    household_registry_with_clock(store, weather, tabs, chores::system_clock())
}

/// Same as [`household_registry`] with an explicit clock for chore dates.
pub fn household_registry_with_clock(
    store: Arc<dyn SheetStore>,
    weather: Arc<dyn WeatherSource>,
    tabs: &TabNames,
    clock: Clock,
) -> Result<ToolRegistry, RegistryError> {
    Ok(ToolRegistry::builder()
        .register(GetMealsTool::new(store.clone(), &tabs.meals))?
        .register(UpdateMealTool::new(store.clone(), &tabs.meals))?
        .register(GetChoresTool::new(store.clone(), &tabs.chores))?
        .register(MarkChoreDoneTool::new(store.clone(), &tabs.chores).with_clock(clock))?
        .register(AddReminderTool::new(store, &tabs.reminders))?
        .register(GetWeatherTool::new(weather))?
        .build())
}

/// The configured sheet store: Google Sheets when credentials are present,
/// otherwise an empty in-memory household. Refresh credentials win over a
/// static access token.
pub fn sheet_store_from_config(config: &SheetsConfig) -> Arc<dyn SheetStore> {
    let Some(id) = &config.spreadsheet_id else {
        return in_memory_household(config);
    };

    let auth = if let Some(creds) = config.refresh_credentials() {
        SheetsAuth::Refreshing(
            RefreshingToken::new(creds.client_id, creds.client_secret, creds.refresh_token)
                .with_token_url(creds.token_url),
        )
    } else if let Some(token) = &config.access_token {
        tracing::info!("Using a static Sheets access token; it will stop working when it expires");
        SheetsAuth::Static(token.clone())
    } else {
        return in_memory_household(config);
    };

    Arc::new(GoogleSheetsStore::with_auth(id, auth).with_base_url(&config.base_url))
}

fn in_memory_household(config: &SheetsConfig) -> Arc<dyn SheetStore> {
    tracing::warn!("Google Sheets not configured, using an in-memory household");
    Arc::new(InMemorySheetStore::household_template(
        &config.tabs.meals,
        &config.tabs.chores,
        &config.tabs.reminders,
    ))
}

pub fn weather_from_config(config: &WeatherConfig) -> Arc<dyn WeatherSource> {
    Arc::new(
        OpenMeteoSource::new(
            config.latitude,
            config.longitude,
            Duration::from_secs(config.timeout_secs),
        )
        .with_base_url(&config.base_url),
    )
}
