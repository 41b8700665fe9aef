//! Completion provider implementations for homehub.
//!
//! All providers implement the `homehub_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;

use homehub_core::error::ProviderError;

/// Build the completion provider from configuration.
///
/// Fails when no API key is configured so the problem surfaces at startup
/// rather than on the first exchange.
pub fn build_from_config(
    config: &homehub_config::AppConfig,
) -> Result<AnthropicProvider, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(
                "no Anthropic API key (set ANTHROPIC_API_KEY or api_key in config.toml)".into(),
            )
        })?;

    let mut provider =
        AnthropicProvider::new(api_key, &config.model).with_max_tokens(config.max_tokens);
    if let Some(url) = &config.api_url {
        provider = provider.with_base_url(url);
    }
    Ok(provider)
}
