//! Wiring from bootstrap configuration to engine components

use std::sync::Arc;
use std::time::Duration;

use deepage_common::config::TomlConfig;
use reqwest::Client;
use tracing::{info, warn};

use crate::ensemble::openai_client::{self, OpenAiCompatibleProvider};
use crate::ensemble::strategy::InferenceStrategy;
use crate::ensemble::{Blender, InferenceProvider};
use crate::error::Result;

/// Connection establishment limit for inference requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the strategy chain described by `[inference]`
///
/// Without an API key or without configured models only the statistical
/// strategy remains.
pub fn build_blender(config: &TomlConfig) -> Result<Blender> {
    let inference = &config.inference;

    if inference.models.is_empty() {
        info!("No inference models configured, statistical predictions only");
        return Ok(Blender::statistical_only());
    }

    let Some(api_key) = config.resolve_api_key() else {
        warn!(
            models = inference.models.len(),
            "Inference models configured but no API key found, statistical predictions only"
        );
        return Ok(Blender::statistical_only());
    };

    let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let limiter = openai_client::rate_limiter(inference.requests_per_minute);
    let timeout = config.engine.inference_timeout();

    let strategies = inference
        .models
        .iter()
        .map(|model| {
            let provider: Arc<dyn InferenceProvider> = Arc::new(
                OpenAiCompatibleProvider::new(
                    client.clone(),
                    inference.base_url.clone(),
                    model.clone(),
                    Some(api_key.clone()),
                    Arc::clone(&limiter),
                )
                .with_temperature(inference.temperature),
            );
            InferenceStrategy::new(provider, timeout)
        })
        .collect();

    let blender = Blender::new(strategies);
    info!(
        variants = ?blender.variants(),
        base_url = %inference.base_url,
        rpm = inference.requests_per_minute,
        "Inference strategy chain configured"
    );
    Ok(blender)
}
