use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Asks the phrasing model to narrate already-computed facts. The model
/// receives finished numbers as text; it is never asked to compute.
pub async fn format(
	cfg: &tally_config::PhrasingProviderConfig,
	messages: &[Value],
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_phrasing_response(json)
}

pub async fn health(cfg: &tally_config::PhrasingProviderConfig) -> bool {
	let Ok(client) = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()
	else {
		return false;
	};
	let url = format!("{}{}", cfg.api_base, cfg.health_path);

	match client.get(url).send().await {
		Ok(res) => res.status().is_success(),
		Err(_) => false,
	}
}

fn parse_phrasing_response(json: Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Phrasing response is missing message content."))?;
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(eyre::eyre!("Phrasing response content is empty."));
	}

	Ok(trimmed.to_string())
}
