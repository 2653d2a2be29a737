use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Calls the embedding server. Wire format follows the BGE-M3 model
/// server: `POST /embed {"texts": [...]}` returning `{"embeddings":
/// [[...], ...]}`.
pub async fn embed(
	cfg: &tally_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"texts": texts,
		"normalize": true,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_embedding_response(json)
}

/// Probes the embedding server's health endpoint. Any reachable,
/// well-formed response counts as available; the pipeline treats
/// everything else as the degraded path.
pub async fn health(cfg: &tally_config::EmbeddingProviderConfig) -> bool {
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

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("embeddings")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Embedding response is missing embeddings array."))?;

	let mut out = Vec::with_capacity(data.len());
	for item in data {
		let embedding = item
			.as_array()
			.ok_or_else(|| eyre::eyre!("Embedding item must be an array of numbers."))?;
		let mut vec = Vec::with_capacity(embedding.len());
		for value in embedding {
			let number =
				value.as_f64().ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;
			vec.push(number as f32);
		}
		out.push(vec);
	}

	Ok(out)
}
