use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// A semantic candidate from the external vector search service: a
/// section id and its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHit {
	pub section_id: String,
	pub score: f32,
}

pub async fn similarity_search(
	cfg: &tally_config::VectorSearchConfig,
	vector: &[f32],
	top_k: u32,
) -> Result<Vec<SemanticHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"vector": vector,
		"top_k": top_k,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_similarity_response(json)
}

fn parse_similarity_response(json: Value) -> Result<Vec<SemanticHit>> {
	let results = json
		.get("results")
		.or_else(|| json.get("matches"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Similarity response is missing results array."))?;

	let mut out = Vec::with_capacity(results.len());
	for item in results {
		let section_id = item
			.get("section_id")
			.or_else(|| item.get("id"))
			.and_then(|v| v.as_str())
			.ok_or_else(|| eyre::eyre!("Similarity result missing section id."))?;
		let score = item
			.get("score")
			.and_then(|v| v.as_f64())
			.ok_or_else(|| eyre::eyre!("Similarity result missing score."))? as f32;

		out.push(SemanticHit { section_id: section_id.to_string(), score });
	}

	Ok(out)
}
