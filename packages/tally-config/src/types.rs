use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub extraction: Extraction,
	#[serde(default)]
	pub aggregation: Aggregation,
	#[serde(default)]
	pub pipeline: Pipeline,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default = "default_true")]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub phrasing: PhrasingProviderConfig,
	pub vector_search: Option<VectorSearchConfig>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_embed_path")]
	pub path: String,
	#[serde(default = "default_health_path")]
	pub health_path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PhrasingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	#[serde(default = "default_health_path")]
	pub health_path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct VectorSearchConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub top_k: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
	pub candidate_cap: u32,
	pub min_score: f32,
	pub partial_min_token_len: usize,
	pub partial_term_cap: usize,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			top_k: 10,
			candidate_cap: 50,
			min_score: 0.1,
			partial_min_token_len: 4,
			partial_term_cap: 50,
		}
	}
}

/// Empirically tuned blend constants. Adjustable policy, not structural
/// invariants.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub keyword_weight: f32,
	pub bm25_weight: f32,
	pub bm25_k1: f32,
	pub bm25_b: f32,
	pub bm25_normalizer: f32,
	pub keyword_threshold: f32,
	pub filename_keyword_threshold: f32,
	pub bm25_rescue_floor: f32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			keyword_weight: 0.3,
			bm25_weight: 0.7,
			bm25_k1: 1.2,
			bm25_b: 0.75,
			bm25_normalizer: 10.0,
			keyword_threshold: 0.15,
			filename_keyword_threshold: 0.05,
			bm25_rescue_floor: 0.2,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Extraction {
	/// Chars scanned on each side of a matched number for a currency token.
	pub currency_window_chars: usize,
}
impl Default for Extraction {
	fn default() -> Self {
		Self { currency_window_chars: 16 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Aggregation {
	pub duplicate_epsilon: f64,
	pub low_confidence_spread: f64,
}
impl Default for Aggregation {
	fn default() -> Self {
		Self { duplicate_epsilon: 0.01, low_confidence_spread: 0.5 }
	}
}

/// Soft per-stage deadlines in milliseconds. Exceeding one degrades the
/// stage, it never blocks the query.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pipeline {
	pub total_budget_ms: u64,
	pub embedding_budget_ms: u64,
	pub retrieval_budget_ms: u64,
	pub extraction_budget_ms: u64,
	pub formatting_budget_ms: u64,
}
impl Default for Pipeline {
	fn default() -> Self {
		Self {
			total_budget_ms: 2_500,
			embedding_budget_ms: 100,
			retrieval_budget_ms: 500,
			extraction_budget_ms: 100,
			formatting_budget_ms: 2_000,
		}
	}
}

fn default_true() -> bool {
	true
}

fn default_embed_path() -> String {
	"/embed".to_string()
}

fn default_health_path() -> String {
	"/health".to_string()
}
