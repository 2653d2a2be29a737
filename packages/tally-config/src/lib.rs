mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Aggregation, Config, EmbeddingProviderConfig, Extraction, Pipeline, PhrasingProviderConfig,
	Providers, Ranking, Search, Service, VectorSearchConfig,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("phrasing", &cfg.providers.phrasing.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if let Some(vector) = cfg.providers.vector_search.as_ref() {
		if vector.top_k == 0 {
			return Err(Error::Validation {
				message: "providers.vector_search.top_k must be greater than zero.".to_string(),
			});
		}
		if vector.api_key.trim().is_empty() {
			return Err(Error::Validation {
				message: "Provider vector_search api_key must be non-empty.".to_string(),
			});
		}
	}

	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.candidate_cap == 0 {
		return Err(Error::Validation {
			message: "search.candidate_cap must be greater than zero.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.min_score) {
		return Err(Error::Validation {
			message: "search.min_score must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.search.partial_min_token_len == 0 {
		return Err(Error::Validation {
			message: "search.partial_min_token_len must be greater than zero.".to_string(),
		});
	}
	if cfg.search.partial_term_cap == 0 {
		return Err(Error::Validation {
			message: "search.partial_term_cap must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("ranking.keyword_weight", cfg.ranking.keyword_weight),
		("ranking.bm25_weight", cfg.ranking.bm25_weight),
		("ranking.keyword_threshold", cfg.ranking.keyword_threshold),
		("ranking.filename_keyword_threshold", cfg.ranking.filename_keyword_threshold),
		("ranking.bm25_rescue_floor", cfg.ranking.bm25_rescue_floor),
	] {
		if !value.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.ranking.filename_keyword_threshold > cfg.ranking.keyword_threshold {
		return Err(Error::Validation {
			message:
				"ranking.filename_keyword_threshold must not exceed ranking.keyword_threshold."
					.to_string(),
		});
	}
	if !cfg.ranking.bm25_k1.is_finite() || cfg.ranking.bm25_k1 < 0.0 {
		return Err(Error::Validation {
			message: "ranking.bm25_k1 must be a finite number, zero or greater.".to_string(),
		});
	}
	if !cfg.ranking.bm25_b.is_finite() || !(0.0..=1.0).contains(&cfg.ranking.bm25_b) {
		return Err(Error::Validation {
			message: "ranking.bm25_b must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.ranking.bm25_normalizer.is_finite() || cfg.ranking.bm25_normalizer <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.bm25_normalizer must be greater than zero.".to_string(),
		});
	}

	if cfg.extraction.currency_window_chars == 0 {
		return Err(Error::Validation {
			message: "extraction.currency_window_chars must be greater than zero.".to_string(),
		});
	}
	if !cfg.aggregation.duplicate_epsilon.is_finite() || cfg.aggregation.duplicate_epsilon <= 0.0 {
		return Err(Error::Validation {
			message: "aggregation.duplicate_epsilon must be greater than zero.".to_string(),
		});
	}
	if !cfg.aggregation.low_confidence_spread.is_finite()
		|| cfg.aggregation.low_confidence_spread <= 0.0
	{
		return Err(Error::Validation {
			message: "aggregation.low_confidence_spread must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("pipeline.total_budget_ms", cfg.pipeline.total_budget_ms),
		("pipeline.embedding_budget_ms", cfg.pipeline.embedding_budget_ms),
		("pipeline.retrieval_budget_ms", cfg.pipeline.retrieval_budget_ms),
		("pipeline.extraction_budget_ms", cfg.pipeline.extraction_budget_ms),
		("pipeline.formatting_budget_ms", cfg.pipeline.formatting_budget_ms),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for base in [
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.phrasing.api_base,
	] {
		while base.ends_with('/') {
			base.pop();
		}
	}
	if let Some(vector) = cfg.providers.vector_search.as_mut() {
		while vector.api_base.ends_with('/') {
			vector.api_base.pop();
		}
	}
}
