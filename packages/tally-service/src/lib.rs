pub mod ask;
pub mod health;
pub mod ingest;
pub mod search;
#[cfg(test)]
pub(crate) mod test_support;

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, RwLock},
};

use serde_json::Value;

pub use ask::{AskRequest, AskResponse, SourceRef};
pub use health::HealthResponse;
pub use ingest::{IngestReport, IngestRequest};
pub use search::{SearchItem, SearchRequest, SearchResponse};
use tally_config::{Config, EmbeddingProviderConfig, PhrasingProviderConfig, VectorSearchConfig};
use tally_providers::{embedding, phrasing, vector};
pub use tally_providers::vector::SemanticHit;

use crate::search::index::Corpus;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub const REASON_NO_SOURCES: &str = "NO_SOURCES";
pub const REASON_INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;

	fn health<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, bool>;
}

pub trait VectorSearchProvider
where
	Self: Send + Sync,
{
	fn similarity_search<'a>(
		&'a self,
		cfg: &'a VectorSearchConfig,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>>;
}

pub trait PhrasingProvider
where
	Self: Send + Sync,
{
	fn format<'a>(
		&'a self,
		cfg: &'a PhrasingProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>>;

	fn health<'a>(&'a self, cfg: &'a PhrasingProviderConfig) -> BoxFuture<'a, bool>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	IndexNotBuilt,
	Provider { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub vector_search: Arc<dyn VectorSearchProvider>,
	pub phrasing: Arc<dyn PhrasingProvider>,
}

pub struct TallyService {
	pub cfg: Config,
	pub providers: Providers,
	corpus: RwLock<Option<Arc<Corpus>>>,
}

struct DefaultProviders;

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::IndexNotBuilt => {
				write!(f, "The lexical index has not been built yet.")
			},
			Self::Provider { message } => write!(f, "Provider error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}

	fn health<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, bool> {
		Box::pin(embedding::health(cfg))
	}
}

impl VectorSearchProvider for DefaultProviders {
	fn similarity_search<'a>(
		&'a self,
		cfg: &'a VectorSearchConfig,
		vector: &'a [f32],
		top_k: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
		Box::pin(vector::similarity_search(cfg, vector, top_k))
	}
}

impl PhrasingProvider for DefaultProviders {
	fn format<'a>(
		&'a self,
		cfg: &'a PhrasingProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(phrasing::format(cfg, messages))
	}

	fn health<'a>(&'a self, cfg: &'a PhrasingProviderConfig) -> BoxFuture<'a, bool> {
		Box::pin(phrasing::health(cfg))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		vector_search: Arc<dyn VectorSearchProvider>,
		phrasing: Arc<dyn PhrasingProvider>,
	) -> Self {
		Self { embedding, vector_search, phrasing }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), vector_search: provider.clone(), phrasing: provider }
	}
}

impl TallyService {
	pub fn new(cfg: Config) -> Self {
		Self { cfg, providers: Providers::default(), corpus: RwLock::new(None) }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers, corpus: RwLock::new(None) }
	}

	pub(crate) fn corpus(&self) -> ServiceResult<Arc<Corpus>> {
		let guard = self.corpus.read().unwrap_or_else(|err| err.into_inner());

		guard.clone().ok_or(ServiceError::IndexNotBuilt)
	}

	pub(crate) fn swap_corpus(&self, corpus: Arc<Corpus>) {
		let mut guard = self.corpus.write().unwrap_or_else(|err| err.into_inner());

		*guard = Some(corpus);
	}
}
