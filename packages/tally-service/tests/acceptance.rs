mod acceptance {
	mod ask_pipeline;
	mod degraded_mode;
	mod ingest_and_search;

	use std::sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	};

	use color_eyre::eyre;
	use serde_json::Value;

	use tally_config::{
		Config, EmbeddingProviderConfig, PhrasingProviderConfig, Service, VectorSearchConfig,
	};
	use tally_domain::section::Section;
	use tally_service::{
		BoxFuture, EmbeddingProvider, IngestRequest, PhrasingProvider, Providers, SemanticHit,
		TallyService, VectorSearchProvider,
	};

	pub fn test_config() -> Config {
		Config {
			service: Service {
				http_bind: "127.0.0.1:0".to_string(),
				log_level: "info".to_string(),
				bind_localhost_only: true,
			},
			providers: tally_config::Providers {
				embedding: EmbeddingProviderConfig {
					api_base: "http://127.0.0.1:9000".to_string(),
					api_key: "test-key".to_string(),
					path: "/embed".to_string(),
					health_path: "/health".to_string(),
					model: "bge-m3".to_string(),
					dimensions: 4,
					timeout_ms: 100,
					default_headers: serde_json::Map::new(),
				},
				phrasing: PhrasingProviderConfig {
					api_base: "http://127.0.0.1:9001".to_string(),
					api_key: "test-key".to_string(),
					path: "/v1/chat/completions".to_string(),
					health_path: "/health".to_string(),
					model: "narrator".to_string(),
					temperature: 0.0,
					timeout_ms: 100,
					default_headers: serde_json::Map::new(),
				},
				vector_search: Some(VectorSearchConfig {
					api_base: "http://127.0.0.1:9002".to_string(),
					api_key: "test-key".to_string(),
					path: "/v1/search".to_string(),
					top_k: 10,
					timeout_ms: 100,
					default_headers: serde_json::Map::new(),
				}),
			},
			search: Default::default(),
			ranking: Default::default(),
			extraction: Default::default(),
			aggregation: Default::default(),
			pipeline: Default::default(),
		}
	}

	pub fn section(id: &str, doc: &str, filename: &str, text: &str) -> Section {
		Section {
			section_id: id.to_string(),
			document_id: doc.to_string(),
			text: text.to_string(),
			filename: filename.to_string(),
			page_number: Some(1),
		}
	}

	pub fn invoice_sections() -> Vec<Section> {
		vec![
			section(
				"s1",
				"inv-2024-001",
				"inv-2024-001.pdf",
				"Invoice INV-2024-001 total 1.234,56 TL due 15.01.2024",
			),
			section("s2", "inv-2024-001", "inv-2024-001.pdf", "Invoice total: 1.234,56 TL"),
			section(
				"s3",
				"inv-2024-002",
				"inv-2024-002.pdf",
				"Invoice total $200.00 paid on 2024-02-10",
			),
			section("s4", "journal", "journal.txt", "Cloudy tuesday, nothing noteworthy."),
		]
	}

	pub fn indexed_service(providers: Providers, sections: Vec<Section>) -> TallyService {
		let service = TallyService::with_providers(test_config(), providers);

		service
			.index_documents(IngestRequest { sections })
			.expect("ingest must succeed");

		service
	}

	pub fn stub_providers() -> Providers {
		Providers::new(
			Arc::new(StubEmbedding { vector_dim: 4 }),
			Arc::new(StubVectorSearch { hits: Vec::new() }),
			Arc::new(StubPhrasing { reply: "narrated answer".to_string() }),
		)
	}

	pub struct StubEmbedding {
		pub vector_dim: u32,
	}
	impl EmbeddingProvider for StubEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
			let dim = self.vector_dim as usize;
			let vectors = texts.iter().map(|_| vec![0.0; dim]).collect();

			Box::pin(async move { Ok(vectors) })
		}

		fn health<'a>(&'a self, _cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, bool> {
			Box::pin(async { true })
		}
	}

	pub struct FailingEmbedding;
	impl EmbeddingProvider for FailingEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			_texts: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
			Box::pin(async { Err(eyre::eyre!("embedding server unreachable")) })
		}

		fn health<'a>(&'a self, _cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, bool> {
			Box::pin(async { false })
		}
	}

	pub struct SlowEmbedding {
		pub vector_dim: u32,
	}
	impl EmbeddingProvider for SlowEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
			let dim = self.vector_dim as usize;
			let vectors = texts.iter().map(|_| vec![0.0; dim]).collect();

			Box::pin(async move {
				tokio::time::sleep(std::time::Duration::from_secs(60)).await;

				Ok(vectors)
			})
		}

		fn health<'a>(&'a self, _cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, bool> {
			Box::pin(async { true })
		}
	}

	pub struct StubVectorSearch {
		pub hits: Vec<SemanticHit>,
	}
	impl VectorSearchProvider for StubVectorSearch {
		fn similarity_search<'a>(
			&'a self,
			_cfg: &'a VectorSearchConfig,
			_vector: &'a [f32],
			_top_k: u32,
		) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
			let hits = self.hits.clone();

			Box::pin(async move { Ok(hits) })
		}
	}

	pub struct FailingVectorSearch;
	impl VectorSearchProvider for FailingVectorSearch {
		fn similarity_search<'a>(
			&'a self,
			_cfg: &'a VectorSearchConfig,
			_vector: &'a [f32],
			_top_k: u32,
		) -> BoxFuture<'a, color_eyre::Result<Vec<SemanticHit>>> {
			Box::pin(async { Err(eyre::eyre!("vector service unreachable")) })
		}
	}

	pub struct StubPhrasing {
		pub reply: String,
	}
	impl PhrasingProvider for StubPhrasing {
		fn format<'a>(
			&'a self,
			_cfg: &'a PhrasingProviderConfig,
			_messages: &'a [Value],
		) -> BoxFuture<'a, color_eyre::Result<String>> {
			let reply = self.reply.clone();

			Box::pin(async move { Ok(reply) })
		}

		fn health<'a>(&'a self, _cfg: &'a PhrasingProviderConfig) -> BoxFuture<'a, bool> {
			Box::pin(async { true })
		}
	}

	pub struct SpyPhrasing {
		pub reply: String,
		pub calls: Arc<AtomicUsize>,
		pub prompts: Arc<Mutex<Vec<String>>>,
	}
	impl PhrasingProvider for SpyPhrasing {
		fn format<'a>(
			&'a self,
			_cfg: &'a PhrasingProviderConfig,
			messages: &'a [Value],
		) -> BoxFuture<'a, color_eyre::Result<String>> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let user_prompt = messages
				.iter()
				.filter(|m| m.get("role").and_then(Value::as_str) == Some("user"))
				.filter_map(|m| m.get("content").and_then(Value::as_str))
				.collect::<Vec<_>>()
				.join("\n");

			self.prompts.lock().expect("prompt log poisoned").push(user_prompt);

			let reply = self.reply.clone();

			Box::pin(async move { Ok(reply) })
		}

		fn health<'a>(&'a self, _cfg: &'a PhrasingProviderConfig) -> BoxFuture<'a, bool> {
			Box::pin(async { true })
		}
	}

	pub struct FailingPhrasing;
	impl PhrasingProvider for FailingPhrasing {
		fn format<'a>(
			&'a self,
			_cfg: &'a PhrasingProviderConfig,
			_messages: &'a [Value],
		) -> BoxFuture<'a, color_eyre::Result<String>> {
			Box::pin(async { Err(eyre::eyre!("phrasing model unreachable")) })
		}

		fn health<'a>(&'a self, _cfg: &'a PhrasingProviderConfig) -> BoxFuture<'a, bool> {
			Box::pin(async { false })
		}
	}
}
