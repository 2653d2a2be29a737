use std::sync::Arc;

use tally_service::{AskRequest, Providers};

use super::{
	indexed_service, invoice_sections, stub_providers, FailingEmbedding, FailingPhrasing,
	FailingVectorSearch, SlowEmbedding, StubEmbedding, StubPhrasing, StubVectorSearch,
};

fn ask_request(query: &str) -> AskRequest {
	AskRequest { query: query.to_string(), top_k: None, min_score: None }
}

#[tokio::test]
async fn embedding_failure_degrades_to_lexical_only() {
	let providers = Providers::new(
		Arc::new(FailingEmbedding),
		Arc::new(StubVectorSearch { hits: Vec::new() }),
		Arc::new(StubPhrasing { reply: "narrated answer".to_string() }),
	);
	let service = indexed_service(providers, invoice_sections());
	let response = service.ask(ask_request("invoice total")).await.expect("ask must succeed");

	assert!(response.degraded);
	assert!(response.stats.is_some());
	assert_eq!(response.answer.as_deref(), Some("narrated answer"));
	assert!(!response.sources.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_embedding_is_cut_off_at_its_budget() {
	let providers = Providers::new(
		Arc::new(SlowEmbedding { vector_dim: 4 }),
		Arc::new(StubVectorSearch { hits: Vec::new() }),
		Arc::new(StubPhrasing { reply: "narrated answer".to_string() }),
	);
	let service = indexed_service(providers, invoice_sections());
	let response = service.ask(ask_request("invoice total")).await.expect("ask must succeed");

	assert!(response.degraded);
	assert!(response.stats.is_some());
}

#[tokio::test]
async fn vector_search_failure_keeps_lexical_results() {
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: 4 }),
		Arc::new(FailingVectorSearch),
		Arc::new(StubPhrasing { reply: "narrated answer".to_string() }),
	);
	let service = indexed_service(providers, invoice_sections());
	let response = service.ask(ask_request("invoice total")).await.expect("ask must succeed");

	assert!(response.degraded);
	assert!(!response.sources.is_empty());
}

#[tokio::test]
async fn phrasing_failure_still_returns_the_numbers() {
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: 4 }),
		Arc::new(StubVectorSearch { hits: Vec::new() }),
		Arc::new(FailingPhrasing),
	);
	let service = indexed_service(providers, invoice_sections());
	let response = service.ask(ask_request("invoice total")).await.expect("ask must succeed");

	assert!(response.degraded);
	assert_eq!(response.answer, None);

	let stats = response.stats.expect("stats must survive a phrasing failure");

	assert!(stats.count > 0);
}

#[tokio::test]
async fn health_reflects_provider_availability() {
	let healthy = indexed_service(stub_providers(), invoice_sections());
	let healthy_report = healthy.health().await;

	assert!(healthy_report.embedding_available);
	assert!(healthy_report.phrasing_available);

	let unhealthy_providers = Providers::new(
		Arc::new(FailingEmbedding),
		Arc::new(StubVectorSearch { hits: Vec::new() }),
		Arc::new(FailingPhrasing),
	);
	let unhealthy = indexed_service(unhealthy_providers, invoice_sections());
	let unhealthy_report = unhealthy.health().await;

	assert!(!unhealthy_report.embedding_available);
	assert!(!unhealthy_report.phrasing_available);
}
