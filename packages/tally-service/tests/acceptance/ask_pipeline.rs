use std::sync::{Arc, Mutex, atomic::AtomicUsize};

use tally_service::{
	AskRequest, Providers, SemanticHit, ServiceError, TallyService, REASON_INSUFFICIENT_DATA,
	REASON_NO_SOURCES,
};

use super::{
	indexed_service, invoice_sections, section, stub_providers, test_config, SpyPhrasing,
	StubEmbedding, StubPhrasing, StubVectorSearch,
};

fn ask_request(query: &str) -> AskRequest {
	AskRequest { query: query.to_string(), top_k: None, min_score: None }
}

#[tokio::test]
async fn full_pipeline_aggregates_deduplicates_and_narrates() {
	let calls = Arc::new(AtomicUsize::new(0));
	let prompts = Arc::new(Mutex::new(Vec::new()));
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: 4 }),
		Arc::new(StubVectorSearch { hits: Vec::new() }),
		Arc::new(SpyPhrasing {
			reply: "The totals add up to 1434.56.".to_string(),
			calls: calls.clone(),
			prompts: prompts.clone(),
		}),
	);
	let service = indexed_service(providers, invoice_sections());
	let response = service.ask(ask_request("invoice total")).await.expect("ask must succeed");
	let stats = response.stats.expect("stats must be present");

	// 1.234,56 TL appears twice in the same document and collapses once.
	assert_eq!(stats.duplicates_removed, 1);
	assert_eq!(stats.count, 2);
	assert!((stats.sum - 1434.56).abs() < 1e-9);
	assert!(stats.mixed_currency);
	assert_eq!(stats.currency_groups.len(), 2);
	assert!(stats.confidence <= 0.4);
	assert_eq!(response.answer.as_deref(), Some("The totals add up to 1434.56."));
	assert!(!response.degraded);
	assert_eq!(response.reason, None);
	assert!(!response.sources.is_empty());

	// The phrasing model only ever sees finished numbers.
	let prompts = prompts.lock().expect("prompt log poisoned");

	assert_eq!(prompts.len(), 1);
	assert!(prompts[0].contains("statistics over 2 amounts"));
	assert!(prompts[0].contains("TRY: 1234.56"));
	assert!(prompts[0].contains("USD: 200"));
}

#[tokio::test]
async fn unmatched_questions_report_no_sources() {
	let service = indexed_service(stub_providers(), invoice_sections());
	let response =
		service.ask(ask_request("xylophone quartet")).await.expect("ask must succeed");

	assert_eq!(response.answer, None);
	assert_eq!(response.stats, None);
	assert!(response.sources.is_empty());
	assert_eq!(response.confidence, 0.0);
	assert_eq!(response.reason.as_deref(), Some(REASON_NO_SOURCES));
}

#[tokio::test]
async fn sections_without_amounts_report_insufficient_data() {
	let service = indexed_service(
		stub_providers(),
		vec![section("s1", "memo", "memo.txt", "The invoice total will be confirmed later.")],
	);
	let response = service.ask(ask_request("invoice total")).await.expect("ask must succeed");

	assert_eq!(response.stats, None);
	assert_eq!(response.answer, None);
	assert!(!response.sources.is_empty());
	assert_eq!(response.reason.as_deref(), Some(REASON_INSUFFICIENT_DATA));
}

#[tokio::test]
async fn semantic_hits_widen_the_candidate_set() {
	let providers = Providers::new(
		Arc::new(StubEmbedding { vector_dim: 4 }),
		Arc::new(StubVectorSearch {
			hits: vec![SemanticHit { section_id: "s9".to_string(), score: 0.9 }],
		}),
		Arc::new(StubPhrasing { reply: "narrated answer".to_string() }),
	);
	let service = indexed_service(
		providers,
		vec![
			section("s1", "inv-a", "inv-a.pdf", "Invoice balance 100,50 TL"),
			section("s9", "inv-b", "inv-b.pdf", "Gross payable 500,00 TL"),
		],
	);
	let response = service.ask(ask_request("invoice balance")).await.expect("ask must succeed");
	let stats = response.stats.expect("stats must be present");

	assert!(response.sources.iter().any(|s| s.section_id == "s9"));
	assert!((stats.sum - 600.5).abs() < 1e-9);
	assert!(!stats.mixed_currency);
}

#[tokio::test]
async fn asking_before_ingest_fails_cleanly() {
	let service = TallyService::with_providers(test_config(), stub_providers());
	let err = service.ask(ask_request("invoice total")).await.unwrap_err();

	assert!(matches!(err, ServiceError::IndexNotBuilt));
}

#[tokio::test]
async fn blank_questions_are_rejected() {
	let service = indexed_service(stub_providers(), invoice_sections());
	let err = service.ask(ask_request(" ")).await.unwrap_err();

	assert!(matches!(err, ServiceError::InvalidRequest { .. }));
}
