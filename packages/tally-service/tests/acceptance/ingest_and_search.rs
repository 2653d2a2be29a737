use tally_service::{SearchRequest, ServiceError, TallyService};

use super::{indexed_service, invoice_sections, section, stub_providers, test_config};

fn search(service: &TallyService, query: &str) -> tally_service::SearchResponse {
	service
		.search(SearchRequest { query: query.to_string(), top_k: None, min_score: None })
		.expect("search must succeed")
}

#[test]
fn lexical_search_ranks_invoice_sections_above_noise() {
	let service = indexed_service(stub_providers(), invoice_sections());
	let response = search(&service, "invoice total");

	assert!(!response.items.is_empty());
	assert!(response.items.iter().all(|item| item.section_id != "s4"));
	assert!(
		response
			.items
			.windows(2)
			.all(|pair| pair[0].hybrid_score >= pair[1].hybrid_score)
	);
}

#[test]
fn filename_style_queries_reach_their_document() {
	let service = indexed_service(stub_providers(), invoice_sections());
	let response = search(&service, "inv-2024-001.pdf");

	assert!(response.items.iter().any(|item| item.document_id == "inv-2024-001"));
}

#[test]
fn identical_corpora_rank_identically() {
	let first = indexed_service(stub_providers(), invoice_sections());
	let second = indexed_service(stub_providers(), invoice_sections());
	let first_ids: Vec<String> =
		search(&first, "invoice total").items.into_iter().map(|i| i.section_id).collect();
	let second_ids: Vec<String> =
		search(&second, "invoice total").items.into_iter().map(|i| i.section_id).collect();

	assert_eq!(first_ids, second_ids);
}

#[test]
fn empty_queries_are_rejected() {
	let service = indexed_service(stub_providers(), invoice_sections());
	let err = service
		.search(SearchRequest { query: "   ".to_string(), top_k: None, min_score: None })
		.unwrap_err();

	assert!(matches!(err, ServiceError::InvalidRequest { .. }));
}

#[test]
fn unmatched_queries_return_an_empty_list() {
	let service = indexed_service(stub_providers(), invoice_sections());
	let response = search(&service, "xylophone quartet");

	assert!(response.items.is_empty());
}

#[test]
fn ingest_validates_before_touching_the_index() {
	let service = TallyService::with_providers(test_config(), stub_providers());
	let err = service
		.index_documents(tally_service::IngestRequest {
			sections: vec![section("", "doc", "doc.txt", "text")],
		})
		.unwrap_err();

	assert!(matches!(err, ServiceError::InvalidRequest { .. }));
	assert!(matches!(
		service
			.search(SearchRequest { query: "text".to_string(), top_k: None, min_score: None })
			.unwrap_err(),
		ServiceError::IndexNotBuilt
	));
}
