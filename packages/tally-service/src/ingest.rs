use std::sync::Arc;

use ahash::AHashSet;
use tally_domain::section::Section;
use tracing::info;

use crate::{search::index::Corpus, ServiceError, ServiceResult, TallyService};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestRequest {
	pub sections: Vec<Section>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IngestReport {
	pub sections_indexed: usize,
	pub documents: usize,
	pub distinct_terms: usize,
}

impl TallyService {
	/// Rebuilds the whole index from the submitted sections and swaps it
	/// in atomically. In-flight queries finish against the generation
	/// they started with.
	pub fn index_documents(&self, req: IngestRequest) -> ServiceResult<IngestReport> {
		let mut seen_ids = AHashSet::with_capacity(req.sections.len());
		let mut documents = AHashSet::new();

		for section in &req.sections {
			if section.section_id.trim().is_empty() {
				return Err(ServiceError::InvalidRequest {
					message: "Every section needs a non-empty section_id.".to_string(),
				});
			}
			if section.document_id.trim().is_empty() {
				return Err(ServiceError::InvalidRequest {
					message: format!(
						"Section {} needs a non-empty document_id.",
						section.section_id
					),
				});
			}
			if !seen_ids.insert(section.section_id.as_str()) {
				return Err(ServiceError::InvalidRequest {
					message: format!("Duplicate section_id {}.", section.section_id),
				});
			}

			documents.insert(section.document_id.as_str());
		}

		let documents = documents.len();
		let corpus = Corpus::build(req.sections);
		let report = IngestReport {
			sections_indexed: corpus.sections.len(),
			documents,
			distinct_terms: corpus.index.distinct_term_count(),
		};

		self.swap_corpus(Arc::new(corpus));
		info!(
			sections = report.sections_indexed,
			documents = report.documents,
			terms = report.distinct_terms,
			"lexical index rebuilt"
		);

		Ok(report)
	}
}
