pub(crate) mod index;
pub(crate) mod ranking;

use ahash::{AHashMap, AHashSet};
use tracing::warn;

use crate::{
	search::index::Corpus, SemanticHit, ServiceError, ServiceResult, TallyService,
};

const SNIPPET_CHARS: usize = 240;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub top_k: Option<u32>,
	pub min_score: Option<f32>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchItem {
	pub section_id: String,
	pub document_id: String,
	pub filename: String,
	pub page_number: Option<u32>,
	pub snippet: String,
	pub keyword_score: f32,
	pub bm25_score: f32,
	pub hybrid_score: f32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub trace_id: uuid::Uuid,
	pub items: Vec<SearchItem>,
	/// True when no semantic candidates were merged. The search endpoint
	/// never calls the vector service; only the ask pipeline does.
	pub lexical_only: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RankedSection {
	pub(crate) position: usize,
	pub(crate) keyword: f32,
	pub(crate) bm25_norm: f32,
	pub(crate) hybrid: f32,
}

#[derive(Default)]
struct CandidateAcc {
	matched_query_tokens: AHashSet<usize>,
	matched_terms: AHashSet<String>,
	semantic: f32,
}

impl TallyService {
	/// Lexical-only search over the indexed corpus.
	pub fn search(&self, req: SearchRequest) -> ServiceResult<SearchResponse> {
		if req.query.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Query must not be empty.".to_string(),
			});
		}

		let corpus = self.corpus()?;
		let ranked = rank_sections(&self.cfg, &corpus, &req.query, req.top_k, req.min_score, &[]);
		let items = ranked.iter().map(|r| search_item(&corpus, r)).collect();

		Ok(SearchResponse { trace_id: uuid::Uuid::new_v4(), items, lexical_only: true })
	}
}

pub(crate) fn search_item(corpus: &Corpus, ranked: &RankedSection) -> SearchItem {
	let section = &corpus.sections[ranked.position];

	SearchItem {
		section_id: section.section_id.clone(),
		document_id: section.document_id.clone(),
		filename: section.filename.clone(),
		page_number: section.page_number,
		snippet: snippet(&section.text),
		keyword_score: ranked.keyword,
		bm25_score: ranked.bm25_norm,
		hybrid_score: ranked.hybrid,
	}
}

/// Gathers candidates from exact and partial term matches plus any
/// external semantic hits, scores them, filters, and ranks. The whole
/// path is deterministic for a given corpus and query.
pub(crate) fn rank_sections(
	cfg: &tally_config::Config,
	corpus: &Corpus,
	query: &str,
	top_k: Option<u32>,
	min_score: Option<f32>,
	semantic: &[SemanticHit],
) -> Vec<RankedSection> {
	let query_tokens = tally_domain::tokenize::distinct_tokens(query);

	if query_tokens.is_empty() && semantic.is_empty() {
		return Vec::new();
	}

	let index = &corpus.index;
	let mut candidates: AHashMap<usize, CandidateAcc> = AHashMap::new();

	for (token_idx, token) in query_tokens.iter().enumerate() {
		if let Some(positions) = index.term_positions(token) {
			for &position in positions {
				let acc = candidates.entry(position).or_default();

				acc.matched_query_tokens.insert(token_idx);
				acc.matched_terms.insert(token.clone());
			}
		}

		if token.chars().count() < cfg.search.partial_min_token_len {
			continue;
		}

		let mut partial_terms = 0usize;

		for term in index.terms() {
			if term == token {
				continue;
			}
			if !term.contains(token.as_str()) && !token.contains(term.as_str()) {
				continue;
			}

			if let Some(positions) = index.term_positions(term) {
				for &position in positions {
					let acc = candidates.entry(position).or_default();

					acc.matched_query_tokens.insert(token_idx);
					acc.matched_terms.insert(term.clone());
				}
			}

			partial_terms += 1;

			if partial_terms >= cfg.search.partial_term_cap {
				break;
			}
		}
	}

	for hit in semantic {
		let Some(&position) = corpus.by_id.get(&hit.section_id) else {
			warn!(section_id = %hit.section_id, "semantic hit references an unknown section");

			continue;
		};
		let acc = candidates.entry(position).or_default();

		acc.semantic = acc.semantic.max(hit.score);
	}

	let filename_like = ranking::is_filename_like_query(query);
	let min_score = min_score.unwrap_or(cfg.search.min_score);
	let mut positions: Vec<usize> = candidates.keys().copied().collect();

	positions.sort_unstable();

	let mut ranked = Vec::with_capacity(positions.len().min(cfg.search.candidate_cap as usize));

	for position in positions {
		let acc = &candidates[&position];
		let keyword = ranking::keyword_score(acc.matched_query_tokens.len(), query_tokens.len());
		let mut matched_terms: Vec<&String> = acc.matched_terms.iter().collect();

		matched_terms.sort_unstable();

		let bm25: f32 = matched_terms
			.iter()
			.map(|term| {
				ranking::bm25_term(
					index.term_frequency(position, term),
					index.section_len(position),
					index.avg_section_len(),
					index.section_count(),
					index.doc_freq(term),
					&cfg.ranking,
				)
			})
			.sum();
		let bm25_norm = ranking::normalize_bm25(bm25, &cfg.ranking);
		let hybrid = ranking::hybrid_score(keyword, bm25_norm, &cfg.ranking);

		if !ranking::keeps_candidate(&cfg.ranking, keyword, bm25_norm, acc.semantic, filename_like)
		{
			continue;
		}
		if hybrid < min_score && acc.semantic < cfg.ranking.bm25_rescue_floor {
			continue;
		}

		ranked.push(RankedSection { position, keyword, bm25_norm, hybrid });
	}

	ranked.sort_by(|a, b| b.hybrid.total_cmp(&a.hybrid).then(a.position.cmp(&b.position)));
	ranked.truncate(cfg.search.candidate_cap as usize);
	ranked.truncate(top_k.unwrap_or(cfg.search.top_k) as usize);

	ranked
}

/// Leading slice of the section text, cut at a character boundary.
pub(crate) fn snippet(text: &str) -> String {
	if text.chars().count() <= SNIPPET_CHARS {
		return text.to_string();
	}

	let mut out: String = text.chars().take(SNIPPET_CHARS).collect();

	out.push('…');

	out
}
