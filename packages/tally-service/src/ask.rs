use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use tally_domain::{
	aggregate::{self, AggregationResult},
	extract,
	fact::Provenance,
};

use crate::{
	search, SemanticHit, ServiceError, ServiceResult, TallyService, REASON_INSUFFICIENT_DATA,
	REASON_NO_SOURCES,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AskRequest {
	pub query: String,
	pub top_k: Option<u32>,
	pub min_score: Option<f32>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SourceRef {
	pub section_id: String,
	pub document_id: String,
	pub filename: String,
	pub page_number: Option<u32>,
	pub snippet: String,
	pub hybrid_score: f32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AskResponse {
	pub trace_id: Uuid,
	/// Narrated answer. `None` when phrasing was skipped or degraded.
	pub answer: Option<String>,
	pub stats: Option<AggregationResult>,
	pub sources: Vec<SourceRef>,
	pub confidence: f32,
	pub degraded: bool,
	pub reason: Option<String>,
}

const SYSTEM_PROMPT: &str = "You narrate pre-computed numeric findings for a user. \
Every number you mention is given to you verbatim; never calculate, round, or invent \
numbers. Answer in one short paragraph and cite the listed source documents.";

impl TallyService {
	/// Runs the full question pipeline: semantic candidates (budgeted),
	/// lexical ranking, numeric extraction, aggregation, then phrased
	/// narration. Stage failures degrade the answer, they never abort it.
	pub async fn ask(&self, req: AskRequest) -> ServiceResult<AskResponse> {
		if req.query.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Query must not be empty.".to_string(),
			});
		}

		let corpus = self.corpus()?;
		let trace_id = Uuid::new_v4();
		let started = Instant::now();
		let (semantic, mut degraded) = self.semantic_candidates(&req.query).await;
		let ranked =
			search::rank_sections(&self.cfg, &corpus, &req.query, req.top_k, req.min_score, &semantic);

		if ranked.is_empty() {
			info!(%trace_id, query = %req.query, "no sections matched");

			return Ok(AskResponse {
				trace_id,
				answer: None,
				stats: None,
				sources: Vec::new(),
				confidence: 0.0,
				degraded,
				reason: Some(REASON_NO_SOURCES.to_string()),
			});
		}

		let extraction_started = Instant::now();
		let mut facts = Vec::new();

		for r in &ranked {
			let section = &corpus.sections[r.position];
			let provenance = Provenance {
				section_id: section.section_id.clone(),
				document_id: section.document_id.clone(),
			};

			facts.extend(extract::extract(&section.text, &provenance, &self.cfg.extraction));
		}

		if extraction_started.elapsed()
			> Duration::from_millis(self.cfg.pipeline.extraction_budget_ms)
		{
			warn!(%trace_id, "extraction stage exceeded its budget");
		}

		let sources: Vec<SourceRef> = ranked
			.iter()
			.map(|r| {
				let section = &corpus.sections[r.position];

				SourceRef {
					section_id: section.section_id.clone(),
					document_id: section.document_id.clone(),
					filename: section.filename.clone(),
					page_number: section.page_number,
					snippet: search::snippet(&section.text),
					hybrid_score: r.hybrid,
				}
			})
			.collect();
		let stats = match aggregate::aggregate(&facts, &self.cfg.aggregation) {
			Ok(stats) => Some(stats),
			Err(tally_domain::Error::InsufficientData) => None,
		};
		let Some(stats) = stats else {
			info!(%trace_id, facts = facts.len(), "no aggregatable amounts");

			return Ok(AskResponse {
				trace_id,
				answer: None,
				stats: None,
				sources,
				confidence: 0.0,
				degraded,
				reason: Some(REASON_INSUFFICIENT_DATA.to_string()),
			});
		};
		let answer = self.narrate(trace_id, &req.query, &stats, &sources).await;

		if answer.is_none() {
			degraded = true;
		}
		if started.elapsed() > Duration::from_millis(self.cfg.pipeline.total_budget_ms) {
			warn!(%trace_id, elapsed_ms = started.elapsed().as_millis() as u64, "query exceeded its total budget");
		}

		let confidence = stats.confidence;

		Ok(AskResponse {
			trace_id,
			answer,
			stats: Some(stats),
			sources,
			confidence,
			degraded,
			reason: None,
		})
	}

	/// Embeds the query and asks the external vector service for
	/// candidates. Both calls run under their stage budgets; any failure
	/// or timeout yields no candidates and flags the response degraded.
	async fn semantic_candidates(&self, query: &str) -> (Vec<SemanticHit>, bool) {
		let Some(vs_cfg) = self.cfg.providers.vector_search.as_ref() else {
			return (Vec::new(), false);
		};
		let embed_budget = Duration::from_millis(self.cfg.pipeline.embedding_budget_ms);
		let texts = [query.to_string()];
		let vectors = match timeout(
			embed_budget,
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts),
		)
		.await
		{
			Ok(Ok(vectors)) => vectors,
			Ok(Err(err)) => {
				warn!(%err, "embedding provider failed; continuing lexical-only");

				return (Vec::new(), true);
			},
			Err(_) => {
				warn!("embedding stage exceeded its budget; continuing lexical-only");

				return (Vec::new(), true);
			},
		};
		let Some(vector) = vectors.into_iter().next() else {
			warn!("embedding provider returned no vectors; continuing lexical-only");

			return (Vec::new(), true);
		};
		let retrieval_budget = Duration::from_millis(self.cfg.pipeline.retrieval_budget_ms);

		match timeout(
			retrieval_budget,
			self.providers.vector_search.similarity_search(vs_cfg, &vector, vs_cfg.top_k),
		)
		.await
		{
			Ok(Ok(hits)) => (hits, false),
			Ok(Err(err)) => {
				warn!(%err, "vector search failed; continuing lexical-only");

				(Vec::new(), true)
			},
			Err(_) => {
				warn!("vector search exceeded its budget; continuing lexical-only");

				(Vec::new(), true)
			},
		}
	}

	/// Hands the finished numbers to the phrasing model. Returns `None`
	/// when the stage fails or runs over budget.
	async fn narrate(
		&self,
		trace_id: Uuid,
		query: &str,
		stats: &AggregationResult,
		sources: &[SourceRef],
	) -> Option<String> {
		let budget = Duration::from_millis(self.cfg.pipeline.formatting_budget_ms);
		let messages = [
			serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
			serde_json::json!({ "role": "user", "content": narration_prompt(query, stats, sources) }),
		];

		match timeout(
			budget,
			self.providers.phrasing.format(&self.cfg.providers.phrasing, &messages),
		)
		.await
		{
			Ok(Ok(answer)) => Some(answer),
			Ok(Err(err)) => {
				warn!(%trace_id, %err, "phrasing provider failed; returning raw stats");

				None
			},
			Err(_) => {
				warn!(%trace_id, "phrasing stage exceeded its budget; returning raw stats");

				None
			},
		}
	}
}

fn narration_prompt(query: &str, stats: &AggregationResult, sources: &[SourceRef]) -> String {
	let mut prompt = format!(
		"Question: {query}\n\nComputed statistics over {count} amounts:\n\
- sum: {sum}\n- average: {average}\n- median: {median}\n- standard deviation: {stddev}\n",
		count = stats.count,
		sum = stats.sum,
		average = stats.average,
		median = stats.median,
		stddev = stats.stddev,
	);

	if stats.mixed_currency {
		prompt.push_str("Amounts span multiple currencies; per-currency sums:\n");

		for (currency, sum) in &stats.currency_groups {
			prompt.push_str(&format!("- {currency}: {sum}\n"));
		}

		prompt.push_str("State that the headline numbers mix currencies.\n");
	}

	prompt.push_str("\nSources:\n");

	for source in sources {
		match source.page_number {
			Some(page) => {
				prompt.push_str(&format!("- {} (page {})\n", source.filename, page));
			},
			None => prompt.push_str(&format!("- {}\n", source.filename)),
		}
	}

	prompt
}
