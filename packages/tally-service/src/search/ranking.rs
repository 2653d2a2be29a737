use tally_config::Ranking;

/// Fraction of distinct query tokens that matched the section.
pub(crate) fn keyword_score(matched: usize, total: usize) -> f32 {
	if total == 0 {
		return 0.0;
	}

	matched as f32 / total as f32
}

/// Okapi BM25 contribution of a single term, with the +1 idf floor so
/// very common terms never go negative.
pub(crate) fn bm25_term(
	tf: u32,
	section_len: u32,
	avg_section_len: f32,
	section_count: usize,
	doc_freq: usize,
	cfg: &Ranking,
) -> f32 {
	if tf == 0 || doc_freq == 0 || section_count == 0 {
		return 0.0;
	}

	let n = section_count as f32;
	let df = doc_freq as f32;
	let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
	let avg = if avg_section_len > 0.0 { avg_section_len } else { 1.0 };
	let tf = tf as f32;
	let norm = tf * (cfg.bm25_k1 + 1.0)
		/ (tf + cfg.bm25_k1 * (1.0 - cfg.bm25_b + cfg.bm25_b * section_len as f32 / avg));

	idf * norm
}

pub(crate) fn normalize_bm25(score: f32, cfg: &Ranking) -> f32 {
	(score / cfg.bm25_normalizer).clamp(0.0, 1.0)
}

pub(crate) fn hybrid_score(keyword: f32, bm25_norm: f32, cfg: &Ranking) -> f32 {
	cfg.keyword_weight * keyword + cfg.bm25_weight * bm25_norm
}

/// Whether the raw query looks like a filename or document code
/// lookup. Such queries keep a lower keyword floor because most of
/// their tokens never appear in section prose.
pub(crate) fn is_filename_like_query(query: &str) -> bool {
	query.split_whitespace().any(filename_like_token)
}

fn filename_like_token(token: &str) -> bool {
	if token.chars().count() < 3 {
		return false;
	}
	if let Some((stem, ext)) = token.rsplit_once('.')
		&& stem.chars().count() >= 2
		&& (1..=5).contains(&ext.chars().count())
		&& ext.chars().all(|c| c.is_ascii_alphanumeric())
	{
		return true;
	}

	token.contains('-')
		&& token.chars().any(|c| c.is_ascii_digit())
		&& token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Candidate filter: a section survives when its keyword overlap
/// clears the floor, or a strong BM25 signal rescues it, or an
/// external semantic hit vouches for it.
pub(crate) fn keeps_candidate(
	cfg: &Ranking,
	keyword: f32,
	bm25_norm: f32,
	semantic: f32,
	filename_like: bool,
) -> bool {
	let keyword_floor =
		if filename_like { cfg.filename_keyword_threshold } else { cfg.keyword_threshold };

	keyword >= keyword_floor || bm25_norm >= cfg.bm25_rescue_floor || semantic >= cfg.bm25_rescue_floor
}
