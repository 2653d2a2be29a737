use ahash::AHashMap;
use tally_domain::{section::Section, tokenize};

/// One indexed generation of the corpus. Rebuilds produce a fresh
/// `Corpus` that is swapped in atomically; readers keep the `Arc` they
/// already hold until their request finishes.
pub(crate) struct Corpus {
	pub(crate) sections: Vec<Section>,
	pub(crate) by_id: AHashMap<String, usize>,
	pub(crate) index: LexicalIndex,
}

pub(crate) struct LexicalIndex {
	/// Term to ascending section positions (ingestion order).
	postings: AHashMap<String, Vec<usize>>,
	/// All indexed terms, sorted, so substring scans visit terms in a
	/// stable order regardless of hasher seed.
	terms: Vec<String>,
	/// Per-section term frequencies, parallel to the section list.
	term_counts: Vec<AHashMap<String, u32>>,
	section_lens: Vec<u32>,
	avg_section_len: f32,
}

impl Corpus {
	pub(crate) fn build(sections: Vec<Section>) -> Self {
		let mut by_id = AHashMap::with_capacity(sections.len());

		for (position, section) in sections.iter().enumerate() {
			by_id.insert(section.section_id.clone(), position);
		}

		let index = LexicalIndex::build(&sections);

		Self { sections, by_id, index }
	}
}

impl LexicalIndex {
	pub(crate) fn build(sections: &[Section]) -> Self {
		let mut postings: AHashMap<String, Vec<usize>> = AHashMap::new();
		let mut term_counts = Vec::with_capacity(sections.len());
		let mut section_lens = Vec::with_capacity(sections.len());
		let mut total_len = 0u64;

		for (position, section) in sections.iter().enumerate() {
			let tokens = tokenize::tokens(&section.text);
			let mut counts: AHashMap<String, u32> = AHashMap::new();

			for token in &tokens {
				*counts.entry(token.clone()).or_insert(0) += 1;
			}
			for term in counts.keys() {
				let positions = postings.entry(term.clone()).or_default();

				if positions.last() != Some(&position) {
					positions.push(position);
				}
			}

			total_len += tokens.len() as u64;
			section_lens.push(tokens.len() as u32);
			term_counts.push(counts);
		}

		let mut terms: Vec<String> = postings.keys().cloned().collect();

		terms.sort_unstable();

		let avg_section_len = if sections.is_empty() {
			0.0
		} else {
			total_len as f32 / sections.len() as f32
		};

		Self { postings, terms, term_counts, section_lens, avg_section_len }
	}

	pub(crate) fn term_positions(&self, term: &str) -> Option<&[usize]> {
		self.postings.get(term).map(Vec::as_slice)
	}

	pub(crate) fn terms(&self) -> &[String] {
		&self.terms
	}

	pub(crate) fn doc_freq(&self, term: &str) -> usize {
		self.postings.get(term).map(Vec::len).unwrap_or(0)
	}

	pub(crate) fn term_frequency(&self, position: usize, term: &str) -> u32 {
		self.term_counts.get(position).and_then(|counts| counts.get(term)).copied().unwrap_or(0)
	}

	pub(crate) fn section_len(&self, position: usize) -> u32 {
		self.section_lens.get(position).copied().unwrap_or(0)
	}

	pub(crate) fn avg_section_len(&self) -> f32 {
		self.avg_section_len
	}

	pub(crate) fn section_count(&self) -> usize {
		self.section_lens.len()
	}

	pub(crate) fn distinct_term_count(&self) -> usize {
		self.terms.len()
	}
}
