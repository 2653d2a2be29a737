use std::collections::HashSet;

/// Normalizes text for indexing and querying: lowercase, split on
/// non-alphanumeric boundaries. Unicode alphanumerics are kept so Turkish
/// text tokenizes the same way on both paths.
pub fn tokens(text: &str) -> Vec<String> {
	let mut normalized = String::with_capacity(text.len());

	for ch in text.chars() {
		if ch.is_alphanumeric() {
			for lower in ch.to_lowercase() {
				normalized.push(lower);
			}
		} else {
			normalized.push(' ');
		}
	}

	normalized.split_whitespace().map(|token| token.to_string()).collect()
}

/// Distinct tokens in first-seen order. Order matters for deterministic
/// candidate iteration downstream.
pub fn distinct_tokens(text: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for token in tokens(text) {
		if seen.insert(token.clone()) {
			out.push(token);
		}
	}

	out
}
