use serde::{Deserialize, Serialize};

/// Smallest indexed and retrievable unit of document text. Immutable once
/// indexed; re-ingesting the owning document replaces its sections
/// wholesale, they are never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
	pub section_id: String,
	pub document_id: String,
	pub text: String,
	pub filename: String,
	pub page_number: Option<u32>,
}
