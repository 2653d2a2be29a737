use serde::{Deserialize, Serialize};

/// Back-reference to the section a fact was extracted from. Provenance,
/// not ownership: sections live in the caller's document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
	pub section_id: String,
	pub document_id: String,
}

/// A structured value extracted deterministically from text. Closed set;
/// every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericFact {
	Amount(AmountFact),
	Date(DateFact),
	Identifier(IdentifierFact),
}
impl NumericFact {
	pub fn raw_span(&self) -> &str {
		match self {
			Self::Amount(fact) => &fact.raw_span,
			Self::Date(fact) => &fact.raw_span,
			Self::Identifier(fact) => &fact.raw_span,
		}
	}

	pub fn provenance(&self) -> &Provenance {
		match self {
			Self::Amount(fact) => &fact.provenance,
			Self::Date(fact) => &fact.provenance,
			Self::Identifier(fact) => &fact.provenance,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountFact {
	pub value: f64,
	/// Normalized currency code (`TRY`, `USD`, ...); unset when no currency
	/// token was found near the number.
	pub currency: Option<String>,
	pub raw_span: String,
	pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFact {
	/// `YYYY-MM-DD`, produced from an already range-checked calendar date.
	pub iso_date: String,
	pub format: DateFormat,
	pub raw_span: String,
	pub provenance: Provenance,
}

/// Which parsing rule produced the date, in the fixed priority order used
/// to resolve structurally ambiguous spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
	DottedDayFirst,
	Iso,
	SlashedDayFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierFact {
	pub kind: IdentifierKind,
	pub value: String,
	pub raw_span: String,
	pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
	Invoice,
	Order,
	Code,
}
