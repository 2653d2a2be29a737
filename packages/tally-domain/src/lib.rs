pub mod aggregate;
pub mod extract;
pub mod fact;
pub mod section;
pub mod tokenize;

pub use aggregate::{AggregationResult, aggregate};
pub use extract::extract;
pub use fact::{
	AmountFact, DateFact, DateFormat, IdentifierFact, IdentifierKind, NumericFact, Provenance,
};
pub use section::Section;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Cannot aggregate an empty amount set.")]
	InsufficientData,
}
