use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
	Error, Result,
	fact::{AmountFact, NumericFact},
};

/// Statistical summary of a deduplicated amount set. Computed once per
/// query and read-only downstream; the phrasing model narrates these
/// numbers, it never recomputes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
	pub count: usize,
	pub sum: f64,
	pub average: f64,
	pub median: f64,
	/// Population variance, not sample variance.
	pub variance: f64,
	pub stddev: f64,
	/// Subtotal per named currency. When `mixed_currency` is set these
	/// subtotals are the authoritative presentation; the headline sum is
	/// reference only, currencies are never converted or silently summed.
	pub currency_groups: BTreeMap<String, f64>,
	pub mixed_currency: bool,
	pub duplicates_removed: usize,
	pub confidence: f32,
}

/// Deduplicates and summarizes the Amount facts in `facts`. Dates and
/// identifiers carry provenance value but no magnitude; they are ignored
/// here.
///
/// Fails with `InsufficientData` when no amounts survive: an average over
/// zero values is undefined, not zero.
pub fn aggregate(facts: &[NumericFact], cfg: &tally_config::Aggregation) -> Result<AggregationResult> {
	let amounts: Vec<&AmountFact> = facts
		.iter()
		.filter_map(|fact| match fact {
			NumericFact::Amount(amount) => Some(amount),
			NumericFact::Date(_) | NumericFact::Identifier(_) => None,
		})
		.collect();
	let (kept, duplicates_removed) = dedup(&amounts, cfg.duplicate_epsilon);

	if kept.is_empty() {
		return Err(Error::InsufficientData);
	}

	let mut values: Vec<f64> = kept.iter().map(|amount| amount.value).collect();

	values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	let count = values.len();
	let sum: f64 = values.iter().sum();
	let average = sum / count as f64;
	let median = if count % 2 == 0 {
		(values[count / 2 - 1] + values[count / 2]) / 2.0
	} else {
		values[count / 2]
	};
	let variance =
		values.iter().map(|value| (value - average).powi(2)).sum::<f64>() / count as f64;
	let stddev = variance.sqrt();

	let mut currency_groups = BTreeMap::new();
	let mut has_unset = false;

	for amount in &kept {
		match amount.currency.as_ref() {
			Some(code) => {
				*currency_groups.entry(code.clone()).or_insert(0.0) += amount.value;
			},
			None => has_unset = true,
		}
	}

	let mixed_currency =
		currency_groups.len() > 1 || (has_unset && !currency_groups.is_empty());
	let spread = relative_spread(&values, average);
	let mut confidence: f32 = if count <= 1 {
		0.5
	} else if spread > cfg.low_confidence_spread {
		0.25
	} else {
		0.9
	};

	if mixed_currency {
		confidence = confidence.min(0.4);
	}

	Ok(AggregationResult {
		count,
		sum,
		average,
		median,
		variance,
		stddev,
		currency_groups,
		mixed_currency,
		duplicates_removed,
		confidence,
	})
}

/// Two amounts are duplicates when they agree on currency, differ by less
/// than epsilon, and come from near-duplicate sources: the same document,
/// or an identical raw span. Numerically equal totals from different
/// documents are genuinely distinct facts and are both kept.
fn dedup<'a>(amounts: &[&'a AmountFact], epsilon: f64) -> (Vec<&'a AmountFact>, usize) {
	let mut kept: Vec<&AmountFact> = Vec::with_capacity(amounts.len());
	let mut removed = 0_usize;

	for amount in amounts {
		let duplicate = kept.iter().any(|existing| {
			existing.currency == amount.currency
				&& (existing.value - amount.value).abs() < epsilon
				&& (existing.provenance.document_id == amount.provenance.document_id
					|| existing.raw_span == amount.raw_span)
		});

		if duplicate {
			removed += 1;
		} else {
			kept.push(amount);
		}
	}

	(kept, removed)
}

fn relative_spread(sorted_values: &[f64], average: f64) -> f64 {
	let Some(first) = sorted_values.first() else { return 0.0 };
	let Some(last) = sorted_values.last() else { return 0.0 };
	let span = last - first;

	if average.abs() < f64::EPSILON {
		return span;
	}

	span / average.abs()
}
