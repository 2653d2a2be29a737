use std::sync::LazyLock;

use regex::Regex;
use time::{Date, Month};

use crate::fact::{
	AmountFact, DateFact, DateFormat, IdentifierFact, IdentifierKind, NumericFact, Provenance,
};

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[A-Za-z][A-Za-z0-9]*(?:-[A-Za-z0-9]+)+").expect("Identifier pattern must compile.")
});
static DOTTED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").expect("Dotted date pattern must compile.")
});
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("ISO date pattern must compile.")
});
static SLASHED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("Slashed date pattern must compile.")
});
static NUMBER_RUN_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("Number pattern must compile."));

/// Parses one section's text into typed numeric facts. Deterministic: no
/// randomness, no IO, identical output for identical input.
///
/// Matching runs identifiers first, then dates, then amounts; a span
/// claimed by an earlier pass is never re-extracted by a later one, so a
/// number embedded in an identifier yields one Identifier fact, not an
/// Identifier plus an Amount.
pub fn extract(
	text: &str,
	provenance: &Provenance,
	cfg: &tally_config::Extraction,
) -> Vec<NumericFact> {
	let mut claimed: Vec<(usize, usize)> = Vec::new();
	let mut out = Vec::new();

	extract_identifiers(text, provenance, &mut claimed, &mut out);
	extract_dates(text, provenance, &mut claimed, &mut out);
	extract_amounts(text, provenance, cfg, &mut claimed, &mut out);

	out.sort_by_key(|(start, _)| *start);

	out.into_iter().map(|(_, fact)| fact).collect()
}

fn extract_identifiers(
	text: &str,
	provenance: &Provenance,
	claimed: &mut Vec<(usize, usize)>,
	out: &mut Vec<(usize, NumericFact)>,
) {
	for m in IDENTIFIER_RE.find_iter(text) {
		if !aligned(text, m.start(), m.end()) {
			continue;
		}

		let span = m.as_str();
		let kind = identifier_kind(span);
		let has_digit = span.chars().any(|ch| ch.is_ascii_digit());

		// Hyphenated prose ("re-ingestion") is not an identifier unless a
		// known prefix vouches for it.
		if !has_digit && kind == IdentifierKind::Code {
			continue;
		}

		claimed.push((m.start(), m.end()));
		out.push((
			m.start(),
			NumericFact::Identifier(IdentifierFact {
				kind,
				value: span.to_string(),
				raw_span: span.to_string(),
				provenance: provenance.clone(),
			}),
		));
	}
}

fn identifier_kind(span: &str) -> IdentifierKind {
	let prefix = span.split('-').next().unwrap_or_default().to_lowercase();

	match prefix.as_str() {
		"invoice" | "inv" | "fatura" => IdentifierKind::Invoice,
		"order" | "ord" | "siparis" => IdentifierKind::Order,
		_ => IdentifierKind::Code,
	}
}

fn extract_dates(
	text: &str,
	provenance: &Provenance,
	claimed: &mut Vec<(usize, usize)>,
	out: &mut Vec<(usize, NumericFact)>,
) {
	// Fixed priority order resolves structurally ambiguous spans: dotted
	// day-first, then ISO, then slashed day-first.
	let passes: [(&Regex, DateFormat, [usize; 3]); 3] = [
		(&DOTTED_DATE_RE, DateFormat::DottedDayFirst, [3, 2, 1]),
		(&ISO_DATE_RE, DateFormat::Iso, [1, 2, 3]),
		(&SLASHED_DATE_RE, DateFormat::SlashedDayFirst, [3, 2, 1]),
	];

	for (pattern, format, [year_group, month_group, day_group]) in passes {
		for caps in pattern.captures_iter(text) {
			let Some(m) = caps.get(0) else { continue };

			if overlaps(claimed, m.start(), m.end()) || !aligned(text, m.start(), m.end()) {
				continue;
			}

			let year: i32 = match caps[year_group].parse() {
				Ok(value) => value,
				Err(_) => continue,
			};
			let month: u8 = match caps[month_group].parse() {
				Ok(value) => value,
				Err(_) => continue,
			};
			let day: u8 = match caps[day_group].parse() {
				Ok(value) => value,
				Err(_) => continue,
			};
			// Out-of-range day/month combinations are rejected here, never
			// wrapped into the next month.
			let Ok(month) = Month::try_from(month) else {
				tracing_skip(m.as_str());

				continue;
			};
			let Ok(date) = Date::from_calendar_date(year, month, day) else {
				tracing_skip(m.as_str());

				continue;
			};
			let iso_date =
				format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day());

			claimed.push((m.start(), m.end()));
			out.push((
				m.start(),
				NumericFact::Date(DateFact {
					iso_date,
					format,
					raw_span: m.as_str().to_string(),
					provenance: provenance.clone(),
				}),
			));
		}
	}
}

fn extract_amounts(
	text: &str,
	provenance: &Provenance,
	cfg: &tally_config::Extraction,
	claimed: &mut Vec<(usize, usize)>,
	out: &mut Vec<(usize, NumericFact)>,
) {
	for m in NUMBER_RUN_RE.find_iter(text) {
		let token = m.as_str().trim_end_matches(['.', ',']);
		let start = m.start();
		let end = start + token.len();

		if token.is_empty() || overlaps(claimed, start, end) || !aligned(text, start, end) {
			continue;
		}

		let Some(value) = parse_amount_token(token) else {
			tracing_skip(token);

			continue;
		};

		let negative = is_negated(text, start, end);
		let currency = currency_near(text, start, end, cfg.currency_window_chars);

		claimed.push((start, end));
		out.push((
			start,
			NumericFact::Amount(AmountFact {
				value: if negative { -value } else { value },
				currency,
				raw_span: token.to_string(),
				provenance: provenance.clone(),
			}),
		));
	}
}

/// Resolves a numeric token's separator convention by the position and
/// identity of the last separator: a trailing 1-2 digit group marks the
/// decimal separator (`1.234,56` and `1,234.56` both parse to 1234.56);
/// trailing 3-digit groups are thousands marks and are stripped.
fn parse_amount_token(token: &str) -> Option<f64> {
	let Some(last_sep) = token.rfind([',', '.']) else {
		return token.parse::<f64>().ok();
	};
	let head = &token[..last_sep];
	let tail = &token[last_sep + 1..];

	if tail.is_empty() || !tail.chars().all(|ch| ch.is_ascii_digit()) {
		return None;
	}

	if tail.len() <= 2 {
		if !valid_grouping(head) {
			return None;
		}

		let mut digits: String = head.chars().filter(|ch| ch.is_ascii_digit()).collect();

		digits.push('.');
		digits.push_str(tail);

		return digits.parse::<f64>().ok();
	}

	// All-thousands form, e.g. `1.234.567`.
	if tail.len() == 3 && valid_grouping(head) {
		let digits: String = token.chars().filter(|ch| ch.is_ascii_digit()).collect();

		return digits.parse::<f64>().ok();
	}

	None
}

/// A head like `1.234` or `12` groups validly; `12.34` does not.
fn valid_grouping(head: &str) -> bool {
	let mut groups = head.split([',', '.']);
	let Some(lead) = groups.next() else { return false };

	if lead.is_empty() || lead.len() > 3 || !lead.chars().all(|ch| ch.is_ascii_digit()) {
		return false;
	}

	groups.all(|group| group.len() == 3 && group.chars().all(|ch| ch.is_ascii_digit()))
}

fn is_negated(text: &str, start: usize, end: usize) -> bool {
	let before = text[..start].chars().next_back();

	if before == Some('-') {
		return true;
	}

	before == Some('(') && text[end..].chars().next() == Some(')')
}

fn currency_near(text: &str, start: usize, end: usize, window: usize) -> Option<String> {
	let after: String = text[end..].chars().take(window).collect();

	if let Some(code) = currency_in(&after) {
		return Some(code);
	}

	let before: String = {
		let chars: Vec<char> = text[..start].chars().collect();

		chars[chars.len().saturating_sub(window)..].iter().collect()
	};

	currency_in(&before)
}

fn currency_in(window: &str) -> Option<String> {
	for (symbol, code) in [('₺', "TRY"), ('$', "USD"), ('€', "EUR"), ('£', "GBP")] {
		if window.contains(symbol) {
			return Some(code.to_string());
		}
	}

	for token in window.split(|ch: char| !ch.is_alphanumeric()) {
		let code = match token.to_uppercase().as_str() {
			"TRY" | "TL" => "TRY",
			"USD" => "USD",
			"EUR" | "EURO" => "EUR",
			"GBP" => "GBP",
			_ => continue,
		};

		return Some(code.to_string());
	}

	None
}

/// A span only counts when it is not embedded in a larger alphanumeric
/// token (`photobox360` must not yield an amount 360).
fn aligned(text: &str, start: usize, end: usize) -> bool {
	let before_ok =
		text[..start].chars().next_back().map(|ch| !ch.is_alphanumeric()).unwrap_or(true);
	let after_ok = text[end..].chars().next().map(|ch| !ch.is_alphanumeric()).unwrap_or(true);

	before_ok && after_ok
}

fn overlaps(claimed: &[(usize, usize)], start: usize, end: usize) -> bool {
	claimed.iter().any(|(s, e)| start < *e && *s < end)
}

fn tracing_skip(span: &str) {
	tracing::warn!(span, "Skipping malformed numeric span.");
}
