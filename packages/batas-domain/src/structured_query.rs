use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_JURISDICTION: &str = "Philippines";

const KEYWORD_LIMIT: usize = 10;
const MIN_KEYWORD_CHARS: usize = 3;

const STOPWORDS: &[&str] = &[
	"about", "after", "all", "and", "any", "are", "been", "before", "but", "can", "could", "did",
	"does", "for", "from", "had", "has", "have", "how", "into", "its", "may", "more", "not",
	"off", "our", "out", "over", "she", "should", "some", "than", "that", "the", "their", "them",
	"then", "there", "they", "this", "under", "was", "were", "what", "when", "where", "which",
	"while", "who", "why", "will", "with", "would", "you", "your",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
	#[default]
	Low,
	Medium,
	High,
}
impl Urgency {
	/// Coerces arbitrary input to one of the three enumerated values;
	/// unrecognized or missing input resolves to low.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_lowercase().as_str() {
			"high" => Self::High,
			"medium" => Self::Medium,
			_ => Self::Low,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}
}

/// A normalized, schema-shaped expansion of a free-text question. List
/// fields are always present (possibly empty), never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
	pub normalized_question: String,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub legal_topics: Vec<String>,
	#[serde(default)]
	pub statutes_referenced: Vec<String>,
	pub jurisdiction: String,
	#[serde(default)]
	pub temporal_scope: Option<String>,
	#[serde(default)]
	pub related_terms: Vec<String>,
	#[serde(default)]
	pub urgency: Urgency,
	#[serde(default)]
	pub query_expansions: Vec<String>,
}

/// Validates a model response field by field. A field of the wrong shape is
/// coerced to its type-correct default rather than failing, so the result
/// always satisfies the schema invariants.
pub fn coerce_structured_query(question: &str, value: Value) -> StructuredQuery {
	let normalized_question = value
		.get("normalized_question")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.unwrap_or_else(|| question.trim())
		.to_string();
	let jurisdiction = value
		.get("jurisdiction")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.unwrap_or(DEFAULT_JURISDICTION)
		.to_string();
	let temporal_scope = value
		.get("temporal_scope")
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.map(|text| text.to_string());
	let urgency = value
		.get("urgency")
		.and_then(Value::as_str)
		.map(Urgency::parse)
		.unwrap_or_default();

	StructuredQuery {
		normalized_question,
		keywords: string_list(value.get("keywords")),
		legal_topics: string_list(value.get("legal_topics")),
		statutes_referenced: string_list(value.get("statutes_referenced")),
		jurisdiction,
		temporal_scope,
		related_terms: string_list(value.get("related_terms")),
		urgency,
		query_expansions: string_list(value.get("query_expansions")),
	}
}

/// Deterministic degraded path for when the model call or parse fails. The
/// output satisfies the same schema invariants as the model path, so callers
/// never special-case it.
pub fn fallback_structured_query(question: &str) -> StructuredQuery {
	StructuredQuery {
		normalized_question: question.trim().to_string(),
		keywords: extract_keywords(question),
		legal_topics: Vec::new(),
		statutes_referenced: Vec::new(),
		jurisdiction: DEFAULT_JURISDICTION.to_string(),
		temporal_scope: None,
		related_terms: Vec::new(),
		urgency: infer_urgency(question),
		query_expansions: Vec::new(),
	}
}

/// First non-stopword tokens of the question, lowercased, longer than two
/// characters, capped at ten.
pub fn extract_keywords(question: &str) -> Vec<String> {
	let mut normalized = String::with_capacity(question.len());

	for ch in question.chars() {
		if ch.is_alphanumeric() {
			normalized.extend(ch.to_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	let mut out = Vec::new();

	for token in normalized.split_whitespace() {
		if token.len() < MIN_KEYWORD_CHARS || STOPWORDS.contains(&token) {
			continue;
		}

		out.push(token.to_string());

		if out.len() >= KEYWORD_LIMIT {
			break;
		}
	}

	out
}

pub fn infer_urgency(question: &str) -> Urgency {
	let high = r"(?i)\b(bail|warrant|arrest(ed)?|custody|detain(ed|tion)?|detention|emergency)\b";
	let medium = r"(?i)\b(deadline|filing|period|time[\s-]?limit)\b";

	if Regex::new(high).map(|re| re.is_match(question)).unwrap_or(false) {
		return Urgency::High;
	}
	if Regex::new(medium).map(|re| re.is_match(question)).unwrap_or(false) {
		return Urgency::Medium;
	}

	Urgency::Low
}

fn string_list(value: Option<&Value>) -> Vec<String> {
	let Some(Value::Array(items)) = value else { return Vec::new() };

	items
		.iter()
		.filter_map(Value::as_str)
		.map(str::trim)
		.filter(|text| !text.is_empty())
		.map(|text| text.to_string())
		.collect()
}
