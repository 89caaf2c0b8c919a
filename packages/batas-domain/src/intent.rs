use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
	Meta,
	List,
	FollowUp,
	Definition,
	Procedure,
	Analysis,
	Legal,
}
impl Intent {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Meta => "meta",
			Self::List => "list",
			Self::FollowUp => "follow_up",
			Self::Definition => "definition",
			Self::Procedure => "procedure",
			Self::Analysis => "analysis",
			Self::Legal => "legal",
		}
	}

	/// Meta, list, and follow-up intents short-circuit the pipeline; every
	/// other intent proceeds to retrieval.
	pub fn skips_retrieval(self) -> bool {
		matches!(self, Self::Meta | Self::List | Self::FollowUp)
	}
}

#[derive(Debug, Clone)]
pub struct Classification {
	pub intent: Intent,
	pub confidence: f32,
	pub query: String,
}

// Evaluation order encodes priority: meta must win over the analysis and
// definition keywords it overlaps with, and list must win over procedure.
const PATTERN_GROUPS: &[(Intent, &[&str], f32)] = &[
	(
		Intent::Meta,
		&[
			r"(?i)^\s*(hi|hello|hey|help)\s*[.!?,]?\s*$",
			r"(?i)\bwho\s+(are|made|built)\s+you\b",
			r"(?i)\bwhat\s+(are|is)\s+(you|this)\b",
			r"(?i)\bwhat\s+can\s+you\s+(do|answer|help)\b",
			r"(?i)\bhow\s+do\s+(you|i)\s+(work|use\s+(you|this))\b",
		],
		0.95,
	),
	(
		Intent::List,
		&[
			r"(?i)\b(list|enumerate|name|cite)\b.{0,40}\b(laws?|acts?|rules?|articles?|provisions?|statutes?|ordinances?)\b",
			r"(?i)\b(give|show)\s+me\b.{0,40}\b(laws?|acts?|rules?|articles?|provisions?|statutes?)\b",
			r"(?i)\bexamples?\s+of\b.{0,40}\b(laws?|acts?|rules?|statutes?)\b",
			r"(?i)^\s*(top|first)\s+\d+\b",
		],
		0.9,
	),
	(
		Intent::FollowUp,
		&[
			r"(?i)^\s*(what|how)\s+about\b",
			r"(?i)^\s*(and|also)\b",
			r"(?i)^\s*(another|more)\b",
			r"(?i)^\s*(ok(ay)?|yes|sure|go\s+on)\s*[.!?]?\s*$",
		],
		0.85,
	),
	(
		Intent::Definition,
		&[
			r"(?i)^\s*what\s+(is|are|does)\b",
			r"(?i)\bdefin(e|ition\s+of)\b",
			r"(?i)\bmeaning\s+of\b",
		],
		0.9,
	),
	(
		Intent::Procedure,
		&[
			r"(?i)^\s*how\s+(do|can|to|should)\b",
			r"(?i)\b(steps?|procedure|process|requirements?)\s+(for|to|in)\b",
			r"(?i)\bhow\s+(do|can)\s+i\s+(file|apply|register|appeal)\b",
		],
		0.85,
	),
	(
		Intent::Analysis,
		&[
			r"(?i)\bwhat\s+happens\s+if\b",
			r"(?i)\b(am|is|are)\s+\w+\s+liable\b",
			r"(?i)\b(can|could)\s+(i|they|he|she)\s+(sue|be\s+(arrested|charged|jailed))\b",
			r"(?i)\b(legal|illegal|allowed|punishable)\b.{0,30}\?",
		],
		0.8,
	),
];

/// Routes a raw question to the first matching intent group; match order
/// encodes priority. Unmatched questions default to the legal intent.
pub fn classify(question: &str) -> Classification {
	for (intent, patterns, confidence) in PATTERN_GROUPS {
		if matches_any(question, patterns) {
			return Classification {
				intent: *intent,
				confidence: *confidence,
				query: question.to_string(),
			};
		}
	}

	Classification { intent: Intent::Legal, confidence: 0.8, query: question.to_string() }
}

/// The closed set of follow-up leading phrases, shared by the classifier
/// group and the follow-up rewriter.
pub fn is_follow_up(question: &str) -> bool {
	let (_, patterns, _) = &PATTERN_GROUPS[2];

	matches_any(question, patterns)
}

fn matches_any(question: &str, patterns: &[&str]) -> bool {
	patterns
		.iter()
		.any(|pattern| Regex::new(pattern).map(|re| re.is_match(question)).unwrap_or(false))
}

/// Topical filter a list query narrows the aggregate sample to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTopic {
	RepublicActs,
	RulesOfCourt,
	PenalCode,
	Constitution,
	Any,
}
impl ListTopic {
	pub fn parse(query: &str) -> Self {
		let checks: &[(Self, &str)] = &[
			(Self::RepublicActs, r"(?i)\brepublic\s+acts?\b|\bra\s+\d"),
			(Self::RulesOfCourt, r"(?i)\brules?\s+of\s+court\b|\bprocedural\s+rules?\b"),
			(Self::PenalCode, r"(?i)\bpenal\s+code\b|\bcrim(es?|inal)\b|\bfelon(y|ies)\b"),
			(Self::Constitution, r"(?i)\bconstitution(al)?\b|\bbill\s+of\s+rights\b"),
		];

		for (topic, pattern) in checks {
			if Regex::new(pattern).map(|re| re.is_match(query)).unwrap_or(false) {
				return *topic;
			}
		}

		Self::Any
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::RepublicActs => "republic acts",
			Self::RulesOfCourt => "rules of court",
			Self::PenalCode => "penal code provisions",
			Self::Constitution => "constitutional provisions",
			Self::Any => "legal entries",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn meta_patterns_win_first() {
		for question in
			["What can you do?", "who are you", "hello", "How do you work exactly?"]
		{
			assert_eq!(classify(question).intent, Intent::Meta, "{question}");
		}
	}

	#[test]
	fn greetings_with_real_questions_are_not_meta() {
		let classification = classify("help me, my brother was arrested last night");

		assert_ne!(classification.intent, Intent::Meta);
	}

	#[test]
	fn list_queries_route_to_list() {
		assert_eq!(classify("list 3 republic acts").intent, Intent::List);
		assert_eq!(classify("Give me some laws about privacy").intent, Intent::List);
	}

	// Pattern order puts the definition group ahead of the legal default, so
	// "What is bail?" is a definition, never meta or list. Definition intents
	// still flow through retrieval.
	#[test]
	fn what_is_bail_is_a_definition() {
		let classification = classify("What is bail?");

		assert_eq!(classification.intent, Intent::Definition);
		assert!(!classification.intent.skips_retrieval());
	}

	#[test]
	fn unmatched_questions_default_to_legal() {
		let classification = classify("My landlord padlocked my unit while I was away");

		assert_eq!(classification.intent, Intent::Legal);
		assert_eq!(classification.confidence, 0.8);
	}

	#[test]
	fn follow_up_leads_match_the_closed_set() {
		assert!(is_follow_up("what about minors?"));
		assert!(is_follow_up("another 5"));
		assert!(!is_follow_up("What is estafa?"));
	}

	#[test]
	fn list_topics_parse_from_query_text() {
		assert_eq!(ListTopic::parse("list 3 republic acts"), ListTopic::RepublicActs);
		assert_eq!(ListTopic::parse("enumerate rules of court"), ListTopic::RulesOfCourt);
		assert_eq!(ListTopic::parse("show me crimes against persons"), ListTopic::PenalCode);
		assert_eq!(ListTopic::parse("list constitutional provisions"), ListTopic::Constitution);
		assert_eq!(ListTopic::parse("list some laws"), ListTopic::Any);
	}
}
