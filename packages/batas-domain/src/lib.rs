pub mod embedding_text;
pub mod entry;
pub mod intent;
pub mod structured_query;

pub use embedding_text::build_embedding_text;
pub use entry::{Candidate, ChecklistPhase, ChecklistStep, EntryRelation, EntrySummary, LegalEntry};
pub use intent::{Classification, Intent, ListTopic, classify, is_follow_up};
pub use structured_query::{
	StructuredQuery, Urgency, coerce_structured_query, extract_keywords,
	fallback_structured_query, infer_urgency,
};
