use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One retrieval hit for a query. External fields come from the hybrid
/// store; `final_score` and the per-stage scores are attached in place as
/// the candidate moves through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
	pub entry_id: Uuid,
	#[serde(rename = "type")]
	pub entry_type: String,
	pub title: String,
	pub canonical_citation: Option<String>,
	pub summary: Option<String>,
	pub text: Option<String>,
	pub similarity: f32,
	pub lexical: f32,
	pub final_score: f32,
	pub cross_score: Option<f32>,
	pub llm_score: Option<f32>,
}
impl Candidate {
	/// Displayable content for snippet building and model judging, summary
	/// preferred over full text.
	pub fn content(&self) -> Option<&str> {
		let summary = self.summary.as_deref().filter(|text| !text.trim().is_empty());

		summary.or_else(|| self.text.as_deref().filter(|text| !text.trim().is_empty()))
	}
}

/// The row shape list queries format and return as sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
	pub entry_id: Uuid,
	#[serde(rename = "type")]
	pub entry_type: String,
	pub title: String,
	pub canonical_citation: Option<String>,
	pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryRelation {
	#[serde(rename = "type")]
	pub rel_type: String,
	pub entry_id: Option<String>,
	pub citation: Option<String>,
	pub title: Option<String>,
	pub url: Option<String>,
	pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistStep {
	pub text: Option<String>,
	pub condition: Option<String>,
	pub deadline: Option<String>,
	pub evidence_needed: Option<String>,
	pub legal_basis: Option<String>,
	pub failure_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistPhase {
	pub name: Option<String>,
	pub steps: Vec<ChecklistStep>,
}

/// A heterogeneous legal-entry record. Core bibliographic fields apply to
/// every subtype; the rest are populated per entry type and left absent
/// elsewhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalEntry {
	pub entry_id: Option<Uuid>,
	#[serde(rename = "type")]
	pub entry_type: String,
	pub title: String,
	pub canonical_citation: Option<String>,
	pub summary: Option<String>,
	pub text: Option<String>,
	pub jurisdiction: Option<String>,
	pub law_family: Option<String>,
	pub section_id: Option<String>,
	pub status: Option<String>,
	pub effective_date: Option<String>,
	pub amendment_date: Option<String>,
	pub tags: Vec<String>,

	// Statutes.
	pub elements: Vec<String>,
	pub penalties: Vec<String>,
	pub defenses: Vec<String>,
	pub prescriptive_period: Option<String>,
	pub standard_of_proof: Option<String>,

	// Rules of court.
	pub rule_no: Option<String>,
	pub section_no: Option<String>,
	pub triggers: Vec<String>,
	pub time_limits: Vec<String>,
	pub required_forms: Vec<String>,

	// Agency circulars.
	pub circular_no: Option<String>,
	pub issuing_agency: Option<String>,
	pub applicability: Vec<String>,

	// Traffic rules and ordinances.
	pub violation_code: Option<String>,
	pub violation_name: Option<String>,
	pub license_action: Option<String>,
	pub fine_schedule: Vec<String>,
	pub apprehension_flow: Vec<String>,

	// Incident checklists.
	pub incident: Option<String>,
	pub phases: Vec<ChecklistPhase>,

	// Rights advisories.
	pub rights_scope: Option<String>,
	pub advice_points: Vec<String>,

	// Constitutional provisions.
	pub topics: Vec<String>,
	pub jurisprudence: Vec<String>,

	// Relations to other instruments.
	pub legal_bases: Vec<EntryRelation>,
	pub related_sections: Vec<EntryRelation>,
	pub supersedes: Vec<EntryRelation>,
	pub superseded_by: Vec<EntryRelation>,

	pub source_urls: Vec<String>,
	pub last_reviewed: Option<String>,
}
