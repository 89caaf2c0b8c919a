use crate::entry::{ChecklistPhase, EntryRelation, LegalEntry};

const LIST_SEPARATOR: &str = " \u{2022} ";

/// Flattens a legal entry into the text blob used for embedding.
///
/// The field walk is fixed and identical for every entry type; fields absent
/// on the input are skipped entirely, so output is reproducible and subtype
/// fields on foreign types are harmless.
pub fn build_embedding_text(entry: &LegalEntry) -> String {
	let mut out = String::new();

	push_field(&mut out, "Type", Some(entry.entry_type.as_str()));
	push_field(&mut out, "Title", Some(entry.title.as_str()));
	push_field(&mut out, "Canonical citation", entry.canonical_citation.as_deref());
	push_field(&mut out, "Summary", entry.summary.as_deref());
	push_field(&mut out, "Text", entry.text.as_deref());
	push_field(&mut out, "Jurisdiction", entry.jurisdiction.as_deref());
	push_field(&mut out, "Law family", entry.law_family.as_deref());
	push_field(&mut out, "Section", entry.section_id.as_deref());
	push_field(&mut out, "Status", entry.status.as_deref());
	push_field(&mut out, "Effective date", entry.effective_date.as_deref());
	push_field(&mut out, "Amendment date", entry.amendment_date.as_deref());
	push_list(&mut out, "Tags", &entry.tags);

	push_list(&mut out, "Elements", &entry.elements);
	push_list(&mut out, "Penalties", &entry.penalties);
	push_list(&mut out, "Defenses", &entry.defenses);
	push_field(&mut out, "Prescriptive period", entry.prescriptive_period.as_deref());
	push_field(&mut out, "Standard of proof", entry.standard_of_proof.as_deref());

	push_field(&mut out, "Rule", entry.rule_no.as_deref());
	push_field(&mut out, "Section number", entry.section_no.as_deref());
	push_list(&mut out, "Triggers", &entry.triggers);
	push_list(&mut out, "Time limits", &entry.time_limits);
	push_list(&mut out, "Required forms", &entry.required_forms);

	push_field(&mut out, "Circular number", entry.circular_no.as_deref());
	push_field(&mut out, "Issuing agency", entry.issuing_agency.as_deref());
	push_list(&mut out, "Applicability", &entry.applicability);

	push_field(&mut out, "Violation code", entry.violation_code.as_deref());
	push_field(&mut out, "Violation name", entry.violation_name.as_deref());
	push_field(&mut out, "License action", entry.license_action.as_deref());
	push_list(&mut out, "Fine schedule", &entry.fine_schedule);
	push_list(&mut out, "Apprehension flow", &entry.apprehension_flow);

	push_field(&mut out, "Incident", entry.incident.as_deref());
	push_phases(&mut out, &entry.phases);

	push_field(&mut out, "Rights scope", entry.rights_scope.as_deref());
	push_list(&mut out, "Advice points", &entry.advice_points);

	push_list(&mut out, "Topics", &entry.topics);
	push_list(&mut out, "Jurisprudence", &entry.jurisprudence);

	push_relations(&mut out, "Legal bases", &entry.legal_bases);
	push_relations(&mut out, "Related sections", &entry.related_sections);
	push_relations(&mut out, "Supersedes", &entry.supersedes);
	push_relations(&mut out, "Superseded by", &entry.superseded_by);

	push_list(&mut out, "Source URLs", &entry.source_urls);
	push_field(&mut out, "Last reviewed", entry.last_reviewed.as_deref());

	out.trim_end().to_string()
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
	let Some(value) = value else { return };
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return;
	}

	out.push_str(label);
	out.push_str(": ");
	out.push_str(trimmed);
	out.push('\n');
}

fn push_list(out: &mut String, label: &str, values: &[String]) {
	let items: Vec<&str> =
		values.iter().map(|value| value.trim()).filter(|value| !value.is_empty()).collect();

	if items.is_empty() {
		return;
	}

	push_field(out, label, Some(items.join(LIST_SEPARATOR).as_str()));
}

fn push_relations(out: &mut String, label: &str, relations: &[EntryRelation]) {
	let mut items = Vec::new();

	for relation in relations {
		let mut parts = Vec::new();

		if !relation.rel_type.trim().is_empty() {
			parts.push(format!("[{}]", relation.rel_type.trim()));
		}

		for value in [
			relation.entry_id.as_deref(),
			relation.citation.as_deref(),
			relation.title.as_deref(),
			relation.url.as_deref(),
			relation.note.as_deref(),
		]
		.into_iter()
		.flatten()
		{
			let trimmed = value.trim();

			if !trimmed.is_empty() {
				parts.push(trimmed.to_string());
			}
		}

		if !parts.is_empty() {
			items.push(parts.join(" "));
		}
	}

	if items.is_empty() {
		return;
	}

	push_field(out, label, Some(items.join(LIST_SEPARATOR).as_str()));
}

fn push_phases(out: &mut String, phases: &[ChecklistPhase]) {
	for (phase_index, phase) in phases.iter().enumerate() {
		let phase_label = phase
			.name
			.as_deref()
			.map(str::trim)
			.filter(|name| !name.is_empty())
			.map(|name| name.to_string())
			.unwrap_or_else(|| format!("Phase {}", phase_index + 1));

		for (step_index, step) in phase.steps.iter().enumerate() {
			let Some(text) = step.text.as_deref().map(str::trim).filter(|text| !text.is_empty())
			else {
				continue;
			};
			let mut line = text.to_string();

			for (sub_label, value) in [
				("condition", step.condition.as_deref()),
				("deadline", step.deadline.as_deref()),
				("evidence", step.evidence_needed.as_deref()),
				("legal basis", step.legal_basis.as_deref()),
				("on failure", step.failure_state.as_deref()),
			] {
				if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
					line.push_str(&format!(" | {sub_label}: {value}"));
				}
			}

			push_field(
				out,
				&format!("{phase_label} step {}", step_index + 1),
				Some(line.as_str()),
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::ChecklistStep;

	fn statute_entry() -> LegalEntry {
		LegalEntry {
			entry_type: "statute_section".to_string(),
			title: "Arbitrary Detention".to_string(),
			canonical_citation: Some("RPC Art. 124".to_string()),
			summary: Some("Detention without legal ground.".to_string()),
			jurisdiction: Some("Philippines".to_string()),
			tags: vec!["detention".to_string(), "public officers".to_string()],
			elements: vec![
				"Offender is a public officer".to_string(),
				"Detains a person".to_string(),
			],
			penalties: vec!["Arresto mayor".to_string()],
			legal_bases: vec![EntryRelation {
				rel_type: "statute".to_string(),
				citation: Some("Act No. 3815".to_string()),
				title: Some("Revised Penal Code".to_string()),
				..EntryRelation::default()
			}],
			..LegalEntry::default()
		}
	}

	#[test]
	fn output_is_deterministic() {
		let entry = statute_entry();

		assert_eq!(build_embedding_text(&entry), build_embedding_text(&entry));
	}

	#[test]
	fn absent_fields_never_appear() {
		let text = build_embedding_text(&statute_entry());

		assert!(text.contains("Title: Arbitrary Detention"));
		assert!(text.contains("Tags: detention \u{2022} public officers"));
		assert!(!text.contains("Rule:"));
		assert!(!text.contains("Violation code:"));
		assert!(!text.contains("Rights scope:"));
	}

	#[test]
	fn relations_flatten_to_token_runs() {
		let text = build_embedding_text(&statute_entry());

		assert!(text.contains("Legal bases: [statute] Act No. 3815 Revised Penal Code"));
	}

	#[test]
	fn checklist_steps_flatten_one_line_per_step() {
		let entry = LegalEntry {
			entry_type: "incident_checklist".to_string(),
			title: "Warrantless Arrest Response".to_string(),
			phases: vec![ChecklistPhase {
				name: Some("At the station".to_string()),
				steps: vec![ChecklistStep {
					text: Some("Demand counsel".to_string()),
					deadline: Some("immediately".to_string()),
					legal_basis: Some("Const. Art. III Sec. 12".to_string()),
					..ChecklistStep::default()
				}],
			}],
			..LegalEntry::default()
		};
		let text = build_embedding_text(&entry);

		assert!(text.contains(
			"At the station step 1: Demand counsel | deadline: immediately | legal basis: Const. Art. III Sec. 12"
		));
	}

	#[test]
	fn blank_statute_fields_are_skipped_on_non_statute_types() {
		let entry = LegalEntry {
			entry_type: "rights_advisory".to_string(),
			title: "Rights During Custodial Investigation".to_string(),
			rights_scope: Some("custodial investigation".to_string()),
			advice_points: vec!["Remain silent".to_string()],
			..LegalEntry::default()
		};
		let text = build_embedding_text(&entry);

		assert!(text.starts_with("Type: rights_advisory\nTitle: Rights During Custodial Investigation"));
		assert!(text.contains("Rights scope: custodial investigation"));
		assert!(!text.contains("Elements:"));
		assert!(!text.contains("Penalties:"));
	}
}
