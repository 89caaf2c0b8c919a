use sqlx::{PgPool, Row, postgres::PgRow};

use batas_domain::{Candidate, EntrySummary, ListTopic};

use crate::Result;

/// Arguments for the black-box hybrid (vector + lexical) search function.
/// The embedding and fusion happen inside the database function; this crate
/// only passes the query text and expansion keywords through.
#[derive(Debug)]
pub struct HybridSearchArgs<'a> {
	pub query: &'a str,
	pub keywords: &'a [String],
	pub limit: u32,
}

/// Runs the hybrid retrieval function and maps its rows into scored
/// candidates. `score` is the fused retrieval score and seeds
/// `final_score`; the per-stage rerank scores start unset.
pub async fn hybrid_search(pool: &PgPool, args: HybridSearchArgs<'_>) -> Result<Vec<Candidate>> {
	let rows = sqlx::query(
		"\
SELECT entry_id, type, title, canonical_citation, summary, entry_text,
	vector_sim, lexical_sim, score
FROM hybrid_entry_search($1, $2, $3)",
	)
	.bind(args.query)
	.bind(args.keywords)
	.bind(args.limit as i64)
	.fetch_all(pool)
	.await?;

	rows.into_iter().map(candidate_from_row).collect()
}

fn candidate_from_row(row: PgRow) -> Result<Candidate> {
	let similarity: f32 = row.try_get("vector_sim")?;
	let lexical: f32 = row.try_get("lexical_sim")?;
	let score: f32 = row.try_get("score")?;

	Ok(Candidate {
		entry_id: row.try_get("entry_id")?,
		entry_type: row.try_get("type")?,
		title: row.try_get("title")?,
		canonical_citation: row.try_get("canonical_citation")?,
		summary: row.try_get("summary")?,
		text: row.try_get("entry_text")?,
		similarity,
		lexical,
		final_score: score,
		cross_score: None,
		llm_score: None,
	})
}

/// Aggregate sample for list queries: ordered by documentation completeness
/// so well-documented entries surface first, then randomized for diversity.
pub async fn sample_entries(
	pool: &PgPool,
	topic: ListTopic,
	count: u32,
) -> Result<Vec<EntrySummary>> {
	let sql = format!(
		"\
SELECT entry_id, type, title, canonical_citation, summary
FROM legal_entries
WHERE status = 'active'{}
ORDER BY
	(CASE WHEN summary IS NOT NULL AND length(summary) > 0 THEN 1 ELSE 0 END)
	+ (CASE WHEN canonical_citation IS NOT NULL AND length(canonical_citation) > 0 THEN 1 ELSE 0 END)
	+ (CASE WHEN entry_text IS NOT NULL AND length(entry_text) > 0 THEN 1 ELSE 0 END) DESC,
	random()
LIMIT $1",
		topic_predicate(topic),
	);
	let rows = sqlx::query(sql.as_str()).bind(count as i64).fetch_all(pool).await?;

	rows.into_iter().map(summary_from_row).collect()
}

fn topic_predicate(topic: ListTopic) -> &'static str {
	match topic {
		ListTopic::RepublicActs => " AND canonical_citation ILIKE 'RA %'",
		ListTopic::RulesOfCourt => " AND type = 'rule_of_court'",
		ListTopic::PenalCode =>
			" AND (canonical_citation ILIKE 'RPC %' OR law_family ILIKE '%penal%')",
		ListTopic::Constitution => " AND type = 'constitution_provision'",
		ListTopic::Any => "",
	}
}

fn summary_from_row(row: PgRow) -> Result<EntrySummary> {
	Ok(EntrySummary {
		entry_id: row.try_get("entry_id")?,
		entry_type: row.try_get("type")?,
		title: row.try_get("title")?,
		canonical_citation: row.try_get("canonical_citation")?,
		summary: row.try_get("summary")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn topic_predicates_narrow_the_sample() {
		assert!(topic_predicate(ListTopic::RepublicActs).contains("RA %"));
		assert!(topic_predicate(ListTopic::RulesOfCourt).contains("rule_of_court"));
		assert_eq!(topic_predicate(ListTopic::Any), "");
	}
}
