use batas_config::Config;

fn parse(raw: &str) -> Config {
	toml::from_str(raw).expect("parse failed")
}

#[test]
fn empty_config_uses_documented_defaults() {
	let cfg = parse("");

	assert_eq!(cfg.service.http_bind, "127.0.0.1:8080");
	assert_eq!(cfg.retrieval.jurisdiction, "Philippines");
	assert_eq!(cfg.list.default_count, 5);
	assert_eq!(cfg.list.max_count, 20);
	assert_eq!(cfg.sqg.cache_ttl_secs, 600);
	assert_eq!(cfg.sqg.cache_max_entries, 300);
	assert_eq!(cfg.rerank.strategy, "cross_encoder");
	assert_eq!(cfg.rerank.cross_encoder.high_confidence, 0.85);
	assert_eq!(cfg.rerank.cross_encoder.low_confidence, 0.22);
	assert_eq!(cfg.rerank.cross_encoder.min_similarity, 0.15);
	assert_eq!(cfg.rerank.cross_encoder.max_candidates, 24);
	assert_eq!(cfg.rerank.cross_encoder.top_n, 8);
	assert_eq!(cfg.rerank.cross_encoder.blend_weight, 0.7);
	assert_eq!(cfg.rerank.llm.min_lexical, 0.1);
	assert_eq!(cfg.rerank.llm.escalation_margin, 0.1);
	assert!(!cfg.metrics.enabled);
	assert!(batas_config::validate(&cfg).is_ok());
}

#[test]
fn rejects_inverted_confidence_band() {
	let cfg = parse(
		"\
[rerank.cross_encoder]
high_confidence = 0.2
low_confidence = 0.8
",
	);

	assert!(batas_config::validate(&cfg).is_err());
}

#[test]
fn rejects_unknown_strategy() {
	let cfg = parse(
		"\
[rerank]
strategy = \"both\"
",
	);

	assert!(batas_config::validate(&cfg).is_err());
}

#[test]
fn rejects_out_of_range_blend_weight() {
	let cfg = parse(
		"\
[rerank.llm]
blend_weight = 1.5
",
	);

	assert!(batas_config::validate(&cfg).is_err());
}

#[test]
fn rejects_zero_cache_sizes() {
	let cfg = parse(
		"\
[sqg]
cache_max_entries = 0
",
	);

	assert!(batas_config::validate(&cfg).is_err());
}

#[test]
fn rejects_pool_smaller_than_top_n() {
	let cfg = parse(
		"\
[rerank.llm]
max_candidates = 4
top_n = 8
",
	);

	assert!(batas_config::validate(&cfg).is_err());
}

#[test]
fn overrides_apply_per_strategy() {
	let cfg = parse(
		"\
[rerank.cross_encoder]
high_confidence = 0.9

[rerank.llm]
high_confidence = 0.7
top_n = 5
max_candidates = 12
",
	);

	assert_eq!(cfg.rerank.cross_encoder.high_confidence, 0.9);
	assert_eq!(cfg.rerank.cross_encoder.top_n, 8);
	assert_eq!(cfg.rerank.llm.high_confidence, 0.7);
	assert_eq!(cfg.rerank.llm.top_n, 5);
	assert!(batas_config::validate(&cfg).is_ok());
}
