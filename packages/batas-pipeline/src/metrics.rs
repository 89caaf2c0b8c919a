use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::{Duration, Instant},
};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Classify,
	StructuredQuery,
	Retrieval,
	Rerank,
}
impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Classify => "classify",
			Self::StructuredQuery => "structured_query",
			Self::Retrieval => "retrieval",
			Self::Rerank => "rerank",
		}
	}

	fn index(self) -> usize {
		match self {
			Self::Classify => 0,
			Self::StructuredQuery => 1,
			Self::Retrieval => 2,
			Self::Rerank => 3,
		}
	}
}

const STAGES: [Stage; 4] = [Stage::Classify, Stage::StructuredQuery, Stage::Retrieval, Stage::Rerank];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
	Sqg,
	CrossEncoder,
	LlmRerank,
}
impl CacheKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Sqg => "sqg",
			Self::CrossEncoder => "cross_encoder",
			Self::LlmRerank => "llm_rerank",
		}
	}

	fn index(self) -> usize {
		match self {
			Self::Sqg => 0,
			Self::CrossEncoder => 1,
			Self::LlmRerank => 2,
		}
	}
}

const CACHE_KINDS: [CacheKind; 3] = [CacheKind::Sqg, CacheKind::CrossEncoder, CacheKind::LlmRerank];

#[derive(Debug)]
pub struct StageTimer {
	stage: Stage,
	started: Instant,
}

/// Pipeline instrumentation. Every operation is a no-op when disabled at
/// construction, so instrumentation costs nothing unless turned on.
#[derive(Debug)]
pub struct Metrics {
	enabled: bool,
	queries: AtomicU64,
	total_micros: AtomicU64,
	stage_micros: [AtomicU64; 4],
	stage_calls: [AtomicU64; 4],
	cache_hits: [AtomicU64; 3],
	cache_misses: [AtomicU64; 3],
	early_terminations: AtomicU64,
	shortcut_skips: AtomicU64,
}
impl Metrics {
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled,
			queries: AtomicU64::new(0),
			total_micros: AtomicU64::new(0),
			stage_micros: std::array::from_fn(|_| AtomicU64::new(0)),
			stage_calls: std::array::from_fn(|_| AtomicU64::new(0)),
			cache_hits: std::array::from_fn(|_| AtomicU64::new(0)),
			cache_misses: std::array::from_fn(|_| AtomicU64::new(0)),
			early_terminations: AtomicU64::new(0),
			shortcut_skips: AtomicU64::new(0),
		}
	}

	pub fn start(&self, stage: Stage) -> Option<StageTimer> {
		self.enabled.then(|| StageTimer { stage, started: Instant::now() })
	}

	pub fn finish(&self, timer: Option<StageTimer>) {
		let Some(timer) = timer else { return };
		let index = timer.stage.index();

		self.stage_micros[index]
			.fetch_add(timer.started.elapsed().as_micros() as u64, Ordering::Relaxed);
		self.stage_calls[index].fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_cache_hit(&self, kind: CacheKind) {
		if self.enabled {
			self.cache_hits[kind.index()].fetch_add(1, Ordering::Relaxed);
		}
	}

	pub fn record_cache_miss(&self, kind: CacheKind) {
		if self.enabled {
			self.cache_misses[kind.index()].fetch_add(1, Ordering::Relaxed);
		}
	}

	pub fn record_early_termination(&self) {
		if self.enabled {
			self.early_terminations.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub fn record_shortcut(&self) {
		if self.enabled {
			self.shortcut_skips.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub fn record_query(&self, latency: Duration) {
		if self.enabled {
			self.queries.fetch_add(1, Ordering::Relaxed);
			self.total_micros.fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
		}
	}

	pub fn snapshot(&self) -> MetricsSnapshot {
		let queries = self.queries.load(Ordering::Relaxed);
		let stages = STAGES
			.iter()
			.map(|stage| {
				let calls = self.stage_calls[stage.index()].load(Ordering::Relaxed);
				let micros = self.stage_micros[stage.index()].load(Ordering::Relaxed);

				StageStats {
					stage: stage.as_str(),
					calls,
					avg_ms: average_ms(micros, calls),
				}
			})
			.collect();
		let caches = CACHE_KINDS
			.iter()
			.map(|kind| {
				let hits = self.cache_hits[kind.index()].load(Ordering::Relaxed);
				let misses = self.cache_misses[kind.index()].load(Ordering::Relaxed);

				CacheStats { cache: kind.as_str(), hits, misses, hit_rate_pct: hit_rate(hits, misses) }
			})
			.collect();

		MetricsSnapshot {
			enabled: self.enabled,
			queries,
			avg_total_ms: average_ms(self.total_micros.load(Ordering::Relaxed), queries),
			stages,
			caches,
			early_terminations: self.early_terminations.load(Ordering::Relaxed),
			shortcut_skips: self.shortcut_skips.load(Ordering::Relaxed),
		}
	}

	pub fn reset(&self) {
		self.queries.store(0, Ordering::Relaxed);
		self.total_micros.store(0, Ordering::Relaxed);
		for counter in &self.stage_micros {
			counter.store(0, Ordering::Relaxed);
		}
		for counter in &self.stage_calls {
			counter.store(0, Ordering::Relaxed);
		}
		for counter in &self.cache_hits {
			counter.store(0, Ordering::Relaxed);
		}
		for counter in &self.cache_misses {
			counter.store(0, Ordering::Relaxed);
		}
		self.early_terminations.store(0, Ordering::Relaxed);
		self.shortcut_skips.store(0, Ordering::Relaxed);
	}
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
	pub enabled: bool,
	pub queries: u64,
	pub avg_total_ms: f64,
	pub stages: Vec<StageStats>,
	pub caches: Vec<CacheStats>,
	pub early_terminations: u64,
	pub shortcut_skips: u64,
}

#[derive(Debug, Serialize)]
pub struct StageStats {
	pub stage: &'static str,
	pub calls: u64,
	pub avg_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
	pub cache: &'static str,
	pub hits: u64,
	pub misses: u64,
	pub hit_rate_pct: f64,
}

fn average_ms(micros: u64, count: u64) -> f64 {
	if count == 0 {
		return 0.0;
	}

	micros as f64 / count as f64 / 1_000.0
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
	let total = hits + misses;

	if total == 0 {
		return 0.0;
	}

	hits as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn disabled_metrics_record_nothing() {
		let metrics = Metrics::new(false);

		assert!(metrics.start(Stage::Classify).is_none());
		metrics.record_cache_hit(CacheKind::Sqg);
		metrics.record_query(Duration::from_millis(5));

		let snapshot = metrics.snapshot();

		assert_eq!(snapshot.queries, 0);
		assert_eq!(snapshot.caches[0].hits, 0);
	}

	#[test]
	fn snapshot_guards_division_by_zero() {
		let snapshot = Metrics::new(true).snapshot();

		assert_eq!(snapshot.avg_total_ms, 0.0);
		assert!(snapshot.caches.iter().all(|cache| cache.hit_rate_pct == 0.0));
		assert!(snapshot.stages.iter().all(|stage| stage.avg_ms == 0.0));
	}

	#[test]
	fn hit_rates_and_averages_derive_from_counters() {
		let metrics = Metrics::new(true);

		metrics.record_cache_hit(CacheKind::CrossEncoder);
		metrics.record_cache_hit(CacheKind::CrossEncoder);
		metrics.record_cache_miss(CacheKind::CrossEncoder);
		metrics.record_query(Duration::from_millis(10));
		metrics.record_query(Duration::from_millis(20));

		let snapshot = metrics.snapshot();
		let cross = &snapshot.caches[1];

		assert_eq!(cross.hits, 2);
		assert_eq!(cross.misses, 1);
		assert!((cross.hit_rate_pct - 66.666).abs() < 0.01);
		assert_eq!(snapshot.queries, 2);
		assert!((snapshot.avg_total_ms - 15.0).abs() < 0.001);
	}

	#[test]
	fn reset_clears_every_counter() {
		let metrics = Metrics::new(true);

		metrics.record_cache_miss(CacheKind::LlmRerank);
		metrics.record_early_termination();
		metrics.record_shortcut();
		metrics.record_query(Duration::from_millis(3));
		metrics.reset();

		let snapshot = metrics.snapshot();

		assert_eq!(snapshot.queries, 0);
		assert_eq!(snapshot.early_terminations, 0);
		assert_eq!(snapshot.shortcut_skips, 0);
		assert_eq!(snapshot.caches[2].misses, 0);
	}
}
