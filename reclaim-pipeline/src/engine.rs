//! The engine: per-source workers with a single fan-in point.
//!
//! `Engine::run` spawns one task per source. Each worker fetches its
//! raw batches under the source's timeout, then normalizes, scores,
//! classifies, and dedups entirely on worker-local state. Workers
//! never talk to each other; their outcomes meet only in the
//! aggregator, so one slow or broken marketplace can delay but never
//! poison the rest of the sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::aggregator::{self, SourceOutcome};
use crate::classifier;
use crate::config::{EngineConfig, SourceConfig};
use crate::dedup::Deduplicator;
use crate::error::SourceError;
use crate::normalizer;
use crate::source::RecordSource;
use crate::types::ConsolidatedReport;

/// Stateless between runs: every call to `run` builds its report from
/// scratch, holding no memory of earlier sweeps.
pub struct Engine {
    config: Arc<EngineConfig>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run one sweep over the given sources and consolidate.
    ///
    /// Sources without a matching `SourceConfig`, and sources that
    /// report themselves disabled, are skipped with a log line. Output
    /// order is deterministic: outcomes keep the caller's source order.
    pub async fn run(&self, sources: Vec<Arc<dyn RecordSource>>) -> ConsolidatedReport {
        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let name = source.name().to_string();
            let Some(source_config) = self.config.source(&name) else {
                log::warn!("source `{}` has no configuration, skipping", name);
                continue;
            };
            if !source.enabled() {
                log::info!("source `{}` disabled for this sweep", name);
                continue;
            }
            let source_config = source_config.clone();
            let engine_config = Arc::clone(&self.config);
            let handle =
                tokio::spawn(
                    async move { run_source(source, source_config, engine_config).await },
                );
            handles.push((name, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_error) => {
                    log::error!("source `{}` worker panicked: {}", name, join_error);
                    outcomes.push(SourceOutcome::failed(
                        name.clone(),
                        SourceError::Fetch {
                            name,
                            reason: join_error.to_string(),
                        },
                    ));
                }
            }
        }

        aggregator::aggregate(outcomes, self.config.top_k, Utc::now())
    }
}

async fn run_source(
    source: Arc<dyn RecordSource>,
    config: SourceConfig,
    engine: Arc<EngineConfig>,
) -> SourceOutcome {
    let name = config.name.clone();
    let deadline = Duration::from_secs(config.timeout_seconds);

    let batches = match tokio::time::timeout(deadline, source.fetch()).await {
        Ok(Ok(batches)) => batches,
        Ok(Err(error)) => {
            log::warn!("source `{}` failed: {}", name, error);
            return SourceOutcome::failed(name, error);
        }
        Err(_) => {
            log::warn!(
                "source `{}` timed out after {}s",
                name,
                config.timeout_seconds
            );
            let error = SourceError::Timeout {
                name: name.clone(),
                seconds: config.timeout_seconds,
            };
            return SourceOutcome::failed(name, error);
        }
    };

    let mut dropped = 0usize;
    let mut candidates = Vec::new();
    for batch in batches {
        for record in &batch.records {
            match normalizer::normalize(&name, record, &batch.search_term, batch.fetched_at) {
                Ok(normalized) => {
                    if let Some(candidate) =
                        classifier::classify(&normalized, &engine.dictionary, &config)
                    {
                        candidates.push(candidate);
                    }
                }
                Err(error) => {
                    dropped += 1;
                    log::warn!("source `{}`: record dropped: {}", name, error);
                }
            }
        }
    }
    log::debug!(
        "source `{}`: {} candidates, {} dropped",
        name,
        candidates.len(),
        dropped
    );

    let candidates = Deduplicator::new(config.similarity_threshold).collapse(candidates);
    SourceOutcome {
        source: name,
        candidates,
        dropped,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::source::{RecordBatch, StaticSource};

    fn batch(search_term: &str, records: Vec<serde_json::Value>) -> RecordBatch {
        RecordBatch {
            search_term: search_term.into(),
            fetched_at: Utc::now(),
            records: records
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect(),
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::with_presets().unwrap())
    }

    struct StalledSource;

    #[async_trait]
    impl RecordSource for StalledSource {
        fn name(&self) -> &str {
            "olx"
        }

        async fn fetch(&self) -> Result<Vec<RecordBatch>, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_times_out_and_is_flagged() {
        let report = engine().run(vec![Arc::new(StalledSource)]).await;
        assert_eq!(report.per_source_counts["olx"], 0);
        assert!(report.source_errors["olx"].contains("timed out after 30s"));
    }

    #[tokio::test]
    async fn bad_records_are_dropped_and_counted() {
        let source = StaticSource::new(
            "olx",
            vec![batch(
                "zephyrus m16",
                vec![
                    json!({ "title": "ASUS ROG Zephyrus M16 AniMe Matrix", "url": "https://x/1", "price_text": "R$ 2.499" }),
                    json!({ "url": "https://x/2" }),
                ],
            )],
        );
        let report = engine().run(vec![Arc::new(source)]).await;
        assert_eq!(report.per_source_counts["olx"], 1);
        assert_eq!(report.per_source_dropped["olx"], 1);
        assert!(report.source_errors.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_source_is_skipped() {
        let source = StaticSource::new("craigslist", vec![]);
        let report = engine().run(vec![Arc::new(source)]).await;
        assert!(!report.per_source_counts.contains_key("craigslist"));
    }

    #[tokio::test]
    async fn one_failed_source_does_not_affect_the_other() {
        struct BrokenSource;

        #[async_trait]
        impl RecordSource for BrokenSource {
            fn name(&self) -> &str {
                "ebay"
            }

            async fn fetch(&self) -> Result<Vec<RecordBatch>, SourceError> {
                Err(SourceError::Fetch {
                    name: "ebay".into(),
                    reason: "connection reset".into(),
                })
            }
        }

        let healthy = StaticSource::new(
            "olx",
            vec![batch(
                "gu604",
                vec![json!({
                    "title": "ASUS ROG GU604 Mini LED",
                    "url": "https://x/1",
                    "price_text": "R$ 2.800",
                })],
            )],
        );
        let report = engine()
            .run(vec![Arc::new(healthy), Arc::new(BrokenSource)])
            .await;
        assert_eq!(report.per_source_counts["olx"], 1);
        assert_eq!(report.per_source_counts["ebay"], 0);
        assert!(report.source_errors["ebay"].contains("connection reset"));
    }
}
