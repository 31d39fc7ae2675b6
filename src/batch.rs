//! Chunked batch illustrations
//!
//! Screens and projects many records while holding only one chunk of
//! outcomes in flight. Every record is handled independently and a bad record
//! never aborts the run. Output order always matches input order, whether a
//! chunk runs sequentially or in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{BatchConfig, PolicyRules};
use crate::policy::BatchRecord;
use crate::projection::{IllustrationEngine, ProjectionResult};
use crate::validation::screen_batch_record;

/// Per-record result of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Caller-supplied id, or the record's zero-based position in the input
    pub policy_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProjectionResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl BatchOutcome {
    fn succeeded(policy_id: String, data: ProjectionResult) -> Self {
        Self {
            policy_id,
            success: true,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    fn failed(policy_id: String, errors: Vec<String>) -> Self {
        Self {
            policy_id,
            success: false,
            data: None,
            errors,
        }
    }
}

/// Pre-configured runner for batch illustrations
///
/// # Example
/// ```ignore
/// let runner = BatchRunner::new(rules, engine, BatchConfig::default());
/// let outcomes = runner.run(&records);
///
/// // Or stop after the first two chunks, keeping an in-order prefix
/// let prefix: Vec<_> = runner.chunks(&records).take(2).flatten().collect();
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    rules: PolicyRules,
    engine: IllustrationEngine,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(rules: PolicyRules, engine: IllustrationEngine, config: BatchConfig) -> Self {
        Self {
            rules,
            engine,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Effective chunk size; zero is treated as one
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size.max(1)
    }

    /// Run every record and collect all outcomes, in input order
    pub fn run(&self, records: &[BatchRecord]) -> Vec<BatchOutcome> {
        log::info!(
            "batch of {} records, chunk size {}, mode {:?}, parallel {}",
            records.len(),
            self.chunk_size(),
            self.config.mode,
            self.config.parallel
        );

        let mut outcomes = Vec::with_capacity(records.len());
        for chunk in self.chunks(records) {
            outcomes.extend(chunk);
        }

        let failed = outcomes.iter().filter(|o| !o.success).count();
        log::info!("batch complete: {} succeeded, {} failed", outcomes.len() - failed, failed);
        outcomes
    }

    /// Lazily process the input one chunk at a time.
    ///
    /// Each item is the outcomes for one chunk. Dropping the iterator early
    /// leaves the remaining chunks unprocessed; what was yielded is an
    /// in-order prefix of the full result.
    pub fn chunks<'a>(&'a self, records: &'a [BatchRecord]) -> BatchChunks<'a> {
        BatchChunks {
            runner: self,
            records,
            offset: 0,
        }
    }

    /// Screen and project one record; `index` is its position in the whole input
    pub fn process_record(&self, index: usize, record: &BatchRecord) -> BatchOutcome {
        let policy_id = record
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| index.to_string());

        let policy = match screen_batch_record(&self.rules, record, self.config.mode) {
            Ok(policy) => policy,
            Err(errors) => {
                log::warn!("record {} rejected: {}", policy_id, errors.join("; "));
                return BatchOutcome::failed(policy_id, errors);
            }
        };

        match self.engine.project(&policy) {
            Ok(result) => BatchOutcome::succeeded(policy_id, result),
            Err(e) => {
                log::warn!("record {} failed to project: {}", policy_id, e);
                BatchOutcome::failed(policy_id, vec![e.to_string()])
            }
        }
    }

    fn process_chunk(&self, offset: usize, chunk: &[BatchRecord]) -> Vec<BatchOutcome> {
        if self.config.parallel {
            // Indexed parallel iterators collect in source order
            chunk
                .par_iter()
                .enumerate()
                .map(|(i, record)| self.process_record(offset + i, record))
                .collect()
        } else {
            chunk
                .iter()
                .enumerate()
                .map(|(i, record)| self.process_record(offset + i, record))
                .collect()
        }
    }
}

/// Iterator over per-chunk outcomes, see [`BatchRunner::chunks`]
#[derive(Debug)]
pub struct BatchChunks<'a> {
    runner: &'a BatchRunner,
    records: &'a [BatchRecord],
    offset: usize,
}

impl Iterator for BatchChunks<'_> {
    type Item = Vec<BatchOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.records.len() {
            return None;
        }
        let end = (self.offset + self.runner.chunk_size()).min(self.records.len());
        let chunk = &self.records[self.offset..end];

        log::debug!("processing records {}..{}", self.offset, end);
        let outcomes = self.runner.process_chunk(self.offset, chunk);
        self.offset = end;
        Some(outcomes)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len().saturating_sub(self.offset);
        let chunks = remaining.div_ceil(self.runner.chunk_size());
        (chunks, Some(chunks))
    }
}

/// Batch with default rules, rates, and settings, except the chunk size
pub fn project_batch(records: &[BatchRecord], chunk_size: usize) -> Vec<BatchOutcome> {
    let config = BatchConfig {
        chunk_size,
        ..BatchConfig::default()
    };
    BatchRunner::new(PolicyRules::default(), IllustrationEngine::default(), config).run(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BatchMode;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(id: Option<&str>, age: u32) -> BatchRecord {
        BatchRecord {
            id: id.map(String::from),
            sum_assured: Some(dec!(1200000)),
            modal_premium: Some(dec!(80000)),
            premium_frequency: Some("Yearly".into()),
            policy_term: Some(18),
            premium_paying_term: Some(10),
            calculated_age: Some(age),
        }
    }

    fn runner(chunk_size: usize, mode: BatchMode, parallel: bool) -> BatchRunner {
        BatchRunner::new(
            PolicyRules::default(),
            IllustrationEngine::default(),
            BatchConfig {
                chunk_size,
                mode,
                parallel,
            },
        )
    }

    #[test]
    fn test_batch_two_policies() {
        let records = vec![
            record(Some("1"), 30),
            BatchRecord {
                id: Some("2".into()),
                sum_assured: Some(dec!(1000000)),
                modal_premium: Some(dec!(50000)),
                premium_frequency: Some("Yearly".into()),
                policy_term: Some(15),
                premium_paying_term: Some(8),
                calculated_age: Some(25),
            },
        ];

        let outcomes = project_batch(&records, 1000);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.success));
        assert_eq!(outcomes[0].policy_id, "1");
        assert_eq!(outcomes[1].policy_id, "2");
        assert_eq!(outcomes[1].data.as_ref().unwrap().illustrations.len(), 15);
    }

    #[test]
    fn test_missing_field_does_not_abort() {
        let mut broken = record(Some("b"), 30);
        broken.policy_term = None;
        let records = vec![record(Some("a"), 30), broken, record(Some("c"), 30)];

        let outcomes = runner(2, BatchMode::Strict, false).run(&records);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[1].data.is_none());
        assert!(outcomes[1].errors[0].contains("policy_term"));
        assert!(outcomes[2].success);
    }

    #[test]
    fn test_strict_and_legacy_modes() {
        let records = vec![record(None, 70)];

        let strict = runner(10, BatchMode::Strict, false).run(&records);
        assert!(!strict[0].success);
        assert_eq!(strict[0].errors, vec!["Age must be maximum 56".to_string()]);

        let legacy = runner(10, BatchMode::Legacy, false).run(&records);
        assert!(legacy[0].success);
    }

    #[test]
    fn test_overflowing_record_fails_alone() {
        let mut huge = record(Some("huge"), 30);
        huge.sum_assured = Some(Decimal::MAX);
        let records = vec![record(Some("a"), 30), huge, record(Some("c"), 30)];

        for parallel in [false, true] {
            let outcomes = runner(10, BatchMode::Strict, parallel).run(&records);
            assert_eq!(outcomes.len(), 3);
            assert!(outcomes[0].success);
            assert!(!outcomes[1].success);
            assert_eq!(outcomes[1].policy_id, "huge");
            assert!(outcomes[1].errors[0].contains("overflow"));
            assert!(outcomes[2].success);
        }
    }

    #[test]
    fn test_legacy_mode_bounds_unchecked_values() {
        let mut premium = record(Some("premium"), 30);
        premium.modal_premium = Some(Decimal::MAX);
        premium.premium_frequency = Some("Monthly".into());
        let mut term = record(Some("term"), 30);
        term.policy_term = Some(u32::MAX);
        let records = vec![premium, term, record(Some("ok"), 30)];

        let outcomes = runner(10, BatchMode::Legacy, true).run(&records);
        assert!(outcomes[0].errors[0].contains("overflow"));
        assert!(outcomes[1].errors[0].contains("projection limit"));
        assert!(outcomes[2].success);
    }

    #[test]
    fn test_ids_default_to_position() {
        let records: Vec<_> = (0..5).map(|_| record(None, 30)).collect();
        let outcomes = runner(2, BatchMode::Strict, false).run(&records);
        let ids: Vec<_> = outcomes.iter().map(|o| o.policy_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records: Vec<_> = (0..57)
            .map(|i| {
                let mut r = record(Some(&i.to_string()), 23 + (i % 40));
                if i % 7 == 0 {
                    r.modal_premium = None;
                }
                r
            })
            .collect();

        let sequential = runner(8, BatchMode::Strict, false).run(&records);
        let parallel = runner(8, BatchMode::Strict, true).run(&records);
        assert_eq!(sequential.len(), records.len());
        assert_eq!(sequential, parallel);
        for (i, outcome) in parallel.iter().enumerate() {
            assert_eq!(outcome.policy_id, i.to_string());
        }
    }

    #[test]
    fn test_chunks_yield_prefix() {
        let records: Vec<_> = (0..10).map(|_| record(None, 30)).collect();
        let runner = runner(3, BatchMode::Strict, true);

        let chunks = runner.chunks(&records);
        assert_eq!(chunks.size_hint(), (4, Some(4)));

        let prefix: Vec<_> = runner.chunks(&records).take(2).flatten().collect();
        assert_eq!(prefix.len(), 6);
        assert_eq!(prefix, runner.run(&records)[..6].to_vec());
    }

    #[test]
    fn test_zero_chunk_size_still_progresses() {
        let records: Vec<_> = (0..3).map(|_| record(None, 30)).collect();
        let outcomes = runner(0, BatchMode::Strict, false).run(&records);
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(project_batch(&[], 1000).is_empty());
    }
}
