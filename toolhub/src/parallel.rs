//! Bounded parallel execution of independent keyed operations
//!
//! [`ParallelExecutor`] runs a batch of async operations with at most
//! `max_concurrent_requests` in flight. Whenever one settles the next
//! not-yet-started operation is admitted, in submission order. Every operation
//! yields exactly one [`BatchItem`] at its submission index, whether it
//! succeeded or failed, and no failure stops the rest of the batch.

use crate::config::{Config, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_CONCURRENT_REQUESTS};
use crate::{Result, ToolhubError};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Instant;

/// Limits applied by a [`ParallelExecutor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Operations allowed in flight at once
    pub max_concurrent_requests: usize,
    /// Largest accepted batch
    pub max_batch_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl From<&Config> for ParallelConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrent_requests: config.max_concurrent_requests,
            max_batch_size: config.max_batch_size,
        }
    }
}

/// One keyed operation submitted to the executor
pub struct BatchOperation<K, F> {
    /// Caller supplied identifier, echoed in the result
    pub key: K,
    /// Closure producing the future to run
    pub operation: F,
}

impl<K, F> BatchOperation<K, F> {
    /// Pair a key with its operation
    pub fn new(key: K, operation: F) -> Self {
        Self { key, operation }
    }
}

/// How one operation settled
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome<V, E> {
    /// The operation produced a value
    Fulfilled(V),
    /// The operation failed
    Rejected(E),
}

/// Settlement of one operation, at its submission index
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem<K, V, E> {
    /// Key of the operation
    pub key: K,
    /// Position of the operation in the submitted batch
    pub index: usize,
    /// Value or failure
    pub outcome: BatchOutcome<V, E>,
}

impl<K, V, E> BatchItem<K, V, E> {
    /// Whether the operation succeeded
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Fulfilled(_))
    }

    /// The value, if the operation succeeded
    pub fn value(&self) -> Option<&V> {
        match &self.outcome {
            BatchOutcome::Fulfilled(value) => Some(value),
            BatchOutcome::Rejected(_) => None,
        }
    }

    /// The failure, if the operation failed
    pub fn reason(&self) -> Option<&E> {
        match &self.outcome {
            BatchOutcome::Fulfilled(_) => None,
            BatchOutcome::Rejected(reason) => Some(reason),
        }
    }
}

/// Serialized as `{key, index, status, value}` or `{key, index, status, reason}`
impl<K: Serialize, V: Serialize, E: Display> Serialize for BatchItem<K, V, E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchItem", 4)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("index", &self.index)?;
        match &self.outcome {
            BatchOutcome::Fulfilled(value) => {
                state.serialize_field("status", "fulfilled")?;
                state.serialize_field("value", value)?;
            }
            BatchOutcome::Rejected(reason) => {
                state.serialize_field("status", "rejected")?;
                state.serialize_field("reason", &reason.to_string())?;
            }
        }
        state.end()
    }
}

/// Concurrency-bounded runner for batches of independent operations
#[derive(Debug, Clone, Default)]
pub struct ParallelExecutor {
    config: ParallelConfig,
}

impl ParallelExecutor {
    /// Create an executor with the given limits
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Limits of this executor
    pub fn config(&self) -> ParallelConfig {
        self.config
    }

    /// Run every operation and return one item per operation, in input order
    ///
    /// Fails with [`ToolhubError::BatchTooLarge`] before starting anything when
    /// the batch exceeds `max_batch_size`. Otherwise always succeeds; individual
    /// failures are reported as [`BatchOutcome::Rejected`]. Operations run on
    /// the calling task, so they need be neither `Send` nor `'static`.
    pub async fn execute_parallel<K, V, E, F, Fut>(
        &self,
        operations: Vec<BatchOperation<K, F>>,
        label: Option<&str>,
    ) -> Result<Vec<BatchItem<K, V, E>>>
    where
        K: Debug,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let total = operations.len();
        if total > self.config.max_batch_size {
            return Err(ToolhubError::BatchTooLarge {
                size: total,
                max: self.config.max_batch_size,
            });
        }
        if total == 0 {
            return Ok(Vec::new());
        }

        let label = label.unwrap_or("batch");
        let limit = self.config.max_concurrent_requests.max(1);
        tracing::info!(
            "Starting {} operations for {} with concurrency limit {}",
            total,
            label,
            limit
        );
        let started = Instant::now();

        let mut settled: Vec<Option<BatchItem<K, V, E>>> = (0..total).map(|_| None).collect();
        let mut pending = operations.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < limit {
                let Some((index, BatchOperation { key, operation })) = pending.next() else {
                    break;
                };
                in_flight.push(async move { (index, key, operation().await) });
            }

            let Some((index, key, outcome)) = in_flight.next().await else {
                break;
            };

            let outcome = match outcome {
                Ok(value) => BatchOutcome::Fulfilled(value),
                Err(reason) => {
                    tracing::warn!(
                        "Operation {} of {} failed (key {:?}): {}",
                        index,
                        label,
                        key,
                        reason
                    );
                    BatchOutcome::Rejected(reason)
                }
            };
            settled[index] = Some(BatchItem {
                key,
                index,
                outcome,
            });
        }

        let results: Vec<BatchItem<K, V, E>> = settled.into_iter().flatten().collect();
        let succeeded = results.iter().filter(|item| item.is_fulfilled()).count();
        tracing::info!(
            "Finished {} in {:?}: {}/{} succeeded",
            label,
            started.elapsed(),
            succeeded,
            total
        );

        Ok(results)
    }

    /// Build one operation per input, keyed by the input itself, and run them
    pub async fn execute_mapped<I, V, E, G, Fut>(
        &self,
        inputs: Vec<I>,
        operation_factory: G,
        label: Option<&str>,
    ) -> Result<Vec<BatchItem<I, V, E>>>
    where
        I: Clone + Debug,
        E: Display,
        G: Fn(I) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let factory = &operation_factory;
        let operations = inputs
            .into_iter()
            .map(|input| {
                let argument = input.clone();
                BatchOperation::new(input, move || factory(argument))
            })
            .collect();

        self.execute_parallel(operations, label).await
    }

    /// Whether every item succeeded
    pub fn is_all_success<K, V, E>(results: &[BatchItem<K, V, E>]) -> bool {
        results.iter().all(BatchItem::is_fulfilled)
    }

    /// Whether any item failed
    pub fn has_errors<K, V, E>(results: &[BatchItem<K, V, E>]) -> bool {
        !Self::is_all_success(results)
    }

    /// Values of the successful items, in order
    pub fn successful_results<K, V, E>(results: &[BatchItem<K, V, E>]) -> Vec<&V> {
        results.iter().filter_map(BatchItem::value).collect()
    }

    /// Failures of the unsuccessful items, in order
    pub fn errors<K, V, E>(results: &[BatchItem<K, V, E>]) -> Vec<&E> {
        results.iter().filter_map(BatchItem::reason).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn executor(max_concurrent_requests: usize, max_batch_size: usize) -> ParallelExecutor {
        ParallelExecutor::new(ParallelConfig {
            max_concurrent_requests,
            max_batch_size,
        })
    }

    type OpFuture = futures::future::BoxFuture<'static, std::result::Result<String, String>>;
    type Op = Box<dyn FnOnce() -> OpFuture>;

    fn resolves(value: &str) -> Op {
        let value = value.to_string();
        Box::new(move || Box::pin(async move { Ok(value) }))
    }

    fn rejects(reason: &str) -> Op {
        let reason = reason.to_string();
        Box::new(move || Box::pin(async move { Err(reason) }))
    }

    #[tokio::test]
    async fn test_mixed_outcomes_keep_order() {
        let results = ParallelExecutor::default()
            .execute_parallel(
                vec![
                    BatchOperation::new("a", resolves("x")),
                    BatchOperation::new("b", rejects("boom")),
                ],
                Some("mixed"),
            )
            .await
            .unwrap();

        assert_eq!(
            results,
            vec![
                BatchItem {
                    key: "a",
                    index: 0,
                    outcome: BatchOutcome::Fulfilled("x".to_string())
                },
                BatchItem {
                    key: "b",
                    index: 1,
                    outcome: BatchOutcome::Rejected("boom".to_string())
                },
            ]
        );
        assert!(ParallelExecutor::has_errors(&results));
        assert_eq!(ParallelExecutor::successful_results(&results), vec!["x"]);
        assert_eq!(ParallelExecutor::errors(&results), vec!["boom"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = ParallelExecutor::default()
            .execute_parallel(Vec::<BatchOperation<usize, Op>>::new(), None)
            .await
            .unwrap();
        assert!(results.is_empty());
        assert!(ParallelExecutor::is_all_success(&results));
    }

    #[tokio::test]
    async fn test_batch_size_boundary() {
        let started = Arc::new(AtomicUsize::new(0));
        let make = |n: usize| {
            (0..n)
                .map(|i| {
                    let started = started.clone();
                    BatchOperation::new(i, move || async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        Ok::<usize, String>(i)
                    })
                })
                .collect::<Vec<_>>()
        };

        let executor = executor(5, 100);
        let exact = executor.execute_parallel(make(100), None).await.unwrap();
        assert_eq!(exact.len(), 100);
        assert_eq!(started.load(Ordering::SeqCst), 100);

        started.store(0, Ordering::SeqCst);
        let err = executor.execute_parallel(make(101), None).await.unwrap_err();
        assert!(matches!(err, ToolhubError::BatchTooLarge { size: 101, max: 100 }));
        let message = err.to_string();
        assert!(message.contains("101") && message.contains("100"));
        assert_eq!(started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let operations = (0..20)
            .map(|i| {
                let current = current.clone();
                let peak = peak.clone();
                BatchOperation::new(i, move || async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(i)
                })
            })
            .collect();

        let results = executor(3, 100)
            .execute_parallel(operations, Some("bounded"))
            .await
            .unwrap();

        assert_eq!(results.len(), 20);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let operations: Vec<BatchOperation<usize, Op>> = (0..10)
            .map(|i| {
                let op = if i % 3 == 0 {
                    rejects(&format!("failed {i}"))
                } else {
                    resolves(&i.to_string())
                };
                BatchOperation::new(i, op)
            })
            .collect();

        let results = executor(2, 100)
            .execute_parallel(operations, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 10);
        assert_eq!(ParallelExecutor::errors(&results).len(), 4);
        assert_eq!(ParallelExecutor::successful_results(&results).len(), 6);
        for (position, item) in results.iter().enumerate() {
            assert_eq!(item.index, position);
            assert_eq!(item.key, position);
        }
    }

    #[tokio::test]
    async fn test_execute_mapped_keys_by_input() {
        let results = ParallelExecutor::default()
            .execute_mapped(
                vec![2u64, 3, 4],
                |n| async move {
                    if n == 3 {
                        Err(format!("odd {n}"))
                    } else {
                        Ok(n * n)
                    }
                },
                Some("squares"),
            )
            .await
            .unwrap();

        let keys: Vec<u64> = results.iter().map(|item| item.key).collect();
        assert_eq!(keys, vec![2, 3, 4]);
        assert_eq!(ParallelExecutor::successful_results(&results), vec![&4, &16]);
        assert_eq!(results[1].reason().map(String::as_str), Some("odd 3"));
    }

    #[test]
    fn test_batch_item_serialization() {
        let ok: BatchItem<&str, i32, String> = BatchItem {
            key: "a",
            index: 0,
            outcome: BatchOutcome::Fulfilled(7),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"key": "a", "index": 0, "status": "fulfilled", "value": 7})
        );

        let failed: BatchItem<&str, i32, String> = BatchItem {
            key: "b",
            index: 1,
            outcome: BatchOutcome::Rejected("boom".into()),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"key": "b", "index": 1, "status": "rejected", "reason": "boom"})
        );
    }

    #[test]
    fn test_config_from_settings() {
        let config = Config {
            max_concurrent_requests: 2,
            max_batch_size: 7,
            ..Config::default()
        };
        assert_eq!(
            ParallelConfig::from(&config),
            ParallelConfig {
                max_concurrent_requests: 2,
                max_batch_size: 7
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_results_follow_submission_order(
            delays in proptest::collection::vec(0u64..8, 1..24),
            limit in 1usize..6,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();

            let results = runtime.block_on(async {
                let operations = delays
                    .iter()
                    .enumerate()
                    .map(|(i, delay)| {
                        let delay = *delay;
                        BatchOperation::new(i, move || async move {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            if delay % 5 == 0 {
                                Err(format!("slow {i}"))
                            } else {
                                Ok(i)
                            }
                        })
                    })
                    .collect();
                executor(limit, 100).execute_parallel(operations, None).await
            })
            .unwrap();

            prop_assert_eq!(results.len(), delays.len());
            for (position, item) in results.iter().enumerate() {
                prop_assert_eq!(item.index, position);
                prop_assert_eq!(item.key, position);
            }
        }
    }
}
