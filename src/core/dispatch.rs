use crate::domain::model::Assignment;
use crate::domain::ports::Notifier;
use crate::utils::error::{ExchangeError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// What a worker does when a delivery keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Retry the same assignment until it succeeds.
    #[default]
    Forever,
    /// Give up after `max_attempts` failures and record a dead letter.
    Limited { max_attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub concurrency: usize,
    pub queue_capacity: usize,
    pub retry_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry: RetryPolicy::Forever,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed_attempts: usize,
    pub dead_letters: Vec<Assignment>,
}

impl DispatchSummary {
    fn merge(&mut self, other: DispatchSummary) {
        self.delivered += other.delivered;
        self.failed_attempts += other.failed_attempts;
        self.dead_letters.extend(other.dead_letters);
    }

    pub fn is_complete(&self) -> bool {
        self.dead_letters.is_empty()
    }
}

/// Resolves once every worker has drained the queue and exited.
pub struct DispatchHandle {
    workers: Vec<JoinHandle<DispatchSummary>>,
}

impl DispatchHandle {
    pub async fn wait(self) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();
        let mut first_error = None;
        // 等所有工作者結束後才回報第一個錯誤
        for (index, worker) in self.workers.into_iter().enumerate() {
            match worker.await {
                Ok(report) => summary.merge(report),
                Err(e) => {
                    tracing::error!("Dispatch worker {} terminated abnormally: {}", index, e);
                    first_error.get_or_insert(ExchangeError::DispatchError {
                        message: format!("worker {} terminated abnormally: {}", index, e),
                    });
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

/// Fixed-size worker pool fed from one bounded queue.
pub struct DispatchPool;

impl DispatchPool {
    /// Spawns `config.concurrency` workers. Dropping the returned sender closes
    /// the intake; the handle then resolves after the queue is drained.
    pub fn start<N>(config: &DispatchConfig, notifier: Arc<N>) -> (mpsc::Sender<Assignment>, DispatchHandle)
    where
        N: Notifier + ?Sized + 'static,
    {
        let concurrency = config.concurrency.max(1);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let queue = Arc::new(Mutex::new(rx));

        tracing::debug!("Starting dispatch pool with {} workers", concurrency);

        let workers = (0..concurrency)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let notifier = Arc::clone(&notifier);
                let retry_delay = config.retry_delay;
                let retry = config.retry;
                tokio::spawn(async move { run_worker(worker, queue, notifier, retry_delay, retry).await })
            })
            .collect();

        (tx, DispatchHandle { workers })
    }

    /// Submits every assignment, closes the intake and waits for completion.
    pub async fn dispatch_all<N>(
        config: &DispatchConfig,
        notifier: Arc<N>,
        assignments: Vec<Assignment>,
    ) -> Result<DispatchSummary>
    where
        N: Notifier + ?Sized + 'static,
    {
        let (tx, handle) = Self::start(config, notifier);
        for assignment in assignments {
            if tx.send(assignment).await.is_err() {
                return Err(ExchangeError::DispatchError {
                    message: "all dispatch workers exited before the queue was closed".to_string(),
                });
            }
        }
        drop(tx);
        handle.wait().await
    }
}

async fn run_worker<N>(
    worker: usize,
    queue: Arc<Mutex<mpsc::Receiver<Assignment>>>,
    notifier: Arc<N>,
    retry_delay: Duration,
    retry: RetryPolicy,
) -> DispatchSummary
where
    N: Notifier + ?Sized,
{
    let mut summary = DispatchSummary::default();

    loop {
        // 只在取件時持有鎖，傳送期間不持有
        let next = queue.lock().await.recv().await;
        let Some(assignment) = next else {
            break;
        };

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match notifier.send(&assignment.source, &assignment.destination).await {
                Ok(()) => {
                    tracing::info!("📨 Sent {}", assignment.source);
                    summary.delivered += 1;
                    break;
                }
                Err(e) => {
                    summary.failed_attempts += 1;
                    tracing::warn!(
                        "Error sending assignment to {} (attempt {}): {}",
                        assignment.source,
                        attempts,
                        e
                    );

                    if let RetryPolicy::Limited { max_attempts } = retry {
                        if attempts >= max_attempts {
                            tracing::error!(
                                "Giving up on {} after {} attempts",
                                assignment.source,
                                attempts
                            );
                            summary.dead_letters.push(assignment);
                            break;
                        }
                    }

                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    tracing::debug!("Dispatch worker {} finished", worker);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Participant;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// Fails the first `failures` sends per recipient, then succeeds.
    struct FlakyNotifier {
        failures: u32,
        attempts: StdMutex<HashMap<String, u32>>,
    }

    #[async_trait::async_trait]
    impl Notifier for FlakyNotifier {
        async fn send(&self, source: &Participant, _destination: &Participant) -> Result<()> {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(source.name.clone()).or_insert(0);
            *count += 1;
            if *count <= self.failures {
                return Err(ExchangeError::DeliveryError {
                    recipient: source.contact.clone(),
                    message: "transient".to_string(),
                });
            }
            Ok(())
        }
    }

    fn assignment(from: &str, to: &str) -> Assignment {
        Assignment {
            source: Participant::new(from, format!("{}@example.com", from)),
            destination: Participant::new(to, format!("{}@example.com", to)),
        }
    }

    fn fast_config(concurrency: usize, retry: RetryPolicy) -> DispatchConfig {
        DispatchConfig {
            concurrency,
            queue_capacity: 2,
            retry_delay: Duration::from_millis(1),
            retry,
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let notifier = Arc::new(FlakyNotifier {
            failures: 2,
            attempts: StdMutex::new(HashMap::new()),
        });
        let summary = DispatchPool::dispatch_all(
            &fast_config(2, RetryPolicy::Forever),
            notifier.clone(),
            vec![assignment("A", "B"), assignment("B", "A")],
        )
        .await
        .unwrap();

        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.failed_attempts, 4);
        assert!(summary.is_complete());
        let attempts = notifier.attempts.lock().unwrap();
        assert_eq!(attempts["A"], 3);
        assert_eq!(attempts["B"], 3);
    }

    #[tokio::test]
    async fn test_limited_retry_records_dead_letter() {
        let notifier = Arc::new(FlakyNotifier {
            failures: u32::MAX,
            attempts: StdMutex::new(HashMap::new()),
        });
        let summary = DispatchPool::dispatch_all(
            &fast_config(1, RetryPolicy::Limited { max_attempts: 3 }),
            notifier,
            vec![assignment("A", "B")],
        )
        .await
        .unwrap();

        assert_eq!(summary.delivered, 0);
        assert_eq!(summary.failed_attempts, 3);
        assert_eq!(summary.dead_letters, vec![assignment("A", "B")]);
        assert!(!summary.is_complete());
    }

    /// Records the clock at every attempt and always fails.
    struct TimedNotifier {
        attempts: StdMutex<Vec<tokio::time::Instant>>,
    }

    #[async_trait::async_trait]
    impl Notifier for TimedNotifier {
        async fn send(&self, source: &Participant, _destination: &Participant) -> Result<()> {
            self.attempts.lock().unwrap().push(tokio::time::Instant::now());
            Err(ExchangeError::DeliveryError {
                recipient: source.contact.clone(),
                message: "unavailable".to_string(),
            })
        }
    }

    /// Panics on the first send; the other workers keep draining the queue.
    struct PanickingNotifier {
        calls: std::sync::atomic::AtomicUsize,
        delivered: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Notifier for PanickingNotifier {
        async fn send(&self, _source: &Participant, _destination: &Participant) -> Result<()> {
            use std::sync::atomic::Ordering;
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("notifier crashed");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_retry_delay_between_attempts() {
        let notifier = Arc::new(TimedNotifier {
            attempts: StdMutex::new(Vec::new()),
        });
        let config = DispatchConfig {
            concurrency: 1,
            queue_capacity: 1,
            retry_delay: Duration::from_secs(1),
            retry: RetryPolicy::Limited { max_attempts: 3 },
        };
        let summary = DispatchPool::dispatch_all(&config, notifier.clone(), vec![assignment("A", "B")])
            .await
            .unwrap();

        assert_eq!(summary.failed_attempts, 3);
        let attempts = notifier.attempts.lock().unwrap();
        assert_eq!(attempts.len(), 3);
        for pair in attempts.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_secs(1), "retried after {:?}", gap);
            assert!(gap < Duration::from_millis(1100), "retried after {:?}", gap);
        }
    }

    #[tokio::test]
    async fn test_wait_joins_every_worker_before_reporting_failure() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let notifier = Arc::new(PanickingNotifier {
            calls: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
        });
        let result = DispatchPool::dispatch_all(
            &fast_config(2, RetryPolicy::Forever),
            notifier.clone(),
            vec![assignment("A", "B"), assignment("B", "C"), assignment("C", "A")],
        )
        .await;

        assert!(matches!(result, Err(ExchangeError::DispatchError { .. })));
        // 回報錯誤時，存活的工作者已送完剩下的兩件
        assert_eq!(notifier.delivered.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_completes() {
        let notifier = Arc::new(FlakyNotifier {
            failures: 0,
            attempts: StdMutex::new(HashMap::new()),
        });
        let (tx, handle) = DispatchPool::start(&fast_config(4, RetryPolicy::Forever), notifier);
        drop(tx);
        assert_eq!(handle.wait().await.unwrap(), DispatchSummary::default());
    }
}
