//! Bounded worker pool for resolver and aggregator tasks

use crate::error::ProcessorError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs tasks with at most `size` in flight
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// Pool allowing `size` concurrent tasks (at least one)
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    /// Run `task` for every item and collect the results
    ///
    /// Cancellation is checked before each task starts; tasks already
    /// running finish. Returns [`ProcessorError::Cancelled`] when any item
    /// was not started, otherwise the first task error. Result order is
    /// unspecified.
    pub async fn run<I, T, F, Fut>(
        &self,
        items: Vec<I>,
        cancel: &CancellationToken,
        task: F,
    ) -> Result<Vec<T>, ProcessorError>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, ProcessorError>> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        let mut cancelled = false;

        for item in items {
            let permit = Arc::clone(&self.permits)
                .acquire_owned()
                .await
                .map_err(|e| ProcessorError::Worker(e.to_string()))?;
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let fut = task(item);
            tasks.spawn(async move {
                let _permit = permit;
                fut.await
            });
        }

        let mut results = Vec::new();
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(value)) => results.push(value),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(ProcessorError::Worker(e.to_string()));
                }
            }
        }

        if cancelled {
            return Err(ProcessorError::Cancelled);
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(results),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_runs_every_item_within_bound() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = pool
            .run((0..10).collect(), &CancellationToken::new(), |i: usize| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(i * 2)
                }
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 10);
        assert_eq!(results.iter().sum::<usize>(), 90);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let pool = WorkerPool::new(2);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pool
            .run(vec![1, 2, 3], &cancel, |i: i32| async move { Ok(i) })
            .await;
        assert!(matches!(result, Err(ProcessorError::Cancelled)));
    }

    #[tokio::test]
    async fn test_task_error_is_returned() {
        let pool = WorkerPool::new(4);
        let result = pool
            .run(vec![1, 2, 3], &CancellationToken::new(), |i: i32| async move {
                if i == 2 {
                    Err(ProcessorError::Roster("boom".to_string()))
                } else {
                    Ok(i)
                }
            })
            .await;
        assert!(matches!(result, Err(ProcessorError::Roster(_))));
    }
}
