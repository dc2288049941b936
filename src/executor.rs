//! Bounded task executor
//!
//! A fixed-width pool of tokio workers draining a single FIFO queue.
//! Submitters never block: `submit` hands back a [`TaskHandle`] future
//! immediately. The width bounds in-flight work — a slow remote call
//! occupies one worker for its full duration, which caps concurrent
//! remote operations at the pool width.
//!
//! Jobs start in submission order; completion order depends on I/O.
//! Shutdown drains everything already queued, then rejects further
//! submissions; a started job always delivers its result.

use crate::error::{Result, SyncError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Default worker count
pub const DEFAULT_WORKERS: usize = 4;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Completion handle for a submitted operation.
///
/// Resolves to the operation's result, or `Canceled` if the executor was
/// shut down before the operation could run.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(SyncError::Canceled(
                "operation dropped before completion".into(),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Fixed-size worker pool executing submitted futures FIFO
pub struct TaskPool {
    tx: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskPool {
    /// Spawn a pool with the given number of workers (must be ≥ 1).
    /// Requires a running tokio runtime.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = std::sync::Arc::new(tokio::sync::Mutex::new(rx));

        let workers = (0..worker_count)
            .map(|_| {
                let rx = rx.clone();
                tokio::spawn(async move {
                    loop {
                        // Lock only to dequeue; run the job unlocked so
                        // the other workers keep draining the queue.
                        let job = {
                            let mut rx = rx.lock().await;
                            match rx.recv().await {
                                Some(job) => job,
                                None => break,
                            }
                        };
                        job.await;
                    }
                })
            })
            .collect();

        Self {
            tx: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
        }
    }

    /// Enqueue an operation. After [`shutdown`](Self::shutdown) the
    /// returned handle resolves immediately to `Canceled`.
    pub fn submit<T, F>(&self, operation: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let guard = self.tx.lock().unwrap();
        match guard.as_ref() {
            Some(tx) => {
                let job: Job = Box::pin(async move {
                    // A dropped handle is fine; the send just fails
                    let _ = done_tx.send(operation.await);
                });
                let _ = tx.send(job);
            }
            None => {
                let _ = done_tx.send(Err(SyncError::Canceled("executor is shut down".into())));
            }
        }
        TaskHandle { rx: done_rx }
    }

    /// Stop accepting work and wait for the queue to drain. Safe to call
    /// multiple times; later calls are no-ops.
    pub async fn shutdown(&self) {
        // Dropping the sender lets workers finish the queued jobs and exit
        drop(self.tx.lock().unwrap().take());
        let workers = std::mem::take(&mut *self.workers.lock().unwrap());
        for worker in workers {
            let _ = worker.await;
        }
    }
}
