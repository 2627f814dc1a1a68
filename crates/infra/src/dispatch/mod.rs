//! Async dispatcher: a fixed worker pool draining a FIFO task queue.
//!
//! Workers are plain Tokio tasks parked on a [`Notify`]. The listener
//! future is registered (`enable`) before the queue is re-checked, so a
//! `notify_one` sent between the check and the park is never lost.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use wren_common::error::ClientError;
use wren_common::DispatcherConfig;

use crate::http::ApiResponse;

/// Submission failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher has been shut down; no further work is accepted.
    #[error("dispatcher is shut down")]
    ShutDown,
}

/// A unit of queued work: an async action plus completion callbacks.
///
/// Exactly one callback fires per task, on the worker that ran it. A
/// panic in the action or a callback is caught and logged; it never takes
/// the worker down.
pub struct DispatchTask {
    action: BoxFuture<'static, Result<ApiResponse, ClientError>>,
    on_complete: Box<dyn FnOnce(ApiResponse) + Send>,
    on_error: Box<dyn FnOnce(ClientError) + Send>,
}

impl DispatchTask {
    pub fn new<F, C, E>(action: F, on_complete: C, on_error: E) -> Self
    where
        F: Future<Output = Result<ApiResponse, ClientError>> + Send + 'static,
        C: FnOnce(ApiResponse) + Send + 'static,
        E: FnOnce(ClientError) + Send + 'static,
    {
        Self {
            action: action.boxed(),
            on_complete: Box::new(on_complete),
            on_error: Box::new(on_error),
        }
    }

    async fn run(self) {
        let Self { action, on_complete, on_error } = self;
        let settled = async move {
            match action.await {
                Ok(response) => on_complete(response),
                Err(err) => on_error(err),
            }
        };
        if std::panic::AssertUnwindSafe(settled).catch_unwind().await.is_err() {
            error!("dispatched task panicked");
        }
    }
}

struct Shared {
    queue: Mutex<VecDeque<DispatchTask>>,
    notify: Notify,
    shutdown: AtomicBool,
}

impl Shared {
    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<DispatchTask>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Fixed-size worker pool executing [`DispatchTask`]s in submission order.
///
/// With a pool of one, execution order equals submission order exactly;
/// larger pools preserve dequeue order but complete concurrently.
pub struct Dispatcher {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Spawn the worker pool. Must be called from within a Tokio runtime.
    pub fn new(config: &DispatcherConfig) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
        });

        let pool_size = config.pool_size.max(1);
        let workers = (0..pool_size)
            .map(|index| tokio::spawn(Self::worker_loop(Arc::clone(&shared), index)))
            .collect();
        debug!(pool_size, "dispatcher started");
        Self { shared, workers: Mutex::new(workers) }
    }

    /// Enqueue a task and wake one idle worker. Never blocks.
    pub fn submit(&self, task: DispatchTask) -> Result<(), DispatchError> {
        if self.shared.is_shut_down() {
            return Err(DispatchError::ShutDown);
        }
        self.shared.lock_queue().push_back(task);
        self.shared.notify.notify_one();
        Ok(())
    }

    /// Shut the pool down: queued tasks are dropped, in-flight tasks run
    /// to completion, workers are joined. Safe to call more than once;
    /// later calls return once the workers are gone.
    pub async fn shutdown(&self) {
        if !self.shared.shutdown.swap(true, Ordering::AcqRel) {
            let dropped = self.shared.lock_queue().drain(..).count();
            if dropped > 0 {
                debug!(dropped, "discarding queued tasks on shutdown");
            }
        }
        self.shared.notify.notify_waiters();

        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            workers.drain(..).collect()
        };
        for handle in handles {
            if handle.await.is_err() {
                error!("dispatcher worker aborted");
            }
        }
    }

    async fn worker_loop(shared: Arc<Shared>, index: usize) {
        loop {
            let notified = shared.notify.notified();
            tokio::pin!(notified);
            // Register before re-checking the queue so a wake sent in
            // between is not lost.
            notified.as_mut().enable();

            loop {
                if shared.is_shut_down() {
                    debug!(worker = index, "dispatcher worker exiting");
                    return;
                }
                let task = shared.lock_queue().pop_front();
                match task {
                    Some(task) => task.run().await,
                    None => break,
                }
            }

            notified.await;
        }
    }
}
