//! Stats Aggregator
//!
//! A fixed pool of tokio workers drains one shared ingestion queue of
//! `LookupEvent`s and folds each event into the `StatsRegistry`.
//!
//! - Producers never block: the queue is unbounded.
//! - The registry mutex is the single serialization point; `combine` and
//!   `get_stats` both take it, so readers never see a half-applied update.
//! - Two states only: running, then stopped (terminal). `shutdown` is a
//!   one-shot broadcast observed between receptions; an in-flight `combine`
//!   always completes first.

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::stats::StatsRegistry;
use crate::models::config::ReferencePoint;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{CountryStat, LookupEvent};

pub type LookupSender = UnboundedSender<LookupEvent>;
pub type LookupReceiver = UnboundedReceiver<LookupEvent>;

/// Ingestion queue shared by all workers
type SharedQueue = Arc<tokio::sync::Mutex<LookupReceiver>>;

/// Create an ingestion queue (multi-producer; the aggregator fans it out to its workers)
pub fn ingestion_queue() -> (LookupSender, LookupReceiver) {
    mpsc::unbounded_channel()
}

pub struct StatsAggregator {
    registry: Arc<Mutex<StatsRegistry>>,
    /// Own producer handle; `None` when the queue is owned by the caller
    queue: Mutex<Option<LookupSender>>,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl StatsAggregator {
    /// Start `worker_count` workers on a fresh queue. Must run inside a tokio runtime.
    pub fn new(reference: ReferencePoint, worker_count: usize) -> Self {
        let (tx, rx) = ingestion_queue();
        let aggregator = Self::with_queue(rx, reference, worker_count);
        if let Ok(mut queue) = aggregator.queue.lock() {
            *queue = Some(tx);
        }
        aggregator
    }

    /// Start workers on a queue whose producers live elsewhere.
    ///
    /// Once every sender is dropped and the backlog is drained, workers exit.
    /// `submit` fails on an aggregator built this way.
    pub fn with_queue(queue: LookupReceiver, reference: ReferencePoint, worker_count: usize) -> Self {
        let worker_count = if worker_count == 0 {
            warn!("⚠️ Stats worker count 0 requested, using 1");
            1
        } else {
            worker_count
        };

        let registry = Arc::new(Mutex::new(StatsRegistry::new(reference)));
        let queue: SharedQueue = Arc::new(tokio::sync::Mutex::new(queue));
        let shutdown = CancellationToken::new();

        let workers = (0..worker_count)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    queue.clone(),
                    registry.clone(),
                    shutdown.clone(),
                ))
            })
            .collect();

        info!("📊 Stats aggregator started with {} workers", worker_count);

        Self {
            registry,
            queue: Mutex::new(None),
            shutdown,
            workers: Mutex::new(workers),
        }
    }

    /// Push an event onto the ingestion queue. Never blocks.
    pub fn submit(&self, event: LookupEvent) -> AppResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(AppError::stats_stopped());
        }
        let queue = self.queue.lock().map_err(|_| AppError::stats_stopped())?;
        match queue.as_ref() {
            Some(tx) => tx.send(event).map_err(|_| AppError::stats_stopped()),
            None => Err(AppError::stats_stopped()),
        }
    }

    /// Apply one event directly, bypassing the queue
    pub fn combine(&self, event: &LookupEvent) {
        combine(&self.registry, event);
    }

    /// Latest report snapshot; `NoDataYet` until the first event is combined
    pub fn try_stats(&self) -> AppResult<String> {
        let registry = match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if registry.has_data() {
            Ok(registry.report().to_string())
        } else {
            Err(AppError::from_code(ErrorCode::NoDataYet))
        }
    }

    /// Latest report snapshot, or the "no data yet" sentinel
    pub fn get_stats(&self) -> String {
        self.try_stats().unwrap_or_else(|e| e.message)
    }

    /// Copy of the per-country records (sorted by country once data exists)
    pub fn records(&self) -> Vec<CountryStat> {
        self.registry
            .lock()
            .map(|registry| registry.records().to_vec())
            .unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Stop accepting events, let workers drain the backlog, then wait for them.
    ///
    /// With `with_queue`, this returns once the external senders are dropped too.
    pub async fn close(&self) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.take();
        }
        self.join_workers().await;
        self.shutdown.cancel();
        info!("📊 Stats aggregator closed");
    }

    /// Broadcast the stop signal and wait for every worker to exit.
    /// Events still queued are discarded.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        if let Ok(mut queue) = self.queue.lock() {
            queue.take();
        }
        self.join_workers().await;
        info!("🛑 Stats aggregator stopped");
    }

    async fn join_workers(&self) {
        let handles = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("⚠️ Stats worker ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for StatsAggregator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_worker(
    id: usize,
    queue: SharedQueue,
    registry: Arc<Mutex<StatsRegistry>>,
    shutdown: CancellationToken,
) {
    debug!("Stats worker {} started", id);
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!("Stats worker {}: stop signal received", id);
                return;
            }
            event = recv_next(&queue) => event,
        };

        match next {
            Some(event) => combine(&registry, &event),
            None => {
                debug!("Stats worker {}: ingestion queue closed", id);
                return;
            }
        }
    }
}

async fn recv_next(queue: &SharedQueue) -> Option<LookupEvent> {
    queue.lock().await.recv().await
}

fn combine(registry: &Mutex<StatsRegistry>, event: &LookupEvent) {
    let mut registry = match registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    registry.combine(event);
    debug!(
        "Combined lookup for {:?} ({} total)",
        event.country,
        registry.total_invocations()
    );
}
