use crate::config::DispatchConfig;
use crate::error::EventError;
use crate::event::Event;
use crate::level::Level;
use crate::record::EventRecord;
use crate::routing::Destinations;
use crate::sink::{EventSink, SinkKind};
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

/// Result of handing one event to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Queued for delivery.
    Enqueued,
    /// Cache event while cache events are disabled.
    Filtered,
    /// Channel full; the record was discarded.
    Dropped,
    /// The background task is gone; the record was discarded.
    Closed,
}

/// Counter snapshot, see [`EventDispatcher::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub total: u64,
    pub enqueued: u64,
    pub filtered: u64,
    pub dropped: u64,
    pub closed: u64,
    pub failed_deliveries: u64,
}

/// Routes events to sinks through a bounded channel and a background task.
///
/// `dispatch` never blocks and never performs I/O: it serializes the event
/// into an [`EventRecord`] and queues it. The background task batches
/// records and delivers each one to every sink whose kind the event's
/// routing markers allow and whose level threshold the event meets.
pub struct EventDispatcher {
    sender: mpsc::Sender<EventRecord>,
    log_cache_events: bool,
    /// Total events handed to `dispatch`.
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Cache events rejected because cache events are disabled.
    pub filtered_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
    /// Rejected because the background task has stopped.
    pub closed_events: Arc<AtomicU64>,
    /// Sink deliveries abandoned after all retries.
    pub failed_deliveries: Arc<AtomicU64>,
}

struct Route {
    sink: Arc<dyn EventSink>,
    kind: SinkKind,
    threshold: Level,
}

impl Route {
    fn accepts(&self, record: &EventRecord) -> bool {
        record.routing.allows(self.kind) && record.level >= self.threshold
    }
}

#[derive(Clone, Copy)]
struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
    max_backoff: Duration,
}

impl EventDispatcher {
    /// Create a dispatcher and spawn the background task that delivers
    /// records to `sinks`. Must be called inside a Tokio runtime.
    ///
    /// Minimal thresholds are enforced for `channel_buffer`, `batch_size`
    /// and `flush_interval` to avoid degenerate configurations.
    pub fn new(sinks: Vec<Arc<dyn EventSink>>, config: &DispatchConfig) -> (Self, JoinHandle<()>) {
        let buffer = config.channel_buffer.max(16);
        let batch_size = config.batch_size.max(1);
        let flush_interval = config.flush_interval.max(Duration::from_millis(10));
        let retry = RetryPolicy {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
        };

        let routes: Vec<Route> = sinks
            .into_iter()
            .map(|sink| {
                let kind = sink.kind();
                Route {
                    sink,
                    kind,
                    threshold: config.threshold(kind),
                }
            })
            .collect();

        let (tx, mut rx) = mpsc::channel::<EventRecord>(buffer);

        let failed_deliveries = Arc::new(AtomicU64::new(0));
        let failed_bg = Arc::clone(&failed_deliveries);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let mut ticker = interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(record) => {
                            batch.push(record);
                            if batch.len() >= batch_size {
                                deliver_batch(&routes, &mut batch, retry, &failed_bg).await;
                            }
                        }
                        None => break,
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            deliver_batch(&routes, &mut batch, retry, &failed_bg).await;
                        }
                    }
                }
            }

            deliver_batch(&routes, &mut batch, retry, &failed_bg).await;
            for route in &routes {
                if let Err(e) = route.sink.flush().await {
                    tracing::warn!(error = %e, "event sink flush failed");
                }
            }
        });

        (Self {
            sender: tx,
            log_cache_events: config.log_cache_events,
            total_events: Arc::new(AtomicU64::new(0)),
            enqueued_events: Arc::new(AtomicU64::new(0)),
            filtered_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
            closed_events: Arc::new(AtomicU64::new(0)),
            failed_deliveries,
        }, handle)
    }

    /// Whether `event` passes the cache-events gate.
    pub fn should_dispatch<E: Event>(&self, event: &E) -> bool {
        !event.routing().is_cache() || self.log_cache_events
    }

    /// Console/file destinations `event` would reach.
    pub fn destinations<E: Event>(&self, event: &E) -> Destinations {
        event.routing().destinations(self.log_cache_events)
    }

    /// Serialize `event` and queue it for delivery.
    ///
    /// Fails only when the event cannot be serialized.
    pub fn dispatch<E: Event>(&self, event: &E) -> Result<DispatchOutcome, EventError> {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if !self.should_dispatch(event) {
            self.filtered_events.fetch_add(1, Ordering::Relaxed);
            return Ok(DispatchOutcome::Filtered);
        }

        let record = EventRecord::from_event(event)?;
        match self.sender.try_send(record) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
                Ok(DispatchOutcome::Enqueued)
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(code = E::CODE, "event channel full, dropping event");
                Ok(DispatchOutcome::Dropped)
            }
            Err(TrySendError::Closed(_)) => {
                self.closed_events.fetch_add(1, Ordering::Relaxed);
                tracing::error!(code = E::CODE, "event dispatcher task has stopped, dropping event");
                Ok(DispatchOutcome::Closed)
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            total: self.total_events.load(Ordering::Relaxed),
            enqueued: self.enqueued_events.load(Ordering::Relaxed),
            filtered: self.filtered_events.load(Ordering::Relaxed),
            dropped: self.dropped_events.load(Ordering::Relaxed),
            closed: self.closed_events.load(Ordering::Relaxed),
            failed_deliveries: self.failed_deliveries.load(Ordering::Relaxed),
        }
    }

    /// Close the channel and wait until every queued record is delivered
    /// and the sinks are flushed.
    pub async fn shutdown(self, handle: JoinHandle<()>) -> Result<DispatchStats, JoinError> {
        let failed = Arc::clone(&self.failed_deliveries);
        let mut stats = self.stats();
        drop(self);
        handle.await?;
        stats.failed_deliveries = failed.load(Ordering::Relaxed);
        Ok(stats)
    }
}

async fn deliver_batch(
    routes: &[Route],
    batch: &mut Vec<EventRecord>,
    retry: RetryPolicy,
    failed: &AtomicU64,
) {
    for record in batch.drain(..) {
        for route in routes.iter().filter(|route| route.accepts(&record)) {
            if !send_with_retry(route, &record, retry).await {
                failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

async fn send_with_retry(route: &Route, record: &EventRecord, retry: RetryPolicy) -> bool {
    let mut backoff = retry.backoff;
    let mut attempt = 0;
    loop {
        match route.sink.send(record).await {
            Ok(()) => return true,
            Err(e) if attempt >= retry.max_retries => {
                tracing::warn!(
                    code = record.code,
                    sink = ?route.kind,
                    error = %e,
                    "giving up on event delivery"
                );
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "event sink send failed, retrying in {:?}", backoff);
                attempt += 1;
                sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, retry.max_backoff);
            }
        }
    }
}
