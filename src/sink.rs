use crate::error::BoxError;
use crate::record::EventRecord;
use async_trait::async_trait;

/// Which routing markers apply to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Terminal output; skipped for `noStdOut` events.
    Console,
    /// Log files; skipped for `noFile` events.
    File,
    /// Machine consumers that see every dispatched event.
    Structured,
}

/// Asynchronous destination for [`EventRecord`]s produced by the dispatcher.
///
/// The dispatcher calls `send` from its background task and never awaits
/// it on the thread that emitted the event.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Decides which routing markers and level threshold apply.
    fn kind(&self) -> SinkKind;

    /// Deliver one record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written.
    /// - `Err(..)` on I/O or encoding failure. The dispatcher retries with
    ///   backoff before giving up on the record.
    async fn send(&self, record: &EventRecord) -> Result<(), BoxError>;

    /// Flush buffered output. Default implementation is a no-op.
    async fn flush(&self) -> Result<(), BoxError> {
        Ok(())
    }
}
