use crate::error::BoxError;
use crate::record::EventRecord;
use crate::sink::{EventSink, SinkKind};
use async_trait::async_trait;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the dispatcher itself without any
/// I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl EventSink for NoopSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Structured
    }

    async fn send(&self, _record: &EventRecord) -> Result<(), BoxError> {
        Ok(())
    }
}
