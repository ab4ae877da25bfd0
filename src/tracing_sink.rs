use crate::error::BoxError;
use crate::level::Level;
use crate::record::EventRecord;
use crate::sink::{EventSink, SinkKind};
use async_trait::async_trait;

/// Target used for re-emitted events, so subscribers can filter them.
pub const EVENT_TARGET: &str = "cli_events";

/// Re-emits each record as a `tracing` event under [`EVENT_TARGET`].
///
/// Lets an application that already installed a `tracing` subscriber
/// (see [`init_tracing`](crate::init::init_tracing)) render events with
/// its own formatting. Treated as a console sink for routing.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

#[async_trait]
impl EventSink for TracingSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    async fn send(&self, record: &EventRecord) -> Result<(), BoxError> {
        let code = record.code;
        let invocation_id = record.invocation_id.as_str();
        let message = record.message.as_str();
        match record.level {
            Level::Test => tracing::trace!(target: EVENT_TARGET, code, invocation_id, "{}", message),
            Level::Debug => tracing::debug!(target: EVENT_TARGET, code, invocation_id, "{}", message),
            Level::Info => tracing::info!(target: EVENT_TARGET, code, invocation_id, "{}", message),
            Level::Warn => tracing::warn!(target: EVENT_TARGET, code, invocation_id, "{}", message),
            Level::Error => tracing::error!(target: EVENT_TARGET, code, invocation_id, "{}", message),
        }
        Ok(())
    }
}
