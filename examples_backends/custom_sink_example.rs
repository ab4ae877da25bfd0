use std::sync::Arc;

use async_trait::async_trait;
use tracing_event_model::{
    config::DispatchConfig,
    dispatcher::EventDispatcher,
    record::EventRecord,
    sink::{EventSink, SinkKind},
    types::{EmptyLine, MainEncounteredError, MainReportVersion},
    BoxError, InvocationContext,
};

/// Example of integrating a completely custom destination by implementing
/// the `EventSink` trait directly. Imagine this ships events to some
/// proprietary collector for which this crate does not provide a sink.
struct MyCollectorSink;

#[async_trait]
impl EventSink for MyCollectorSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    async fn send(&self, record: &EventRecord) -> Result<(), BoxError> {
        // Here you would call your own client library.
        // For the sake of example we just print the JSON line.
        println!("[my-collector] {}", record.to_json_line()?);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let ctx = InvocationContext::new().shared();
    let sink: Arc<dyn EventSink> = Arc::new(MyCollectorSink);
    let (dispatcher, handle) = EventDispatcher::new(vec![sink], &DispatchConfig::default());

    let events = [
        dispatcher.dispatch(&MainReportVersion::new(&ctx, env!("CARGO_PKG_VERSION"))),
        // Routed away from file-kind sinks, so the collector never sees it.
        dispatcher.dispatch(&EmptyLine::new(&ctx)),
        dispatcher.dispatch(&MainEncounteredError::new(&ctx, "simulated failure")),
    ];
    for outcome in events {
        if let Err(e) = outcome {
            eprintln!("failed to serialize event: {}", e);
        }
    }

    if let Err(e) = dispatcher.shutdown(handle).await {
        eprintln!("dispatcher task failed: {}", e);
    }
}
