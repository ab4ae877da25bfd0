use std::sync::Arc;
use std::time::Instant;

use tracing_event_model::config::DispatchConfig;
use tracing_event_model::dispatcher::EventDispatcher;
use tracing_event_model::noop_sink::NoopSink;
use tracing_event_model::types::MainReportVersion;
use tracing_event_model::InvocationContext;

#[tokio::main]
async fn main() {
    let ctx = InvocationContext::new().shared();
    let (dispatcher, handle) =
        EventDispatcher::new(vec![Arc::new(NoopSink)], &DispatchConfig::default());

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let event = MainReportVersion::new(&ctx, format!("load-{i}"));
        if let Err(e) = dispatcher.dispatch(&event) {
            eprintln!("failed to serialize event: {}", e);
        }
    }

    let elapsed = start.elapsed();
    println!("default config: dispatched {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    match dispatcher.shutdown(handle).await {
        Ok(stats) => println!("{:?}", stats),
        Err(e) => eprintln!("dispatcher task failed: {}", e),
    }
}
