use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;

use tracing_event_model::config::DispatchConfig;
use tracing_event_model::dispatcher::EventDispatcher;
use tracing_event_model::noop_sink::NoopSink;
use tracing_event_model::types::CacheAction;
use tracing_event_model::InvocationContext;

#[tokio::main]
async fn main() {
    let ctx = InvocationContext::new().shared();

    let config = DispatchConfig {
        channel_buffer: 50_000,
        batch_size: 1_000,
        flush_interval: Duration::from_millis(200),
        log_cache_events: true,
        ..DispatchConfig::default()
    };

    let (dispatcher, handle) = EventDispatcher::new(vec![Arc::new(NoopSink)], &config);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let event = CacheAction::new(&ctx, "adding", format!("analytics.table_{i}"));
        if let Err(e) = dispatcher.dispatch(&event) {
            eprintln!("failed to serialize event: {}", e);
        }
    }

    let elapsed = start.elapsed();
    println!("custom config: dispatched {} cache events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    match dispatcher.shutdown(handle).await {
        Ok(stats) => println!("{:?}", stats),
        Err(e) => eprintln!("dispatcher task failed: {}", e),
    }
}
