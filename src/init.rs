use crate::backend::{make_sink, parse_sink_spec, SinkBuildError, SinkSpecError};
use crate::config::{ConfigError, DispatchConfig};
use crate::dispatcher::EventDispatcher;
use crate::level::Level;
use crate::sink::EventSink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

/// Error returned while wiring up logging.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SinkSpec(#[from] SinkSpecError),

    #[error(transparent)]
    SinkBuild(#[from] SinkBuildError),

    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Build the sinks named in `config.sinks` and start a dispatcher over them.
///
/// **Parameters**
/// - `config`: [`DispatchConfig`] controlling buffering, routing thresholds,
///   the cache-events flag and which sinks to open.
///
/// **Returns**
/// - The dispatcher and the handle of its background task; pass both to
///   [`EventDispatcher::shutdown`] before the process exits.
pub async fn init_dispatcher(config: &DispatchConfig) -> Result<(EventDispatcher, JoinHandle<()>), InitError> {
    let mut sinks: Vec<Arc<dyn EventSink>> = Vec::with_capacity(config.sinks.len());
    for spec in &config.sinks {
        let spec = parse_sink_spec(spec)?;
        sinks.push(make_sink(&spec, config.format).await?);
    }
    Ok(EventDispatcher::new(sinks, config))
}

/// Dispatcher configured from `EVENT_LOG_*` environment variables.
pub async fn init_dispatcher_from_env() -> Result<(EventDispatcher, JoinHandle<()>), InitError> {
    let config = DispatchConfig::from_env()?;
    init_dispatcher(&config).await
}

/// Install a global `tracing` subscriber printing at `max_level` and above.
///
/// Needed to see the dispatcher's own diagnostics and the output of a
/// [`TracingSink`](crate::tracing_sink::TracingSink).
pub fn init_tracing(max_level: Level) -> Result<(), InitError> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(LevelFilter::from_level(max_level.to_tracing()));
    let subscriber = Registry::default().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
