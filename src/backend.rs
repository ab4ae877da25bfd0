use std::path::PathBuf;
use std::sync::Arc;

use crate::noop_sink::NoopSink;
use crate::record::LogFormat;
use crate::sink::EventSink;
use crate::tracing_sink::TracingSink;

/// Sink selected by a short spec string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkSpec {
    Stdout,
    Stderr,
    File(PathBuf),
    Tracing,
    Noop,
}

/// Parse a sink spec.
///
/// Examples:
/// - "stdout", "stderr"
/// - "file:///var/log/tool/events.log", "file://logs/run.log"
/// - "tracing" (re-emit through the global `tracing` subscriber)
/// - "noop"
pub fn parse_sink_spec(spec: &str) -> Result<SinkSpec, SinkSpecError> {
    let trimmed = spec.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("file://") {
        let path = &trimmed["file://".len()..];
        if path.is_empty() {
            return Err(SinkSpecError::MissingPath);
        }
        return Ok(SinkSpec::File(PathBuf::from(path)));
    }

    match lower.as_str() {
        "stdout" => Ok(SinkSpec::Stdout),
        "stderr" => Ok(SinkSpec::Stderr),
        "tracing" => Ok(SinkSpec::Tracing),
        "noop" => Ok(SinkSpec::Noop),
        _ => Err(SinkSpecError::Unknown(trimmed.to_string())),
    }
}

/// Error type returned when parsing a sink spec.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SinkSpecError {
    #[error("unknown or unsupported sink spec: {0}")]
    Unknown(String),

    #[error("file sink spec has no path")]
    MissingPath,
}

/// Error type returned when building a sink from a spec.
#[derive(thiserror::Error, Debug)]
pub enum SinkBuildError {
    #[error("console feature is not enabled")]
    ConsoleFeatureDisabled,

    #[error("file feature is not enabled")]
    FileFeatureDisabled,

    #[error("cannot open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Create a concrete [`EventSink`] for `spec`.
pub async fn make_sink(spec: &SinkSpec, format: LogFormat) -> Result<Arc<dyn EventSink>, SinkBuildError> {
    match spec {
        SinkSpec::Stdout | SinkSpec::Stderr => {
            #[cfg(feature = "console")]
            {
                use crate::console::ConsoleSink;

                let sink = if *spec == SinkSpec::Stdout {
                    ConsoleSink::stdout(format)
                } else {
                    ConsoleSink::stderr(format)
                };
                Ok(Arc::new(sink) as Arc<dyn EventSink>)
            }

            #[cfg(not(feature = "console"))]
            {
                let _ = format;
                Err(SinkBuildError::ConsoleFeatureDisabled)
            }
        }
        SinkSpec::File(path) => {
            #[cfg(feature = "file")]
            {
                use crate::file::FileSink;

                let sink = FileSink::open(path, format)
                    .await
                    .map_err(|source| SinkBuildError::OpenFile {
                        path: path.clone(),
                        source,
                    })?;
                Ok(Arc::new(sink) as Arc<dyn EventSink>)
            }

            #[cfg(not(feature = "file"))]
            {
                let _ = (path, format);
                Err(SinkBuildError::FileFeatureDisabled)
            }
        }
        SinkSpec::Tracing => Ok(Arc::new(TracingSink)),
        SinkSpec::Noop => Ok(Arc::new(NoopSink)),
    }
}
