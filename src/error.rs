//! Error types for building and serializing events.

use thiserror::Error;

/// Boxed error used at the sink seam and for error-valued event fields.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Display text of `err` followed by one `Caused by:` line per source.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\nCaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Errors that can occur when registering or serializing events.
#[derive(Debug, Error)]
pub enum EventError {
    /// An event code is not exactly four ASCII alphanumeric characters.
    #[error("invalid event code {code:?} on {type_name}: expected 4 ASCII alphanumerics")]
    InvalidCode {
        code: &'static str,
        type_name: &'static str,
    },

    /// Two event types share a code.
    #[error("duplicate event code {code}: {first} and {second}")]
    DuplicateCode {
        code: &'static str,
        first: &'static str,
        second: &'static str,
    },

    /// A level name did not match any known level.
    #[error("unknown level: {0}")]
    UnknownLevel(String),

    /// A declared field uses one of the envelope keys.
    #[error("field name {0:?} is reserved by the event envelope")]
    ReservedField(String),

    /// A field type needs a serialization strategy but none is registered.
    #[error("no serialization strategy registered for {0}")]
    UnregisteredType(&'static str),

    /// A registered strategy produced a value of the wrong type.
    #[error("serialization strategy for {0} returned a mismatched type")]
    StrategyMismatch(&'static str),

    /// Timestamp text could not be parsed.
    #[error("invalid timestamp {text:?}: {reason}")]
    InvalidTimestamp { text: String, reason: String },

    /// Structural serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, Error)]
    #[error("compilation failed")]
    struct CompileError {
        #[source]
        source: io::Error,
    }

    #[test]
    fn test_error_chain_lists_sources() {
        let err = CompileError {
            source: io::Error::new(io::ErrorKind::NotFound, "models/orders.sql missing"),
        };
        assert_eq!(
            error_chain(&err),
            "compilation failed\nCaused by: models/orders.sql missing"
        );
        assert_eq!(error_chain(&err.source), "models/orders.sql missing");
    }
}
