//! Per-type serialization strategies for values serde cannot represent
//! directly, and the registry that holds them.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::{BoxError, EventError};
use crate::timestamp::Timestamp;

/// Encode/decode rule for one type.
pub trait SerializationStrategy: Send + Sync + 'static {
    type Value: Any + Send;

    fn serialize(&self, value: &Self::Value) -> Value;

    fn deserialize(&self, raw: &Value) -> Result<Self::Value, EventError>;
}

/// Error rebuilt from its serialized text. Only the message survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericError {
    message: String,
}

impl GenericError {
    pub fn new(message: impl Into<String>) -> Self {
        GenericError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GenericError {}

/// Errors serialize to their display text and come back as [`GenericError`].
///
/// The round trip is lossy: the concrete error type and its source chain
/// are gone after deserialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorStrategy;

impl ErrorStrategy {
    /// Encode any error, not only a [`BoxError`].
    pub fn encode(&self, err: &dyn std::error::Error) -> Value {
        Value::String(err.to_string())
    }
}

impl SerializationStrategy for ErrorStrategy {
    type Value = BoxError;

    fn serialize(&self, value: &BoxError) -> Value {
        self.encode(&**value)
    }

    fn deserialize(&self, raw: &Value) -> Result<BoxError, EventError> {
        let message = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(Box::new(GenericError::new(message)))
    }
}

/// [`Timestamp`]s serialize to canonical RFC3339 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampStrategy;

impl SerializationStrategy for TimestampStrategy {
    type Value = Timestamp;

    fn serialize(&self, value: &Timestamp) -> Value {
        Value::String(value.to_rfc3339())
    }

    fn deserialize(&self, raw: &Value) -> Result<Timestamp, EventError> {
        Timestamp::parse(expect_str::<Timestamp>(raw)?)
    }
}

/// UTC datetimes serialize with an explicit `+00:00` offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcDateTimeStrategy;

impl SerializationStrategy for UtcDateTimeStrategy {
    type Value = DateTime<Utc>;

    fn serialize(&self, value: &DateTime<Utc>) -> Value {
        Value::String(value.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    fn deserialize(&self, raw: &Value) -> Result<DateTime<Utc>, EventError> {
        Timestamp::parse(expect_str::<DateTime<Utc>>(raw)?).map(|ts| ts.to_utc())
    }
}

fn expect_str<T>(raw: &Value) -> Result<&str, EventError> {
    raw.as_str().ok_or_else(|| EventError::InvalidTimestamp {
        text: raw.to_string(),
        reason: format!("expected a string for {}", type_name::<T>()),
    })
}

trait ErasedStrategy: Send + Sync {
    fn serialize_any(&self, value: &dyn Any) -> Option<Value>;
    fn deserialize_any(&self, raw: &Value) -> Result<Box<dyn Any + Send>, EventError>;
}

struct Erased<S>(S);

impl<S: SerializationStrategy> ErasedStrategy for Erased<S> {
    fn serialize_any(&self, value: &dyn Any) -> Option<Value> {
        value
            .downcast_ref::<S::Value>()
            .map(|value| self.0.serialize(value))
    }

    fn deserialize_any(&self, raw: &Value) -> Result<Box<dyn Any + Send>, EventError> {
        let value = self.0.deserialize(raw)?;
        Ok(Box::new(value))
    }
}

/// Strategies keyed by the type they handle.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<TypeId, Box<dyn ErasedStrategy>>,
}

impl StrategyRegistry {
    /// Empty registry; every field serializes structurally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the error and timestamp strategies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(ErrorStrategy)
            .register(TimestampStrategy)
            .register(UtcDateTimeStrategy);
        registry
    }

    /// Shared, immutable registry holding the default strategies.
    pub fn standard() -> &'static StrategyRegistry {
        static STANDARD: OnceLock<StrategyRegistry> = OnceLock::new();
        STANDARD.get_or_init(StrategyRegistry::with_defaults)
    }

    /// Register `strategy`, replacing any earlier one for the same type.
    pub fn register<S: SerializationStrategy>(&mut self, strategy: S) -> &mut Self {
        self.strategies
            .insert(TypeId::of::<S::Value>(), Box::new(Erased(strategy)));
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.strategies.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Encode `value` with its registered strategy, if there is one.
    pub fn serialize<T: Any>(&self, value: &T) -> Option<Value> {
        self.strategies
            .get(&TypeId::of::<T>())
            .and_then(|strategy| strategy.serialize_any(value))
    }

    /// Decode `raw` with the strategy registered for `T`.
    pub fn deserialize<T: Any>(&self, raw: &Value) -> Result<T, EventError> {
        let strategy = self
            .strategies
            .get(&TypeId::of::<T>())
            .ok_or(EventError::UnregisteredType(type_name::<T>()))?;
        strategy
            .deserialize_any(raw)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| EventError::StrategyMismatch(type_name::<T>()))
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}
