use std::any::{type_name, Any};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EventError;
use crate::serialization::{ErrorStrategy, StrategyRegistry};

/// Keys written by the event envelope itself.
pub const RESERVED_KEYS: [&str; 7] = [
    "log_version",
    "ts_rfc3339",
    "pid",
    "code",
    "level",
    "msg",
    "node_info",
];

/// Collects the payload fields an event declares.
///
/// Registered strategies take precedence; anything else must be
/// `Serialize` and is converted structurally.
pub struct EventFields<'a> {
    registry: &'a StrategyRegistry,
    fields: Map<String, Value>,
}

impl<'a> EventFields<'a> {
    pub fn new(registry: &'a StrategyRegistry) -> Self {
        EventFields {
            registry,
            fields: Map::new(),
        }
    }

    /// Record a serializable field.
    pub fn record<T: Serialize + Any>(&mut self, name: &str, value: &T) -> Result<(), EventError> {
        let encoded = match self.registry.serialize(value) {
            Some(encoded) => encoded,
            None => serde_json::to_value(value)?,
        };
        self.insert(name, encoded)
    }

    /// Record a field whose type only a registered strategy can encode.
    pub fn record_with<T: Any>(&mut self, name: &str, value: &T) -> Result<(), EventError> {
        let encoded = self
            .registry
            .serialize(value)
            .ok_or(EventError::UnregisteredType(type_name::<T>()))?;
        self.insert(name, encoded)
    }

    /// Record an error of any concrete type the way a [`BoxError`] field
    /// is recorded.
    ///
    /// [`BoxError`]: crate::error::BoxError
    pub fn record_error(&mut self, name: &str, err: &dyn std::error::Error) -> Result<(), EventError> {
        self.insert(name, ErrorStrategy.encode(err))
    }

    fn insert(&mut self, name: &str, value: Value) -> Result<(), EventError> {
        if RESERVED_KEYS.contains(&name) {
            return Err(EventError::ReservedField(name.to_string()));
        }
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}
