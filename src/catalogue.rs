//! Startup self-check over the set of event types a tool emits.

use std::any::type_name;
use std::collections::BTreeMap;

use crate::error::EventError;
use crate::event::Event;
use crate::level::{Level, LevelCapability};
use crate::routing::Routing;

/// What the catalogue knows about one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogueEntry {
    pub code: &'static str,
    pub level: Level,
    pub routing: Routing,
    pub show_exception: bool,
    pub type_name: &'static str,
}

/// Registered event types, keyed by code.
#[derive(Debug, Clone, Default)]
pub struct EventCatalogue {
    entries: BTreeMap<&'static str, CatalogueEntry>,
}

impl EventCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E`, rejecting malformed or already-taken codes.
    pub fn register<E: Event>(&mut self) -> Result<&mut Self, EventError> {
        let entry = CatalogueEntry {
            code: E::CODE,
            level: <E::Level as LevelCapability>::LEVEL,
            routing: E::ROUTING,
            show_exception: E::SHOW_EXCEPTION,
            type_name: type_name::<E>(),
        };
        validate_code(entry.code, entry.type_name)?;

        if let Some(existing) = self.entries.get(entry.code) {
            return Err(EventError::DuplicateCode {
                code: entry.code,
                first: existing.type_name,
                second: entry.type_name,
            });
        }
        self.entries.insert(entry.code, entry);
        Ok(self)
    }

    pub fn get(&self, code: &str) -> Option<&CatalogueEntry> {
        self.entries.get(code)
    }

    /// Entries in code order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A code is exactly four ASCII alphanumeric characters.
pub fn validate_code(code: &'static str, type_name: &'static str) -> Result<(), EventError> {
    if code.len() == 4 && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(EventError::InvalidCode { code, type_name })
    }
}
