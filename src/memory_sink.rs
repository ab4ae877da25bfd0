use std::sync::{Arc, Mutex};

use crate::error::BoxError;
use crate::record::EventRecord;
use crate::sink::{EventSink, SinkKind};
use async_trait::async_trait;

/// Keeps every delivered record in memory. Clones share the same buffer.
#[derive(Clone)]
pub struct MemorySink {
    kind: SinkKind,
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl MemorySink {
    pub fn new(kind: SinkKind) -> Self {
        MemorySink {
            kind,
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the records received so far.
    pub fn records(&self) -> Vec<EventRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Codes of the records received so far, in delivery order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.records().iter().map(|record| record.code).collect()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    fn kind(&self) -> SinkKind {
        self.kind
    }

    async fn send(&self, record: &EventRecord) -> Result<(), BoxError> {
        self.records
            .lock()
            .map_err(|_| "memory sink lock poisoned")?
            .push(record.clone());
        Ok(())
    }
}
