//! The contract every concrete event implements.
//!
//! A concrete event is a struct that embeds an [`EventHeader`] and
//! implements [`Event`], naming its code, exactly one level marker and,
//! optionally, routing markers:
//!
//! ```
//! use tracing_event_model::{Event, EventHeader, InvocationContext, Routing};
//! use tracing_event_model::level::WarnLevel;
//!
//! struct DiskUsageHigh {
//!     header: EventHeader,
//! }
//!
//! impl Event for DiskUsageHigh {
//!     const CODE: &'static str = "W001";
//!     type Level = WarnLevel;
//!
//!     fn header(&self) -> &EventHeader {
//!         &self.header
//!     }
//!
//!     fn message(&self) -> String {
//!         "disk usage high".to_string()
//!     }
//! }
//!
//! let ctx = InvocationContext::new().shared();
//! let event = DiskUsageHigh { header: EventHeader::new(&ctx) };
//! let dict = event.to_dict().unwrap();
//! assert_eq!(dict["level"], "warn");
//! assert_eq!(event.routing(), Routing::NONE);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};

use crate::context::{ContextProvider, SharedContext};
use crate::error::EventError;
use crate::fields::EventFields;
use crate::level::{Level, LevelCapability};
use crate::node_info::NodeInfo;
use crate::routing::Routing;
use crate::serialization::StrategyRegistry;
use crate::timestamp::format_utc_naive;

/// Current schema version of the serialized form.
pub const LOG_VERSION: u32 = 1;

/// Identity fields shared by every event.
///
/// Timestamp and process id are read from the context on first access and
/// then fixed for the lifetime of the event.
#[derive(Clone)]
pub struct EventHeader {
    log_version: u32,
    context: SharedContext,
    ts: OnceLock<DateTime<Utc>>,
    ts_rfc3339: OnceLock<String>,
    pid: OnceLock<u32>,
}

impl EventHeader {
    pub fn new(context: &SharedContext) -> Self {
        EventHeader {
            log_version: LOG_VERSION,
            context: Arc::clone(context),
            ts: OnceLock::new(),
            ts_rfc3339: OnceLock::new(),
            pid: OnceLock::new(),
        }
    }

    pub fn with_log_version(mut self, log_version: u32) -> Self {
        self.log_version = log_version;
        self
    }

    pub fn log_version(&self) -> u32 {
        self.log_version
    }

    /// UTC instant of the event, truncated to microseconds.
    pub fn timestamp(&self) -> DateTime<Utc> {
        *self.ts.get_or_init(|| self.context.now().trunc_subsecs(6))
    }

    pub fn timestamp_rfc3339(&self) -> &str {
        self.ts_rfc3339
            .get_or_init(|| format_utc_naive(self.timestamp()))
    }

    pub fn process_id(&self) -> u32 {
        *self.pid.get_or_init(|| self.context.process_id())
    }

    pub fn thread_name(&self) -> String {
        self.context.thread_name()
    }

    pub fn invocation_id(&self) -> &str {
        self.context.invocation_id()
    }

    pub fn context(&self) -> &SharedContext {
        &self.context
    }
}

impl fmt::Debug for EventHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHeader")
            .field("log_version", &self.log_version)
            .field("invocation_id", &self.context.invocation_id())
            .field("ts", &self.ts.get())
            .field("pid", &self.pid.get())
            .finish()
    }
}

/// A structured, log-worthy occurrence.
pub trait Event: Send + Sync {
    /// Four-character identifier, unique across all event types.
    const CODE: &'static str;

    /// The level capability; exactly one per event type.
    type Level: LevelCapability;

    /// Routing markers; none by default.
    const ROUTING: Routing = Routing::NONE;

    /// Attach [`exception_detail`](Event::exception_detail) to file and
    /// JSON output.
    const SHOW_EXCEPTION: bool = false;

    fn header(&self) -> &EventHeader;

    /// Human-readable text only. Sinks add timestamps and formatting.
    fn message(&self) -> String;

    /// Optional node description. Events that declare one always emit
    /// `node_info`, even when it is empty.
    fn node_info(&self) -> Option<&NodeInfo> {
        None
    }

    /// Error and trace text shown when `SHOW_EXCEPTION` is set.
    fn exception_detail(&self) -> Option<String> {
        None
    }

    /// Declare payload fields beyond the envelope.
    fn record_fields(&self, _fields: &mut EventFields<'_>) -> Result<(), EventError> {
        Ok(())
    }

    fn code(&self) -> &'static str {
        Self::CODE
    }

    fn level(&self) -> Level {
        <Self::Level as LevelCapability>::LEVEL
    }

    fn level_tag(&self) -> &'static str {
        self.level().as_str()
    }

    fn routing(&self) -> Routing {
        Self::ROUTING
    }

    fn show_exception(&self) -> bool {
        Self::SHOW_EXCEPTION
    }

    fn get_timestamp(&self) -> DateTime<Utc> {
        self.header().timestamp()
    }

    fn get_timestamp_text(&self) -> &str {
        self.header().timestamp_rfc3339()
    }

    fn get_process_id(&self) -> u32 {
        self.header().process_id()
    }

    fn get_thread_name(&self) -> String {
        self.header().thread_name()
    }

    fn get_invocation_id(&self) -> &str {
        self.header().invocation_id()
    }

    /// Canonical structured form using the standard registry.
    fn to_dict(&self) -> Result<Map<String, Value>, EventError> {
        self.to_dict_with(StrategyRegistry::standard())
    }

    fn to_dict_with(&self, registry: &StrategyRegistry) -> Result<Map<String, Value>, EventError> {
        let header = self.header();
        let mut dict = Map::new();
        dict.insert("log_version".into(), header.log_version().into());
        dict.insert("ts_rfc3339".into(), header.timestamp_rfc3339().into());
        dict.insert("pid".into(), header.process_id().into());
        dict.insert("code".into(), self.code().into());
        dict.insert("level".into(), self.level_tag().into());
        dict.insert("msg".into(), self.message().into());
        if let Some(node_info) = self.node_info() {
            dict.insert("node_info".into(), serde_json::to_value(node_info)?);
        }

        let mut fields = EventFields::new(registry);
        self.record_fields(&mut fields)?;
        dict.extend(fields.into_map());
        Ok(dict)
    }
}
