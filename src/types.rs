//! Built-in events emitted by the dispatcher's host tool.

use crate::catalogue::EventCatalogue;
use crate::context::SharedContext;
use crate::error::{error_chain, BoxError, EventError};
use crate::event::{Event, EventHeader};
use crate::fields::EventFields;
use crate::level::{DebugLevel, ErrorLevel, InfoLevel, TestLevel};
use crate::node_info::NodeInfo;
use crate::routing::Routing;

/// Catalogue of every event defined in this module.
pub fn builtin_catalogue() -> Result<EventCatalogue, EventError> {
    let mut catalogue = EventCatalogue::new();
    catalogue
        .register::<MainReportVersion>()?
        .register::<MainEncounteredError>()?
        .register::<CacheAction>()?
        .register::<NodeStart>()?
        .register::<EmptyLine>()?
        .register::<PrintDebugStackTrace>()?
        .register::<IntegrationTestInfo>()?;
    Ok(catalogue)
}

/// Tool version banner at startup.
#[derive(Debug, Clone)]
pub struct MainReportVersion {
    header: EventHeader,
    pub version: String,
}

impl MainReportVersion {
    pub fn new(ctx: &SharedContext, version: impl Into<String>) -> Self {
        MainReportVersion {
            header: EventHeader::new(ctx),
            version: version.into(),
        }
    }
}

impl Event for MainReportVersion {
    const CODE: &'static str = "A001";
    type Level = InfoLevel;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        format!("Running with version {}", self.version)
    }

    fn record_fields(&self, fields: &mut EventFields<'_>) -> Result<(), EventError> {
        fields.record("version", &self.version)
    }
}

/// Unhandled error that ends the run.
#[derive(Debug)]
pub struct MainEncounteredError {
    header: EventHeader,
    pub exc: BoxError,
}

impl MainEncounteredError {
    pub fn new(ctx: &SharedContext, exc: impl Into<BoxError>) -> Self {
        MainEncounteredError {
            header: EventHeader::new(ctx),
            exc: exc.into(),
        }
    }
}

impl Event for MainEncounteredError {
    const CODE: &'static str = "Z002";
    type Level = ErrorLevel;
    const SHOW_EXCEPTION: bool = true;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        format!("Encountered an error:\n{}", self.exc)
    }

    fn exception_detail(&self) -> Option<String> {
        Some(error_chain(&*self.exc))
    }

    fn record_fields(&self, fields: &mut EventFields<'_>) -> Result<(), EventError> {
        fields.record_with("exc", &self.exc)
    }
}

/// Relation cache bookkeeping. Noisy, so only logged on request.
#[derive(Debug, Clone)]
pub struct CacheAction {
    header: EventHeader,
    pub action: String,
    pub relation: String,
}

impl CacheAction {
    pub fn new(ctx: &SharedContext, action: impl Into<String>, relation: impl Into<String>) -> Self {
        CacheAction {
            header: EventHeader::new(ctx),
            action: action.into(),
            relation: relation.into(),
        }
    }
}

impl Event for CacheAction {
    const CODE: &'static str = "E010";
    type Level = DebugLevel;
    const ROUTING: Routing = Routing::CACHE;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        format!("{} relation {}", self.action, self.relation)
    }

    fn record_fields(&self, fields: &mut EventFields<'_>) -> Result<(), EventError> {
        fields.record("action", &self.action)?;
        fields.record("relation", &self.relation)
    }
}

/// A graph node started executing.
#[derive(Debug, Clone)]
pub struct NodeStart {
    header: EventHeader,
    pub unique_id: String,
    node_info: NodeInfo,
}

impl NodeStart {
    pub fn new(ctx: &SharedContext, unique_id: impl Into<String>, node_info: NodeInfo) -> Self {
        NodeStart {
            header: EventHeader::new(ctx),
            unique_id: unique_id.into(),
            node_info,
        }
    }
}

impl Event for NodeStart {
    const CODE: &'static str = "Q024";
    type Level = InfoLevel;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        format!("Began running node {}", self.unique_id)
    }

    fn node_info(&self) -> Option<&NodeInfo> {
        Some(&self.node_info)
    }
}

/// Blank line for console spacing; pointless in files.
#[derive(Debug, Clone)]
pub struct EmptyLine {
    header: EventHeader,
}

impl EmptyLine {
    pub fn new(ctx: &SharedContext) -> Self {
        EmptyLine {
            header: EventHeader::new(ctx),
        }
    }
}

impl Event for EmptyLine {
    const CODE: &'static str = "Z017";
    type Level = InfoLevel;
    const ROUTING: Routing = Routing::NO_FILE;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        String::new()
    }
}

/// Stack trace of the last error, kept out of the console.
#[derive(Debug, Clone)]
pub struct PrintDebugStackTrace {
    header: EventHeader,
    pub trace: String,
}

impl PrintDebugStackTrace {
    pub fn new(ctx: &SharedContext, trace: impl Into<String>) -> Self {
        PrintDebugStackTrace {
            header: EventHeader::new(ctx),
            trace: trace.into(),
        }
    }
}

impl Event for PrintDebugStackTrace {
    const CODE: &'static str = "Z011";
    type Level = DebugLevel;
    const ROUTING: Routing = Routing::NO_STDOUT;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        self.trace.clone()
    }
}

/// Free-form note from the tool's own integration tests.
#[derive(Debug, Clone)]
pub struct IntegrationTestInfo {
    header: EventHeader,
    pub msg: String,
}

impl IntegrationTestInfo {
    pub fn new(ctx: &SharedContext, msg: impl Into<String>) -> Self {
        IntegrationTestInfo {
            header: EventHeader::new(ctx),
            msg: msg.into(),
        }
    }
}

impl Event for IntegrationTestInfo {
    const CODE: &'static str = "T001";
    type Level = TestLevel;

    fn header(&self) -> &EventHeader {
        &self.header
    }

    fn message(&self) -> String {
        format!("Integration Test: {}", self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InvocationContext;
    use crate::level::Level;
    use crate::serialization::{GenericError, StrategyRegistry};
    use std::io;

    #[test]
    fn test_builtin_codes_unique() {
        let catalogue = builtin_catalogue().unwrap();
        assert_eq!(catalogue.len(), 7);
        let levels: Vec<Level> = catalogue.entries().map(|e| e.level).collect();
        for level in Level::ALL {
            if level != Level::Warn {
                assert!(levels.contains(&level), "missing {level}");
            }
        }
    }

    #[test]
    fn test_error_event_degrades_exception() {
        let ctx = InvocationContext::new().shared();
        let event = MainEncounteredError::new(
            &ctx,
            io::Error::new(io::ErrorKind::Other, "connection refused"),
        );
        let dict = event.to_dict().unwrap();
        assert_eq!(dict["level"], "error");
        assert_eq!(dict["exc"], "connection refused");
        assert_eq!(dict["msg"], "Encountered an error:\nconnection refused");

        let restored: BoxError = StrategyRegistry::standard()
            .deserialize(&dict["exc"])
            .unwrap();
        assert_eq!(restored.to_string(), event.exc.to_string());
        assert!(restored.downcast_ref::<io::Error>().is_none());
        assert!(restored.is::<GenericError>());
    }

    #[test]
    fn test_cache_action_is_cache_routed() {
        let ctx = InvocationContext::new().shared();
        let event = CacheAction::new(&ctx, "adding", "analytics.orders");
        assert!(event.routing().is_cache());
        assert_eq!(event.level_tag(), "debug");
        let dict = event.to_dict().unwrap();
        assert_eq!(dict["relation"], "analytics.orders");
        assert_eq!(dict["msg"], "adding relation analytics.orders");
    }

    #[test]
    fn test_node_start_carries_node_info() {
        let ctx = InvocationContext::new().shared();
        let info = NodeInfo::new()
            .with("unique_id", "model.shop.orders")
            .with("resource_type", "model");
        let event = NodeStart::new(&ctx, "model.shop.orders", info);
        let dict = event.to_dict().unwrap();
        assert_eq!(dict["node_info"]["resource_type"], "model");
        assert_eq!(dict["code"], "Q024");
    }

    #[test]
    fn test_version_field_recorded() {
        let ctx = InvocationContext::new().shared();
        let dict = MainReportVersion::new(&ctx, "1.4.0").to_dict().unwrap();
        assert_eq!(dict["version"], "1.4.0");
        assert_eq!(dict["msg"], "Running with version 1.4.0");
    }

    #[test]
    fn test_test_level_event() {
        let ctx = InvocationContext::new().shared();
        let event = IntegrationTestInfo::new(&ctx, "seeded");
        assert_eq!(event.level_tag(), "test");
        assert_eq!(event.message(), "Integration Test: seeded");
    }
}
