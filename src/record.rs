use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EventError;
use crate::event::Event;
use crate::level::Level;
use crate::routing::Routing;

/// Output format of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Everything a sink needs to know about one event, detached from the
/// event's type.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub code: &'static str,
    pub level: Level,
    pub message: String,
    #[serde(skip)]
    pub routing: Routing,
    pub thread_name: String,
    pub invocation_id: String,
    /// Error and trace text of events that show their exception.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exc_info: Option<String>,
    /// The event's `to_dict()` output.
    pub data: Map<String, Value>,
}

impl EventRecord {
    pub fn from_event<E: Event>(event: &E) -> Result<Self, EventError> {
        Ok(EventRecord {
            timestamp: event.get_timestamp(),
            code: event.code(),
            level: event.level(),
            message: event.message(),
            routing: event.routing(),
            thread_name: event.get_thread_name(),
            invocation_id: event.get_invocation_id().to_string(),
            exc_info: if event.show_exception() {
                event.exception_detail()
            } else {
                None
            },
            data: event.to_dict()?,
        })
    }

    /// `ts_rfc3339` as captured in the dict.
    pub fn timestamp_text(&self) -> &str {
        self.data
            .get("ts_rfc3339")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// One JSON object: the dict plus invocation id, thread name and,
    /// when present, `exc_info`.
    pub fn to_json_line(&self) -> Result<String, EventError> {
        let mut line = self.data.clone();
        line.insert("invocation_id".into(), self.invocation_id.clone().into());
        line.insert("thread_name".into(), self.thread_name.clone().into());
        if let Some(exc_info) = &self.exc_info {
            line.insert("exc_info".into(), exc_info.clone().into());
        }
        Ok(serde_json::to_string(&line)?)
    }

    /// `HH:MM:SS  message`.
    pub fn to_console_text(&self) -> String {
        format!("{}  {}", self.timestamp.format("%H:%M:%S"), self.message)
    }

    /// `ts [level] [thread]: message`, followed by the exception text on
    /// its own lines.
    pub fn to_file_text(&self) -> String {
        let mut line = format!(
            "{} [{:<5}] [{}]: {}",
            self.timestamp_text(),
            self.level,
            self.thread_name,
            self.message
        );
        if let Some(exc_info) = &self.exc_info {
            line.push('\n');
            line.push_str(exc_info);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InvocationContext;
    use crate::node_info::NodeInfo;
    use crate::types::{MainEncounteredError, MainReportVersion, NodeStart};
    use std::io;

    #[test]
    fn test_record_captures_event() {
        let ctx = InvocationContext::with_invocation_id("inv-1").shared();
        let event = MainReportVersion::new(&ctx, "1.0.0");
        let record = EventRecord::from_event(&event).unwrap();

        assert_eq!(record.code, "A001");
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.invocation_id, "inv-1");
        assert_eq!(record.timestamp, event.get_timestamp());
        assert_eq!(record.timestamp_text(), event.get_timestamp_text());
        assert_eq!(record.data["msg"], "Running with version 1.0.0");
    }

    #[test]
    fn test_json_line_adds_context() {
        let ctx = InvocationContext::with_invocation_id("inv-2").shared();
        let event = NodeStart::new(&ctx, "model.a", NodeInfo::new().with("unique_id", "model.a"));
        let record = EventRecord::from_event(&event).unwrap();
        let line = record.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["invocation_id"], "inv-2");
        assert_eq!(parsed["code"], "Q024");
        assert_eq!(parsed["node_info"]["unique_id"], "model.a");
        assert!(parsed["thread_name"].is_string());
    }

    #[test]
    fn test_text_renderings() {
        let ctx = InvocationContext::new().shared();
        let record = EventRecord::from_event(&MainReportVersion::new(&ctx, "2.0")).unwrap();

        let console = record.to_console_text();
        assert!(console.ends_with("  Running with version 2.0"));
        assert_eq!(console.as_bytes()[2], b':');

        let file = record.to_file_text();
        assert!(file.starts_with(record.timestamp_text()));
        assert!(file.contains(" [info ] ["));
        assert!(file.ends_with("]: Running with version 2.0"));
    }

    #[test]
    fn test_error_event_attaches_exception() {
        let ctx = InvocationContext::new().shared();
        let event = MainEncounteredError::new(
            &ctx,
            io::Error::new(io::ErrorKind::PermissionDenied, "profiles.yml unreadable"),
        );
        let record = EventRecord::from_event(&event).unwrap();
        assert_eq!(record.exc_info.as_deref(), Some("profiles.yml unreadable"));

        let file = record.to_file_text();
        assert!(file.ends_with("]: Encountered an error:\nprofiles.yml unreadable\nprofiles.yml unreadable"));

        let parsed: Value = serde_json::from_str(&record.to_json_line().unwrap()).unwrap();
        assert_eq!(parsed["exc_info"], "profiles.yml unreadable");
        assert_eq!(parsed["exc"], "profiles.yml unreadable");

        assert_eq!(record.to_console_text().matches("profiles.yml unreadable").count(), 1);
    }

    #[test]
    fn test_plain_event_has_no_exception() {
        let ctx = InvocationContext::new().shared();
        let record = EventRecord::from_event(&MainReportVersion::new(&ctx, "1.0")).unwrap();
        assert!(record.exc_info.is_none());
        assert!(!record.to_file_text().contains('\n'));

        let parsed: Value = serde_json::from_str(&record.to_json_line().unwrap()).unwrap();
        assert!(parsed.get("exc_info").is_none());
    }
}
