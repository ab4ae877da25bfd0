//! Structured events for a command-line tool.
//!
//! Every event has a fixed four-character code, exactly one severity
//! level, optional routing markers and a uniform dictionary form. Events
//! never know about sinks: the [`dispatcher`] reads their level and
//! routing markers to decide whether they reach the console, log files or
//! structured consumers.

pub mod error;
pub mod level;
pub mod routing;
pub mod context;
pub mod timestamp;
pub mod serialization;
pub mod fields;
pub mod node_info;
pub mod event;
pub mod catalogue;
pub mod types;

pub mod record;
pub mod sink;
pub mod dispatcher;
pub mod config;
pub mod backend;
pub mod init;

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;

pub mod memory_sink;
pub mod noop_sink;
pub mod tracing_sink;

pub use catalogue::EventCatalogue;
pub use context::{ContextProvider, InvocationContext, SharedContext};
pub use error::{BoxError, EventError};
pub use event::{Event, EventHeader};
pub use level::Level;
pub use node_info::NodeInfo;
pub use routing::Routing;
