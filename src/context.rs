//! Process context shared by every event of one tool invocation.
//!
//! A context is built once at startup, before any worker threads exist,
//! and handed to event constructors as a [`SharedContext`]. Nothing in it
//! changes after construction.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of the identity values stamped onto events.
pub trait ContextProvider: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Id of the running process.
    fn process_id(&self) -> u32 {
        std::process::id()
    }

    /// Display name of the calling thread. Read on every call.
    fn thread_name(&self) -> String {
        current_thread_name()
    }

    /// Identifier shared by all events of this invocation.
    fn invocation_id(&self) -> &str;
}

/// Context handle passed to event constructors.
pub type SharedContext = Arc<dyn ContextProvider>;

/// The context of a real tool run: system clock, OS pid, live thread names.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    invocation_id: String,
}

impl InvocationContext {
    /// New context with a random UUID v4 invocation id.
    pub fn new() -> Self {
        Self::with_invocation_id(Uuid::new_v4().to_string())
    }

    /// New context with a caller-chosen invocation id.
    pub fn with_invocation_id(invocation_id: impl Into<String>) -> Self {
        InvocationContext {
            invocation_id: invocation_id.into(),
        }
    }

    /// Wrap into a [`SharedContext`].
    pub fn shared(self) -> SharedContext {
        Arc::new(self)
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextProvider for InvocationContext {
    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }
}

/// Name of the current thread, or its id when it was spawned unnamed.
pub fn current_thread_name() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_id_is_uuid() {
        let ctx = InvocationContext::new();
        assert!(Uuid::parse_str(ctx.invocation_id()).is_ok());
    }

    #[test]
    fn test_invocation_id_is_stable() {
        let ctx = InvocationContext::with_invocation_id("run-1").shared();
        assert_eq!(ctx.invocation_id(), "run-1");
        assert_eq!(ctx.invocation_id(), ctx.invocation_id());
    }

    #[test]
    fn test_distinct_contexts_get_distinct_ids() {
        let a = InvocationContext::new();
        let b = InvocationContext::new();
        assert_ne!(a.invocation_id(), b.invocation_id());
    }

    #[test]
    fn test_process_id_matches_os() {
        let ctx = InvocationContext::new();
        assert_eq!(ctx.process_id(), std::process::id());
    }

    #[test]
    fn test_thread_name_read_per_call() {
        let ctx = InvocationContext::new().shared();
        let worker_ctx = Arc::clone(&ctx);
        let name = thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(move || worker_ctx.thread_name())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "worker-7");
        assert_ne!(ctx.thread_name(), "worker-7");
    }
}
