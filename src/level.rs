//! Severity levels and the level capabilities events compose with.
//!
//! Every event type names exactly one level marker through
//! [`Event::Level`](crate::event::Event::Level). The markers are
//! uninhabited types behind a sealed trait, so a type cannot end up with
//! zero or two levels and no level outside this set can be added.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Fixed severity of an event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Test,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Test,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
    ];

    /// The tag emitted as `level` in serialized events.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Test => "test",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    /// Closest `tracing` level. `test` has no counterpart and maps to `TRACE`.
    pub fn to_tracing(self) -> tracing::Level {
        match self {
            Level::Test => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Level::Test),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(EventError::UnknownLevel(s.to_string())),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A level capability. Implemented only by the five markers below.
pub trait LevelCapability: sealed::Sealed + Send + Sync + 'static {
    const LEVEL: Level;
}

macro_rules! level_marker {
    ($(#[$doc:meta])* $name:ident => $level:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub enum $name {}

        impl sealed::Sealed for $name {}

        impl LevelCapability for $name {
            const LEVEL: Level = $level;
        }
    };
}

level_marker!(
    /// Events emitted only while testing the tool itself.
    TestLevel => Level::Test
);
level_marker!(DebugLevel => Level::Debug);
level_marker!(InfoLevel => Level::Info);
level_marker!(WarnLevel => Level::Warn);
level_marker!(ErrorLevel => Level::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_tags() {
        let tags: Vec<&str> = Level::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(tags, vec!["test", "debug", "info", "warn", "error"]);
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Test < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_serialization() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warn\"");
        let parsed: Level = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, Level::Error);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!(" warning ".parse::<Level>().unwrap(), Level::Warn);
        assert!(matches!(
            "fatal".parse::<Level>(),
            Err(EventError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_markers_fix_level() {
        assert_eq!(TestLevel::LEVEL, Level::Test);
        assert_eq!(DebugLevel::LEVEL, Level::Debug);
        assert_eq!(InfoLevel::LEVEL, Level::Info);
        assert_eq!(WarnLevel::LEVEL, Level::Warn);
        assert_eq!(ErrorLevel::LEVEL, Level::Error);
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:<5}|", Level::Info), "info |");
    }
}
