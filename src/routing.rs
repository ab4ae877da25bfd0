//! Routing markers that steer events between sinks.
//!
//! Markers never change how an event serializes. Only the dispatcher reads
//! them, through [`Routing::allows`] and [`Routing::destinations`].

use serde::Serialize;

use crate::sink::SinkKind;

/// Set of routing markers carried by an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Routing {
    cache: bool,
    no_file: bool,
    no_stdout: bool,
}

impl Routing {
    /// No markers: the event goes everywhere its level allows.
    pub const NONE: Routing = Routing {
        cache: false,
        no_file: false,
        no_stdout: false,
    };

    /// Only emitted when cache events are enabled.
    pub const CACHE: Routing = Routing {
        cache: true,
        ..Routing::NONE
    };

    /// Never written to file sinks.
    pub const NO_FILE: Routing = Routing {
        no_file: true,
        ..Routing::NONE
    };

    /// Never written to console sinks.
    pub const NO_STDOUT: Routing = Routing {
        no_stdout: true,
        ..Routing::NONE
    };

    /// Combine two marker sets.
    pub const fn union(self, other: Routing) -> Routing {
        Routing {
            cache: self.cache || other.cache,
            no_file: self.no_file || other.no_file,
            no_stdout: self.no_stdout || other.no_stdout,
        }
    }

    pub const fn is_cache(self) -> bool {
        self.cache
    }

    pub const fn is_no_file(self) -> bool {
        self.no_file
    }

    pub const fn is_no_stdout(self) -> bool {
        self.no_stdout
    }

    pub const fn is_empty(self) -> bool {
        !(self.cache || self.no_file || self.no_stdout)
    }

    /// Whether a sink of the given kind may receive the event.
    ///
    /// Structured sinks ignore `noFile` and `noStdOut`; the cache marker is
    /// handled before sinks are consulted.
    pub const fn allows(self, kind: SinkKind) -> bool {
        match kind {
            SinkKind::Console => !self.no_stdout,
            SinkKind::File => !self.no_file,
            SinkKind::Structured => true,
        }
    }

    /// Console and file destinations for an event given the cache-events flag.
    pub const fn destinations(self, log_cache_events: bool) -> Destinations {
        if self.cache && !log_cache_events {
            return Destinations::NONE;
        }
        Destinations {
            console: !self.no_stdout,
            file: !self.no_file,
        }
    }
}

/// Which of the standard sinks an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destinations {
    pub console: bool,
    pub file: bool,
}

impl Destinations {
    pub const NONE: Destinations = Destinations {
        console: false,
        file: false,
    };

    pub const fn is_empty(self) -> bool {
        !self.console && !self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_routes_everywhere() {
        let dest = Routing::NONE.destinations(false);
        assert!(dest.console);
        assert!(dest.file);
        assert!(Routing::NONE.is_empty());
    }

    #[test]
    fn test_cache_requires_flag() {
        assert!(Routing::CACHE.destinations(false).is_empty());
        let dest = Routing::CACHE.destinations(true);
        assert!(dest.console && dest.file);
    }

    #[test]
    fn test_union_combines_markers() {
        let routing = Routing::NO_FILE.union(Routing::NO_STDOUT);
        assert!(routing.is_no_file());
        assert!(routing.is_no_stdout());
        assert!(!routing.is_cache());
        assert!(routing.destinations(true).is_empty());
    }

    #[test]
    fn test_allows_by_sink_kind() {
        assert!(!Routing::NO_FILE.allows(SinkKind::File));
        assert!(Routing::NO_FILE.allows(SinkKind::Console));
        assert!(!Routing::NO_STDOUT.allows(SinkKind::Console));
        assert!(Routing::NO_STDOUT.union(Routing::NO_FILE).allows(SinkKind::Structured));
    }
}
