use crate::path::NormalizedPath;
use crate::types::TrackerConfig;
use std::fmt;

/// Severity of a [`TrackerEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
}

/// Something the tracker did, reported for the developer running the build.
///
/// Events are observational only; nothing in the tracker depends on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    DependencyAdded { source: NormalizedPath, dependency: NormalizedPath },
    DependencyRemoved { source: NormalizedPath, dependency: NormalizedPath },
    MarkedCompiled { file: NormalizedPath },
    /// `dirtied` starts with `file` and lists every dependent it dirtied
    QueuedRebuild { file: NormalizedPath, dirtied: Vec<NormalizedPath> },
    UnresolvedImport { file: NormalizedPath, import: String },
    /// Emitted once per tracker, the first time a partial is listed
    PartialEncountered { file: NormalizedPath },
    FileListed { file: NormalizedPath },
    FileFiltered { file: NormalizedPath, dirty: bool },
}

impl TrackerEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            TrackerEvent::DependencyAdded { .. }
            | TrackerEvent::DependencyRemoved { .. }
            | TrackerEvent::FileFiltered { .. }
            | TrackerEvent::FileListed { .. } => EventLevel::Debug,
            TrackerEvent::MarkedCompiled { .. } | TrackerEvent::QueuedRebuild { .. } => {
                EventLevel::Info
            }
            TrackerEvent::UnresolvedImport { .. } | TrackerEvent::PartialEncountered { .. } => {
                EventLevel::Warn
            }
        }
    }
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerEvent::DependencyAdded { source, dependency } => {
                write!(f, "{source} depends on {dependency}")
            }
            TrackerEvent::DependencyRemoved { source, dependency } => {
                write!(f, "{source} no longer depends on {dependency}")
            }
            TrackerEvent::MarkedCompiled { file } => write!(f, "compiled {file}"),
            TrackerEvent::QueuedRebuild { file, dirtied } => {
                write!(f, "queued {file} for rebuild ({} file(s) dirty)", dirtied.len())
            }
            TrackerEvent::UnresolvedImport { file, import } => {
                write!(f, "could not resolve import '{import}' in {file}")
            }
            TrackerEvent::PartialEncountered { file } => write!(
                f,
                "{file} is a partial; the compiler skips partials, they are only built through imports"
            ),
            TrackerEvent::FileListed { file } => write!(f, "{file}"),
            TrackerEvent::FileFiltered { file, dirty: true } => write!(f, "{file} needs compiling"),
            TrackerEvent::FileFiltered { file, dirty: false } => write!(f, "{file} is up to date"),
        }
    }
}

/// Receives diagnostic events from a tracker
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &TrackerEvent);
}

impl<F> EventSink for F
where
    F: Fn(&TrackerEvent) + Send + Sync,
{
    fn emit(&self, event: &TrackerEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`, filtered by the tracker configuration:
/// debug events only with `debug`, everything else unless `suppress_output`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    debug: bool,
    suppress_output: bool,
}

impl TracingSink {
    pub fn new(config: &TrackerConfig) -> Self {
        Self { debug: config.debug, suppress_output: config.suppress_output }
    }

    pub fn enabled(&self, level: EventLevel) -> bool {
        match level {
            EventLevel::Debug => self.debug,
            EventLevel::Info | EventLevel::Warn => !self.suppress_output,
        }
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: &TrackerEvent) {
        let level = event.level();
        if !self.enabled(level) {
            return;
        }

        match level {
            EventLevel::Debug => tracing::debug!("{event}"),
            EventLevel::Info => tracing::info!("{event}"),
            EventLevel::Warn => tracing::warn!("{event}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::normalize;

    #[test]
    fn test_levels() {
        let file = normalize("/s/a.scss").unwrap();
        assert_eq!(TrackerEvent::FileListed { file: file.clone() }.level(), EventLevel::Debug);
        assert_eq!(TrackerEvent::MarkedCompiled { file: file.clone() }.level(), EventLevel::Info);
        assert_eq!(
            TrackerEvent::UnresolvedImport { file, import: "x".to_string() }.level(),
            EventLevel::Warn
        );
    }

    #[test]
    fn test_tracing_sink_filtering() {
        let quiet = TracingSink::new(&TrackerConfig { suppress_output: true, ..Default::default() });
        assert!(!quiet.enabled(EventLevel::Warn));
        assert!(!quiet.enabled(EventLevel::Debug));

        let verbose = TracingSink::new(&TrackerConfig {
            debug: true,
            suppress_output: true,
            ..Default::default()
        });
        assert!(verbose.enabled(EventLevel::Debug));
        assert!(!verbose.enabled(EventLevel::Info));

        let default = TracingSink::new(&TrackerConfig::default());
        assert!(default.enabled(EventLevel::Info));
        assert!(!default.enabled(EventLevel::Debug));
    }

    #[test]
    fn test_display() {
        let event = TrackerEvent::UnresolvedImport {
            file: normalize("/s/a.scss").unwrap(),
            import: "missing".to_string(),
        };
        assert_eq!(event.to_string(), "could not resolve import 'missing' in /s/a.scss");
    }
}
