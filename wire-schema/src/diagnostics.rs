//! Diagnostics sink threaded through the compile pipeline.
//!
//! Loader, pruner and dispatcher append structured records here instead of
//! writing to a process-wide stream. Each record is mirrored to `tracing` so
//! a subscriber still sees progress in real time.

use std::fmt;

/// Severity of a diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
}

/// A single diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Info => write!(f, "{}", self.message),
            Level::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

/// Ordered collection of diagnostics produced during one compile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an informational message
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.records.push(Diagnostic {
            level: Level::Info,
            message,
        });
    }

    /// Records a warning
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.records.push(Diagnostic {
            level: Level::Warning,
            message,
        });
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    /// Message text of every record, in insertion order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|record| record.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_keep_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info("first");
        diagnostics.warn("second");

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.messages().collect::<Vec<_>>(), ["first", "second"]);
        assert_eq!(diagnostics.records()[1].level, Level::Warning);
    }

    #[test]
    fn test_display_prefixes_warnings() {
        let record = Diagnostic {
            level: Level::Warning,
            message: "careful".to_string(),
        };
        assert_eq!(record.to_string(), "warning: careful");
    }
}
