//! Script error log
//!
//! Every non-fatal script problem goes through [`ScriptLog::record`]: one line
//! to `tracing`, and a copy in a bounded in-memory ring for online viewing.

use fiery_core::Vnum;
use std::collections::VecDeque;
use std::fmt;

/// Category of a script diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Unmatched block keywords, unknown fields, malformed commands
    Structural,
    /// Loop or recursion ceilings
    Runaway,
    /// A reference to an entity that no longer exists
    Reference,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Structural => write!(f, "structural"),
            DiagnosticKind::Runaway => write!(f, "runaway"),
            DiagnosticKind::Reference => write!(f, "reference"),
        }
    }
}

/// One recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: DiagnosticKind,
    pub vnum: Vnum,
    pub trigger: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger {} ({}): {}", self.vnum, self.trigger, self.message)
    }
}

/// Which trigger a diagnostic belongs to
#[derive(Debug, Clone, Copy)]
pub struct TriggerTag<'a> {
    pub vnum: Vnum,
    pub name: &'a str,
}

impl TriggerTag<'_> {
    /// Tag for diagnostics raised outside any trigger
    pub const NONE: TriggerTag<'static> = TriggerTag { vnum: -1, name: "none" };
}

#[derive(Debug)]
pub struct ScriptLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl ScriptLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Record a diagnostic against a trigger
    pub fn record(&mut self, kind: DiagnosticKind, tag: TriggerTag<'_>, message: impl Into<String>) {
        let entry = LogEntry {
            kind,
            vnum: tag.vnum,
            trigger: tag.name.to_string(),
            message: message.into(),
        };
        match kind {
            DiagnosticKind::Structural => tracing::warn!("{}", entry),
            DiagnosticKind::Runaway => tracing::error!("{}", entry),
            DiagnosticKind::Reference => tracing::debug!("{}", entry),
        }
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if any retained message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.message.contains(needle))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_drops_oldest() {
        let mut log = ScriptLog::new(2);
        let tag = TriggerTag { vnum: 7, name: "door" };
        log.record(DiagnosticKind::Structural, tag, "one");
        log.record(DiagnosticKind::Runaway, tag, "two");
        log.record(DiagnosticKind::Reference, tag, "three");
        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert!(log.contains("thr"));
    }

    #[test]
    fn test_entry_format() {
        let mut log = ScriptLog::new(4);
        log.record(DiagnosticKind::Structural, TriggerTag { vnum: 12, name: "bell" }, "'end' without 'if'.");
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.to_string(), "trigger 12 (bell): 'end' without 'if'.");
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut log = ScriptLog::new(0);
        log.record(DiagnosticKind::Runaway, TriggerTag::NONE, "gone");
        assert!(log.is_empty());
    }
}
