//! The session repair log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    /// Detection only; nothing was changed.
    Warning,
    /// A patch was applied to the document.
    Fix,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    System,
    SystemError,
    Structure,
    Link,
    Image,
    Style,
    Script,
    FeatureCheck,
    FeatureFix,
    FeatureWarning,
    GlobalError,
    UnhandledRejection,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::System => "System info",
            Category::SystemError => "System error",
            Category::Structure => "HTML structure",
            Category::Link => "Link repair",
            Category::Image => "Image repair",
            Category::Style => "CSS repair",
            Category::Script => "Script check",
            Category::FeatureCheck => "Feature check",
            Category::FeatureFix => "Feature repair",
            Category::FeatureWarning => "Feature warning",
            Category::GlobalError => "Global error",
            Category::UnhandledRejection => "Unhandled rejection",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    /// `2026-10-14T08:00:00.000Z`
    pub fn iso_timestamp(&self) -> String {
        iso_millis::format(&self.timestamp)
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

type Mirror = Box<dyn Fn(&LogEntry)>;

/// Bounded, insertion-ordered record of everything the agent saw or did.
pub struct RepairLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    mirror: Option<Mirror>,
}

impl Default for RepairLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for RepairLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepairLog")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl RepairLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            mirror: None,
        }
    }

    /// Extra console sink, called for every entry after the tracing event.
    pub fn set_mirror(&mut self, mirror: impl Fn(&LogEntry) + 'static) {
        self.mirror = Some(Box::new(mirror));
    }

    /// Appends, mirrors to the console, and evicts the oldest entry once over
    /// capacity.
    pub fn append(&mut self, entry: LogEntry) {
        match entry.severity {
            Severity::Info | Severity::Fix => {
                tracing::info!(category = %entry.category, "{}", entry.message)
            }
            Severity::Warning => tracing::warn!(category = %entry.category, "{}", entry.message),
            Severity::Error => tracing::error!(category = %entry.category, "{}", entry.message),
        }
        if let Some(mirror) = &self.mirror {
            mirror(&entry);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// The newest `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn entry(i: usize) -> LogEntry {
        LogEntry {
            timestamp: DateTime::<Utc>::default(),
            category: Category::System,
            severity: Severity::Info,
            message: format!("entry {i}"),
        }
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut log = RepairLog::default();
        for i in 0..100 {
            log.append(entry(i));
        }
        assert_eq!(log.len(), 100);
        log.append(entry(100));
        assert_eq!(log.len(), 100);
        assert_eq!(log.entries().next().unwrap().message, "entry 1");
        assert_eq!(log.last().unwrap().message, "entry 100");
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = RepairLog::new(10);
        for i in 0..5 {
            log.append(entry(i));
        }
        let tail: Vec<_> = log.recent(2).map(|e| e.message.as_str()).collect();
        assert_eq!(tail, vec!["entry 3", "entry 4"]);
        assert_eq!(log.recent(20).count(), 5);
    }

    #[test]
    fn mirror_sees_every_entry() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut log = RepairLog::new(2);
        log.set_mirror(move |e| sink.borrow_mut().push(e.message.clone()));
        for i in 0..3 {
            log.append(entry(i));
        }
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn timestamps_serialize_with_millis() {
        let json = serde_json::to_value(entry(0)).unwrap();
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["category"], "system");
        let back: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry(0));
    }
}
