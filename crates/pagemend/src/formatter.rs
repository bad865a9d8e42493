use pagemend_core::log::{LogEntry, Severity};

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warn",
        Severity::Fix => "fixed",
        Severity::Error => "error",
    }
}

/// e.g. `2026-10-14T08:00:00.000Z [fixed] Link repair: Corrected relative path: a.iso -> ./a.iso`
pub fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{} [{}] {}: {}",
        entry.iso_timestamp(),
        severity_tag(entry.severity),
        entry.category,
        entry.message
    )
}

pub fn format_log(entries: &[LogEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        output.push_str(&format_entry(entry));
        output.push('\n');
    }
    output
}

pub fn format_summary(entries: &[LogEntry], cycles: u32) -> String {
    let count = |s: Severity| entries.iter().filter(|e| e.severity == s).count();
    format!(
        "{} check(s): {} fixed, {} warning(s), {} error(s)",
        cycles,
        count(Severity::Fix),
        count(Severity::Warning),
        count(Severity::Error)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemend_core::log::Category;

    fn entry(severity: Severity, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Default::default(),
            category: Category::Link,
            severity,
            message: message.to_string(),
        }
    }

    #[test]
    fn formats_single_entry() {
        assert_eq!(
            format_entry(&entry(Severity::Fix, "Link repaired: https://microsoft.com")),
            "1970-01-01T00:00:00.000Z [fixed] Link repair: Link repaired: https://microsoft.com"
        );
    }

    #[test]
    fn summary_counts_by_severity() {
        let log = vec![
            entry(Severity::Fix, "a"),
            entry(Severity::Fix, "b"),
            entry(Severity::Warning, "c"),
            entry(Severity::Info, "d"),
        ];
        assert_eq!(
            format_summary(&log, 2),
            "2 check(s): 2 fixed, 1 warning(s), 0 error(s)"
        );
    }
}
