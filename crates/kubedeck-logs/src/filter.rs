use regex::Regex;

use crate::LogParser;
use kubedeck_types::{LogEntry, LogLevel};

/// Compiled filter for log lines
///
/// Combines an optional case-insensitive regex with an optional minimum
/// severity. An empty filter matches everything.
#[derive(Clone, Debug, Default)]
pub struct LogFilter {
    regex: Option<Regex>,
    min_level: Option<LogLevel>,
}

impl LogFilter {
    /// Build a filter from an optional pattern and minimum level
    pub fn new(pattern: Option<&str>, min_level: Option<LogLevel>) -> Result<Self, regex::Error> {
        let regex = match pattern {
            Some(p) if !p.is_empty() => Some(Regex::new(&format!("(?i){p}"))?),
            _ => None,
        };
        Ok(Self { regex, min_level })
    }

    /// Check if the filter passes everything through
    pub fn is_empty(&self) -> bool {
        self.regex.is_none() && self.min_level.is_none()
    }

    /// Check if a parsed entry passes the filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(min) = self.min_level {
            if entry.level.rank() < min.rank() {
                return false;
            }
        }
        match &self.regex {
            Some(re) => re.is_match(&entry.raw),
            None => true,
        }
    }

    /// Apply the filter to a block of raw log text, keeping matching lines
    pub fn apply(&self, logs: &str) -> String {
        if self.is_empty() {
            return logs.to_string();
        }

        let mut out = String::new();
        for (i, line) in logs.lines().enumerate() {
            let entry = LogParser::parse(line, "", i as u64 + 1);
            if self.matches(&entry) {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_filter() {
        let filter = LogFilter::new(Some("error"), None).unwrap();
        let mut entry = LogEntry::new("pod".to_string(), 1, "an ERROR occurred".to_string());
        assert!(filter.matches(&entry));

        entry.raw = "everything is fine".to_string();
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn test_min_level_filter() {
        let filter = LogFilter::new(None, Some(LogLevel::Warn)).unwrap();
        let mut entry = LogEntry::new("pod".to_string(), 1, "test".to_string());

        entry.level = LogLevel::Error;
        assert!(filter.matches(&entry));

        entry.level = LogLevel::Info;
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = LogFilter::new(None, None).unwrap();
        assert!(filter.is_empty());
        let entry = LogEntry::new("pod".to_string(), 1, "anything".to_string());
        assert!(filter.matches(&entry));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(LogFilter::new(Some("(unclosed"), None).is_err());
    }

    #[test]
    fn test_apply_keeps_matching_lines() {
        let filter = LogFilter::new(Some("timeout"), Some(LogLevel::Warn)).unwrap();
        let logs = "\
[INFO] request served\n\
[WARN] upstream timeout, retrying\n\
[ERROR] timeout talking to database\n\
[ERROR] unrelated failure\n";
        let filtered = filter.apply(logs);
        assert_eq!(
            filtered,
            "[WARN] upstream timeout, retrying\n[ERROR] timeout talking to database\n"
        );
    }
}
