use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use kubedeck_types::{LogEntry, LogLevel};

/// Level keywords in precedence order; WARNING before WARN so prefix
/// checks see the longer form first
const LEVEL_NAMES: &[(&str, LogLevel)] = &[
    ("FATAL", LogLevel::Fatal),
    ("PANIC", LogLevel::Fatal),
    ("CRITICAL", LogLevel::Fatal),
    ("ERROR", LogLevel::Error),
    ("ERR", LogLevel::Error),
    ("WARNING", LogLevel::Warn),
    ("WARN", LogLevel::Warn),
    ("INFO", LogLevel::Info),
    ("DEBUG", LogLevel::Debug),
    ("TRACE", LogLevel::Trace),
];

/// Field names loggers commonly use for the severity
const LEVEL_FIELDS: &[&str] = &[
    "level",
    "lvl",
    "severity",
    "log.level",
    "loglevel",
    "log_level",
    "Level",
    "LEVEL",
];

/// Field names loggers commonly use for the message body
const MESSAGE_FIELDS: &[&str] = &["msg", "message", "Message", "MESSAGE"];

/// Extracts structure from raw log lines
pub struct LogParser;

impl LogParser {
    /// Turn one raw line into a LogEntry
    ///
    /// Splits off the kubelet timestamp prefix when present, then tries
    /// JSON before falling back to keyword scanning for the level.
    pub fn parse(raw: &str, pod_name: &str, line_number: u64) -> LogEntry {
        let (timestamp, content) = Self::split_kubelet_timestamp(raw);
        let mut entry = LogEntry::new(pod_name.to_string(), line_number, content.to_string());
        entry.timestamp = timestamp;

        if let Some((level, message)) = Self::try_parse_json(content) {
            entry.level = level;
            if let Some(message) = message {
                entry.message = message;
            }
        } else {
            entry.level = Self::extract_level_from_text(content);
        }

        entry
    }

    /// Split a leading kubelet timestamp off a log line
    ///
    /// With `timestamps=true` the kubelet prefixes each line with one
    /// RFC 3339 instant and a single space. Working on the whole first
    /// token avoids byte slicing, so multibyte content is never split.
    fn split_kubelet_timestamp(raw: &str) -> (Option<DateTime<Utc>>, &str) {
        let (candidate, rest) = raw.split_once(' ').unwrap_or((raw, ""));
        match DateTime::parse_from_rfc3339(candidate) {
            Ok(ts) => (Some(ts.with_timezone(&Utc)), rest.trim_start()),
            Err(_) => (None, raw),
        }
    }

    /// Read the line as a JSON object, returning its level and message
    /// body if found
    fn try_parse_json(content: &str) -> Option<(LogLevel, Option<String>)> {
        let trimmed = content.trim();
        if !trimmed.starts_with('{') {
            return None;
        }

        let value: Value = serde_json::from_str(trimmed).ok()?;
        let obj = value.as_object()?;

        let message = MESSAGE_FIELDS
            .iter()
            .find_map(|f| obj.get(*f).and_then(Value::as_str))
            .map(str::to_string);

        Some((Self::extract_level_from_json(obj), message))
    }

    fn extract_level_from_json(obj: &Map<String, Value>) -> LogLevel {
        for field in LEVEL_FIELDS {
            match obj.get(*field) {
                Some(Value::String(s)) => return LogLevel::from_str(s),
                Some(Value::Number(n)) => {
                    // Bunyan-style numeric levels
                    if let Some(num) = n.as_u64() {
                        return match num {
                            0..=10 => LogLevel::Trace,
                            11..=20 => LogLevel::Debug,
                            21..=30 => LogLevel::Info,
                            31..=40 => LogLevel::Warn,
                            41..=50 => LogLevel::Error,
                            _ => LogLevel::Fatal,
                        };
                    }
                }
                _ => {}
            }
        }
        LogLevel::Unknown
    }

    /// Scan plain text for level keywords, most explicit form first
    fn extract_level_from_text(content: &str) -> LogLevel {
        let upper = content.to_uppercase();

        // Bracketed [ERROR], then delimited ERROR: and " ERROR ", then a
        // bare keyword at the start of the line
        for (name, level) in LEVEL_NAMES {
            if upper.contains(&format!("[{name}]")) {
                return *level;
            }
        }
        for (name, level) in LEVEL_NAMES {
            if upper.contains(&format!("{name}:")) {
                return *level;
            }
        }
        for (name, level) in LEVEL_NAMES {
            if upper.contains(&format!(" {name} ")) {
                return *level;
            }
        }

        let trimmed = upper.trim_start();
        for (name, level) in LEVEL_NAMES {
            if trimmed.starts_with(name) {
                return *level;
            }
        }

        LogLevel::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_kubelet_timestamp() {
        let line = "2025-03-02T08:15:42.002918476Z listening on 0.0.0.0:8080";
        let entry = LogParser::parse(line, "gateway-0", 1);
        assert_eq!(entry.raw, "listening on 0.0.0.0:8080");
        let ts = entry.timestamp.unwrap();
        assert_eq!(ts.to_rfc3339().split('T').next(), Some("2025-03-02"));

        let bare = LogParser::parse("no timestamp here", "gateway-0", 2);
        assert!(bare.timestamp.is_none());
        assert_eq!(bare.raw, "no timestamp here");
    }

    #[test]
    fn test_json_level_and_message() {
        let line = r#"{"level":"error","msg":"dial tcp 10.0.0.9:5432: connection refused"}"#;
        let entry = LogParser::parse(line, "api-1", 1);
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message, "dial tcp 10.0.0.9:5432: connection refused");
        // The raw line is kept for regex filtering
        assert!(entry.raw.starts_with('{'));
    }

    #[test]
    fn test_numeric_level_buckets() {
        let entry = LogParser::parse(r#"{"level":40,"msg":"slow query"}"#, "db-0", 1);
        assert_eq!(entry.level, LogLevel::Warn);

        let entry = LogParser::parse(r#"{"level":60}"#, "db-0", 2);
        assert_eq!(entry.level, LogLevel::Fatal);
    }

    #[test]
    fn test_text_level_keywords() {
        assert_eq!(
            LogParser::parse("[ERROR] failed to mount volume", "p", 1).level,
            LogLevel::Error
        );
        assert_eq!(
            LogParser::parse("warn: certificate expires in 3 days", "p", 2).level,
            LogLevel::Warn
        );
        assert_eq!(
            LogParser::parse("request took 12ms", "p", 3).level,
            LogLevel::Unknown
        );
    }

    #[test]
    fn test_plain_line_keeps_raw_as_message() {
        let entry = LogParser::parse("2025-03-02T08:15:42Z INFO serving traffic", "web-0", 1);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "INFO serving traffic");
    }

    #[test]
    fn test_multibyte_content_is_safe() {
        let entry = LogParser::parse("▶ データベース接続を確立しました", "jobs-0", 1);
        assert!(entry.timestamp.is_none());
        assert_eq!(entry.raw, "▶ データベース接続を確立しました");

        let entry = LogParser::parse("2025-03-02T08:15:42Z ✓ 接続完了", "jobs-0", 2);
        assert!(entry.timestamp.is_some());
        assert_eq!(entry.raw, "✓ 接続完了");
    }
}
