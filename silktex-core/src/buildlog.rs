//! Compile-log scraping
//!
//! Turns the raw output of a typesetter run into a flat list of
//! messages. Engines are invoked with `-file-line-error`, so hard errors
//! arrive as `file:line: message`; LaTeX warnings and bad boxes keep
//! their usual free-form shapes.

use regex::Regex;
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    BadBox,
}

/// One message scraped from a compile log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogMessage {
    pub file: Option<String>,
    pub line: Option<usize>,
    pub level: LogLevel,
    pub message: String,
}

static FILE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:\./)?([^:\s][^:\n]*\.\w+):(\d+): (.+)$").unwrap());

static BANG_ERROR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^! (.+)$").unwrap());

static WARNING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:LaTeX|Package \w+) Warning: ([^\n]+)").unwrap());

static ON_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"on input line (\d+)").unwrap());

static BADBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^((?:Overfull|Underfull) \\[hv]box \([^)\n]*\))(?: in paragraph at lines (\d+)--\d+)?").unwrap()
});

/// Scrape a compile log into messages, in order of appearance. Pure
/// function; an empty or unrecognizable log yields no messages.
pub fn scrape(log: &str) -> Vec<LogMessage> {
    let mut found: Vec<(usize, LogMessage)> = Vec::new();

    for caps in FILE_LINE_RE.captures_iter(log) {
        let whole = caps.get(0).unwrap();
        found.push((
            whole.start(),
            LogMessage {
                file: Some(caps[1].to_string()),
                line: caps[2].parse().ok(),
                level: LogLevel::Error,
                message: caps[3].trim().to_string(),
            },
        ));
    }

    for caps in BANG_ERROR_RE.captures_iter(log) {
        let whole = caps.get(0).unwrap();
        found.push((
            whole.start(),
            LogMessage {
                file: None,
                line: None,
                level: LogLevel::Error,
                message: caps[1].trim().to_string(),
            },
        ));
    }

    for caps in WARNING_RE.captures_iter(log) {
        let whole = caps.get(0).unwrap();
        let message = caps[1].trim().to_string();
        let line = ON_LINE_RE
            .captures(&message)
            .and_then(|c| c[1].parse().ok());
        found.push((
            whole.start(),
            LogMessage {
                file: None,
                line,
                level: LogLevel::Warning,
                message,
            },
        ));
    }

    for caps in BADBOX_RE.captures_iter(log) {
        let whole = caps.get(0).unwrap();
        let line = caps.get(2).and_then(|m| m.as_str().parse().ok());
        found.push((
            whole.start(),
            LogMessage {
                file: None,
                line,
                level: LogLevel::BadBox,
                message: caps[1].to_string(),
            },
        ));
    }

    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, message)| message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log() {
        assert!(scrape("").is_empty());
    }

    #[test]
    fn test_file_line_error() {
        let log = "./main.tex:12: Undefined control sequence.\n";
        let messages = scrape(log);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, LogLevel::Error);
        assert_eq!(messages[0].file.as_deref(), Some("main.tex"));
        assert_eq!(messages[0].line, Some(12));
        assert_eq!(messages[0].message, "Undefined control sequence.");
    }

    #[test]
    fn test_bang_error() {
        let log = "! LaTeX Error: File `nope.sty' not found.\n";
        let messages = scrape(log);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, LogLevel::Error);
        assert!(messages[0].message.starts_with("LaTeX Error:"));
    }

    #[test]
    fn test_warning_with_input_line() {
        let log = "LaTeX Warning: Citation `knuth' undefined on input line 37.\n";
        let messages = scrape(log);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, LogLevel::Warning);
        assert_eq!(messages[0].line, Some(37));
    }

    #[test]
    fn test_package_warning() {
        let log = "Package hyperref Warning: Token not allowed.\n";
        let messages = scrape(log);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, LogLevel::Warning);
        assert_eq!(messages[0].message, "Token not allowed.");
    }

    #[test]
    fn test_overfull_hbox() {
        let log = "Overfull \\hbox (12.3pt too wide) in paragraph at lines 5--7\n";
        let messages = scrape(log);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, LogLevel::BadBox);
        assert_eq!(messages[0].line, Some(5));
        assert!(messages[0].message.starts_with("Overfull"));
    }

    #[test]
    fn test_messages_in_log_order() {
        let log = "LaTeX Warning: early warning.\n\
                   some filler\n\
                   ./main.tex:9: Missing $ inserted.\n\
                   Underfull \\vbox (badness 10000)\n";
        let messages = scrape(log);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].level, LogLevel::Warning);
        assert_eq!(messages[1].level, LogLevel::Error);
        assert_eq!(messages[2].level, LogLevel::BadBox);
    }
}
