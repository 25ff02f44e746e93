//! Structured JSON logger
//!
//! One line per event: `event`, `severity` and `ts` lead, then the
//! caller's fields in key order. Writes are synchronous.

use std::fmt;
use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Info,
    /// Discarded or repaired input
    Warn,
    /// The edit attempt failed
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Logger;

impl Logger {
    /// Errors go to stderr, everything else to stdout.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::format_line_at(severity, event, fields, Utc::now());
        // A lost log line must not fail the edit.
        let _ = if severity == Severity::Error {
            Self::write_line(&mut io::stderr().lock(), &line)
        } else {
            Self::write_line(&mut io::stdout().lock(), &line)
        };
    }

    pub fn write_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    /// Render without a timestamp. Output depends on the inputs only.
    pub fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        Self::render(severity, event, None, fields)
    }

    pub fn format_line_at(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        at: DateTime<Utc>,
    ) -> String {
        let ts = at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self::render(severity, event, Some(&ts), fields)
    }

    fn render(severity: Severity, event: &str, ts: Option<&str>, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = format!(
            "{{\"event\":{},\"severity\":\"{}\"",
            quote(event),
            severity.as_str()
        );
        if let Some(ts) = ts {
            line.push_str(",\"ts\":");
            line.push_str(&quote(ts));
        }
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&quote(key));
            line.push(':');
            line.push_str(&quote(value));
        }
        line.push_str("}\n");
        line
    }
}

fn quote(s: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(s).unwrap_or_else(|_| String::from("\"\""))
}
