//! Log record wire types.
//!
//! Records are encoded as self-describing JSON with the historical field
//! names (`Prefix`, `Time`, `Host`, `Level`, `Msg`, `Caller`, `LineNo`) so
//! the stream stays readable to humans and to existing consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Finest,
    Fine,
    Debug,
    Trace,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// The wire name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Finest => "FINEST",
            Level::Fine => "FINE",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FINEST" => Ok(Level::Finest),
            "FINE" => Ok(Level::Fine),
            "DEBUG" => Ok(Level::Debug),
            "TRACE" => Ok(Level::Trace),
            "INFO" => Ok(Level::Info),
            "WARNING" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" => Ok(Level::Critical),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

/// One structured log record, fully formed before it enters the queue.
///
/// The facade stamps `prefix`, `host`, `time` and the call site; the level
/// entry point provides `level` and `msg`. Records are immutable once
/// enqueued and their lifetime ends at serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogRecord {
    /// Process-wide tag, fixed at shipper construction.
    pub prefix: String,
    /// Emission time, stamped when the entry point is called.
    pub time: DateTime<Utc>,
    /// Host identity from the shipper configuration.
    pub host: String,
    pub level: Level,
    pub msg: String,
    /// Source file of the application call site.
    pub caller: String,
    /// Line of the application call site.
    pub line_no: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_by_increasing_severity() {
        assert!(Level::Finest < Level::Fine);
        assert!(Level::Fine < Level::Debug);
        assert!(Level::Debug < Level::Trace);
        assert!(Level::Trace < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn test_level_round_trips_through_name() {
        for level in [
            Level::Finest,
            Level::Fine,
            Level::Debug,
            Level::Trace,
            Level::Info,
            Level::Warning,
            Level::Error,
            Level::Critical,
        ] {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
            assert_eq!(
                serde_json::to_value(level).unwrap(),
                serde_json::Value::String(level.as_str().to_string())
            );
        }
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_record_serializes_with_wire_field_names() {
        let record = LogRecord {
            prefix: "svc-a".to_string(),
            time: Utc::now(),
            host: "node-1".to_string(),
            level: Level::Warning,
            msg: "disk almost full".to_string(),
            caller: "src/session.rs".to_string(),
            line_no: 87,
        };

        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["Caller", "Host", "Level", "LineNo", "Msg", "Prefix", "Time"]
        );
        assert_eq!(object["Level"], "WARNING");
        assert_eq!(object["LineNo"], 87);

        let back: LogRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.msg, "disk almost full");
        assert_eq!(back.level, Level::Warning);
    }
}
