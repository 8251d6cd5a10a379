//! Structured diagnostics for the layout engine.
//!
//! Every [`Config`](crate::Config) carries a [`Logger`]. Contract violations
//! are reported at [`LogLevel::Fatal`] right before the failing call returns
//! its error, and the trace switches on the config emit `Verbose`/`Debug`
//! events describing cache behaviour and finished trees.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub type LogFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
    Fatal,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "verbose",
            LogLevel::Fatal => "fatal",
        }
    }

    fn is_failure(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty", default)]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
        fields: LogFields,
    ) -> Self {
        Self {
            fields,
            ..Self::new(level, target, message)
        }
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Logger writing human-readable lines to stdout/stderr.
    pub fn console() -> Self {
        Self::new(ConsoleSink)
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) -> LoggingResult<()> {
        let event = LogEvent::new(level, target.to_string(), message.to_string());
        self.sink.log(&event)
    }

    pub fn log_with_fields(
        &self,
        level: LogLevel,
        target: &str,
        message: &str,
        fields: LogFields,
    ) -> LoggingResult<()> {
        let event = LogEvent::with_fields(level, target.to_string(), message.to_string(), fields);
        self.sink.log(&event)
    }

    pub fn log_event(&self, event: LogEvent) -> LoggingResult<()> {
        self.sink.log(&event)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::console()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Default sink. Errors and fatal messages go to stderr, the rest to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let mut line = format!("[{}] {}: {}", event.level.as_str(), event.target, event.message);
        if !event.fields.is_empty() {
            line.push(' ');
            line.push_str(&serde_json::to_string(&event.fields)?);
        }
        if event.level.is_failure() {
            let mut err = std::io::stderr().lock();
            writeln!(err, "{line}")?;
        } else {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("memory sink poisoned").clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.events
            .lock()
            .expect("memory sink poisoned")
            .iter()
            .filter(|event| event.level == level)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().expect("memory sink poisoned").clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        self.events
            .lock()
            .expect("memory sink poisoned")
            .push(event.clone());
        Ok(())
    }
}

/// JSON-lines sink truncating the file once it would grow past `max_bytes`.
pub struct FileSink {
    path: PathBuf,
    max_bytes: u64,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, max_bytes: u64) -> LoggingResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            max_bytes,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_line(&self, mut line: String) -> LoggingResult<()> {
        line.push('\n');
        let mut guard = self.writer.lock().expect("logger mutex poisoned");

        if self.should_rotate(guard.get_ref(), line.len() as u64)? {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?;
            *guard = BufWriter::new(file);
        }

        guard.write_all(line.as_bytes())?;
        guard.flush()?;
        Ok(())
    }

    fn should_rotate(&self, file: &File, incoming_len: u64) -> std::io::Result<bool> {
        if self.max_bytes == 0 {
            return Ok(false);
        }
        let current = file.metadata()?.len();
        Ok(current + incoming_len > self.max_bytes)
    }
}

impl LogSink for FileSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let line = serde_json::to_string(event)?;
        self.write_line(line)
    }
}

pub fn event_with_fields(
    level: LogLevel,
    target: &str,
    message: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> LogEvent {
    let map: LogFields = fields.into_iter().collect();
    LogEvent::with_fields(level, target.to_string(), message.to_string(), map)
}

pub fn json_kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn memory_sink_shares_buffer_between_clones() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        logger.log(LogLevel::Warn, "room_flex::test", "first").unwrap();
        logger
            .log_event(event_with_fields(
                LogLevel::Fatal,
                "room_flex::test",
                "second",
                [json_kv("node", "#3")],
            ))
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].fields.get("node").unwrap(), "#3");
        assert_eq!(sink.count(LogLevel::Fatal), 1);
        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn event_serializes_level_lowercase() {
        let event = LogEvent::new(LogLevel::Verbose, "room_flex::cache", "wrapped");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["level"], "verbose");
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn file_sink_truncates_when_full() {
        let path = std::env::temp_dir().join(format!("room_flex_log_{}.jsonl", std::process::id()));
        let _ = fs::remove_file(&path);
        let sink = FileSink::new(&path, 200).unwrap();
        for i in 0..10 {
            let event = LogEvent::new(LogLevel::Info, "room_flex::test", format!("line {i}"));
            sink.log(&event).unwrap();
        }
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.len() as u64 <= 200);
        assert!(contents.contains("line 9"));
        let _ = fs::remove_file(&path);
    }
}
