//! In-memory ring of recent log lines for the admin log viewer.
//!
//! A JSON `fmt` layer writes each event into the buffer; lines are parsed
//! back into [`LogEntry`] values and the oldest are dropped once the
//! configured capacity is reached.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug)]
struct Inner {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

/// Bounded, shareable log line buffer.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// Tracing layer that feeds this buffer.
    pub fn layer<S>(&self) -> impl Layer<S> + Send + Sync + 'static
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(self.clone())
    }

    /// Change the capacity, dropping the oldest lines if it shrank.
    pub fn set_capacity(&self, capacity: usize) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.capacity = capacity.max(1);
        while inner.entries.len() > inner.capacity {
            inner.entries.pop_front();
        }
    }

    pub fn push(&self, entry: LogEntry) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.entries.len() >= inner.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(entry);
    }

    /// The newest `max_entries` lines, oldest first.
    pub fn recent(&self, max_entries: usize) -> Vec<LogEntry> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let skip = inner.entries.len().saturating_sub(max_entries);
        inner.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_line(&self, line: &str) {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return;
        }
        self.push(parse_line(line));
    }
}

/// Shape of a line written by the JSON formatter.
#[derive(Deserialize)]
struct JsonLine {
    #[serde(default)]
    timestamp: Option<String>,
    level: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

fn parse_line(line: &str) -> LogEntry {
    match serde_json::from_str::<JsonLine>(line) {
        Ok(parsed) => {
            let mut message = parsed
                .fields
                .get("message")
                .map(field_text)
                .unwrap_or_default();
            for (key, value) in parsed.fields.iter().filter(|(k, _)| *k != "message") {
                if !message.is_empty() {
                    message.push(' ');
                }
                message.push_str(&format!("{key}={}", field_text(value)));
            }
            LogEntry {
                timestamp: parsed
                    .timestamp
                    .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                level: parsed.level,
                message,
            }
        }
        Err(_) => LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: "INFO".to_string(),
            message: line.to_string(),
        },
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Writer handed out per event; complete lines land in the buffer on drop.
pub struct LogWriter {
    buffer: LogBuffer,
    bytes: Vec<u8>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.bytes);
        for line in text.split('\n') {
            self.buffer.push_line(line);
        }
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.clone(),
            bytes: Vec::new(),
        }
    }
}
