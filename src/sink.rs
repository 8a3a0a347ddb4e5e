//! Destinations for advice log entries.
//!
//! The advice never talks to a global logger: a [`LogSink`] is handed to
//! [`crate::MethodLogger`] when it is built. [`TracingSink`] forwards to
//! `tracing`; [`MemorySink`] keeps entries for inspection. Any
//! `Fn(&LogRecord<'_>) + Send + Sync` closure is a sink as well.
//!
//! Emission is best effort: sinks swallow their own failures so that the
//! advised call is never affected. A sink that panics anyway is caught by
//! the advice, after the panic hook has printed its message.

use std::fmt;
use std::sync::Mutex;

use tracing::Level;

use crate::signature::MethodSignature;

/// Which advice produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceKind {
    /// Namespace rule, before the call.
    BeforeNamespaced,
    /// Namespace rule, after a normal return.
    AfterNamespaced,
    /// Namespace rule, the call failed.
    Failed,
    /// Marker rule, the marker description line.
    MarkerDescription,
    /// Marker rule, the monitoring line with arguments.
    BeforeMarked,
    /// Marker rule, after a normal return.
    AfterMarked,
}

impl AdviceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AdviceKind::BeforeNamespaced => "before_namespaced",
            AdviceKind::AfterNamespaced => "after_namespaced",
            AdviceKind::Failed => "failed",
            AdviceKind::MarkerDescription => "marker_description",
            AdviceKind::BeforeMarked => "before_marked",
            AdviceKind::AfterMarked => "after_marked",
        }
    }
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log entry, borrowed for the duration of [`LogSink::emit`].
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub level: Level,
    pub advice: AdviceKind,
    pub method: &'a MethodSignature,
    pub message: &'a str,
}

/// Receiver of advice log entries.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord<'_>);
}

impl<F> LogSink for F
where
    F: Fn(&LogRecord<'_>) + Send + Sync,
{
    fn emit(&self, record: &LogRecord<'_>) {
        self(record)
    }
}

/// Sink forwarding entries to `tracing` under the `methodlog` target.
///
/// The identity token and advice kind are attached as structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: &LogRecord<'_>) {
        let method = record.method.token();
        let advice = record.advice.as_str();
        let message = record.message;

        let level = record.level;
        if level == Level::ERROR {
            tracing::error!(target: "methodlog", %method, advice, "{}", message);
        } else if level == Level::WARN {
            tracing::warn!(target: "methodlog", %method, advice, "{}", message);
        } else if level == Level::INFO {
            tracing::info!(target: "methodlog", %method, advice, "{}", message);
        } else if level == Level::DEBUG {
            tracing::debug!(target: "methodlog", %method, advice, "{}", message);
        } else {
            tracing::trace!(target: "methodlog", %method, advice, "{}", message);
        }
    }
}

/// Owned copy of a [`LogRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub advice: AdviceKind,
    /// Identity token of the advised method.
    pub method: String,
    pub message: String,
}

/// Sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CapturedRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the entries emitted so far.
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Entries emitted at `level`.
    pub fn at_level(&self, level: Level) -> Vec<CapturedRecord> {
        self.lock()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock must not disable logging for everyone else.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CapturedRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: &LogRecord<'_>) {
        self.lock().push(CapturedRecord {
            level: record.level,
            advice: record.advice,
            method: record.method.token(),
            message: record.message.to_string(),
        });
    }
}
