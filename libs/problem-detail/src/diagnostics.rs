//! Diagnostic records emitted when a problem is logged.

use std::sync::Arc;

use http::StatusCode;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::exception::ExceptionIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Server errors are errors, everything else is only interesting when debugging.
    pub fn for_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            LogLevel::Error
        } else {
            LogLevel::Debug
        }
    }
}

/// One logged problem occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub level: LogLevel,
    pub identity: ExceptionIdentity,
    pub status: StatusCode,
    pub type_uri: String,
    pub title: String,
    pub detail: Option<String>,
    pub instance: Option<String>,
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: &DiagnosticRecord);
}

/// Forwards records to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! emit {
    ($lvl:ident, $r:ident) => {
        tracing::$lvl!(
            exception = %$r.identity,
            status = $r.status.as_u16(),
            problem_type = %$r.type_uri,
            title = %$r.title,
            detail = $r.detail.as_deref().unwrap_or(""),
            instance = $r.instance.as_deref().unwrap_or(""),
            "mapped exception to problem detail"
        )
    };
}

impl DiagnosticSink for TracingSink {
    fn record(&self, r: &DiagnosticRecord) {
        match r.level {
            LogLevel::Off => {}
            LogLevel::Error => emit!(error, r),
            LogLevel::Warn => emit!(warn, r),
            LogLevel::Info => emit!(info, r),
            LogLevel::Debug => emit!(debug, r),
            LogLevel::Trace => emit!(trace, r),
        }
    }
}

/// Keeps records in memory; handy for tests and diagnostics endpoints.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<DiagnosticRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, record: &DiagnosticRecord) {
        if record.level != LogLevel::Off {
            self.records.lock().push(record.clone());
        }
    }
}
