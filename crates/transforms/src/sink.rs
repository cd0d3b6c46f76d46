//! Logging boundary of the patch pipeline.

use ilsplice_core::LocalSlot;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;

/// Something worth reporting about one patch attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatchEvent {
    Patched {
        method: String,
        /// `(target name, local)` in splice order
        locals: Vec<(String, LocalSlot)>,
    },
    NotFound {
        method: String,
        target: String,
    },
    ShapeMismatch {
        method: String,
        index: isize,
    },
    AlreadyPatched {
        method: String,
        call_index: usize,
    },
    Faulted {
        method: String,
        reason: String,
    },
}

impl fmt::Display for PatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchEvent::Patched { method, locals } => {
                write!(f, "patched {method}:")?;
                for (name, slot) in locals {
                    write!(f, " {name}={slot}")?;
                }
                Ok(())
            }
            PatchEvent::NotFound { method, target } => {
                write!(f, "not found: no call to {target} in {method}")
            }
            PatchEvent::ShapeMismatch { method, index } => {
                write!(
                    f,
                    "shape mismatch: anchor {index} in {method} is not a local address load"
                )
            }
            PatchEvent::AlreadyPatched { method, call_index } => {
                write!(f, "already patched: {method} has a splice after call {call_index}")
            }
            PatchEvent::Faulted { method, reason } => {
                write!(f, "faulted patching {method}: {reason}")
            }
        }
    }
}

/// Receives pipeline events.
///
/// Implementations should not panic; the pipeline contains a panic here and logs it through
/// `tracing` instead.
pub trait PatchSink: Send + Sync {
    fn info(&self, event: &PatchEvent);
    fn error(&self, event: &PatchEvent);
}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl PatchSink for TracingSink {
    fn info(&self, event: &PatchEvent) {
        tracing::info!("{}", event);
    }

    fn error(&self, event: &PatchEvent) {
        tracing::error!("{}", event);
    }
}

/// Severity an event was reported at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(Severity, PatchEvent)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Severity, PatchEvent)> {
        self.events.lock().clone()
    }
}

impl PatchSink for RecordingSink {
    fn info(&self, event: &PatchEvent) {
        self.events.lock().push((Severity::Info, event.clone()));
    }

    fn error(&self, event: &PatchEvent) {
        self.events.lock().push((Severity::Error, event.clone()));
    }
}
