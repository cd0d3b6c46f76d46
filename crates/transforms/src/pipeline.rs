//! One-shot patch pipeline: scan → resolve → validate → build → splice.
//!
//! Every outcome is decided here. On anything other than a successful splice the input stream
//! comes back unmodified and an error event goes to the sink; internal faults, including
//! panics, are caught at this boundary so the host installation never fails because of a patch.

use crate::anchor::resolve_anchors;
use crate::matcher::scan_for_call;
use crate::plan::PatchPlan;
use crate::rewriter::{BLOCK_LEN, build_injection, insert_after, is_spliced};
use crate::sink::{PatchEvent, PatchSink, Severity};
use crate::validator::validate_anchors;
use crate::Result;
use ilsplice_core::{InstructionStream, LocalSlot};
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Outcome of one patch attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum PatchResult {
    /// Blocks were spliced after the call at `call_index`.
    Patched {
        call_index: usize,
        locals: Vec<LocalSlot>,
        inserted: usize,
    },
    /// The target call does not occur in the stream.
    NotFound,
    /// The anchor at this index is not a local address load (or lies outside the stream).
    ShapeMismatch(isize),
    /// A factor block already follows the call.
    AlreadyPatched { call_index: usize },
    /// An internal fault was caught at the pipeline boundary.
    Faulted(String),
}

impl PatchResult {
    pub fn is_patched(&self) -> bool {
        matches!(self, PatchResult::Patched { .. })
    }
}

/// Pipeline output: the outcome plus the stream to hand to the installer.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchReport {
    pub result: PatchResult,
    /// Patched stream on success, otherwise the input unmodified.
    pub stream: InstructionStream,
}

enum Attempt {
    Spliced {
        stream: InstructionStream,
        call_index: usize,
        locals: Vec<LocalSlot>,
    },
    NotFound,
    ShapeMismatch(isize),
    AlreadyPatched(usize),
}

/// Applies `plan` to `stream` once.
pub fn patch(stream: InstructionStream, plan: &PatchPlan, sink: &dyn PatchSink) -> PatchReport {
    let method = plan.method.qualified_name();
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| try_patch(&stream, plan)));

    let (result, event) = match attempt {
        Ok(Ok(Attempt::Spliced {
            stream: patched,
            call_index,
            locals,
        })) => {
            let named = plan
                .targets
                .iter()
                .map(|t| t.name.clone())
                .zip(locals.iter().copied())
                .collect();
            let event = PatchEvent::Patched {
                method,
                locals: named,
            };
            deliver(sink, Severity::Info, &event);
            let inserted = patched.len() - stream.len();
            return PatchReport {
                result: PatchResult::Patched {
                    call_index,
                    locals,
                    inserted,
                },
                stream: patched,
            };
        }
        Ok(Ok(Attempt::NotFound)) => (
            PatchResult::NotFound,
            PatchEvent::NotFound {
                method,
                target: plan.target.to_string(),
            },
        ),
        Ok(Ok(Attempt::ShapeMismatch(index))) => (
            PatchResult::ShapeMismatch(index),
            PatchEvent::ShapeMismatch { method, index },
        ),
        Ok(Ok(Attempt::AlreadyPatched(call_index))) => (
            PatchResult::AlreadyPatched { call_index },
            PatchEvent::AlreadyPatched { method, call_index },
        ),
        Ok(Err(e)) => faulted(method, e.to_string()),
        Err(payload) => faulted(method, panic_message(&*payload)),
    };
    deliver(sink, Severity::Error, &event);

    PatchReport { result, stream }
}

/// Hands `event` to the sink. A panicking sink is logged and otherwise ignored.
fn deliver(sink: &dyn PatchSink, severity: Severity, event: &PatchEvent) {
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| match severity {
        Severity::Info => sink.info(event),
        Severity::Error => sink.error(event),
    }));
    if let Err(payload) = delivered {
        warn!("patch sink panicked on `{}`: {}", event, panic_message(&*payload));
    }
}

fn faulted(method: String, reason: String) -> (PatchResult, PatchEvent) {
    (
        PatchResult::Faulted(reason.clone()),
        PatchEvent::Faulted { method, reason },
    )
}

fn try_patch(stream: &InstructionStream, plan: &PatchPlan) -> Result<Attempt> {
    plan.validate()?;

    let Some(call_index) = scan_for_call(stream, &plan.target) else {
        return Ok(Attempt::NotFound);
    };

    // all index work happens against the unmodified stream
    let anchors = resolve_anchors(call_index, &plan.offsets());
    let locals = match validate_anchors(stream, &anchors) {
        Ok(locals) => locals,
        Err(index) => return Ok(Attempt::ShapeMismatch(index)),
    };

    let blocks: Vec<_> = plan
        .targets
        .iter()
        .zip(&locals)
        .map(|(target, &slot)| build_injection(slot, target.source, target.operation))
        .collect();

    if is_spliced(stream, call_index) {
        return Ok(Attempt::AlreadyPatched(call_index));
    }

    let patched = insert_after(stream, call_index, &blocks)?;
    debug!(
        "{} blocks ({} instructions) after call at {}",
        blocks.len(),
        blocks.len() * BLOCK_LEN,
        call_index
    );

    Ok(Attempt::Spliced {
        stream: patched,
        call_index,
        locals,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
