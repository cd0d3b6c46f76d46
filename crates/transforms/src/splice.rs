//! Factor splicing as a [`Transform`].
//!
//! Wraps [`crate::pipeline::patch`] so a plan can run alongside other transforms in a
//! [`crate::pass::Pass`]. Non-patched outcomes are not errors: the stream is left as it was and
//! the transform reports no change.

use crate::pipeline::{PatchResult, patch};
use crate::plan::PatchPlan;
use crate::sink::{PatchSink, TracingSink};
use crate::{Result, Transform};
use ilsplice_core::InstructionStream;
use parking_lot::Mutex;
use std::sync::Arc;

/// Splice factor-scaling blocks after the plan's target call.
pub struct FactorSplice {
    plan: PatchPlan,
    sink: Arc<dyn PatchSink>,
    last: Mutex<Option<PatchResult>>,
}

impl FactorSplice {
    pub fn new(plan: PatchPlan) -> Self {
        Self::with_sink(plan, Arc::new(TracingSink))
    }

    pub fn with_sink(plan: PatchPlan, sink: Arc<dyn PatchSink>) -> Self {
        Self {
            plan,
            sink,
            last: Mutex::new(None),
        }
    }

    pub fn plan(&self) -> &PatchPlan {
        &self.plan
    }

    /// Outcome of the most recent [`Transform::apply`].
    pub fn last_result(&self) -> Option<PatchResult> {
        self.last.lock().clone()
    }
}

impl Transform for FactorSplice {
    fn name(&self) -> &'static str {
        "FactorSplice"
    }

    fn apply(&self, stream: &mut InstructionStream) -> Result<bool> {
        let report = patch(std::mem::take(stream), &self.plan, self.sink.as_ref());
        *stream = report.stream;
        let changed = report.result.is_patched();
        *self.last.lock() = Some(report.result);
        Ok(changed)
    }
}
