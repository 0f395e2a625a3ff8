//! The batch mutation engine.
//!
//! The single public entry point is [`batch_update`]: it validates a
//! batch of operations, orders it for drift-free execution, applies it,
//! and returns the aggregated [`BatchResult`]. The document graph is
//! passed in explicitly and never retained between calls.
//!
//! Index semantics: every index in a batch refers to the document as it
//! stood when `batch_update` was called. After the call returns, callers
//! must re-query the read model before issuing a new batch, because
//! structural operations shift same-track ordinals.

pub mod exec;
pub mod op;
pub mod outcome;
pub mod plan;
pub mod style;

pub use op::{OpKind, Operation, Position};
pub use outcome::{Applied, BatchResult, OpOutcome, OpStatus, OpTarget};
pub use plan::Plan;
pub use style::{FontSpec, IndentSpec, SpacingSpec, StyleSpec};

use serde_json::Value;

use crate::error::Result;
use crate::model::Document;

/// Options controlling batch execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// What to do when an operation fails during execution
    pub failure_mode: FailureMode,
}

impl BatchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure mode.
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Keep executing after a failed operation.
    pub fn continue_on_error(mut self) -> Self {
        self.failure_mode = FailureMode::Continue;
        self
    }
}

/// Policy for execution-time failures (protection, out-of-range).
///
/// Validation failures are unaffected: they always reject the whole
/// batch before anything runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop at the first failed operation and return the partial result
    /// up to and including the failure. Operations already applied stay
    /// applied. This is the default.
    #[default]
    Abort,
    /// Record the failure and keep executing the remaining operations.
    Continue,
}

/// Validate, plan, and execute a batch of operations against `doc`.
///
/// Validation is fail-fast and whole-batch: a malformed operation
/// anywhere in the list prevents every operation in the batch from
/// running and the call returns `Err` with zero side effects.
/// Execution-time failures are per-operation and reported through the
/// returned [`BatchResult`] according to the configured
/// [`FailureMode`].
pub fn batch_update(
    doc: &mut Document,
    ops: &[Operation],
    options: &BatchOptions,
) -> Result<BatchResult> {
    op::validate(ops, doc)?;
    let plan = plan::plan(ops);

    let mut result = BatchResult::new();
    for &submitted in &plan.steps {
        let op = &ops[submitted];
        match exec::execute(doc, op) {
            Ok(applied) => result.push_ok(submitted, op, applied),
            Err(error) => {
                log::warn!("operation {} ({}) failed: {}", submitted, op.kind(), error);
                result.push_err(submitted, op, error);
                if options.failure_mode == FailureMode::Abort {
                    break;
                }
            }
        }
    }
    Ok(result)
}

/// Parse raw operation records and apply them as one batch.
///
/// Records are JSON mappings with an `op` discriminator; unknown extra
/// fields are ignored. Any parse failure rejects the whole batch.
pub fn batch_update_records(
    doc: &mut Document,
    records: &[Value],
    options: &BatchOptions,
) -> Result<BatchResult> {
    let ops = records
        .iter()
        .map(Operation::from_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    batch_update(doc, &ops, options)
}
