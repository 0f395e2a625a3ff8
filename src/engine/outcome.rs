//! Batch outcome reporting.

use serde::{Deserialize, Serialize};

use super::op::{OpKind, Operation};
use crate::error::ExecError;
use crate::model::Track;

/// Aggregated result of one `batch_update` invocation: the ordered list
/// of per-operation outcomes, in execution order.
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    /// Number of operations applied successfully
    pub applied: usize,

    /// Number of operations that failed
    pub failed: usize,

    /// Per-operation outcomes in execution order
    pub outcomes: Vec<OpOutcome>,
}

impl BatchResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every executed operation succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Record a successful operation.
    pub(crate) fn push_ok(&mut self, submitted: usize, op: &Operation, applied: Applied) {
        self.applied += 1;
        self.outcomes.push(OpOutcome {
            kind: op.kind(),
            submitted,
            target: OpTarget::of(op),
            status: OpStatus::Applied(applied),
        });
    }

    /// Record a failed operation.
    pub(crate) fn push_err(&mut self, submitted: usize, op: &Operation, error: ExecError) {
        self.failed += 1;
        self.outcomes.push(OpOutcome {
            kind: op.kind(),
            submitted,
            target: OpTarget::of(op),
            status: OpStatus::Failed(error),
        });
    }

    /// The first failure, if any.
    pub fn first_failure(&self) -> Option<&OpOutcome> {
        self.outcomes
            .iter()
            .find(|o| matches!(o.status, OpStatus::Failed(_)))
    }
}

/// Outcome of a single operation.
#[derive(Debug, Serialize)]
pub struct OpOutcome {
    /// Operation kind
    pub kind: OpKind,

    /// Position of the operation in the submitted batch
    pub submitted: usize,

    /// What the operation targeted
    pub target: OpTarget,

    /// Success detail or typed failure
    pub status: OpStatus,
}

/// The entity an operation targeted, as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "track", content = "index", rename_all = "lowercase")]
pub enum OpTarget {
    /// A block, by invocation-start index
    Block(usize),
    /// A table, by table index
    Table(usize),
    /// A derived image, by scan-order index
    Image(usize),
    /// The whole document (global operations)
    Document,
}

impl OpTarget {
    fn of(op: &Operation) -> Self {
        match (op.target_index(), target_track(op)) {
            (Some(index), Track::Blocks) => OpTarget::Block(index),
            (Some(index), Track::Tables) => OpTarget::Table(index),
            (Some(index), Track::Images) => OpTarget::Image(index),
            _ => OpTarget::Document,
        }
    }
}

/// The track an operation's submitted index belongs to. Note this is the
/// index space of the *reference*, not necessarily the track whose count
/// changes: `insert_image` references a block.
fn target_track(op: &Operation) -> Track {
    match op {
        Operation::UpdateTableCell { .. }
        | Operation::ReplaceTableCell { .. }
        | Operation::UpdateTableRow { .. }
        | Operation::UpdateTableCol { .. } => Track::Tables,
        Operation::DeleteImage { .. } | Operation::ResizeImage { .. } => Track::Images,
        _ => Track::Blocks,
    }
}

/// Success or typed failure of one operation.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OpStatus {
    /// The operation was applied
    Applied(Applied),
    /// The operation failed and had no effect
    Failed(ExecError),
}

/// Detail reported by a successful operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Applied {
    /// Index of a newly created block, for `insert`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_index: Option<usize>,

    /// Whether a substitution changed anything, for single-target replace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,

    /// Number of blocks changed, for `replace_text_global`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<usize>,
}

impl Applied {
    /// Success with no extra detail.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Success reporting a newly created index.
    pub fn at(new_index: usize) -> Self {
        Self {
            new_index: Some(new_index),
            ..Default::default()
        }
    }

    /// Success reporting whether anything changed.
    pub fn changed(changed: bool) -> Self {
        Self {
            changed: Some(changed),
            ..Default::default()
        }
    }

    /// Success reporting how many blocks changed.
    pub fn replaced(count: usize) -> Self {
        Self {
            replaced: Some(count),
            ..Default::default()
        }
    }
}
