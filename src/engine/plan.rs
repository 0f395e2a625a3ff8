//! Execution planning.
//!
//! Orders a validated batch so that position-shifting operations never
//! invalidate positions referenced by operations not yet executed. Every
//! index a caller submits refers to the document as it stood when the
//! batch was submitted; the plan makes that hold without any index
//! recalculation:
//!
//! 1. Non-structural operations run first, in submitted order. They never
//!    change entity counts, so they cannot invalidate anyone, and running
//!    them before any structural shift means every submitted index is
//!    still the invocation-start index when it is used.
//! 2. Structural operations run per track in descending target-index
//!    order. Removing or inserting at a higher ordinal never shifts the
//!    ordinals of not-yet-processed lower ordinals.
//! 3. On equal index, `delete` runs before `insert`, so a paired
//!    delete/insert at one slot reads as "replace".
//!
//! The tracks are independent, so their relative order is free; image
//! structural operations are placed before block structural operations so
//! that an `insert_image` aimed at a block index still sees the pristine
//! block track.

use super::op::Operation;

/// An execution plan: positions into the submitted operation list, in
/// the order they are to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Submission positions in execution order
    pub steps: Vec<usize>,
}

impl Plan {
    /// Number of planned steps (always the full batch).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Order a batch for drift-free execution.
pub fn plan(ops: &[Operation]) -> Plan {
    let mut steps: Vec<usize> = Vec::with_capacity(ops.len());
    let mut structural: Vec<usize> = Vec::new();

    for (position, op) in ops.iter().enumerate() {
        if op.is_structural() {
            structural.push(position);
        } else {
            steps.push(position);
        }
    }

    // Stable sort keeps submission order for equal keys.
    structural.sort_by_key(|&position| sort_key(&ops[position]));

    log::debug!(
        "planned batch: {} non-structural, {} structural",
        steps.len(),
        structural.len()
    );

    steps.extend(structural);
    Plan { steps }
}

/// Sort key for structural operations: track first (images before
/// blocks), then descending index, with delete before insert on ties.
///
/// On the image track the two kinds address different index spaces
/// (image ordinals for delete, block positions for insert), so their
/// indices are not comparable: all image deletes run before all image
/// inserts, each group descending within its own space.
fn sort_key(op: &Operation) -> (u8, u8, std::cmp::Reverse<usize>, u8) {
    let index = op.target_index().unwrap_or(0);
    match op {
        Operation::DeleteImage { .. } => (0, 0, std::cmp::Reverse(index), 0),
        Operation::InsertImage { .. } => (0, 1, std::cmp::Reverse(index), 0),
        Operation::Delete { .. } => (1, 0, std::cmp::Reverse(index), 0),
        _ => (1, 0, std::cmp::Reverse(index), 1),
    }
}
