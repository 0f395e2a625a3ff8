//! # docpatch
//!
//! Batch mutation engine for structured documents.
//!
//! docpatch lets a caller describe *what* should change in a document
//! (text blocks, tables, inline images) as an ordered list of declarative
//! operations, without tracking how earlier changes shift the positions
//! of later ones. The engine validates the batch, orders it so that
//! position-shifting operations never invalidate indices referenced by
//! operations not yet executed, applies it, and refuses destructive
//! mistakes such as silently deleting a block that carries an embedded
//! image.
//!
//! ## Quick Start
//!
//! ```
//! use docpatch::{batch_update, BatchOptions, Document, Operation};
//!
//! fn main() -> docpatch::Result<()> {
//!     let mut doc = Document::from_texts(["Intro", "Old body", "Outro"]);
//!
//!     // Indices always refer to the document as it stood here, no
//!     // matter how the operations are ordered.
//!     let ops = [
//!         Operation::Delete { index: 0, force: false },
//!         Operation::SetText { index: 1, text: "New body".to_string() },
//!     ];
//!     let result = batch_update(&mut doc, &ops, &BatchOptions::new())?;
//!
//!     assert!(result.is_success());
//!     assert_eq!(doc.plain_text(), "New body\nOutro");
//!     Ok(())
//! }
//! ```
//!
//! ## Index tracks
//!
//! Blocks, tables, and images live in three independent ordinal index
//! spaces. A mutation on one track never renumbers entities on another.
//! Within a batch, every submitted index refers to the invocation-start
//! state; after the batch completes, re-query the read model before
//! issuing another batch.
//!
//! ## Safety rules
//!
//! - A block whose visible text is blank may still carry embedded
//!   content (a drawing, a break, an embedded object). `delete` refuses
//!   such blocks unless `force` is set.
//! - Validation is whole-batch and fail-fast: one malformed operation
//!   record prevents every operation in that batch from running.

pub mod engine;
pub mod error;
pub mod model;
pub mod view;

// Re-export commonly used types
pub use engine::{
    batch_update, batch_update_records, Applied, BatchOptions, BatchResult, FailureMode, FontSpec,
    IndentSpec, OpKind, OpOutcome, OpStatus, OpTarget, Operation, Position, SpacingSpec, StyleSpec,
};
pub use error::{Error, ExecError, Result, ValidationError};
pub use model::{
    Alignment, Block, BlockStyle, BreakKind, Document, Drawing, Fragment, ImageRef, Metadata,
    RunStyle, Table, TableCell, TableRow, TextRun, Track,
};
pub use view::{BlockInfo, Heading, ImageInfo, Outline, StyleInfo, TableGrid, TableOutline};

use serde_json::Value;
use std::path::Path;

/// An editing session owning one document graph.
///
/// The graph is exclusively owned by the session; running concurrent
/// batches against the same document is not supported (documented
/// precondition, not a runtime lock). `Editor` is a convenience wrapper
/// around the free functions: the engine itself never retains the graph.
///
/// # Example
///
/// ```no_run
/// use docpatch::{Editor, Operation};
///
/// let mut editor = Editor::open("report.json")?;
/// let outline = editor.document().outline();
/// println!("{} blocks", outline.total);
///
/// editor.batch_update(&[Operation::Delete { index: 3, force: false }])?;
/// editor.save("report.json")?;
/// # Ok::<(), docpatch::Error>(())
/// ```
pub struct Editor {
    document: Document,
    options: BatchOptions,
}

impl Editor {
    /// Create a session around an existing document graph.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            options: BatchOptions::default(),
        }
    }

    /// Load a document snapshot from `path` and open a session on it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Document::load(path)?))
    }

    /// Set the batch options used by this session.
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// The owned document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the owned document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Consume the session, returning the document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Apply a batch of typed operations.
    pub fn batch_update(&mut self, ops: &[Operation]) -> Result<BatchResult> {
        engine::batch_update(&mut self.document, ops, &self.options)
    }

    /// Parse raw operation records and apply them as one batch.
    pub fn apply_records(&mut self, records: &[Value]) -> Result<BatchResult> {
        engine::batch_update_records(&mut self.document, records, &self.options)
    }

    /// Serialize the current graph to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.document.save(path)
    }
}
