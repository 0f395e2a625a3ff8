//! Document model types.
//!
//! This module defines the in-memory document graph the engine mutates:
//! three independently indexed tracks (blocks, tables, derived images)
//! plus the document-level field-refresh flag. The engine never parses a
//! container format; it receives this graph and serializes it back as a
//! JSON snapshot.

mod block;
mod document;
mod image;
mod table;

pub use block::{Alignment, Block, BlockStyle, BreakKind, Drawing, Fragment, RunStyle, TextRun};
pub use document::{Document, Metadata};
pub use image::ImageRef;
pub use table::{Table, TableCell, TableRow};

use serde::{Deserialize, Serialize};

/// One of the three independent ordinal index spaces.
///
/// A mutation on one track never renumbers entities on another track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    /// Paragraph-equivalent blocks, addressed by `index`
    Blocks,
    /// Tables, addressed by `table_index`
    Tables,
    /// Derived images, addressed by `image_index`
    Images,
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Track::Blocks => write!(f, "block"),
            Track::Tables => write!(f, "table"),
            Track::Images => write!(f, "image"),
        }
    }
}
