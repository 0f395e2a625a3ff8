//! Document-level types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{Block, Table, Track};
use crate::error::Result;

/// A structured document: the root aggregate owning the three
/// independently indexed tracks.
///
/// Blocks and tables are stored; images are derived by scanning blocks
/// (see [`Document::images`](crate::model::Document::images)). The graph
/// is mutated in place by the engine and is exclusively owned by the
/// session that opened it; no concurrent batches against the same
/// instance are supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Blocks track, in document order
    pub blocks: Vec<Block>,

    /// Tables track, in document order
    #[serde(default)]
    pub tables: Vec<Table>,

    /// When set, a conforming viewer refreshes all computed fields
    /// (tables of contents, page numbers, cross references) on open.
    #[serde(default)]
    pub update_fields_on_open: bool,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            blocks: Vec::new(),
            tables: Vec::new(),
            update_fields_on_open: false,
        }
    }

    /// Create a document whose blocks carry the given texts. Convenient
    /// for tests and programmatic construction.
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        let mut doc = Self::new();
        for text in texts {
            doc.add_block(Block::with_text(text));
        }
        doc
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Current entry count on a track.
    pub fn track_len(&self, track: Track) -> usize {
        match track {
            Track::Blocks => self.block_count(),
            Track::Tables => self.table_count(),
            Track::Images => self.image_count(),
        }
    }

    /// Get a block by index.
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Get a mutable block by index.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Get a table by index.
    pub fn table(&self, table_index: usize) -> Option<&Table> {
        self.tables.get(table_index)
    }

    /// Get a mutable table by index.
    pub fn table_mut(&mut self, table_index: usize) -> Option<&mut Table> {
        self.tables.get_mut(table_index)
    }

    /// Append a block.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Append a table.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get plain text content of the entire document, one line per block.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize the document graph to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a document graph from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the full current graph to `path`. Does not mutate the
    /// in-memory graph; there is no partial or incremental persistence.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a document snapshot from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Record the current instant as the modification date.
    pub fn touch(&mut self) {
        self.modified = Some(Utc::now());
    }
}
