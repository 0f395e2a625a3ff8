//! The entity read model.
//!
//! Derives the three ordered views (blocks, tables, images) from the
//! document graph. Everything here is recomputed from the current graph
//! on every call; nothing is cached across mutations, so a view queried
//! after a batch always reflects the shifted ordinals.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Alignment, Block, Document};

/// Maximum heading text length carried in an outline entry.
const HEADING_PREVIEW_LEN: usize = 100;

/// Maximum preview length for a table outline entry.
const TABLE_PREVIEW_LEN: usize = 50;

/// Block-track summary: total count plus the heading hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    /// Total number of blocks
    pub total: usize,

    /// Heading blocks in document order
    pub headings: Vec<Heading>,
}

/// One heading entry in the outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Block index of the heading
    pub index: usize,

    /// Heading level (1-9)
    pub level: u8,

    /// Heading text, truncated
    pub text: String,
}

/// Detail view of a single block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block index
    pub index: usize,

    /// Concatenated visible text
    pub text: String,

    /// Visible text is blank (the block may still carry embedded content)
    pub is_empty: bool,

    /// No visible text and no embedded payload; safe for an unforced delete
    pub is_truly_empty: bool,

    /// At least one fragment carries a non-text payload
    pub has_embedded: bool,

    /// Formatting summary
    pub style: StyleInfo,

    /// Named structural properties carried by the block
    pub flags: Vec<String>,
}

/// Formatting summary for a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleInfo {
    /// Named style record
    pub name: Option<String>,

    /// Heading level, stored or derived from the style name
    pub heading_level: Option<u8>,

    /// Alignment
    pub alignment: Option<Alignment>,

    /// First-line indent in centimeters
    pub first_line_indent: Option<f32>,

    /// Left indent in centimeters
    pub left_indent: Option<f32>,

    /// Space before in centimeters
    pub space_before: Option<f32>,

    /// Space after in centimeters
    pub space_after: Option<f32>,

    /// Line spacing multiplier
    pub line_spacing: Option<f32>,
}

/// Table-track summary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOutline {
    /// Table index
    pub table_index: usize,

    /// Number of rows
    pub rows: usize,

    /// Number of columns
    pub cols: usize,

    /// First cell text, truncated
    pub preview: String,
}

/// Full contents of one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableGrid {
    /// Table index
    pub table_index: usize,

    /// Number of rows
    pub rows: usize,

    /// Number of columns
    pub cols: usize,

    /// Cell texts by row, then column
    pub data: Vec<Vec<String>>,
}

/// Image-track summary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image index (document scan order)
    pub image_index: usize,

    /// Index of the owning block
    pub block_index: usize,

    /// Display width in centimeters, if recorded
    pub width: Option<f32>,

    /// Display height in centimeters, if recorded
    pub height: Option<f32>,
}

impl Document {
    /// Block-track summary with heading hierarchy positions.
    pub fn outline(&self) -> Outline {
        let headings = self
            .blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                let level = block.heading_level()?;
                let text = block.text();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(Heading {
                    index,
                    level,
                    text: truncate(text, HEADING_PREVIEW_LEN),
                })
            })
            .collect();

        Outline {
            total: self.block_count(),
            headings,
        }
    }

    /// Detail views for the given block indices. Out-of-range indices
    /// are skipped, not errors.
    pub fn read_content(&self, indices: &[usize]) -> Vec<BlockInfo> {
        indices
            .iter()
            .filter_map(|&index| self.block(index).map(|block| block_info(index, block)))
            .collect()
    }

    /// Summary of every table.
    pub fn tables_outline(&self) -> Vec<TableOutline> {
        self.tables
            .iter()
            .enumerate()
            .map(|(table_index, table)| TableOutline {
                table_index,
                rows: table.row_count(),
                cols: table.column_count(),
                preview: table
                    .cell(0, 0)
                    .map(|c| truncate(c.text.trim(), TABLE_PREVIEW_LEN))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Full contents of the table at `table_index`.
    pub fn read_table(&self, table_index: usize) -> Result<TableGrid> {
        let table = self.table(table_index).ok_or(Error::TableOutOfRange {
            index: table_index,
            count: self.table_count(),
        })?;
        Ok(TableGrid {
            table_index,
            rows: table.row_count(),
            cols: table.column_count(),
            data: table
                .rows
                .iter()
                .map(|row| row.cells.iter().map(|c| c.text.clone()).collect())
                .collect(),
        })
    }

    /// Summary of every derived image, in document scan order.
    pub fn images_outline(&self) -> Vec<ImageInfo> {
        self.images()
            .into_iter()
            .map(|image| ImageInfo {
                image_index: image.image_index,
                block_index: image.block_index,
                width: image.width,
                height: image.height,
            })
            .collect()
    }
}

fn block_info(index: usize, block: &Block) -> BlockInfo {
    BlockInfo {
        index,
        text: block.text(),
        is_empty: block.is_empty(),
        is_truly_empty: block.is_truly_empty(),
        has_embedded: block.has_embedded(),
        style: StyleInfo {
            name: block.style.name.clone(),
            heading_level: block.heading_level(),
            alignment: block.style.alignment,
            first_line_indent: block.style.first_line_indent,
            left_indent: block.style.left_indent,
            space_before: block.style.space_before,
            space_after: block.style.space_after,
            line_spacing: block.style.line_spacing,
        },
        flags: block.flags.clone(),
    }
}

/// Truncate on a character boundary.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
