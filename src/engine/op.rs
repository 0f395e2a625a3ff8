//! Operation descriptors, record parsing, and validation.
//!
//! Raw operation records are JSON mappings with an `op` discriminator.
//! Parsing classifies every failure (unknown operation, missing field,
//! type mismatch, bad value) and unknown extra fields are ignored, so a
//! caller can attach bookkeeping data to records without breaking them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::style::{FontSpec, IndentSpec, SpacingSpec, StyleSpec};
use crate::error::ValidationError;
use crate::model::{Alignment, Document, Track};

/// A single edit operation. Every variant references exactly one track
/// through its matching index parameter, except `update_fields_on_open`
/// which is document-global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Remove the block at `index`. Refused without `force` when the
    /// block carries embedded non-text content.
    Delete {
        /// Block index
        index: usize,
        /// Bypass the embedded-content protection check
        #[serde(default)]
        force: bool,
    },

    /// Create a new block with `text` adjacent to the block at `index`.
    Insert {
        /// Reference block index
        index: usize,
        /// Text of the new block
        text: String,
        /// Placement relative to the reference block
        #[serde(default)]
        position: Position,
        /// Optional named style for the new block
        #[serde(default)]
        style: Option<String>,
    },

    /// Apply a partial style descriptor to the block at `index`.
    UpdateStyle {
        /// Block index
        index: usize,
        /// The partial style changes
        #[serde(flatten)]
        style: StyleSpec,
    },

    /// Replace occurrences of `pattern` in the visible text of one block.
    ReplaceText {
        /// Block index
        index: usize,
        /// Literal substring or regular expression
        pattern: String,
        /// Replacement text
        #[serde(default)]
        replacement: String,
        /// Treat `pattern` as a regular expression
        #[serde(default)]
        regex: bool,
    },

    /// Apply the same substitution across every block in document order.
    ReplaceTextGlobal {
        /// Literal substring or regular expression
        pattern: String,
        /// Replacement text
        #[serde(default)]
        replacement: String,
        /// Treat `pattern` as a regular expression
        #[serde(default)]
        regex: bool,
    },

    /// Remove named structural properties (e.g. `numPr`) from the block
    /// at `index` without altering its visible text.
    CleanXml {
        /// Block index
        index: usize,
        /// Property names to remove
        remove: Vec<String>,
        /// Optional style record to assign afterwards
        #[serde(default)]
        style: Option<String>,
        /// Optional indentation to assign afterwards
        #[serde(default)]
        indent: Option<IndentSpec>,
    },

    /// Replace the block's entire fragment list with a single text run.
    /// Destroys per-fragment formatting and embedded payloads in that
    /// block; this collapse is a documented side effect.
    SetText {
        /// Block index
        index: usize,
        /// The new text
        text: String,
    },

    /// Set the text of a single table cell.
    UpdateTableCell {
        /// Table index
        table_index: usize,
        /// Row within the table
        row: usize,
        /// Column within the table
        col: usize,
        /// New cell text
        text: String,
    },

    /// Replace occurrences of `pattern` within a single table cell.
    ReplaceTableCell {
        /// Table index
        table_index: usize,
        /// Row within the table
        row: usize,
        /// Column within the table
        col: usize,
        /// Literal substring or regular expression
        pattern: String,
        /// Replacement text
        #[serde(default)]
        replacement: String,
        /// Treat `pattern` as a regular expression
        #[serde(default)]
        regex: bool,
    },

    /// Set every cell of a row. `texts` must match the column count.
    UpdateTableRow {
        /// Table index
        table_index: usize,
        /// Row within the table
        row: usize,
        /// One text per column
        texts: Vec<String>,
    },

    /// Set every cell of a column. `texts` must match the row count.
    UpdateTableCol {
        /// Table index
        table_index: usize,
        /// Column within the table
        col: usize,
        /// One text per row
        texts: Vec<String>,
    },

    /// Remove the derived image at `image_index`.
    DeleteImage {
        /// Image index (document scan order)
        image_index: usize,
    },

    /// Resize the derived image at `image_index`. With only one dimension
    /// supplied the other is recomputed to preserve the original aspect
    /// ratio; supplying both overrides it.
    ResizeImage {
        /// Image index (document scan order)
        image_index: usize,
        /// New width in centimeters
        #[serde(default)]
        width: Option<f32>,
        /// New height in centimeters
        #[serde(default)]
        height: Option<f32>,
    },

    /// Append a new inline image to the block at `index`. The source
    /// path must exist; binary embedding is left to the container layer,
    /// the drawing records the source reference.
    InsertImage {
        /// Block index
        index: usize,
        /// Source image path
        path: String,
        /// Display width in centimeters
        #[serde(default)]
        width: Option<f32>,
        /// Display height in centimeters
        #[serde(default)]
        height: Option<f32>,
    },

    /// Set the document-level flag that makes a conforming viewer refresh
    /// all computed fields on open. References no index.
    UpdateFieldsOnOpen,
}

impl Operation {
    /// The operation kind.
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Delete { .. } => OpKind::Delete,
            Operation::Insert { .. } => OpKind::Insert,
            Operation::UpdateStyle { .. } => OpKind::UpdateStyle,
            Operation::ReplaceText { .. } => OpKind::ReplaceText,
            Operation::ReplaceTextGlobal { .. } => OpKind::ReplaceTextGlobal,
            Operation::CleanXml { .. } => OpKind::CleanXml,
            Operation::SetText { .. } => OpKind::SetText,
            Operation::UpdateTableCell { .. } => OpKind::UpdateTableCell,
            Operation::ReplaceTableCell { .. } => OpKind::ReplaceTableCell,
            Operation::UpdateTableRow { .. } => OpKind::UpdateTableRow,
            Operation::UpdateTableCol { .. } => OpKind::UpdateTableCol,
            Operation::DeleteImage { .. } => OpKind::DeleteImage,
            Operation::ResizeImage { .. } => OpKind::ResizeImage,
            Operation::InsertImage { .. } => OpKind::InsertImage,
            Operation::UpdateFieldsOnOpen => OpKind::UpdateFieldsOnOpen,
        }
    }

    /// Whether this operation changes the entity count on its track.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Operation::Delete { .. }
                | Operation::Insert { .. }
                | Operation::DeleteImage { .. }
                | Operation::InsertImage { .. }
        )
    }

    /// The track whose entity count a structural operation changes.
    /// `None` for non-structural operations.
    pub fn structural_track(&self) -> Option<Track> {
        match self {
            Operation::Delete { .. } | Operation::Insert { .. } => Some(Track::Blocks),
            Operation::DeleteImage { .. } | Operation::InsertImage { .. } => Some(Track::Images),
            _ => None,
        }
    }

    /// The index submitted with the operation, in whatever index space
    /// the operation uses. `None` for global operations.
    pub fn target_index(&self) -> Option<usize> {
        match self {
            Operation::Delete { index, .. }
            | Operation::Insert { index, .. }
            | Operation::UpdateStyle { index, .. }
            | Operation::ReplaceText { index, .. }
            | Operation::CleanXml { index, .. }
            | Operation::SetText { index, .. }
            | Operation::InsertImage { index, .. } => Some(*index),
            Operation::UpdateTableCell { table_index, .. }
            | Operation::ReplaceTableCell { table_index, .. }
            | Operation::UpdateTableRow { table_index, .. }
            | Operation::UpdateTableCol { table_index, .. } => Some(*table_index),
            Operation::DeleteImage { image_index } | Operation::ResizeImage { image_index, .. } => {
                Some(*image_index)
            }
            Operation::ReplaceTextGlobal { .. } | Operation::UpdateFieldsOnOpen => None,
        }
    }

    /// Parse a raw operation record.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let map = value.as_object().ok_or(ValidationError::MalformedRecord)?;
        let op = require_str(map, "record", "op")?;

        match op.as_str() {
            "delete" => Ok(Operation::Delete {
                index: require_usize(map, &op, "index")?,
                force: opt_bool(map, "force")?.unwrap_or(false),
            }),
            "insert" => Ok(Operation::Insert {
                index: require_usize(map, &op, "index")?,
                text: require_str(map, &op, "text")?,
                position: opt_position(map)?,
                style: opt_str(map, "style")?,
            }),
            "update_style" => Ok(Operation::UpdateStyle {
                index: require_usize(map, &op, "index")?,
                style: parse_style_spec(map)?,
            }),
            "replace_text" => Ok(Operation::ReplaceText {
                index: require_usize(map, &op, "index")?,
                pattern: require_str(map, &op, "pattern")?,
                replacement: opt_str(map, "replacement")?.unwrap_or_default(),
                regex: opt_bool(map, "regex")?.unwrap_or(false),
            }),
            "replace_text_global" => Ok(Operation::ReplaceTextGlobal {
                pattern: require_str(map, &op, "pattern")?,
                replacement: opt_str(map, "replacement")?.unwrap_or_default(),
                regex: opt_bool(map, "regex")?.unwrap_or(false),
            }),
            "clean_xml" => Ok(Operation::CleanXml {
                index: require_usize(map, &op, "index")?,
                remove: require_texts(map, &op, "remove")?,
                style: opt_str(map, "style")?,
                indent: parse_indent(map)?,
            }),
            "set_text" => Ok(Operation::SetText {
                index: require_usize(map, &op, "index")?,
                text: require_str(map, &op, "text")?,
            }),
            "update_table_cell" => Ok(Operation::UpdateTableCell {
                table_index: require_usize(map, &op, "table_index")?,
                row: require_usize(map, &op, "row")?,
                col: require_usize(map, &op, "col")?,
                text: require_str(map, &op, "text")?,
            }),
            "replace_table_cell" => Ok(Operation::ReplaceTableCell {
                table_index: require_usize(map, &op, "table_index")?,
                row: require_usize(map, &op, "row")?,
                col: require_usize(map, &op, "col")?,
                pattern: require_str(map, &op, "pattern")?,
                replacement: opt_str(map, "replacement")?.unwrap_or_default(),
                regex: opt_bool(map, "regex")?.unwrap_or(false),
            }),
            "update_table_row" => Ok(Operation::UpdateTableRow {
                table_index: require_usize(map, &op, "table_index")?,
                row: require_usize(map, &op, "row")?,
                texts: require_texts(map, &op, "texts")?,
            }),
            "update_table_col" => Ok(Operation::UpdateTableCol {
                table_index: require_usize(map, &op, "table_index")?,
                col: require_usize(map, &op, "col")?,
                texts: require_texts(map, &op, "texts")?,
            }),
            "delete_image" => Ok(Operation::DeleteImage {
                image_index: require_usize(map, &op, "image_index")?,
            }),
            "resize_image" => Ok(Operation::ResizeImage {
                image_index: require_usize(map, &op, "image_index")?,
                width: opt_f32(map, "width")?,
                height: opt_f32(map, "height")?,
            }),
            "insert_image" => Ok(Operation::InsertImage {
                index: require_usize(map, &op, "index")?,
                path: require_str(map, &op, "path")?,
                width: opt_f32(map, "width")?,
                height: opt_f32(map, "height")?,
            }),
            "update_fields_on_open" => Ok(Operation::UpdateFieldsOnOpen),
            _ => Err(ValidationError::UnknownOperation { op }),
        }
    }
}

/// Operation kinds, used for outcome reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// `delete`
    Delete,
    /// `insert`
    Insert,
    /// `update_style`
    UpdateStyle,
    /// `replace_text`
    ReplaceText,
    /// `replace_text_global`
    ReplaceTextGlobal,
    /// `clean_xml`
    CleanXml,
    /// `set_text`
    SetText,
    /// `update_table_cell`
    UpdateTableCell,
    /// `replace_table_cell`
    ReplaceTableCell,
    /// `update_table_row`
    UpdateTableRow,
    /// `update_table_col`
    UpdateTableCol,
    /// `delete_image`
    DeleteImage,
    /// `resize_image`
    ResizeImage,
    /// `insert_image`
    InsertImage,
    /// `update_fields_on_open`
    UpdateFieldsOnOpen,
}

impl OpKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Delete => "delete",
            OpKind::Insert => "insert",
            OpKind::UpdateStyle => "update_style",
            OpKind::ReplaceText => "replace_text",
            OpKind::ReplaceTextGlobal => "replace_text_global",
            OpKind::CleanXml => "clean_xml",
            OpKind::SetText => "set_text",
            OpKind::UpdateTableCell => "update_table_cell",
            OpKind::ReplaceTableCell => "replace_table_cell",
            OpKind::UpdateTableRow => "update_table_row",
            OpKind::UpdateTableCol => "update_table_col",
            OpKind::DeleteImage => "delete_image",
            OpKind::ResizeImage => "resize_image",
            OpKind::InsertImage => "insert_image",
            OpKind::UpdateFieldsOnOpen => "update_fields_on_open",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of an inserted block relative to its reference block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Before the reference block
    Before,
    /// After the reference block (default)
    #[default]
    After,
}

/// Validate a batch before any mutation runs.
///
/// Fail-fast and whole-batch: the first problem rejects the entire batch
/// with zero side effects. Checks that need the document (regex
/// compilation aside) are the row/column length matches; plain index
/// bounds are execution-time concerns handled per operation.
pub fn validate(ops: &[Operation], doc: &Document) -> Result<(), ValidationError> {
    for op in ops {
        match op {
            Operation::ReplaceText { pattern, regex, .. }
            | Operation::ReplaceTextGlobal { pattern, regex, .. }
            | Operation::ReplaceTableCell { pattern, regex, .. } => {
                if *regex {
                    check_pattern(pattern)?;
                }
            }
            Operation::ResizeImage { width, height, .. } => {
                if width.is_none() && height.is_none() {
                    return Err(ValidationError::BadValue {
                        field: "width".to_string(),
                        message: "resize_image requires width or height".to_string(),
                    });
                }
            }
            Operation::CleanXml { remove, .. } => {
                if remove.is_empty() {
                    return Err(ValidationError::BadValue {
                        field: "remove".to_string(),
                        message: "no properties named for removal".to_string(),
                    });
                }
            }
            Operation::UpdateTableRow {
                table_index, texts, ..
            } => {
                if let Some(table) = doc.table(*table_index) {
                    let expected = table.column_count();
                    if texts.len() != expected {
                        return Err(ValidationError::LengthMismatch {
                            expected,
                            got: texts.len(),
                        });
                    }
                }
            }
            Operation::UpdateTableCol {
                table_index, texts, ..
            } => {
                if let Some(table) = doc.table(*table_index) {
                    let expected = table.row_count();
                    if texts.len() != expected {
                        return Err(ValidationError::LengthMismatch {
                            expected,
                            got: texts.len(),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_pattern(pattern: &str) -> Result<(), ValidationError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ValidationError::BadValue {
            field: "pattern".to_string(),
            message: e.to_string(),
        })
}

// ---- record field helpers ----

fn require<'a>(
    map: &'a Map<String, Value>,
    op: &str,
    field: &str,
) -> Result<&'a Value, ValidationError> {
    map.get(field).ok_or_else(|| ValidationError::MissingField {
        op: op.to_string(),
        field: field.to_string(),
    })
}

fn require_str(map: &Map<String, Value>, op: &str, field: &str) -> Result<String, ValidationError> {
    require(map, op, field)?
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| type_mismatch(field, "string"))
}

fn require_usize(map: &Map<String, Value>, op: &str, field: &str) -> Result<usize, ValidationError> {
    require(map, op, field)?
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| type_mismatch(field, "non-negative integer"))
}

fn require_texts(
    map: &Map<String, Value>,
    op: &str,
    field: &str,
) -> Result<Vec<String>, ValidationError> {
    let items = require(map, op, field)?
        .as_array()
        .ok_or_else(|| type_mismatch(field, "array of strings"))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| type_mismatch(field, "array of strings"))
        })
        .collect()
}

fn opt_str(map: &Map<String, Value>, field: &str) -> Result<Option<String>, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| type_mismatch(field, "string")),
    }
}

fn opt_bool(map: &Map<String, Value>, field: &str) -> Result<Option<bool>, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| type_mismatch(field, "boolean")),
    }
}

fn opt_f32(map: &Map<String, Value>, field: &str) -> Result<Option<f32>, ValidationError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(|n| Some(n as f32))
            .ok_or_else(|| type_mismatch(field, "number")),
    }
}

fn opt_position(map: &Map<String, Value>) -> Result<Position, ValidationError> {
    match opt_str(map, "position")? {
        None => Ok(Position::default()),
        Some(s) => match s.as_str() {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(ValidationError::BadValue {
                field: "position".to_string(),
                message: format!("expected 'before' or 'after', got '{}'", other),
            }),
        },
    }
}

fn parse_alignment(map: &Map<String, Value>) -> Result<Option<Alignment>, ValidationError> {
    match opt_str(map, "alignment")? {
        None => Ok(None),
        Some(s) => Alignment::parse(&s)
            .map(Some)
            .ok_or_else(|| ValidationError::BadValue {
                field: "alignment".to_string(),
                message: format!("unrecognized alignment '{}'", s),
            }),
    }
}

fn parse_indent(map: &Map<String, Value>) -> Result<Option<IndentSpec>, ValidationError> {
    let Some(value) = map.get("indent") else {
        return Ok(None);
    };
    let obj = value
        .as_object()
        .ok_or_else(|| type_mismatch("indent", "object"))?;
    Ok(Some(IndentSpec {
        first_line: opt_f32(obj, "first_line")?,
        left: opt_f32(obj, "left")?,
    }))
}

fn parse_style_spec(map: &Map<String, Value>) -> Result<StyleSpec, ValidationError> {
    let font = match map.get("font") {
        None => None,
        Some(value) => {
            let obj = value
                .as_object()
                .ok_or_else(|| type_mismatch("font", "object"))?;
            Some(FontSpec {
                name: opt_str(obj, "name")?,
                size: opt_f32(obj, "size")?,
                bold: opt_bool(obj, "bold")?,
                italic: opt_bool(obj, "italic")?,
            })
        }
    };

    let spacing = match map.get("spacing") {
        None => None,
        Some(value) => {
            let obj = value
                .as_object()
                .ok_or_else(|| type_mismatch("spacing", "object"))?;
            Some(SpacingSpec {
                before: opt_f32(obj, "before")?,
                after: opt_f32(obj, "after")?,
                line: opt_f32(obj, "line")?,
            })
        }
    };

    Ok(StyleSpec {
        name: opt_str(map, "style")?,
        font,
        alignment: parse_alignment(map)?,
        indent: parse_indent(map)?,
        spacing,
    })
}

fn type_mismatch(field: &str, expected: &str) -> ValidationError {
    ValidationError::TypeMismatch {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}
