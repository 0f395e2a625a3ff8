//! Mutation executors: one routine per operation kind.
//!
//! Each executor touches only its targeted entity (or, for the global
//! replace, all blocks), and returns success detail or a typed failure.
//! Bounds are checked here, at the moment the index is used; the
//! planner's ordering guarantees that every submitted index is still
//! valid against the current graph when its operation runs.

use regex::Regex;
use std::path::Path;

use super::op::{Operation, Position};
use super::outcome::Applied;
use super::style::{IndentSpec, StyleSpec};
use crate::error::ExecError;
use crate::model::{Block, Document, Drawing, Fragment, Track};

type ExecResult = Result<Applied, ExecError>;

/// Execute a single planned operation against the document graph.
pub(crate) fn execute(doc: &mut Document, op: &Operation) -> ExecResult {
    match op {
        Operation::Delete { index, force } => delete(doc, *index, *force),
        Operation::Insert {
            index,
            text,
            position,
            style,
        } => insert(doc, *index, text, *position, style.as_deref()),
        Operation::UpdateStyle { index, style } => update_style(doc, *index, style),
        Operation::ReplaceText {
            index,
            pattern,
            replacement,
            regex,
        } => replace_text(doc, *index, pattern, replacement, *regex),
        Operation::ReplaceTextGlobal {
            pattern,
            replacement,
            regex,
        } => replace_text_global(doc, pattern, replacement, *regex),
        Operation::CleanXml {
            index,
            remove,
            style,
            indent,
        } => clean_xml(doc, *index, remove, style.as_deref(), indent.as_ref()),
        Operation::SetText { index, text } => set_text(doc, *index, text),
        Operation::UpdateTableCell {
            table_index,
            row,
            col,
            text,
        } => update_table_cell(doc, *table_index, *row, *col, text),
        Operation::ReplaceTableCell {
            table_index,
            row,
            col,
            pattern,
            replacement,
            regex,
        } => replace_table_cell(doc, *table_index, *row, *col, pattern, replacement, *regex),
        Operation::UpdateTableRow {
            table_index,
            row,
            texts,
        } => update_table_row(doc, *table_index, *row, texts),
        Operation::UpdateTableCol {
            table_index,
            col,
            texts,
        } => update_table_col(doc, *table_index, *col, texts),
        Operation::DeleteImage { image_index } => delete_image(doc, *image_index),
        Operation::ResizeImage {
            image_index,
            width,
            height,
        } => resize_image(doc, *image_index, *width, *height),
        Operation::InsertImage {
            index,
            path,
            width,
            height,
        } => insert_image(doc, *index, path, *width, *height),
        Operation::UpdateFieldsOnOpen => {
            doc.update_fields_on_open = true;
            Ok(Applied::ok())
        }
    }
}

fn block_bounds(doc: &Document, index: usize) -> Result<(), ExecError> {
    let count = doc.block_count();
    if index < count {
        Ok(())
    } else {
        Err(ExecError::OutOfRange {
            track: Track::Blocks,
            index,
            count,
        })
    }
}

fn delete(doc: &mut Document, index: usize, force: bool) -> ExecResult {
    block_bounds(doc, index)?;
    if !force && doc.blocks[index].has_embedded() {
        return Err(ExecError::Protected { index });
    }
    doc.blocks.remove(index);
    Ok(Applied::ok())
}

fn insert(
    doc: &mut Document,
    index: usize,
    text: &str,
    position: Position,
    style: Option<&str>,
) -> ExecResult {
    block_bounds(doc, index)?;
    let mut block = Block::with_text(text);
    if let Some(name) = style {
        block.style.name = Some(name.to_string());
    }
    let new_index = match position {
        Position::Before => index,
        Position::After => index + 1,
    };
    doc.blocks.insert(new_index, block);
    Ok(Applied::at(new_index))
}

fn update_style(doc: &mut Document, index: usize, style: &StyleSpec) -> ExecResult {
    block_bounds(doc, index)?;
    style.apply(&mut doc.blocks[index]);
    Ok(Applied::ok())
}

fn substitute(
    text: &str,
    pattern: &str,
    replacement: &str,
    regex: bool,
) -> Result<String, ExecError> {
    if regex {
        let re = Regex::new(pattern).map_err(|_| ExecError::InvalidPattern {
            pattern: pattern.to_string(),
        })?;
        Ok(re.replace_all(text, replacement).into_owned())
    } else {
        Ok(text.replace(pattern, replacement))
    }
}

fn replace_text(
    doc: &mut Document,
    index: usize,
    pattern: &str,
    replacement: &str,
    regex: bool,
) -> ExecResult {
    block_bounds(doc, index)?;
    let block = &mut doc.blocks[index];
    let original = block.text();
    let rewritten = substitute(&original, pattern, replacement, regex)?;
    if rewritten != original {
        block.set_visible_text(rewritten);
        Ok(Applied::changed(true))
    } else {
        Ok(Applied::changed(false))
    }
}

fn replace_text_global(
    doc: &mut Document,
    pattern: &str,
    replacement: &str,
    regex: bool,
) -> ExecResult {
    let mut count = 0;
    for block in &mut doc.blocks {
        let original = block.text();
        let rewritten = substitute(&original, pattern, replacement, regex)?;
        if rewritten != original {
            block.set_visible_text(rewritten);
            count += 1;
        }
    }
    Ok(Applied::replaced(count))
}

fn clean_xml(
    doc: &mut Document,
    index: usize,
    remove: &[String],
    style: Option<&str>,
    indent: Option<&IndentSpec>,
) -> ExecResult {
    block_bounds(doc, index)?;
    let block = &mut doc.blocks[index];
    block.flags.retain(|flag| !remove.contains(flag));
    if let Some(name) = style {
        block.style.name = Some(name.to_string());
    }
    if let Some(indent) = indent {
        indent.apply(block);
    }
    Ok(Applied::ok())
}

fn set_text(doc: &mut Document, index: usize, text: &str) -> ExecResult {
    block_bounds(doc, index)?;
    // Documented collapse: the whole fragment list is replaced, dropping
    // per-fragment formatting and any embedded payloads in this block.
    doc.blocks[index].content = vec![Fragment::text(text)];
    Ok(Applied::ok())
}

fn table_cell_bounds(
    doc: &Document,
    table_index: usize,
    row: usize,
    col: usize,
) -> Result<(), ExecError> {
    let count = doc.table_count();
    let table = doc.table(table_index).ok_or(ExecError::OutOfRange {
        track: Track::Tables,
        index: table_index,
        count,
    })?;
    if row >= table.row_count() {
        return Err(ExecError::RowOutOfRange {
            row,
            count: table.row_count(),
        });
    }
    if col >= table.column_count() {
        return Err(ExecError::ColOutOfRange {
            col,
            count: table.column_count(),
        });
    }
    Ok(())
}

fn update_table_cell(
    doc: &mut Document,
    table_index: usize,
    row: usize,
    col: usize,
    text: &str,
) -> ExecResult {
    table_cell_bounds(doc, table_index, row, col)?;
    if let Some(cell) = doc.tables[table_index].cell_mut(row, col) {
        cell.text = text.to_string();
    }
    Ok(Applied::ok())
}

fn replace_table_cell(
    doc: &mut Document,
    table_index: usize,
    row: usize,
    col: usize,
    pattern: &str,
    replacement: &str,
    regex: bool,
) -> ExecResult {
    table_cell_bounds(doc, table_index, row, col)?;
    let Some(cell) = doc.tables[table_index].cell_mut(row, col) else {
        return Ok(Applied::changed(false));
    };
    let rewritten = substitute(&cell.text, pattern, replacement, regex)?;
    if rewritten != cell.text {
        cell.text = rewritten;
        Ok(Applied::changed(true))
    } else {
        Ok(Applied::changed(false))
    }
}

fn update_table_row(
    doc: &mut Document,
    table_index: usize,
    row: usize,
    texts: &[String],
) -> ExecResult {
    let count = doc.table_count();
    let table = doc.table_mut(table_index).ok_or(ExecError::OutOfRange {
        track: Track::Tables,
        index: table_index,
        count,
    })?;
    let row_count = table.row_count();
    let cells = &mut table
        .rows
        .get_mut(row)
        .ok_or(ExecError::RowOutOfRange {
            row,
            count: row_count,
        })?
        .cells;
    for (cell, text) in cells.iter_mut().zip(texts) {
        cell.text = text.clone();
    }
    Ok(Applied::ok())
}

fn update_table_col(
    doc: &mut Document,
    table_index: usize,
    col: usize,
    texts: &[String],
) -> ExecResult {
    let count = doc.table_count();
    let table = doc.table_mut(table_index).ok_or(ExecError::OutOfRange {
        track: Track::Tables,
        index: table_index,
        count,
    })?;
    if col >= table.column_count() {
        return Err(ExecError::ColOutOfRange {
            col,
            count: table.column_count(),
        });
    }
    for (row, text) in table.rows.iter_mut().zip(texts) {
        if let Some(cell) = row.cells.get_mut(col) {
            cell.text = text.clone();
        }
    }
    Ok(Applied::ok())
}

fn locate_image(doc: &Document, image_index: usize) -> Result<(usize, usize), ExecError> {
    match doc.image(image_index) {
        Some(image) => Ok((image.block_index, image.fragment_index)),
        None => Err(ExecError::OutOfRange {
            track: Track::Images,
            index: image_index,
            count: doc.image_count(),
        }),
    }
}

fn delete_image(doc: &mut Document, image_index: usize) -> ExecResult {
    let (block_index, fragment_index) = locate_image(doc, image_index)?;
    doc.blocks[block_index].content.remove(fragment_index);
    Ok(Applied::ok())
}

fn resize_image(
    doc: &mut Document,
    image_index: usize,
    width: Option<f32>,
    height: Option<f32>,
) -> ExecResult {
    let (block_index, fragment_index) = locate_image(doc, image_index)?;
    let Fragment::Drawing(drawing) = &mut doc.blocks[block_index].content[fragment_index] else {
        // locate_image only ever resolves to a drawing fragment
        return Err(ExecError::OutOfRange {
            track: Track::Images,
            index: image_index,
            count: 0,
        });
    };

    match (width, height) {
        (Some(w), Some(h)) => {
            // Both supplied: aspect preservation is overridden.
            drawing.width = Some(w);
            drawing.height = Some(h);
        }
        (Some(w), None) => {
            if let (Some(w0), Some(h0)) = (drawing.width, drawing.height) {
                if w0 > 0.0 {
                    drawing.height = Some(w * h0 / w0);
                }
            }
            drawing.width = Some(w);
        }
        (None, Some(h)) => {
            if let (Some(w0), Some(h0)) = (drawing.width, drawing.height) {
                if h0 > 0.0 {
                    drawing.width = Some(h * w0 / h0);
                }
            }
            drawing.height = Some(h);
        }
        // Rejected by validation.
        (None, None) => {}
    }
    Ok(Applied::ok())
}

fn insert_image(
    doc: &mut Document,
    index: usize,
    path: &str,
    width: Option<f32>,
    height: Option<f32>,
) -> ExecResult {
    block_bounds(doc, index)?;
    if !Path::new(path).exists() {
        return Err(ExecError::ImageFileNotFound {
            path: path.to_string(),
        });
    }
    doc.blocks[index].content.push(Fragment::Drawing(Drawing {
        width,
        height,
        source: Some(path.to_string()),
        alt_text: None,
    }));
    Ok(Applied::ok())
}
