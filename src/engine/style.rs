//! Style translation.
//!
//! Maps a partial, semantic style description onto a block's formatting.
//! Every section and sub-field is optional: absent keys leave existing
//! formatting untouched, present keys overwrite.

use serde::{Deserialize, Serialize};

use crate::model::{Alignment, Block, Fragment};

/// A partial style descriptor, as carried by `update_style` operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSpec {
    /// Named style record to assign (e.g. "Normal", "Heading 1").
    /// Carried as `style` in operation records.
    #[serde(rename = "style")]
    pub name: Option<String>,

    /// Font changes, applied uniformly to every text fragment
    pub font: Option<FontSpec>,

    /// Paragraph alignment
    pub alignment: Option<Alignment>,

    /// Indentation in centimeters
    pub indent: Option<IndentSpec>,

    /// Spacing around and inside the block
    pub spacing: Option<SpacingSpec>,
}

impl StyleSpec {
    /// Create an empty spec that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the named style record.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set font changes.
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    /// Set alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Set indentation.
    pub fn with_indent(mut self, indent: IndentSpec) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Set spacing.
    pub fn with_spacing(mut self, spacing: SpacingSpec) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Check whether the spec changes anything at all.
    pub fn is_noop(&self) -> bool {
        self.name.is_none()
            && self.font.is_none()
            && self.alignment.is_none()
            && self.indent.is_none()
            && self.spacing.is_none()
    }

    /// Apply the present sections to `block`, leaving absent ones alone.
    pub fn apply(&self, block: &mut Block) {
        if let Some(ref name) = self.name {
            block.style.name = Some(name.clone());
        }
        if let Some(alignment) = self.alignment {
            block.style.alignment = Some(alignment);
        }
        if let Some(ref indent) = self.indent {
            indent.apply(block);
        }
        if let Some(ref spacing) = self.spacing {
            if let Some(before) = spacing.before {
                block.style.space_before = Some(before);
            }
            if let Some(after) = spacing.after {
                block.style.space_after = Some(after);
            }
            if let Some(line) = spacing.line {
                block.style.line_spacing = Some(line);
            }
        }
        if let Some(ref font) = self.font {
            for fragment in &mut block.content {
                if let Fragment::Text(run) = fragment {
                    if let Some(ref name) = font.name {
                        run.style.font_name = Some(name.clone());
                    }
                    if let Some(size) = font.size {
                        run.style.font_size = Some(size);
                    }
                    if let Some(bold) = font.bold {
                        run.style.bold = Some(bold);
                    }
                    if let Some(italic) = font.italic {
                        run.style.italic = Some(italic);
                    }
                }
            }
        }
    }
}

/// Font changes. Tri-state fields: `None` leaves the run unchanged,
/// `Some` overwrites (including `Some(false)` to clear bold/italic).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Font name
    pub name: Option<String>,

    /// Font size in points
    pub size: Option<f32>,

    /// Bold
    pub bold: Option<bool>,

    /// Italic
    pub italic: Option<bool>,
}

/// Indentation changes, in centimeters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndentSpec {
    /// First-line indent
    pub first_line: Option<f32>,

    /// Left indent
    pub left: Option<f32>,
}

impl IndentSpec {
    /// Apply present sub-fields to `block`.
    pub fn apply(&self, block: &mut Block) {
        if let Some(first_line) = self.first_line {
            block.style.first_line_indent = Some(first_line);
        }
        if let Some(left) = self.left {
            block.style.left_indent = Some(left);
        }
    }
}

/// Spacing changes. `before` and `after` are centimeters, the same linear
/// unit as indents. `line` is a multiplier of the single-line height, not
/// a length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpacingSpec {
    /// Space before the block in centimeters
    pub before: Option<f32>,

    /// Space after the block in centimeters
    pub after: Option<f32>,

    /// Line spacing multiplier (1.5 = one-and-a-half line height)
    pub line: Option<f32>,
}
