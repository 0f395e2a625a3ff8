//! Derived image entities.
//!
//! Images are not stored on their own track. Each drawing fragment
//! encountered while scanning blocks in document order yields one image
//! entity, and its ordinal is that scan position. The scan runs on every
//! query so image ordinals always reflect the current graph.

use serde::{Deserialize, Serialize};

use super::{Document, Fragment};

/// A derived image entity: one inline drawing, located by its owning
/// block and fragment position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Ordinal on the images track (document scan order)
    pub image_index: usize,

    /// Index of the owning block
    pub block_index: usize,

    /// Position of the drawing fragment within the owning block
    pub fragment_index: usize,

    /// Display width in centimeters, if recorded
    pub width: Option<f32>,

    /// Display height in centimeters, if recorded
    pub height: Option<f32>,
}

impl Document {
    /// Scan all blocks in document order and return the derived image
    /// entities. Recomputed on every call; never cached across mutations.
    pub fn images(&self) -> Vec<ImageRef> {
        let mut images = Vec::new();
        for (block_index, block) in self.blocks.iter().enumerate() {
            for (fragment_index, fragment) in block.content.iter().enumerate() {
                if let Fragment::Drawing(drawing) = fragment {
                    images.push(ImageRef {
                        image_index: images.len(),
                        block_index,
                        fragment_index,
                        width: drawing.width,
                        height: drawing.height,
                    });
                }
            }
        }
        images
    }

    /// Get the derived image at `image_index`, if it exists.
    pub fn image(&self, image_index: usize) -> Option<ImageRef> {
        self.images().into_iter().nth(image_index)
    }

    /// Number of images currently in the document.
    pub fn image_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|b| &b.content)
            .filter(|f| f.is_drawing())
            .count()
    }
}
