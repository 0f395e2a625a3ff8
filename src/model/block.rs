//! Block and fragment-level types.

use serde::{Deserialize, Serialize};

/// An ordered unit of text content (paragraph-equivalent), the basic
/// addressable element on the blocks track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Content fragments (runs) in document order
    pub content: Vec<Fragment>,

    /// Paragraph-level formatting
    pub style: BlockStyle,

    /// Named structural properties carried by the block (e.g. `"numPr"`
    /// for automatic numbering). Target of the `clean_xml` operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

impl Block {
    /// Create a new empty block.
    pub fn new() -> Self {
        Self {
            content: Vec::new(),
            style: BlockStyle::default(),
            flags: Vec::new(),
        }
    }

    /// Create a block with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut block = Self::new();
        block.add_text(text);
        block
    }

    /// Create a heading block.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        let mut block = Self::with_text(text);
        block.style.heading_level = Some(level.clamp(1, 9));
        block
    }

    /// Add plain text to the block.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.content.push(Fragment::Text(TextRun::new(text)));
    }

    /// Add a styled text run.
    pub fn add_run(&mut self, run: TextRun) {
        self.content.push(Fragment::Text(run));
    }

    /// Add an arbitrary fragment.
    pub fn add_fragment(&mut self, fragment: Fragment) {
        self.content.push(fragment);
    }

    /// Concatenated visible text of the block. Non-text fragments
    /// contribute nothing, which is exactly why emptiness alone must not
    /// be used to decide whether a block is safe to delete.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|f| match f {
                Fragment::Text(run) => Some(run.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the visible text is blank. The block may still carry
    /// embedded non-text content.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }

    /// Whether at least one fragment carries a non-text payload
    /// (drawing, break, embedded object).
    pub fn has_embedded(&self) -> bool {
        self.content.iter().any(Fragment::is_non_text)
    }

    /// Whether the block is truly empty: no visible text and no embedded
    /// payload. Only truly empty or text-only blocks may be removed by an
    /// unforced delete.
    pub fn is_truly_empty(&self) -> bool {
        self.is_empty() && !self.has_embedded()
    }

    /// Heading level, either stored on the style or derived from a
    /// `Heading N` style name.
    pub fn heading_level(&self) -> Option<u8> {
        if self.style.heading_level.is_some() {
            return self.style.heading_level;
        }
        let name = self.style.name.as_deref()?;
        let rest = name.strip_prefix("Heading ")?;
        rest.parse::<u8>().ok().filter(|l| (1..=9).contains(l))
    }

    /// Whether this block is a heading.
    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// Rewrite the block's visible text.
    ///
    /// Text fragments collapse into the first one, which keeps its run
    /// style; the remaining text fragments are dropped. Non-text
    /// fragments are preserved in place, so embedded content survives a
    /// text rewrite. Finer-grained run formatting within the old text is
    /// lost.
    pub fn set_visible_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        let mut first = true;
        self.content.retain_mut(|f| match f {
            Fragment::Text(run) => {
                if first {
                    first = false;
                    run.text = text.clone();
                    true
                } else {
                    false
                }
            }
            _ => true,
        });
        if first {
            self.add_text(text);
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

/// A content fragment within a block: either visible text or a non-text
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    /// A run of visible text
    Text(TextRun),

    /// A page or section break
    Break {
        /// Break kind
        kind: BreakKind,
    },

    /// An embedded drawing (inline image)
    Drawing(Drawing),

    /// An embedded object reference (OLE object, chart, formula)
    Object {
        /// Object name or kind hint
        name: String,
    },
}

impl Fragment {
    /// Create a text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(TextRun::new(text))
    }

    /// Check if this fragment carries visible text.
    pub fn is_text(&self) -> bool {
        matches!(self, Fragment::Text(_))
    }

    /// Check if this fragment carries a non-text payload.
    pub fn is_non_text(&self) -> bool {
        !self.is_text()
    }

    /// Check if this fragment is a drawing.
    pub fn is_drawing(&self) -> bool {
        matches!(self, Fragment::Drawing(_))
    }
}

/// Kind of break carried by a break fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    /// Page break
    Page,
    /// Section break
    Section,
}

/// A run of text with consistent styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Run styling
    #[serde(default)]
    pub style: RunStyle,
}

impl TextRun {
    /// Create a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Create a bold text run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle {
                bold: Some(true),
                ..Default::default()
            },
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Run styling. All fields are tri-state: `None` means "not set here",
/// inherited from the style record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold text
    pub bold: Option<bool>,

    /// Italic text
    pub italic: Option<bool>,

    /// Font name
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: Option<f32>,
}

/// An embedded drawing. Dimensions are in centimeters; `None` means the
/// intrinsic size is not recorded in the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Drawing {
    /// Display width in centimeters
    pub width: Option<f32>,

    /// Display height in centimeters
    pub height: Option<f32>,

    /// Source path or resource reference
    pub source: Option<String>,

    /// Alternative text
    pub alt_text: Option<String>,
}

impl Drawing {
    /// Create a drawing with known dimensions.
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}

/// Paragraph-level formatting. `None` fields fall back to the named style
/// record; present fields override it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Named style record (e.g. "Normal", "Heading 1")
    pub name: Option<String>,

    /// Heading level (1-9) or None for body text
    pub heading_level: Option<u8>,

    /// Text alignment
    pub alignment: Option<Alignment>,

    /// First-line indent in centimeters
    pub first_line_indent: Option<f32>,

    /// Left indent in centimeters
    pub left_indent: Option<f32>,

    /// Space before the block in centimeters
    pub space_before: Option<f32>,

    /// Space after the block in centimeters
    pub space_after: Option<f32>,

    /// Line spacing as a multiplier of the single-line height
    /// (1.5 = one-and-a-half lines). Never an absolute length.
    pub line_spacing: Option<f32>,
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Parse an alignment name. Returns `None` for unrecognized values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }

    /// Name of this alignment as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_text_concatenation() {
        let mut block = Block::new();
        block.add_text("Hello ");
        block.add_run(TextRun::bold("world"));
        block.add_text("!");

        assert_eq!(block.text(), "Hello world!");
        assert!(!block.is_empty());
    }

    #[test]
    fn test_classification_text_only() {
        let block = Block::with_text("some text");
        assert!(!block.is_empty());
        assert!(!block.has_embedded());
        assert!(!block.is_truly_empty());
    }

    #[test]
    fn test_classification_truly_empty() {
        let block = Block::new();
        assert!(block.is_empty());
        assert!(!block.has_embedded());
        assert!(block.is_truly_empty());
    }

    #[test]
    fn test_classification_hidden_drawing() {
        // A block whose only content is a drawing reads as text-empty but
        // must never classify as truly empty.
        let mut block = Block::new();
        block.add_fragment(Fragment::Drawing(Drawing::with_size(4.0, 3.0)));

        assert!(block.is_empty());
        assert!(block.has_embedded());
        assert!(!block.is_truly_empty());
    }

    #[test]
    fn test_classification_break_counts_as_embedded() {
        let mut block = Block::new();
        block.add_fragment(Fragment::Break {
            kind: BreakKind::Page,
        });
        assert!(block.has_embedded());
        assert!(!block.is_truly_empty());
    }

    #[test]
    fn test_set_visible_text_preserves_drawing() {
        let mut block = Block::new();
        block.add_run(TextRun::bold("old"));
        block.add_fragment(Fragment::Drawing(Drawing::with_size(1.0, 1.0)));
        block.add_text(" tail");

        block.set_visible_text("new");

        assert_eq!(block.text(), "new");
        assert!(block.has_embedded());
        assert_eq!(block.content.len(), 2);
        // First run's style survives the rewrite
        match &block.content[0] {
            Fragment::Text(run) => assert_eq!(run.style.bold, Some(true)),
            other => panic!("expected text fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_set_visible_text_on_empty_block() {
        let mut block = Block::new();
        block.set_visible_text("added");
        assert_eq!(block.text(), "added");
        assert_eq!(block.content.len(), 1);
    }

    #[test]
    fn test_heading_level_from_style_name() {
        let mut block = Block::with_text("Chapter");
        block.style.name = Some("Heading 2".to_string());
        assert_eq!(block.heading_level(), Some(2));
        assert!(block.is_heading());

        block.style.name = Some("Heading 10".to_string());
        assert_eq!(block.heading_level(), None);

        block.style.name = Some("Normal".to_string());
        assert_eq!(block.heading_level(), None);
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!(Alignment::parse("justify"), Some(Alignment::Justify));
        assert_eq!(Alignment::parse("middle"), None);
        assert_eq!(Alignment::Justify.to_string(), "justify");
    }
}
