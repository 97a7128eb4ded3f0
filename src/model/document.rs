//! Document and section-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// Points per centimeter, for page-geometry conversions.
pub const PT_PER_CM: f32 = 28.346_457;

/// An in-memory word-processing document.
///
/// The model is constructed once per invocation by the I/O collaborator,
/// mutated in place by a fix pass, and handed back for persistence. The
/// engine never reads or writes files itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Sections in document order
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Add a section to the document.
    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Check if the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of blocks across all sections.
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(|s| s.blocks.len()).sum()
    }

    /// Plain text of the entire document, one line per paragraph.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for section in &self.sections {
            for block in &section.blocks {
                match block {
                    Block::Paragraph(p) => lines.push(p.plain_text()),
                    Block::Table(t) => lines.push(t.plain_text()),
                }
            }
        }
        lines.join("\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A section: a run of blocks sharing one page geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Page geometry for this section
    pub geometry: PageGeometry,

    /// Blocks in reading order
    pub blocks: Vec<Block>,
}

impl Section {
    /// Create an empty section with the given geometry.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            blocks: Vec::new(),
        }
    }

    /// Add a paragraph block.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Add a table block.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Usable text width between the margins, in points.
    pub fn text_width_pt(&self) -> f32 {
        let g = &self.geometry;
        ((g.page_width_cm - g.margins.left_cm - g.margins.right_cm) * PT_PER_CM).max(0.0)
    }
}

/// A block-level element within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A text paragraph
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Block {
    /// View this block as a paragraph, if it is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Mutable paragraph view.
    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }
}

/// Page geometry owned by a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in centimeters
    pub page_width_cm: f32,

    /// Page height in centimeters
    pub page_height_cm: f32,

    /// Page margins
    pub margins: Margins,

    /// Page background color (hex format, e.g. "#FFFFFF")
    pub background: String,
}

impl PageGeometry {
    /// A4 portrait with the given margins and a white background.
    pub fn a4(margins: Margins) -> Self {
        Self {
            page_width_cm: 21.0,
            page_height_cm: 29.7,
            margins,
            background: "#FFFFFF".to_string(),
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4(Margins::default())
    }
}

/// Page margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top_cm: f32,
    /// Bottom margin
    pub bottom_cm: f32,
    /// Left margin
    pub left_cm: f32,
    /// Right margin
    pub right_cm: f32,
}

impl Margins {
    /// Create margins from the four sides.
    pub fn new(top_cm: f32, bottom_cm: f32, left_cm: f32, right_cm: f32) -> Self {
        Self {
            top_cm,
            bottom_cm,
            left_cm,
            right_cm,
        }
    }

    /// Sides as (name, value) pairs, for diagnostics.
    pub fn sides(&self) -> [(&'static str, f32); 4] {
        [
            ("top", self.top_cm),
            ("bottom", self.bottom_cm),
            ("left", self.left_cm),
            ("right", self.right_cm),
        ]
    }
}

impl Default for Margins {
    fn default() -> Self {
        // Standard official-document page setup.
        Self::new(3.46, 3.26, 2.8, 2.6)
    }
}
