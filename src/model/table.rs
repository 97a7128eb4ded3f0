//! Table types.

use super::Paragraph;
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Number of header rows (0 = no header)
    pub header_rows: u8,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            header_rows: 0,
        }
    }

    /// Create a table with header rows.
    pub fn with_header(header_rows: u8) -> Self {
        Self {
            header_rows,
            ..Self::new()
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check whether a row index is within the header.
    pub fn is_header_row(&self, row_index: usize) -> bool {
        row_index < self.header_rows as usize
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Get plain text of the row, tab-separated.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.plain_text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell owning nested paragraphs and its geometry.
///
/// `None` dimensions are engine-computed; `Some` values are explicit
/// user-set dimensions and are preserved unless the content overflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Paragraphs inside the cell (at least one, by model invariant)
    pub paragraphs: Vec<Paragraph>,

    /// Explicit cell width in points, if user-set
    pub width_pt: Option<f32>,

    /// Explicit cell height in points, if user-set
    pub height_pt: Option<f32>,
}

impl TableCell {
    /// Create a cell with automatic dimensions.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            width_pt: None,
            height_pt: None,
        }
    }

    /// Create a cell with an explicit width.
    pub fn with_width(paragraphs: Vec<Paragraph>, width_pt: f32) -> Self {
        Self {
            paragraphs,
            width_pt: Some(width_pt),
            height_pt: None,
        }
    }

    /// Get plain text of the cell.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Run, Style};

    fn cell(text: &str) -> TableCell {
        TableCell::new(vec![Paragraph::with_text(Style::default(), text)])
    }

    #[test]
    fn test_table_counts() {
        let mut table = Table::with_header(1);
        table.add_row(TableRow::new(vec![cell("名称"), cell("数量")]));
        table.add_row(TableRow::new(vec![cell("甲"), cell("3")]));

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert!(table.is_header_row(0));
        assert!(!table.is_header_row(1));
    }

    #[test]
    fn test_cell_plain_text() {
        let mut p = Paragraph::new(Style::default());
        p.add_run(Run::new("第一行"));
        let c = TableCell::new(vec![p, Paragraph::with_text(Style::default(), "第二行")]);
        assert_eq!(c.plain_text(), "第一行\n第二行");
    }
}
