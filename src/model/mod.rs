//! Document model types.
//!
//! A typed tree of sections, paragraphs, runs, and tables, constructed once
//! per invocation by the I/O collaborator and mutated in place by fix passes.

mod document;
mod issue;
mod paragraph;
mod table;

pub use document::{Block, Document, Margins, PageGeometry, Section, PT_PER_CM};
pub use issue::{Issue, IssueKind, Location, Severity};
pub use paragraph::{
    Alignment, HeadingRole, MarkerStyle, Numbering, Paragraph, Run, Style, StyleOverrides,
};
pub use table::{Table, TableCell, TableRow};
