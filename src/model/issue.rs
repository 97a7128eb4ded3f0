//! Diagnostic issue records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single finding reported by a rule module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Where in the document the finding applies
    pub location: Location,

    /// What kind of finding this is
    pub kind: IssueKind,

    /// How serious the finding is
    pub severity: Severity,

    /// Human-readable detail
    pub detail: String,

    /// Whether a fix pass can resolve this finding automatically
    pub fixable: bool,
}

impl Issue {
    /// Create a fixable warning — the common case.
    pub fn fixable(location: Location, kind: IssueKind, detail: impl Into<String>) -> Self {
        Self {
            location,
            kind,
            severity: Severity::Warning,
            detail: detail.into(),
            fixable: true,
        }
    }

    /// Create a non-fixable finding with the given severity.
    pub fn report(
        location: Location,
        kind: IssueKind,
        severity: Severity,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            location,
            kind,
            severity,
            detail: detail.into(),
            fixable: false,
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} at {}: {}",
            self.severity, self.kind, self.location, self.detail
        )
    }
}

/// The kind of a diagnostic finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// Half-width punctuation inside CJK context (or mixed symbol forms)
    MixedUsage,
    /// A quote or bracket with no matching counterpart
    UnpairedPunctuation,
    /// Run style disagrees with the font/size its heading role mandates
    FontMismatch,
    /// A role font is not present in the caller-supplied font registry
    FontMissing,
    /// Section margin differs from the standard beyond tolerance
    MarginMismatch,
    /// Body paragraph first-line indent below the standard
    IndentMismatch,
    /// Paragraph line spacing deviates from the standard beyond tolerance
    LineSpacingMismatch,
    /// One contiguous list mixes more than one marker style
    NumberingInconsistent,
    /// Cell content wider or taller than its explicit dimension
    TableOverflow,
    /// Run carries direct formatting not mandated by its role
    DirectFormatting,
    /// Section background differs from the configured color
    BackgroundMismatch,
    /// A rule module could not process one element and skipped it
    RuleFailure,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or informational
    Info,
    /// Deviation from the standard
    Warning,
    /// An element the engine could not process
    Error,
}

/// Index path identifying where a finding applies.
///
/// Indices are zero-based and nest left to right:
/// section → block → (run | row/column → paragraph-in-cell).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Section index
    pub section: usize,

    /// Block index within the section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<usize>,

    /// Run index within a paragraph block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<usize>,

    /// (row, column) within a table block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<(usize, usize)>,
}

impl Location {
    /// A whole section.
    pub fn section(section: usize) -> Self {
        Self {
            section,
            ..Default::default()
        }
    }

    /// A block within a section.
    pub fn block(section: usize, block: usize) -> Self {
        Self {
            section,
            block: Some(block),
            ..Default::default()
        }
    }

    /// A run within a paragraph block.
    pub fn run(section: usize, block: usize, run: usize) -> Self {
        Self {
            section,
            block: Some(block),
            run: Some(run),
            ..Default::default()
        }
    }

    /// A cell within a table block.
    pub fn cell(section: usize, block: usize, row: usize, column: usize) -> Self {
        Self {
            section,
            block: Some(block),
            cell: Some((row, column)),
            ..Default::default()
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section {}", self.section)?;
        if let Some(block) = self.block {
            write!(f, " / block {block}")?;
        }
        if let Some((row, col)) = self.cell {
            write!(f, " / cell ({row}, {col})")?;
        }
        if let Some(run) = self.run {
            write!(f, " / run {run}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::run(0, 3, 1);
        assert_eq!(loc.to_string(), "section 0 / block 3 / run 1");

        let loc = Location::cell(1, 0, 2, 4);
        assert_eq!(loc.to_string(), "section 1 / block 0 / cell (2, 4)");
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::fixable(
            Location::section(0),
            IssueKind::MarginMismatch,
            "top margin 2.00cm, expected 3.46cm",
        );
        let text = issue.to_string();
        assert!(text.contains("MarginMismatch"));
        assert!(text.contains("section 0"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
