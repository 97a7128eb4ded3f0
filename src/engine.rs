//! Engine entry point: mode selection, model validation, rule dispatch.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{Block, Document, Issue};
use crate::rules;
use std::fmt;
use std::str::FromStr;

/// Processing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run every rule: detect, then fix
    SmartOneClick,
    /// Run every rule's detection, return the document untouched
    DiagnosisOnly,
    /// Run only the punctuation rule, detect and fix
    PunctuationFix,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "smart-one-click" => Ok(Mode::SmartOneClick),
            "diagnosis-only" => Ok(Mode::DiagnosisOnly),
            "punctuation-fix" => Ok(Mode::PunctuationFix),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::SmartOneClick => "smart-one-click",
            Mode::DiagnosisOnly => "diagnosis-only",
            Mode::PunctuationFix => "punctuation-fix",
        };
        write!(f, "{name}")
    }
}

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The document, fixed in place unless the mode is diagnosis-only
    pub document: Document,
    /// Everything detected, plus element-level failures hit while fixing
    pub issues: Vec<Issue>,
}

impl Outcome {
    /// Issues that a fixing mode would (or did) resolve.
    pub fn fixable_count(&self) -> usize {
        self.issues.iter().filter(|i| i.fixable).count()
    }
}

fn finite_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn finite_non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

/// Structural validation, run before any rule may touch the document.
fn validate(document: &Document) -> Result<()> {
    for (si, section) in document.sections.iter().enumerate() {
        let g = &section.geometry;
        if !finite_positive(g.page_width_cm) || !finite_positive(g.page_height_cm) {
            return Err(Error::MalformedModel(format!(
                "section {si}: non-positive page size"
            )));
        }
        for (name, value) in g.margins.sides() {
            if !finite_non_negative(value) {
                return Err(Error::MalformedModel(format!(
                    "section {si}: {name} margin is not a finite non-negative number"
                )));
            }
        }
        for (bi, block) in section.blocks.iter().enumerate() {
            match block {
                Block::Paragraph(p) => {
                    if !p.line_spacing_pt.is_finite() || !p.first_line_indent_chars.is_finite() {
                        return Err(Error::MalformedModel(format!(
                            "section {si} block {bi}: non-finite paragraph geometry"
                        )));
                    }
                    if !finite_positive(p.style.size_pt) {
                        return Err(Error::MalformedModel(format!(
                            "section {si} block {bi}: non-positive font size"
                        )));
                    }
                }
                Block::Table(table) => {
                    for (ri, row) in table.rows.iter().enumerate() {
                        for (ci, cell) in row.cells.iter().enumerate() {
                            if cell.paragraphs.is_empty() {
                                return Err(Error::MalformedModel(format!(
                                    "section {si} block {bi}: cell ({ri}, {ci}) has no paragraphs"
                                )));
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Run the engine over a document.
///
/// Validation failures surface before anything is modified; once rules
/// run, a failure on one element is reported as an issue and the rest of
/// the document still gets processed.
pub fn run(document: Document, mode: Mode, config: &EngineConfig) -> Result<Outcome> {
    validate(&document)?;
    log::debug!(
        "running {} over {} block(s) in {} section(s)",
        mode,
        document.block_count(),
        document.sections.len()
    );

    let pipeline = rules::pipeline(mode);
    let mut issues = Vec::new();
    for rule in &pipeline {
        let found = rule.detect(&document, config);
        log::debug!("{}: {} finding(s)", rule.name(), found.len());
        issues.extend(found);
    }

    if mode == Mode::DiagnosisOnly {
        return Ok(Outcome { document, issues });
    }

    let mut document = document;
    for rule in &pipeline {
        // A skipped element already reported by detection is not reported
        // a second time by the fix pass.
        for issue in rule.apply(&mut document, config) {
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
    }
    Ok(Outcome { document, issues })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        IssueKind, Margins, PageGeometry, Paragraph, Section, Style, Table, TableCell, TableRow,
    };

    fn minimal_doc() -> Document {
        let mut section = Section::new(PageGeometry::a4(Margins::default()));
        let mut p = Paragraph::with_text(Style::default(), "正文内容。");
        p.first_line_indent_chars = 2.0;
        p.line_spacing_pt = 29.0;
        section.add_paragraph(p);
        let mut d = Document::new();
        d.add_section(section);
        d
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("smart-one-click".parse::<Mode>().unwrap(), Mode::SmartOneClick);
        assert_eq!("diagnosis-only".parse::<Mode>().unwrap(), Mode::DiagnosisOnly);
        assert_eq!("punctuation-fix".parse::<Mode>().unwrap(), Mode::PunctuationFix);
        assert!(matches!(
            "one-click".parse::<Mode>(),
            Err(Error::InvalidMode(_))
        ));
    }

    #[test]
    fn test_mode_display_round_trip() {
        for mode in [Mode::SmartOneClick, Mode::DiagnosisOnly, Mode::PunctuationFix] {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_clean_document_yields_no_issues() {
        let outcome = run(minimal_doc(), Mode::SmartOneClick, &EngineConfig::default()).unwrap();
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_empty_cell_rejected_before_any_fix() {
        let mut d = minimal_doc();
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![TableCell::new(vec![])]));
        d.sections[0].add_table(table);

        let err = run(d, Mode::SmartOneClick, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedModel(_)));
    }

    #[test]
    fn test_degenerate_table_reported_once_in_fix_mode() {
        let mut d = minimal_doc();
        d.sections[0].add_table(Table::new());

        let outcome = run(d, Mode::SmartOneClick, &EngineConfig::default()).unwrap();
        let failures = outcome
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::RuleFailure)
            .count();
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let mut d = minimal_doc();
        d.sections[0].geometry.margins.left_cm = f32::NAN;
        let err = run(d, Mode::DiagnosisOnly, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedModel(_)));
    }
}
