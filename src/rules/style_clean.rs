//! Direct-formatting cleanup and page background enforcement.
//!
//! Every run override and every baseline slant/color that the standard
//! does not mandate is stripped. The surviving bold spots are exactly the
//! mandated ones: roles whose font spec is bold, header-row cells when
//! configured, and the leading run of a body paragraph when first-sentence
//! emphasis is enabled.

use super::{classify, Rule};
use crate::config::EngineConfig;
use crate::model::{
    Block, Document, HeadingRole, Issue, IssueKind, Location, Paragraph, Style, StyleOverrides,
};

pub struct StyleCleanRule {
    _private: (),
}

/// The bold spots a paragraph is entitled to.
#[derive(Clone, Copy)]
struct Mandate {
    /// Baseline weight for the whole paragraph
    baseline_bold: bool,
    /// The first run may carry a bold override
    first_run_bold: bool,
}

fn run_disallowed(o: &StyleOverrides, allow_bold: bool) -> bool {
    o.font_family.is_some()
        || o.size_pt.is_some()
        || o.italic.is_some()
        || o.underline.is_some()
        || o.color.is_some()
        || match o.bold {
            None => false,
            Some(true) => !allow_bold,
            Some(false) => true,
        }
}

fn baseline_off(style: &Style, mandate: Mandate) -> bool {
    style.italic
        || style.underline
        || !style.color.eq_ignore_ascii_case("#000000")
        || style.bold != mandate.baseline_bold
}

impl StyleCleanRule {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn deviations(paragraph: &Paragraph, mandate: Mandate) -> usize {
        let mut count = 0;
        if baseline_off(&paragraph.style, mandate) {
            count += 1;
        }
        for (i, run) in paragraph.runs.iter().enumerate() {
            let allow_bold = mandate.baseline_bold || (mandate.first_run_bold && i == 0);
            if run_disallowed(&run.overrides, allow_bold) {
                count += 1;
            }
            if mandate.first_run_bold && i == 0 && run.overrides.bold != Some(true) {
                count += 1;
            }
        }
        count
    }

    fn scrub(paragraph: &mut Paragraph, mandate: Mandate) {
        paragraph.style.bold = mandate.baseline_bold;
        paragraph.style.italic = false;
        paragraph.style.underline = false;
        paragraph.style.color = "#000000".to_string();
        for (i, run) in paragraph.runs.iter_mut().enumerate() {
            let allow_bold = mandate.baseline_bold || (mandate.first_run_bold && i == 0);
            let o = &mut run.overrides;
            o.font_family = None;
            o.size_pt = None;
            o.italic = None;
            o.underline = None;
            o.color = None;
            if !(allow_bold && o.bold == Some(true)) {
                o.bold = None;
            }
            if mandate.first_run_bold && i == 0 {
                o.bold = Some(true);
            }
        }
    }

    fn paragraph_mandate(role: HeadingRole, config: &EngineConfig) -> Mandate {
        Mandate {
            baseline_bold: config.roles.get(role).bold,
            first_run_bold: config.first_sentence_bold && role == HeadingRole::Body,
        }
    }

    fn cell_mandate(is_header: bool, config: &EngineConfig) -> Mandate {
        Mandate {
            baseline_bold: is_header && config.table.header_bold,
            first_run_bold: false,
        }
    }
}

impl Default for StyleCleanRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for StyleCleanRule {
    fn name(&self) -> &'static str {
        "style-clean"
    }

    fn detect(&self, document: &Document, config: &EngineConfig) -> Vec<Issue> {
        let roles = classify(document, config);
        let mut issues = Vec::new();

        for (si, section) in document.sections.iter().enumerate() {
            if !section.geometry.background.eq_ignore_ascii_case(&config.background) {
                issues.push(Issue::fixable(
                    Location::section(si),
                    IssueKind::BackgroundMismatch,
                    format!(
                        "page background {} (standard {})",
                        section.geometry.background, config.background
                    ),
                ));
            }
            for (bi, block) in section.blocks.iter().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        if p.is_empty() {
                            continue;
                        }
                        let role = roles.role(si, bi).unwrap_or(HeadingRole::Body);
                        let count = Self::deviations(p, Self::paragraph_mandate(role, config));
                        if count > 0 {
                            issues.push(Issue::fixable(
                                Location::block(si, bi),
                                IssueKind::DirectFormatting,
                                format!("{} non-mandated formatting deviation(s)", count),
                            ));
                        }
                    }
                    Block::Table(table) => {
                        for (ri, row) in table.rows.iter().enumerate() {
                            let mandate = Self::cell_mandate(table.is_header_row(ri), config);
                            for (ci, cell) in row.cells.iter().enumerate() {
                                let count: usize = cell
                                    .paragraphs
                                    .iter()
                                    .filter(|p| !p.is_empty())
                                    .map(|p| Self::deviations(p, mandate))
                                    .sum();
                                if count > 0 {
                                    issues.push(Issue::fixable(
                                        Location::cell(si, bi, ri, ci),
                                        IssueKind::DirectFormatting,
                                        format!("{} non-mandated formatting deviation(s)", count),
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }
        issues
    }

    fn apply(&self, document: &mut Document, config: &EngineConfig) -> Vec<Issue> {
        let roles = classify(document, config);

        for (si, section) in document.sections.iter_mut().enumerate() {
            if !section.geometry.background.eq_ignore_ascii_case(&config.background) {
                section.geometry.background = config.background.clone();
            }
            for (bi, block) in section.blocks.iter_mut().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        if p.is_empty() {
                            continue;
                        }
                        let role = roles.role(si, bi).unwrap_or(HeadingRole::Body);
                        Self::scrub(p, Self::paragraph_mandate(role, config));
                    }
                    Block::Table(table) => {
                        let header_rows = table.header_rows as usize;
                        for (ri, row) in table.rows.iter_mut().enumerate() {
                            let mandate = Self::cell_mandate(ri < header_rows, config);
                            for cell in &mut row.cells {
                                for p in &mut cell.paragraphs {
                                    if !p.is_empty() {
                                        Self::scrub(p, mandate);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Margins, PageGeometry, Run, Section, Table, TableCell, TableRow};

    fn doc_with(paragraphs: Vec<Paragraph>) -> Document {
        let mut section = Section::new(PageGeometry::a4(Margins::default()));
        for p in paragraphs {
            section.add_paragraph(p);
        }
        let mut d = Document::new();
        d.add_section(section);
        d
    }

    #[test]
    fn test_direct_formatting_stripped() {
        let mut p = Paragraph::new(Style::default());
        p.add_run(Run {
            text: "重点内容".to_string(),
            overrides: StyleOverrides {
                color: Some("#FF0000".to_string()),
                italic: Some(true),
                ..Default::default()
            },
        });
        p.add_run(Run::new("普通内容。"));
        let mut d = doc_with(vec![p]);
        let config = EngineConfig::default();
        let rule = StyleCleanRule::new();

        let issues = rule.detect(&d, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DirectFormatting);

        rule.apply(&mut d, &config);
        let Block::Paragraph(p) = &d.sections[0].blocks[0] else {
            panic!()
        };
        assert!(!p.runs[0].overrides.is_any_set());
        assert!(rule.detect(&d, &config).is_empty());
    }

    #[test]
    fn test_stray_bold_removed_from_body() {
        let mut p = Paragraph::new(Style::default());
        p.add_run(Run::new("开头"));
        p.add_run(Run::bold("中间加粗"));
        let mut d = doc_with(vec![p]);
        let config = EngineConfig::default();
        let rule = StyleCleanRule::new();

        assert_eq!(rule.detect(&d, &config).len(), 1);
        rule.apply(&mut d, &config);
        let Block::Paragraph(p) = &d.sections[0].blocks[0] else {
            panic!()
        };
        assert_eq!(p.runs[1].overrides.bold, None);
    }

    #[test]
    fn test_first_sentence_bold_mandated_when_enabled() {
        let p = Paragraph::with_text(Style::default(), "首句要求加粗。后续正常。");
        let mut d = doc_with(vec![p]);
        let config = EngineConfig::new().with_first_sentence_bold(true);
        let rule = StyleCleanRule::new();

        assert_eq!(rule.detect(&d, &config).len(), 1);
        rule.apply(&mut d, &config);
        let Block::Paragraph(p) = &d.sections[0].blocks[0] else {
            panic!()
        };
        assert_eq!(p.runs[0].overrides.bold, Some(true));
        assert!(rule.detect(&d, &config).is_empty());
    }

    #[test]
    fn test_header_row_bold_kept_body_rows_cleaned() {
        let header = TableCell::new(vec![{
            let mut p = Paragraph::new(Style::default());
            p.add_run(Run::bold("栏目"));
            p
        }]);
        let body = TableCell::new(vec![{
            let mut p = Paragraph::new(Style::default());
            p.add_run(Run::bold("数值"));
            p
        }]);
        let mut table = Table::with_header(1);
        table.add_row(TableRow::new(vec![header]));
        table.add_row(TableRow::new(vec![body]));

        let mut section = Section::new(PageGeometry::a4(Margins::default()));
        section.add_table(table);
        let mut d = Document::new();
        d.add_section(section);
        let config = EngineConfig::default();
        let rule = StyleCleanRule::new();

        rule.apply(&mut d, &config);
        let Block::Table(t) = &d.sections[0].blocks[0] else {
            panic!()
        };
        let header_p = &t.rows[0].cells[0].paragraphs[0];
        assert!(header_p.style.bold);
        let body_p = &t.rows[1].cells[0].paragraphs[0];
        assert!(!body_p.style.bold);
        assert_eq!(body_p.runs[0].overrides.bold, None);
    }

    #[test]
    fn test_background_enforced() {
        let mut d = doc_with(vec![Paragraph::with_text(Style::default(), "正文。")]);
        d.sections[0].geometry.background = "#f5f5dc".to_string();
        let config = EngineConfig::default();
        let rule = StyleCleanRule::new();

        let issues = rule.detect(&d, &config);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::BackgroundMismatch));

        rule.apply(&mut d, &config);
        assert_eq!(d.sections[0].geometry.background, "#FFFFFF");
    }
}
