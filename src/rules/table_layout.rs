//! Table geometry: column widths and row heights.
//!
//! Column widths follow the widest content in each column, scaled down
//! proportionally when the table would run past the usable text width.
//! Dimensions a user set explicitly are honored unless the content no
//! longer fits, and then only the overflowing dimension is corrected.

use super::Rule;
use crate::config::EngineConfig;
use crate::model::{Block, Document, Issue, IssueKind, Location, Severity, Table, TableCell};

/// Slack before a dimension counts as overflowing, in points.
const OVERFLOW_EPSILON_PT: f32 = 0.5;

pub struct TableLayoutRule;

/// Whether a character occupies a full em in CJK typesetting.
fn is_fullwidth(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
        || ('\u{3400}'..='\u{4dbf}').contains(&c)
        || ('\u{3000}'..='\u{303f}').contains(&c)
        || ('\u{ff00}'..='\u{ff60}').contains(&c)
        || matches!(c, '“' | '”' | '‘' | '’' | '…' | '—')
}

/// Estimated width of one line of text at the given size: full-width
/// characters take one em, everything else half an em.
fn text_width_pt(text: &str, size_pt: f32) -> f32 {
    text.chars()
        .map(|c| if is_fullwidth(c) { size_pt } else { size_pt * 0.5 })
        .sum()
}

/// Widest single line of a cell's content, in points.
fn cell_content_width(cell: &TableCell, size_pt: f32) -> f32 {
    cell.paragraphs
        .iter()
        .map(|p| text_width_pt(&p.plain_text(), size_pt))
        .fold(0.0, f32::max)
}

/// Vertical space the cell's content needs, padding included.
fn cell_content_height(cell: &TableCell, config: &EngineConfig) -> f32 {
    cell.paragraphs.len().max(1) as f32 * config.table.line_spacing_pt
        + 2.0 * config.table.cell_padding_pt
}

/// Per-column target widths for a table, padding included and capped at
/// the available text width. The cap never shrinks a column below its raw
/// content width.
fn column_widths(table: &Table, available_pt: f32, config: &EngineConfig) -> Vec<f32> {
    let columns = table.column_count();
    let pad = 2.0 * config.table.cell_padding_pt;
    let mut content = vec![0.0f32; columns];
    for row in &table.rows {
        for (ci, cell) in row.cells.iter().enumerate() {
            content[ci] = content[ci].max(cell_content_width(cell, config.table.size_pt));
        }
    }
    // A column of empty cells still gets room for one character.
    for w in &mut content {
        *w = w.max(config.table.size_pt);
    }

    let natural: Vec<f32> = content.iter().map(|w| w + pad).collect();
    let total: f32 = natural.iter().sum();
    if total <= available_pt || total <= 0.0 {
        natural
    } else {
        let scale = available_pt / total;
        natural
            .iter()
            .zip(&content)
            .map(|(n, c)| (n * scale).max(*c))
            .collect()
    }
}

impl Rule for TableLayoutRule {
    fn name(&self) -> &'static str {
        "table-layout"
    }

    fn detect(&self, document: &Document, config: &EngineConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (si, section) in document.sections.iter().enumerate() {
            for (bi, block) in section.blocks.iter().enumerate() {
                let Block::Table(table) = block else { continue };
                if table.is_empty() {
                    issues.push(Issue::report(
                        Location::block(si, bi),
                        IssueKind::RuleFailure,
                        Severity::Error,
                        "table has no rows, skipped",
                    ));
                    continue;
                }
                for (ri, row) in table.rows.iter().enumerate() {
                    if row.cells.is_empty() {
                        issues.push(Issue::report(
                            Location::block(si, bi),
                            IssueKind::RuleFailure,
                            Severity::Error,
                            format!("row {} has no cells, skipped", ri),
                        ));
                        continue;
                    }
                    for (ci, cell) in row.cells.iter().enumerate() {
                        if let Some(w) = cell.width_pt {
                            let content = cell_content_width(cell, config.table.size_pt);
                            if content > w + OVERFLOW_EPSILON_PT {
                                issues.push(Issue::fixable(
                                    Location::cell(si, bi, ri, ci),
                                    IssueKind::TableOverflow,
                                    format!(
                                        "content needs {:.1}pt but the cell is {:.1}pt wide",
                                        content, w
                                    ),
                                ));
                            }
                        }
                        if let Some(h) = cell.height_pt {
                            let needed = cell_content_height(cell, config);
                            if needed > h + OVERFLOW_EPSILON_PT {
                                issues.push(Issue::fixable(
                                    Location::cell(si, bi, ri, ci),
                                    IssueKind::TableOverflow,
                                    format!(
                                        "content needs {:.1}pt but the cell is {:.1}pt tall",
                                        needed, h
                                    ),
                                ));
                            }
                        }
                    }
                }
            }
        }
        issues
    }

    fn apply(&self, document: &mut Document, config: &EngineConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (si, section) in document.sections.iter_mut().enumerate() {
            let available = section.text_width_pt();
            for (bi, block) in section.blocks.iter_mut().enumerate() {
                let Block::Table(table) = block else { continue };
                if table.is_empty() {
                    issues.push(Issue::report(
                        Location::block(si, bi),
                        IssueKind::RuleFailure,
                        Severity::Error,
                        "table has no rows, skipped",
                    ));
                    continue;
                }
                let widths = column_widths(table, available, config);
                let pad = 2.0 * config.table.cell_padding_pt;

                for (ri, row) in table.rows.iter_mut().enumerate() {
                    if row.cells.is_empty() {
                        issues.push(Issue::report(
                            Location::block(si, bi),
                            IssueKind::RuleFailure,
                            Severity::Error,
                            format!("row {} has no cells, skipped", ri),
                        ));
                        continue;
                    }
                    let row_height = row
                        .cells
                        .iter()
                        .map(|c| cell_content_height(c, config))
                        .fold(0.0, f32::max);

                    for (ci, cell) in row.cells.iter_mut().enumerate() {
                        match cell.width_pt {
                            Some(w) => {
                                let content = cell_content_width(cell, config.table.size_pt);
                                if content > w + OVERFLOW_EPSILON_PT {
                                    cell.width_pt = Some(content + pad);
                                }
                            }
                            None => cell.width_pt = Some(widths[ci]),
                        }
                        match cell.height_pt {
                            Some(h) => {
                                let needed = cell_content_height(cell, config);
                                if needed > h + OVERFLOW_EPSILON_PT {
                                    cell.height_pt = Some(needed);
                                }
                            }
                            None => cell.height_pt = Some(row_height),
                        }
                    }
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Margins, PageGeometry, Paragraph, Section, Style, TableRow};

    fn cell(text: &str) -> TableCell {
        TableCell::new(vec![Paragraph::with_text(Style::default(), text)])
    }

    fn doc_with_table(table: Table) -> Document {
        let mut section = Section::new(PageGeometry::a4(Margins::default()));
        section.add_table(table);
        let mut d = Document::new();
        d.add_section(section);
        d
    }

    #[test]
    fn test_text_width_estimate() {
        assert_eq!(text_width_pt("中文", 12.0), 24.0);
        assert_eq!(text_width_pt("ab", 12.0), 12.0);
        assert_eq!(text_width_pt("中a", 12.0), 18.0);
    }

    #[test]
    fn test_auto_geometry_filled_in() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![cell("姓名"), cell("职务")]));
        table.add_row(TableRow::new(vec![cell("张三"), cell("科长")]));
        let mut d = doc_with_table(table);
        let config = EngineConfig::default();

        assert!(TableLayoutRule.detect(&d, &config).is_empty());
        assert!(TableLayoutRule.apply(&mut d, &config).is_empty());

        let Block::Table(t) = &d.sections[0].blocks[0] else {
            panic!()
        };
        for row in &t.rows {
            for c in &row.cells {
                assert!(c.width_pt.is_some());
                assert!(c.height_pt.is_some());
            }
        }
        // Two CJK chars at 12pt plus padding on both sides.
        assert_eq!(t.rows[0].cells[0].width_pt, Some(32.0));
    }

    #[test]
    fn test_explicit_overflow_corrected_others_untouched() {
        let tight = TableCell::with_width(
            vec![Paragraph::with_text(Style::default(), "很长的一段内容放不下")],
            30.0,
        );
        let roomy = TableCell::with_width(
            vec![Paragraph::with_text(Style::default(), "短")],
            90.0,
        );
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![tight, roomy]));
        let mut d = doc_with_table(table);
        let config = EngineConfig::default();

        let issues = TableLayoutRule.detect(&d, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TableOverflow);
        assert_eq!(issues[0].location.cell, Some((0, 0)));

        TableLayoutRule.apply(&mut d, &config);
        let Block::Table(t) = &d.sections[0].blocks[0] else {
            panic!()
        };
        // 10 CJK chars at 12pt = 120pt content, plus 8pt padding.
        assert_eq!(t.rows[0].cells[0].width_pt, Some(128.0));
        assert_eq!(t.rows[0].cells[1].width_pt, Some(90.0));
        assert!(TableLayoutRule.detect(&d, &config).is_empty());
    }

    #[test]
    fn test_wide_table_scaled_to_text_width() {
        let long = "一".repeat(60);
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![
            cell(&long),
            cell(&long),
        ]));
        let mut d = doc_with_table(table);
        let config = EngineConfig::default();
        let available = d.sections[0].text_width_pt();

        TableLayoutRule.apply(&mut d, &config);
        let Block::Table(t) = &d.sections[0].blocks[0] else {
            panic!()
        };
        let total: f32 = t.rows[0]
            .cells
            .iter()
            .map(|c| c.width_pt.unwrap_or(0.0))
            .sum();
        // 120 ems at 12pt far exceeds an A4 text column; the result may
        // keep the raw content floor but must not exceed it.
        assert!(total <= 2.0 * (60.0 * 12.0) + 0.001);
        assert!(total > available * 0.9);
    }

    #[test]
    fn test_degenerate_table_reported_and_skipped() {
        let mut d = doc_with_table(Table::new());
        let config = EngineConfig::default();

        let issues = TableLayoutRule.detect(&d, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::RuleFailure);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(!issues[0].fixable);

        let apply_issues = TableLayoutRule.apply(&mut d, &config);
        assert_eq!(apply_issues.len(), 1);
    }

    #[test]
    fn test_second_pass_stable() {
        let mut table = Table::new();
        table.add_row(TableRow::new(vec![cell("编号"), cell("内容说明较长一些")]));
        let mut d = doc_with_table(table);
        let config = EngineConfig::default();

        TableLayoutRule.apply(&mut d, &config);
        let snapshot = format!("{:?}", d.sections[0].blocks[0]);
        assert!(TableLayoutRule.detect(&d, &config).is_empty());
        TableLayoutRule.apply(&mut d, &config);
        assert_eq!(format!("{:?}", d.sections[0].blocks[0]), snapshot);
    }
}
