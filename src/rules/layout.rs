//! Page margins, first-line indentation, and line spacing.
//!
//! Values inside the configured tolerance band are accepted as-is; only
//! out-of-band values are reported and snapped to the exact standard.
//! Indentation applies to body paragraphs only. Headings and list items
//! carry their own leading geometry and are exempt.

use super::{classify, Rule};
use crate::config::EngineConfig;
use crate::model::{Block, Document, HeadingRole, Issue, IssueKind, Location, Paragraph};

pub struct LayoutRule;

impl LayoutRule {
    fn off_sides(section_margins: &crate::model::Margins, config: &EngineConfig) -> Vec<String> {
        section_margins
            .sides()
            .iter()
            .zip(config.margins.sides().iter())
            .filter(|((_, actual), (_, wanted))| (actual - wanted).abs() > config.margin_tolerance_cm)
            .map(|((name, actual), (_, wanted))| {
                format!("{} {:.2}cm (standard {:.2}cm)", name, actual, wanted)
            })
            .collect()
    }

    fn indent_applies(paragraph: &Paragraph, role: HeadingRole) -> bool {
        role == HeadingRole::Body && !paragraph.is_list_item() && !paragraph.is_empty()
    }

    fn spacing_off(actual: f32, wanted: f32, config: &EngineConfig) -> bool {
        (actual - wanted).abs() > config.line_spacing_tolerance_pt
    }
}

impl Rule for LayoutRule {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn detect(&self, document: &Document, config: &EngineConfig) -> Vec<Issue> {
        let roles = classify(document, config);
        let mut issues = Vec::new();

        for (si, section) in document.sections.iter().enumerate() {
            let off = Self::off_sides(&section.geometry.margins, config);
            if !off.is_empty() {
                issues.push(Issue::fixable(
                    Location::section(si),
                    IssueKind::MarginMismatch,
                    off.join(", "),
                ));
            }

            for (bi, block) in section.blocks.iter().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        let role = roles.role(si, bi).unwrap_or(HeadingRole::Body);
                        if Self::indent_applies(p, role)
                            && (p.first_line_indent_chars - config.first_line_indent_chars).abs()
                                > config.indent_tolerance_chars
                        {
                            issues.push(Issue::fixable(
                                Location::block(si, bi),
                                IssueKind::IndentMismatch,
                                format!(
                                    "first-line indent {:.2} chars (standard {:.2})",
                                    p.first_line_indent_chars, config.first_line_indent_chars
                                ),
                            ));
                        }
                        if !p.is_empty()
                            && Self::spacing_off(p.line_spacing_pt, config.line_spacing_pt, config)
                        {
                            issues.push(Issue::fixable(
                                Location::block(si, bi),
                                IssueKind::LineSpacingMismatch,
                                format!(
                                    "line spacing {:.1}pt (standard {:.1}pt)",
                                    p.line_spacing_pt, config.line_spacing_pt
                                ),
                            ));
                        }
                    }
                    Block::Table(table) => {
                        for (ri, row) in table.rows.iter().enumerate() {
                            for (ci, cell) in row.cells.iter().enumerate() {
                                let off = cell.paragraphs.iter().any(|p| {
                                    !p.is_empty()
                                        && Self::spacing_off(
                                            p.line_spacing_pt,
                                            config.table.line_spacing_pt,
                                            config,
                                        )
                                });
                                if off {
                                    issues.push(Issue::fixable(
                                        Location::cell(si, bi, ri, ci),
                                        IssueKind::LineSpacingMismatch,
                                        format!(
                                            "cell line spacing deviates from {:.1}pt",
                                            config.table.line_spacing_pt
                                        ),
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
            let margins = &mut section.geometry.margins;
            if (margins.top_cm - config.margins.top_cm).abs() > config.margin_tolerance_cm {
                margins.top_cm = config.margins.top_cm;
            }
            if (margins.bottom_cm - config.margins.bottom_cm).abs() > config.margin_tolerance_cm {
                margins.bottom_cm = config.margins.bottom_cm;
            }
            if (margins.left_cm - config.margins.left_cm).abs() > config.margin_tolerance_cm {
                margins.left_cm = config.margins.left_cm;
            }
            if (margins.right_cm - config.margins.right_cm).abs() > config.margin_tolerance_cm {
                margins.right_cm = config.margins.right_cm;
            }

            for (bi, block) in section.blocks.iter_mut().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        let role = roles.role(si, bi).unwrap_or(HeadingRole::Body);
                        if Self::indent_applies(p, role)
                            && (p.first_line_indent_chars - config.first_line_indent_chars).abs()
                                > config.indent_tolerance_chars
                        {
                            p.first_line_indent_chars = config.first_line_indent_chars;
                        }
                        if !p.is_empty()
                            && Self::spacing_off(p.line_spacing_pt, config.line_spacing_pt, config)
                        {
                            p.line_spacing_pt = config.line_spacing_pt;
                        }
                    }
                    Block::Table(table) => {
                        for row in &mut table.rows {
                            for cell in &mut row.cells {
                                for p in &mut cell.paragraphs {
                                    if !p.is_empty()
                                        && Self::spacing_off(
                                            p.line_spacing_pt,
                                            config.table.line_spacing_pt,
                                            config,
                                        )
                                    {
                                        p.line_spacing_pt = config.table.line_spacing_pt;
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
