//! Heading role classification and role-mandated fonts.
//!
//! Roles are recomputed from document state on every pass and never stored
//! in the model, so a paragraph whose text or styling changes is re-judged
//! from scratch the next time any rule asks.

use super::Rule;
use crate::config::EngineConfig;
use crate::model::{
    Alignment, Block, Document, HeadingRole, Issue, IssueKind, Location, Paragraph, Severity,
};
use regex::Regex;
use std::collections::BTreeSet;

/// Size slack when comparing a run against its mandated size.
const SIZE_EPSILON_PT: f32 = 0.1;

/// How far above the body size a paragraph must sit before size alone
/// suggests a heading.
const SIZE_HEADING_MARGIN_PT: f32 = 1.0;

/// Roles assigned to every block of a document, indexed
/// `[section][block]`. Table blocks carry no role.
pub struct RoleMap {
    roles: Vec<Vec<Option<HeadingRole>>>,
}

impl RoleMap {
    /// Role of a block, `None` for tables.
    pub fn role(&self, section: usize, block: usize) -> Option<HeadingRole> {
        self.roles.get(section).and_then(|s| s.get(block)).copied().flatten()
    }
}

struct Patterns {
    chapter: Regex,
    level1: Regex,
    level2: Regex,
    level3: Regex,
    level4: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            chapter: Regex::new(r"^第[零一二三四五六七八九十百千0-9０-９]+[章节篇]").unwrap(),
            level1: Regex::new(r"^[一二三四五六七八九十百]+、").unwrap(),
            level2: Regex::new(r"^[（(][一二三四五六七八九十百]+[）)]").unwrap(),
            level3: Regex::new(r"^[0-9０-９]+[．.、]").unwrap(),
            level4: Regex::new(r"^[（(][0-9０-９]+[）)]").unwrap(),
        }
    }

    /// Roles suggested by the numbering marker at the head of the text.
    fn candidates(&self, text: &str, out: &mut Vec<HeadingRole>) {
        if self.chapter.is_match(text) || self.level1.is_match(text) {
            out.push(HeadingRole::Level1);
        }
        if self.level2.is_match(text) {
            out.push(HeadingRole::Level2);
        }
        if self.level3.is_match(text) {
            out.push(HeadingRole::Level3);
        }
        if self.level4.is_match(text) {
            out.push(HeadingRole::Level4);
        }
    }
}

/// Classify every block of the document.
///
/// Three heuristics contribute candidates per paragraph: the numbering
/// pattern opening its text, its size and weight relative to the role
/// table, and title position (first non-empty paragraph of a section,
/// centered). When heuristics disagree the shallowest candidate wins, so
/// an over-styled deep item is promoted rather than a top-level heading
/// demoted.
pub fn classify(document: &Document, config: &EngineConfig) -> RoleMap {
    let patterns = Patterns::new();
    let title_floor = config.roles.title.size_pt - 0.5;
    let body_size = config.roles.body.size_pt;

    let mut roles = Vec::with_capacity(document.sections.len());
    for section in &document.sections {
        let mut section_roles = Vec::with_capacity(section.blocks.len());
        let mut seen_text = false;
        for block in &section.blocks {
            let Block::Paragraph(p) = block else {
                section_roles.push(None);
                continue;
            };
            if p.is_empty() {
                section_roles.push(Some(HeadingRole::Body));
                continue;
            }

            let mut candidates = Vec::new();
            patterns.candidates(&p.plain_text(), &mut candidates);

            let style = if p.runs.is_empty() {
                p.style.clone()
            } else {
                p.effective_style(0)
            };
            // With first-sentence emphasis on, a bold leading run is routine
            // body styling and only the paragraph baseline weight counts.
            let bold_signal = if config.first_sentence_bold {
                p.style.bold
            } else {
                style.bold
            };
            if style.size_pt >= title_floor {
                candidates.push(HeadingRole::Title);
            } else if style.size_pt > body_size + SIZE_HEADING_MARGIN_PT || bold_signal {
                candidates.push(HeadingRole::Level1);
            }
            // A paragraph already set in a role's distinctive family keeps
            // that role, so classification is stable across passes.
            for (role, spec) in config.roles.entries() {
                if role.is_heading()
                    && spec.family != config.roles.body.family
                    && style.font_family == spec.family
                {
                    candidates.push(role);
                    break;
                }
            }

            if !seen_text && p.alignment == Alignment::Center {
                candidates.push(HeadingRole::Title);
            }
            seen_text = true;

            let role = candidates
                .into_iter()
                .min_by_key(|r| r.depth())
                .unwrap_or(HeadingRole::Body);
            section_roles.push(Some(role));
        }
        roles.push(section_roles);
    }
    RoleMap { roles }
}

/// Enforces the role font table over paragraphs and the table font over
/// cell text.
pub struct HeadingFontRule {
    _private: (),
}

impl HeadingFontRule {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn mismatched_runs(paragraph: &Paragraph, family: &str, size_pt: f32) -> usize {
        (0..paragraph.runs.len())
            .filter(|&i| {
                let eff = paragraph.effective_style(i);
                eff.font_family != family || (eff.size_pt - size_pt).abs() > SIZE_EPSILON_PT
            })
            .count()
    }

    fn retarget(paragraph: &mut Paragraph, family: &str, size_pt: f32) {
        paragraph.style.font_family = family.to_string();
        paragraph.style.size_pt = size_pt;
        for run in &mut paragraph.runs {
            run.overrides.font_family = None;
            run.overrides.size_pt = None;
        }
    }
}

impl Default for HeadingFontRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for HeadingFontRule {
    fn name(&self) -> &'static str {
        "heading-font"
    }

    fn detect(&self, document: &Document, config: &EngineConfig) -> Vec<Issue> {
        let roles = classify(document, config);
        let mut issues = Vec::new();
        let mut missing: BTreeSet<&str> = BTreeSet::new();

        for (si, section) in document.sections.iter().enumerate() {
            for (bi, block) in section.blocks.iter().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        if p.is_empty() {
                            continue;
                        }
                        let role = roles.role(si, bi).unwrap_or(HeadingRole::Body);
                        let spec = config.roles.get(role);
                        if !config.fonts.is_available(&spec.family) {
                            missing.insert(&spec.family);
                            continue;
                        }
                        let count = Self::mismatched_runs(p, &spec.family, spec.size_pt);
                        if count > 0 {
                            issues.push(Issue::fixable(
                                Location::block(si, bi),
                                IssueKind::FontMismatch,
                                format!(
                                    "{} run(s) deviate from {} {}pt mandated for {:?}",
                                    count, spec.family, spec.size_pt, role
                                ),
                            ));
                        }
                    }
                    Block::Table(table) => {
                        let family = &config.roles.body.family;
                        if !config.fonts.is_available(family) {
                            missing.insert(family);
                            continue;
                        }
                        for (ri, row) in table.rows.iter().enumerate() {
                            for (ci, cell) in row.cells.iter().enumerate() {
                                let count: usize = cell
                                    .paragraphs
                                    .iter()
                                    .filter(|p| !p.is_empty())
                                    .map(|p| {
                                        Self::mismatched_runs(p, family, config.table.size_pt)
                                    })
                                    .sum();
                                if count > 0 {
                                    issues.push(Issue::fixable(
                                        Location::cell(si, bi, ri, ci),
                                        IssueKind::FontMismatch,
                                        format!(
                                            "{} run(s) deviate from {} {}pt mandated for tables",
                                            count, family, config.table.size_pt
                                        ),
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }

        for family in missing {
            issues.push(Issue::report(
                Location::section(0),
                IssueKind::FontMissing,
                Severity::Warning,
                format!("mandated font '{}' is not installed, elements left as-is", family),
            ));
        }
        issues
    }

    fn apply(&self, document: &mut Document, config: &EngineConfig) -> Vec<Issue> {
        let roles = classify(document, config);
        for (si, section) in document.sections.iter_mut().enumerate() {
            for (bi, block) in section.blocks.iter_mut().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        if p.is_empty() {
                            continue;
                        }
                        let role = roles.role(si, bi).unwrap_or(HeadingRole::Body);
                        let spec = config.roles.get(role);
                        if !config.fonts.is_available(&spec.family) {
                            log::warn!(
                                "font '{}' for {:?} unavailable, leaving section {} block {} as-is",
                                spec.family,
                                role,
                                si,
                                bi
                            );
                            continue;
                        }
                        Self::retarget(p, &spec.family, spec.size_pt);
                    }
                    Block::Table(table) => {
                        let family = config.roles.body.family.clone();
                        if !config.fonts.is_available(&family) {
                            continue;
                        }
                        for row in &mut table.rows {
                            for cell in &mut row.cells {
                                for p in &mut cell.paragraphs {
                                    if !p.is_empty() {
                                        Self::retarget(p, &family, config.table.size_pt);
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
    use crate::model::{Margins, PageGeometry, Run, Section, Style};

    fn doc_with(paragraphs: Vec<Paragraph>) -> Document {
        let mut section = Section::new(PageGeometry::a4(Margins::default()));
        for p in paragraphs {
            section.add_paragraph(p);
        }
        let mut doc = Document::new();
        doc.add_section(section);
        doc
    }

    fn body(text: &str) -> Paragraph {
        Paragraph::with_text(Style::default(), text)
    }

    #[test]
    fn test_pattern_roles() {
        let config = EngineConfig::default();
        let doc = doc_with(vec![
            body("一、总体要求"),
            body("（一）指导思想"),
            body("1.主要目标"),
            body("（1）近期安排"),
            body("第三章 保障措施"),
            body("各地区各部门要認真贯彻执行。"),
        ]);
        let roles = classify(&doc, &config);
        assert_eq!(roles.role(0, 0), Some(HeadingRole::Level1));
        assert_eq!(roles.role(0, 1), Some(HeadingRole::Level2));
        assert_eq!(roles.role(0, 2), Some(HeadingRole::Level3));
        assert_eq!(roles.role(0, 3), Some(HeadingRole::Level4));
        assert_eq!(roles.role(0, 4), Some(HeadingRole::Level1));
        assert_eq!(roles.role(0, 5), Some(HeadingRole::Body));
    }

    #[test]
    fn test_title_by_size() {
        let config = EngineConfig::default();
        let doc = doc_with(vec![Paragraph::with_text(
            Style::new("FZXiaoBiaoSong-B05S", 22.0),
            "关于加强管理工作的通知",
        )]);
        assert_eq!(classify(&doc, &config).role(0, 0), Some(HeadingRole::Title));
    }

    #[test]
    fn test_title_by_position_and_centering() {
        let config = EngineConfig::default();
        let mut p = body("关于开展专项行动的通知");
        p.alignment = Alignment::Center;
        let doc = doc_with(vec![p, body("正文第一段。")]);
        let roles = classify(&doc, &config);
        assert_eq!(roles.role(0, 0), Some(HeadingRole::Title));
        assert_eq!(roles.role(0, 1), Some(HeadingRole::Body));
    }

    #[test]
    fn test_tie_break_prefers_shallower_role() {
        // Deep numbering pattern plus title-sized text: the shallower
        // candidate must win, deterministically.
        let config = EngineConfig::default();
        let doc = doc_with(vec![Paragraph::with_text(
            Style::new("SimHei", 22.0),
            "1.总体部署",
        )]);
        assert_eq!(classify(&doc, &config).role(0, 0), Some(HeadingRole::Title));
    }

    #[test]
    fn test_mandated_first_run_bold_is_not_a_heading_signal() {
        let mut p = Paragraph::new(Style::default());
        p.add_run(Run::bold("首句要求加粗。"));
        p.add_run(Run::new("后续内容照常排版。"));
        let doc = doc_with(vec![p]);

        let config = EngineConfig::new().with_first_sentence_bold(true);
        assert_eq!(classify(&doc, &config).role(0, 0), Some(HeadingRole::Body));

        // Without the emphasis rule the same bold run still reads as a
        // hand-styled heading.
        let plain = EngineConfig::default();
        assert_eq!(classify(&doc, &plain).role(0, 0), Some(HeadingRole::Level1));
    }

    #[test]
    fn test_detect_and_fix_font_mismatch() {
        let config = EngineConfig::default();
        let mut p = Paragraph::new(Style::new("SimSun", 14.0));
        p.add_run(Run::new("一、认真落实各项要求"));
        let mut doc = doc_with(vec![p]);

        let rule = HeadingFontRule::new();
        let issues = rule.detect(&doc, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::FontMismatch);
        assert!(issues[0].fixable);

        rule.apply(&mut doc, &config);
        assert!(rule.detect(&doc, &config).is_empty());
        let Block::Paragraph(fixed) = &doc.sections[0].blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(fixed.style.font_family, "SimHei");
        assert_eq!(fixed.style.size_pt, 16.0);
    }

    #[test]
    fn test_missing_font_reported_not_fixed() {
        use crate::config::FontRegistry;
        let config =
            EngineConfig::new().with_fonts(FontRegistry::with_fonts(["FangSong_GB2312"]));
        let mut doc = doc_with(vec![body("一、要点")]);
        let rule = HeadingFontRule::new();

        let issues = rule.detect(&doc, &config);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::FontMissing && !i.fixable));

        rule.apply(&mut doc, &config);
        let Block::Paragraph(p) = &doc.sections[0].blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.style.font_family, Style::default().font_family);
    }
}
