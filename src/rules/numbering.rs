//! List numbering canonicalization.
//!
//! Markers are unified inside each contiguous group of list items at the
//! same level. Two lists separated by plain paragraphs or a table are
//! independent and may legitimately use different marker styles; setting
//! `unify_numbering_globally` collapses that freedom to one marker style
//! per level across the whole document. Item numbers themselves are never
//! rewritten.

use super::Rule;
use crate::config::EngineConfig;
use crate::model::{Block, Document, Issue, IssueKind, Location, MarkerStyle};
use std::collections::HashMap;

pub struct NumberingRule;

/// One contiguous run of same-level list items within a section.
struct Group {
    section: usize,
    /// Block index and marker for each member, in document order.
    members: Vec<(usize, MarkerStyle)>,
    level: u8,
}

fn collect_groups(document: &Document) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for (si, section) in document.sections.iter().enumerate() {
        let mut current: Option<Group> = None;
        for (bi, block) in section.blocks.iter().enumerate() {
            let numbering = match block {
                Block::Paragraph(p) => p.numbering.as_ref(),
                Block::Table(_) => None,
            };
            match numbering {
                Some(n) => {
                    match current.as_mut() {
                        Some(g) if g.level == n.level => g.members.push((bi, n.marker)),
                        _ => {
                            if let Some(done) = current.take() {
                                groups.push(done);
                            }
                            current = Some(Group {
                                section: si,
                                members: vec![(bi, n.marker)],
                                level: n.level,
                            });
                        }
                    }
                }
                None => {
                    if let Some(done) = current.take() {
                        groups.push(done);
                    }
                }
            }
        }
        if let Some(done) = current.take() {
            groups.push(done);
        }
    }
    groups
}

/// Canonical marker per group: the group's first marker, or with global
/// unification the first marker seen anywhere in the document for that
/// level.
fn canonical_markers(groups: &[Group], config: &EngineConfig) -> Vec<MarkerStyle> {
    if config.unify_numbering_globally {
        let mut per_level: HashMap<u8, MarkerStyle> = HashMap::new();
        for g in groups {
            per_level.entry(g.level).or_insert(g.members[0].1);
        }
        groups.iter().map(|g| per_level[&g.level]).collect()
    } else {
        groups.iter().map(|g| g.members[0].1).collect()
    }
}

impl Rule for NumberingRule {
    fn name(&self) -> &'static str {
        "numbering"
    }

    fn detect(&self, document: &Document, config: &EngineConfig) -> Vec<Issue> {
        let groups = collect_groups(document);
        let canonical = canonical_markers(&groups, config);
        let mut issues = Vec::new();
        for (group, &target) in groups.iter().zip(&canonical) {
            let off = group
                .members
                .iter()
                .filter(|(_, marker)| *marker != target)
                .count();
            if off > 0 {
                let first = group.members[0].0;
                issues.push(Issue::fixable(
                    Location::block(group.section, first),
                    IssueKind::NumberingInconsistent,
                    format!(
                        "{} of {} level-{} item(s) deviate from the {} marker",
                        off,
                        group.members.len(),
                        group.level,
                        target.format(1)
                    ),
                ));
            }
        }
        issues
    }

    fn apply(&self, document: &mut Document, config: &EngineConfig) -> Vec<Issue> {
        let groups = collect_groups(document);
        let canonical = canonical_markers(&groups, config);
        for (group, &target) in groups.iter().zip(&canonical) {
            for &(bi, marker) in &group.members {
                if marker == target {
                    continue;
                }
                if let Block::Paragraph(p) = &mut document.sections[group.section].blocks[bi] {
                    if let Some(n) = p.numbering.as_mut() {
                        n.marker = target;
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
    use crate::model::{Margins, Numbering, PageGeometry, Paragraph, Section, Style};

    fn item(level: u8, number: u32, marker: MarkerStyle, text: &str) -> Paragraph {
        let mut p = Paragraph::with_text(Style::default(), text);
        p.numbering = Some(Numbering::new(level, number, marker));
        p
    }

    fn doc(paragraphs: Vec<Paragraph>) -> Document {
        let mut section = Section::new(PageGeometry::a4(Margins::default()));
        for p in paragraphs {
            section.add_paragraph(p);
        }
        let mut d = Document::new();
        d.add_section(section);
        d
    }

    #[test]
    fn test_mixed_markers_in_group_unified_to_first() {
        let mut d = doc(vec![
            item(1, 1, MarkerStyle::IdeographicComma, "第一项"),
            item(1, 2, MarkerStyle::Dot, "第二项"),
            item(1, 3, MarkerStyle::IdeographicComma, "第三项"),
        ]);
        let config = EngineConfig::default();

        let issues = NumberingRule.detect(&d, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::NumberingInconsistent);

        NumberingRule.apply(&mut d, &config);
        for block in &d.sections[0].blocks {
            let Block::Paragraph(p) = block else { panic!() };
            let n = p.numbering.as_ref().unwrap();
            assert_eq!(n.marker, MarkerStyle::IdeographicComma);
        }
        assert!(NumberingRule.detect(&d, &config).is_empty());
    }

    #[test]
    fn test_numbers_preserved() {
        let mut d = doc(vec![
            item(1, 1, MarkerStyle::Dot, "甲"),
            item(1, 5, MarkerStyle::ParenBoth, "乙"),
        ]);
        let config = EngineConfig::default();
        NumberingRule.apply(&mut d, &config);
        let Block::Paragraph(p) = &d.sections[0].blocks[1] else {
            panic!()
        };
        assert_eq!(p.numbering.as_ref().unwrap().number, 5);
        assert_eq!(p.numbering.as_ref().unwrap().marker, MarkerStyle::Dot);
    }

    #[test]
    fn test_separated_groups_stay_independent() {
        let mut d = doc(vec![
            item(1, 1, MarkerStyle::IdeographicComma, "第一项"),
            item(1, 2, MarkerStyle::IdeographicComma, "第二项"),
            Paragraph::with_text(Style::default(), "中间正文。"),
            item(1, 1, MarkerStyle::ParenBoth, "另一列表"),
            item(1, 2, MarkerStyle::ParenBoth, "另一项"),
        ]);
        let config = EngineConfig::default();
        assert!(NumberingRule.detect(&d, &config).is_empty());
        NumberingRule.apply(&mut d, &config);
        let Block::Paragraph(p) = &d.sections[0].blocks[3] else {
            panic!()
        };
        assert_eq!(p.numbering.as_ref().unwrap().marker, MarkerStyle::ParenBoth);
    }

    #[test]
    fn test_global_unification_spans_groups() {
        let mut d = doc(vec![
            item(1, 1, MarkerStyle::IdeographicComma, "第一项"),
            Paragraph::with_text(Style::default(), "中间正文。"),
            item(1, 1, MarkerStyle::ParenBoth, "另一列表"),
        ]);
        let config = EngineConfig::new().with_global_numbering(true);

        let issues = NumberingRule.detect(&d, &config);
        assert_eq!(issues.len(), 1);

        NumberingRule.apply(&mut d, &config);
        let Block::Paragraph(p) = &d.sections[0].blocks[2] else {
            panic!()
        };
        assert_eq!(
            p.numbering.as_ref().unwrap().marker,
            MarkerStyle::IdeographicComma
        );
    }

    #[test]
    fn test_level_change_splits_group() {
        let d = doc(vec![
            item(1, 1, MarkerStyle::IdeographicComma, "一级"),
            item(2, 1, MarkerStyle::FullWidthParen, "二级"),
            item(1, 2, MarkerStyle::Dot, "回到一级"),
        ]);
        let config = EngineConfig::default();
        // Each run is its own group, so no inconsistency inside any of them.
        assert!(NumberingRule.detect(&d, &config).is_empty());
    }
}
