//! Normalization rules and the fixed pipeline they run in.
//!
//! Every rule offers the same two faces: `detect` walks the document and
//! reports issues without touching it, `apply` rewrites the document in
//! place. Rules run in a fixed order so later rules can rely on earlier
//! ones; heading classification in particular must settle before layout
//! and style cleanup so role exemptions hold.

mod heading;
mod layout;
mod numbering;
pub mod punctuation;
mod style_clean;
mod table_layout;

pub use heading::{classify, HeadingFontRule, RoleMap};
pub use layout::LayoutRule;
pub use numbering::NumberingRule;
pub use punctuation::{classify_char, width_of, PunctClass, PunctWidth, PunctuationRule};
pub use style_clean::StyleCleanRule;
pub use table_layout::TableLayoutRule;

use crate::config::EngineConfig;
use crate::engine::Mode;
use crate::model::{Document, Issue};

/// A single normalization rule.
///
/// `detect` must never mutate anything; `apply` fixes what `detect`
/// reports. A rule that fails on one element reports a
/// [`RuleFailure`](crate::model::IssueKind::RuleFailure) for that element
/// and keeps going.
pub trait Rule {
    /// Short stable name, used in logs.
    fn name(&self) -> &'static str;

    /// Report issues without modifying the document.
    fn detect(&self, document: &Document, config: &EngineConfig) -> Vec<Issue>;

    /// Fix the document in place. Returns issues hit during fixing
    /// (element-level failures that were skipped).
    fn apply(&self, document: &mut Document, config: &EngineConfig) -> Vec<Issue>;
}

/// Build the rule pipeline for a mode.
///
/// Punctuation runs first so later text-shape checks see canonical marks,
/// heading/font before layout and style cleanup so role-based exemptions
/// and mandates resolve against settled roles.
pub fn pipeline(mode: Mode) -> Vec<Box<dyn Rule>> {
    match mode {
        Mode::PunctuationFix => vec![Box::new(PunctuationRule::new())],
        Mode::SmartOneClick | Mode::DiagnosisOnly => vec![
            Box::new(PunctuationRule::new()),
            Box::new(HeadingFontRule::new()),
            Box::new(LayoutRule),
            Box::new(NumberingRule),
            Box::new(TableLayoutRule),
            Box::new(StyleCleanRule::new()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = pipeline(Mode::SmartOneClick)
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "punctuation",
                "heading-font",
                "layout",
                "numbering",
                "table-layout",
                "style-clean"
            ]
        );
    }

    #[test]
    fn test_punctuation_fix_pipeline_is_single_rule() {
        let rules = pipeline(Mode::PunctuationFix);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), "punctuation");
    }
}
