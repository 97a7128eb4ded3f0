//! Engine configuration.
//!
//! All invocation parameters are passed explicitly through [`EngineConfig`];
//! the engine holds no process-wide state, so callers may run multiple
//! documents in parallel with independent configurations.

use crate::model::{HeadingRole, Margins};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for one engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Standard page margins in centimeters
    pub margins: Margins,

    /// Margin deviation tolerated without flagging, in centimeters.
    /// Keeps rounding noise from format conversion out of the report.
    pub margin_tolerance_cm: f32,

    /// Standard first-line indent for body paragraphs, in character units
    pub first_line_indent_chars: f32,

    /// Indent deviation tolerated without flagging, in character units
    pub indent_tolerance_chars: f32,

    /// Standard fixed-value line spacing in points
    pub line_spacing_pt: f32,

    /// Line-spacing deviation tolerated without flagging, in points
    pub line_spacing_tolerance_pt: f32,

    /// Font/size pair mandated for each heading role
    pub roles: RoleTable,

    /// Page background color (hex format)
    pub background: String,

    /// Table-specific formatting
    pub table: TableConfig,

    /// Caller-supplied font availability registry
    pub fonts: FontRegistry,

    /// Unify list marker styles per level across the whole document instead
    /// of per contiguous group
    pub unify_numbering_globally: bool,

    /// Allow the leading run of a body paragraph to stay bold
    pub first_sentence_bold: bool,
}

impl EngineConfig {
    /// Create a configuration with the official-document preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the standard margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the margin tolerance in centimeters.
    pub fn with_margin_tolerance(mut self, tolerance_cm: f32) -> Self {
        self.margin_tolerance_cm = tolerance_cm;
        self
    }

    /// Set the standard first-line indent in character units.
    pub fn with_indent(mut self, chars: f32) -> Self {
        self.first_line_indent_chars = chars;
        self
    }

    /// Set the standard line spacing in points.
    pub fn with_line_spacing(mut self, spacing_pt: f32) -> Self {
        self.line_spacing_pt = spacing_pt;
        self
    }

    /// Override the font/size pair for one role.
    pub fn with_role_font(mut self, role: HeadingRole, spec: FontSpec) -> Self {
        *self.roles.get_mut(role) = spec;
        self
    }

    /// Set the page background color.
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = color.into();
        self
    }

    /// Set the font availability registry.
    pub fn with_fonts(mut self, fonts: FontRegistry) -> Self {
        self.fonts = fonts;
        self
    }

    /// Unify numbering styles document-wide instead of per contiguous group.
    pub fn with_global_numbering(mut self, enabled: bool) -> Self {
        self.unify_numbering_globally = enabled;
        self
    }

    /// Allow a bold leading run in body paragraphs.
    pub fn with_first_sentence_bold(mut self, enabled: bool) -> Self {
        self.first_sentence_bold = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            margin_tolerance_cm: 0.05,
            first_line_indent_chars: 2.0,
            indent_tolerance_chars: 0.25,
            line_spacing_pt: 29.0,
            line_spacing_tolerance_pt: 0.5,
            roles: RoleTable::default(),
            background: "#FFFFFF".to_string(),
            table: TableConfig::default(),
            fonts: FontRegistry::assume_all(),
            unify_numbering_globally: false,
            first_sentence_bold: false,
        }
    }
}

/// A (font family, size) pair mandated for a heading role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Font family name
    pub family: String,

    /// Font size in points
    pub size_pt: f32,

    /// Whether the role mandates bold weight
    pub bold: bool,
}

impl FontSpec {
    /// Create a non-bold font spec.
    pub fn new(family: impl Into<String>, size_pt: f32) -> Self {
        Self {
            family: family.into(),
            size_pt,
            bold: false,
        }
    }
}

/// Per-role font table.
///
/// Defaults follow the official-document preset: small-biaosong title,
/// heiti first-level headings, kaiti second-level, fangsong everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTable {
    /// Document title
    pub title: FontSpec,
    /// First-level heading
    pub level1: FontSpec,
    /// Second-level heading
    pub level2: FontSpec,
    /// Third-level heading
    pub level3: FontSpec,
    /// Fourth-level heading
    pub level4: FontSpec,
    /// Body text
    pub body: FontSpec,
}

impl RoleTable {
    /// Font spec mandated for a role.
    pub fn get(&self, role: HeadingRole) -> &FontSpec {
        match role {
            HeadingRole::Title => &self.title,
            HeadingRole::Level1 => &self.level1,
            HeadingRole::Level2 => &self.level2,
            HeadingRole::Level3 => &self.level3,
            HeadingRole::Level4 => &self.level4,
            HeadingRole::Body => &self.body,
        }
    }

    /// Mutable font spec for a role.
    pub fn get_mut(&mut self, role: HeadingRole) -> &mut FontSpec {
        match role {
            HeadingRole::Title => &mut self.title,
            HeadingRole::Level1 => &mut self.level1,
            HeadingRole::Level2 => &mut self.level2,
            HeadingRole::Level3 => &mut self.level3,
            HeadingRole::Level4 => &mut self.level4,
            HeadingRole::Body => &mut self.body,
        }
    }

    /// All (role, spec) pairs in depth order.
    pub fn entries(&self) -> [(HeadingRole, &FontSpec); 6] {
        [
            (HeadingRole::Title, &self.title),
            (HeadingRole::Level1, &self.level1),
            (HeadingRole::Level2, &self.level2),
            (HeadingRole::Level3, &self.level3),
            (HeadingRole::Level4, &self.level4),
            (HeadingRole::Body, &self.body),
        ]
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            title: FontSpec::new("FZXiaoBiaoSong-B05S", 22.0),
            level1: FontSpec::new("SimHei", 16.0),
            level2: FontSpec::new("KaiTi_GB2312", 16.0),
            level3: FontSpec::new("FangSong_GB2312", 16.0),
            level4: FontSpec::new("FangSong_GB2312", 16.0),
            body: FontSpec::new("FangSong_GB2312", 16.0),
        }
    }
}

/// Table formatting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Font size for table text in points
    pub size_pt: f32,

    /// Fixed line spacing inside cells in points
    pub line_spacing_pt: f32,

    /// Padding added around cell content in points
    pub cell_padding_pt: f32,

    /// Keep header-row runs bold
    pub header_bold: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            size_pt: 12.0,
            line_spacing_pt: 22.0,
            cell_padding_pt: 4.0,
            header_bold: true,
        }
    }
}

/// Caller-supplied registry of installed fonts.
///
/// Replaces ad-hoc global "fonts installed" queries: the classifier consults
/// this registry to report `FontMissing` without touching process state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRegistry {
    // None = availability unknown, treat every family as present.
    available: Option<BTreeSet<String>>,
}

impl FontRegistry {
    /// A registry that treats every family as available.
    pub fn assume_all() -> Self {
        Self { available: None }
    }

    /// A registry restricted to the given families.
    pub fn with_fonts<I, S>(fonts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: Some(fonts.into_iter().map(Into::into).collect()),
        }
    }

    /// Check whether a family is available.
    pub fn is_available(&self, family: &str) -> bool {
        match &self.available {
            None => true,
            Some(set) => set.contains(family),
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::assume_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_indent(4.0)
            .with_line_spacing(22.0)
            .with_background("#FDFDFD")
            .with_global_numbering(true);

        assert_eq!(config.first_line_indent_chars, 4.0);
        assert_eq!(config.line_spacing_pt, 22.0);
        assert_eq!(config.background, "#FDFDFD");
        assert!(config.unify_numbering_globally);
    }

    #[test]
    fn test_role_table_defaults() {
        let roles = RoleTable::default();
        assert_eq!(roles.get(HeadingRole::Title).size_pt, 22.0);
        assert_eq!(roles.get(HeadingRole::Level1).family, "SimHei");
        assert_eq!(roles.get(HeadingRole::Body).family, "FangSong_GB2312");
    }

    #[test]
    fn test_font_registry() {
        let all = FontRegistry::assume_all();
        assert!(all.is_available("SimHei"));

        let some = FontRegistry::with_fonts(["SimHei", "KaiTi_GB2312"]);
        assert!(some.is_available("SimHei"));
        assert!(!some.is_available("FZXiaoBiaoSong-B05S"));
    }

    #[test]
    fn test_with_role_font() {
        let config = EngineConfig::new()
            .with_role_font(HeadingRole::Title, FontSpec::new("STZhongsong", 24.0));
        assert_eq!(config.roles.get(HeadingRole::Title).family, "STZhongsong");
        assert_eq!(config.roles.get(HeadingRole::Title).size_pt, 24.0);
    }
}
