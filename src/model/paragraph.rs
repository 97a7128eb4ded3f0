//! Paragraph and run-level types.

use serde::{Deserialize, Serialize};

/// A paragraph of text content.
///
/// Every paragraph carries exactly one resolved baseline [`Style`]; runs layer
/// direct overrides on top of it but never replace it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Baseline style for the whole paragraph
    pub style: Style,

    /// Text alignment
    pub alignment: Alignment,

    /// Fixed-value line spacing in points
    pub line_spacing_pt: f32,

    /// First-line indent in character units
    pub first_line_indent_chars: f32,

    /// List numbering, if this paragraph is a list item
    pub numbering: Option<Numbering>,

    /// Text runs in the paragraph
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Create an empty paragraph with the given baseline style.
    pub fn new(style: Style) -> Self {
        Self {
            style,
            alignment: Alignment::default(),
            line_spacing_pt: 0.0,
            first_line_indent_chars: 0.0,
            numbering: None,
            runs: Vec::new(),
        }
    }

    /// Create a paragraph holding a single plain run.
    pub fn with_text(style: Style, text: impl Into<String>) -> Self {
        let mut p = Self::new(style);
        p.runs.push(Run::new(text));
        p
    }

    /// Add a run to the paragraph.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() || self.plain_text().trim().is_empty()
    }

    /// Check if this paragraph is a list item.
    pub fn is_list_item(&self) -> bool {
        self.numbering.is_some()
    }

    /// Effective style of a run, with overrides layered on the baseline.
    pub fn effective_style(&self, run_index: usize) -> Style {
        match self.runs.get(run_index) {
            Some(run) => run.overrides.layered_on(&self.style),
            None => self.style.clone(),
        }
    }
}

/// A run of text with optional direct-style overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The text content
    pub text: String,

    /// Direct overrides layered on the paragraph baseline
    pub overrides: StyleOverrides,
}

impl Run {
    /// Create a run with no overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            overrides: StyleOverrides::default(),
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            overrides: StyleOverrides {
                bold: Some(true),
                ..Default::default()
            },
        }
    }

    /// Check if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A resolved character style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Font family name
    pub font_family: String,

    /// Font size in points
    pub size_pt: f32,

    /// Bold weight
    pub bold: bool,

    /// Italic slant
    pub italic: bool,

    /// Underline
    pub underline: bool,

    /// Text color (hex format, e.g. "#000000")
    pub color: String,
}

impl Style {
    /// Create a plain style with the given family and size.
    pub fn new(font_family: impl Into<String>, size_pt: f32) -> Self {
        Self {
            font_family: font_family.into(),
            size_pt,
            bold: false,
            italic: false,
            underline: false,
            color: "#000000".to_string(),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new("FangSong_GB2312", 16.0)
    }
}

/// Direct-style overrides carried by a run.
///
/// `None` means "inherit from the paragraph baseline".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverrides {
    /// Font family override
    pub font_family: Option<String>,

    /// Font size override in points
    pub size_pt: Option<f32>,

    /// Bold override
    pub bold: Option<bool>,

    /// Italic override
    pub italic: Option<bool>,

    /// Underline override
    pub underline: Option<bool>,

    /// Color override (hex format)
    pub color: Option<String>,
}

impl StyleOverrides {
    /// Check if any override is set.
    pub fn is_any_set(&self) -> bool {
        self.font_family.is_some()
            || self.size_pt.is_some()
            || self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.color.is_some()
    }

    /// Resolve the overrides against a baseline style.
    pub fn layered_on(&self, base: &Style) -> Style {
        Style {
            font_family: self
                .font_family
                .clone()
                .unwrap_or_else(|| base.font_family.clone()),
            size_pt: self.size_pt.unwrap_or(base.size_pt),
            bold: self.bold.unwrap_or(base.bold),
            italic: self.italic.unwrap_or(base.italic),
            underline: self.underline.unwrap_or(base.underline),
            color: self.color.clone().unwrap_or_else(|| base.color.clone()),
        }
    }
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

/// List numbering carried by a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Numbering {
    /// Nesting level (1 = top level)
    pub level: u8,

    /// Position in the list sequence
    pub number: u32,

    /// Marker style used to render the number
    pub marker: MarkerStyle,
}

impl Numbering {
    /// Create a numbering reference.
    pub fn new(level: u8, number: u32, marker: MarkerStyle) -> Self {
        Self {
            level,
            number,
            marker,
        }
    }

    /// Render the marker text for this item, e.g. `3、` or `(3)`.
    pub fn marker_text(&self) -> String {
        self.marker.format(self.number)
    }
}

/// Structural role of a paragraph, inferred per pass and never stored.
///
/// The formatting standard ties fonts and sizes to roles, not to paragraph
/// identity, so classification is recomputed from scratch on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingRole {
    /// Document title
    Title,
    /// First-level heading (一、 / 第一章)
    Level1,
    /// Second-level heading (（一）)
    Level2,
    /// Third-level heading (1.)
    Level3,
    /// Fourth-level heading ((1))
    Level4,
    /// Ordinary body text
    Body,
}

impl HeadingRole {
    /// Hierarchy depth, smaller is closer to the root. Title is 0, Body 5.
    pub fn depth(&self) -> u8 {
        match self {
            HeadingRole::Title => 0,
            HeadingRole::Level1 => 1,
            HeadingRole::Level2 => 2,
            HeadingRole::Level3 => 3,
            HeadingRole::Level4 => 4,
            HeadingRole::Body => 5,
        }
    }

    /// Whether this role is a heading (including the title).
    pub fn is_heading(&self) -> bool {
        !matches!(self, HeadingRole::Body)
    }
}

/// The digit-separator convention of a list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// `1.`
    Dot,
    /// `1、` (ideographic comma)
    IdeographicComma,
    /// `1)`
    ParenRight,
    /// `(1)`
    ParenBoth,
    /// `（1）` (full-width parentheses)
    FullWidthParen,
}

impl MarkerStyle {
    /// Render a number in this marker style.
    pub fn format(&self, number: u32) -> String {
        match self {
            MarkerStyle::Dot => format!("{number}."),
            MarkerStyle::IdeographicComma => format!("{number}、"),
            MarkerStyle::ParenRight => format!("{number})"),
            MarkerStyle::ParenBoth => format!("({number})"),
            MarkerStyle::FullWidthParen => format!("（{number}）"),
        }
    }

    /// Recognize the marker style of a literal marker text.
    pub fn parse(marker: &str) -> Option<(Self, u32)> {
        let marker = marker.trim();
        if let Some(inner) = marker.strip_prefix('（').and_then(|m| m.strip_suffix('）')) {
            return inner.parse().ok().map(|n| (MarkerStyle::FullWidthParen, n));
        }
        if let Some(inner) = marker.strip_prefix('(').and_then(|m| m.strip_suffix(')')) {
            return inner.parse().ok().map(|n| (MarkerStyle::ParenBoth, n));
        }
        if let Some(num) = marker.strip_suffix('、') {
            return num.parse().ok().map(|n| (MarkerStyle::IdeographicComma, n));
        }
        if let Some(num) = marker.strip_suffix('.') {
            return num.parse().ok().map(|n| (MarkerStyle::Dot, n));
        }
        if let Some(num) = marker.strip_suffix(')') {
            return num.parse().ok().map(|n| (MarkerStyle::ParenRight, n));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new(Style::default());
        p.add_run(Run::new("你好"));
        p.add_run(Run::bold("世界"));
        assert_eq!(p.plain_text(), "你好世界");
        assert!(!p.is_empty());
    }

    #[test]
    fn test_effective_style_layers_overrides() {
        let mut p = Paragraph::new(Style::new("SimHei", 16.0));
        p.add_run(Run {
            text: "x".to_string(),
            overrides: StyleOverrides {
                size_pt: Some(22.0),
                ..Default::default()
            },
        });

        let eff = p.effective_style(0);
        assert_eq!(eff.font_family, "SimHei");
        assert_eq!(eff.size_pt, 22.0);
    }

    #[test]
    fn test_marker_style_round_trip() {
        for style in [
            MarkerStyle::Dot,
            MarkerStyle::IdeographicComma,
            MarkerStyle::ParenRight,
            MarkerStyle::ParenBoth,
            MarkerStyle::FullWidthParen,
        ] {
            let text = style.format(7);
            assert_eq!(MarkerStyle::parse(&text), Some((style, 7)));
        }
    }

    #[test]
    fn test_marker_parse_rejects_garbage() {
        assert_eq!(MarkerStyle::parse("abc"), None);
        assert_eq!(MarkerStyle::parse("（x）"), None);
    }
}
