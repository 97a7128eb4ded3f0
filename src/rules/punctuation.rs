//! Full/half-width punctuation normalization.
//!
//! Classifies every character against a canonical full/half-width mapping
//! table, converts half-width marks sitting in CJK context to their
//! full-width counterparts, repairs quote alternation, and reports unpaired
//! quotes and brackets found by a left-to-right stack scan.
//!
//! Context is decided by the nearest script-bearing neighbors of each mark,
//! never by a document-wide majority vote. Spans that must survive
//! untouched (URLs, e-mail addresses, clock times, standard designations,
//! Windows drive paths) are masked out before any rewriting.

use super::Rule;
use crate::config::EngineConfig;
use crate::model::{Block, Document, Issue, IssueKind, Location, Paragraph, Severity};
use regex::Regex;

/// Canonical half-width → full-width mapping table.
const HALF_TO_FULL: &[(char, char)] = &[
    ('(', '（'),
    (')', '）'),
    ('[', '［'),
    (']', '］'),
    ('{', '｛'),
    ('}', '｝'),
    (',', '，'),
    ('.', '。'),
    (':', '：'),
    (';', '；'),
    ('!', '！'),
    ('?', '？'),
];

/// Double-quote glyph variants normalized by alternation.
const DOUBLE_QUOTE_VARIANTS: &[char] = &['"', '“', '”', '„', '‟', '「', '」'];

/// Single-quote glyph variants normalized by alternation.
const SINGLE_QUOTE_VARIANTS: &[char] = &['\'', '‘', '’', '‚', '‛'];

/// Punctuation class of a character, a pure function of the character and
/// its immediate neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctClass {
    /// Not a punctuation mark
    None,
    /// `(`, `（`, `[`, `「`, ...
    OpeningBracket,
    /// `)`, `）`, `]`, `」`, ...
    ClosingBracket,
    /// `“`, `‘`, or an ambiguous ASCII quote after an opener/space
    OpeningQuote,
    /// `”`, `’`, or an ambiguous ASCII quote elsewhere
    ClosingQuote,
    /// `,`, `，`, `、`
    Comma,
    /// `.`, `。`
    Period,
    /// Any other mark in the mapping table (`:`, `；`, `！`, ...)
    Other,
}

/// Classify one character given its immediate neighbors.
pub fn classify_char(c: char, prev: Option<char>, _next: Option<char>) -> PunctClass {
    match c {
        '(' | '（' | '[' | '［' | '{' | '｛' | '「' | '『' | '《' | '〈' => {
            PunctClass::OpeningBracket
        }
        ')' | '）' | ']' | '］' | '}' | '｝' | '」' | '』' | '》' | '〉' => {
            PunctClass::ClosingBracket
        }
        '“' | '‘' => PunctClass::OpeningQuote,
        '”' | '’' => PunctClass::ClosingQuote,
        '"' | '\'' => {
            // Ambiguous ASCII quotes open after whitespace or an opener.
            let opens = match prev {
                None => true,
                Some(p) => {
                    p.is_whitespace() || classify_char(p, None, None) == PunctClass::OpeningBracket
                }
            };
            if opens {
                PunctClass::OpeningQuote
            } else {
                PunctClass::ClosingQuote
            }
        }
        ',' | '，' | '、' => PunctClass::Comma,
        '.' | '。' => PunctClass::Period,
        ':' | '：' | ';' | '；' | '!' | '！' | '?' | '？' => PunctClass::Other,
        _ => PunctClass::None,
    }
}

/// Width class of a punctuation mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctWidth {
    /// Sized for East-Asian text
    Full,
    /// Sized for Latin text
    Half,
    /// ASCII quotes, direction and width resolved by context
    Ambiguous,
}

/// Width of a character, if it is a known punctuation mark.
pub fn width_of(c: char) -> Option<PunctWidth> {
    if c == '"' || c == '\'' {
        return Some(PunctWidth::Ambiguous);
    }
    if HALF_TO_FULL.iter().any(|&(h, _)| h == c) {
        return Some(PunctWidth::Half);
    }
    if HALF_TO_FULL.iter().any(|&(_, f)| f == c) {
        return Some(PunctWidth::Full);
    }
    None
}

fn half_to_full(c: char) -> Option<char> {
    HALF_TO_FULL.iter().find(|&&(h, _)| h == c).map(|&(_, f)| f)
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c) || ('\u{3400}'..='\u{4dbf}').contains(&c)
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn bears_script(c: char) -> bool {
    is_cjk(c) || is_latin(c)
}

/// Script context surrounding one character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptContext {
    Cjk,
    Latin,
    Neutral,
}

/// Context of the mark at `idx`, from the nearest script-bearing character
/// on each side. CJK on either side wins over Latin on the other, so a
/// half-width comma glued to Chinese text converts even right after a
/// Latin word.
fn context_at(chars: &[char], idx: usize) -> ScriptContext {
    let left = chars[..idx].iter().rev().copied().find(|&c| bears_script(c));
    let right = chars[idx + 1..].iter().copied().find(|&c| bears_script(c));
    if left.map_or(false, is_cjk) || right.map_or(false, is_cjk) {
        ScriptContext::Cjk
    } else if left.is_some() || right.is_some() {
        ScriptContext::Latin
    } else {
        ScriptContext::Neutral
    }
}

/// Bracket/quote family for pair matching. Matching is width-insensitive:
/// `（` closed by `)` is paired (and separately reported as mixed usage).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Paren,
    Square,
    Curly,
    Angle,
    DoubleQuote,
    SingleQuote,
}

fn family_of(c: char) -> Option<(Family, bool)> {
    let entry = match c {
        '(' | '（' => (Family::Paren, true),
        ')' | '）' => (Family::Paren, false),
        '[' | '［' => (Family::Square, true),
        ']' | '］' => (Family::Square, false),
        '{' | '｛' => (Family::Curly, true),
        '}' | '｝' => (Family::Curly, false),
        '《' | '〈' => (Family::Angle, true),
        '》' | '〉' => (Family::Angle, false),
        '“' => (Family::DoubleQuote, true),
        '”' => (Family::DoubleQuote, false),
        '‘' => (Family::SingleQuote, true),
        '’' => (Family::SingleQuote, false),
        _ => return None,
    };
    Some(entry)
}

fn closing_for(opener: char) -> char {
    match opener {
        '(' => ')',
        '（' => '）',
        '[' => ']',
        '［' => '］',
        '{' => '}',
        '｛' => '｝',
        '《' => '》',
        '〈' => '〉',
        '“' => '”',
        '‘' => '’',
        other => other,
    }
}

/// An unmatched quote or bracket found by the pairing scan.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Unpaired {
    pub ch: char,
    pub opening: bool,
}

/// Outcome of rewriting one paragraph's text.
#[derive(Debug, Clone)]
pub(crate) struct TextFix {
    /// The rewritten text, without best-guess closures
    pub text: String,
    /// Closing marks for unmatched openers, appended only in fix mode
    pub closure_suffix: String,
    /// Number of marks whose canonical form differs from the source
    pub conversions: usize,
    /// Unmatched quotes/brackets after rewriting
    pub unpaired: Vec<Unpaired>,
}

impl TextFix {
    pub fn is_clean(&self) -> bool {
        self.conversions == 0 && self.unpaired.is_empty()
    }
}

/// Punctuation normalizer rule.
pub struct PunctuationRule {
    re_url: Regex,
    re_email: Regex,
    re_drive: Regex,
    re_standard: Regex,
    re_time: Regex,
    re_dots: Regex,
    re_full_stops: Regex,
    re_hyphens: Regex,
    re_em_dashes: Regex,
}

impl PunctuationRule {
    pub fn new() -> Self {
        Self {
            re_url: Regex::new(r"(?:https?|ftp)://\S+").unwrap(),
            re_email: Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap(),
            re_drive: Regex::new(r"[A-Za-z]:\\").unwrap(),
            re_standard: Regex::new(r"[A-Za-z]+[\s-]?\d+:\d{2,}").unwrap(),
            re_time: Regex::new(r"\d{1,2}:\d{2}(?::\d{2})?").unwrap(),
            re_dots: Regex::new(r"\.{2,}").unwrap(),
            re_full_stops: Regex::new(r"。{2,}").unwrap(),
            re_hyphens: Regex::new(r"-{2,}").unwrap(),
            re_em_dashes: Regex::new(r"—+").unwrap(),
        }
    }

    /// Byte ranges that must survive rewriting untouched, sorted and
    /// non-overlapping.
    fn protected_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for re in [&self.re_url, &self.re_email, &self.re_drive, &self.re_standard] {
            for m in re.find_iter(text) {
                spans.push((m.start(), m.end()));
            }
        }
        // Clock times, rejected when glued to surrounding digits. The regex
        // crate has no lookaround, so the boundary check is done by hand.
        for m in self.re_time.find_iter(text) {
            let before_ok = text[..m.start()]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_ascii_digit());
            let after_ok = text[m.end()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_ascii_digit());
            if before_ok && after_ok {
                spans.push((m.start(), m.end()));
            }
        }

        spans.sort_unstable();
        // Merge overlaps so downstream masking stays simple.
        let mut merged: Vec<(usize, usize)> = Vec::new();
        for (start, end) in spans {
            match merged.last_mut() {
                Some((_, last_end)) if start <= *last_end => *last_end = (*last_end).max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    /// Rewrite one match set, counting only replacements that change text.
    fn rewrite_counted(re: &Regex, text: &str, replacement: &str, count: &mut usize) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in re.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            out.push_str(replacement);
            if m.as_str() != replacement {
                *count += 1;
            }
            last = m.end();
        }
        out.push_str(&text[last..]);
        out
    }

    /// Compute the full rewrite of one paragraph's text.
    pub(crate) fn rewrite(&self, text: &str) -> TextFix {
        let spans = self.protected_spans(text);
        let has_cjk = text.chars().any(is_cjk);
        let mut conversions = 0usize;

        // Stage 1: length-changing canonicalizations on unprotected
        // segments only (ellipsis before period handling, then dashes).
        let mut chars: Vec<char> = Vec::with_capacity(text.len());
        let mut protected: Vec<bool> = Vec::with_capacity(text.len());
        let mut cursor = 0usize;
        for &(start, end) in &spans {
            let open = &text[cursor..start];
            let rewritten = self.rewrite_segment(open, &mut conversions);
            chars.extend(rewritten.chars());
            protected.extend(std::iter::repeat(false).take(rewritten.chars().count()));

            let kept = &text[start..end];
            chars.extend(kept.chars());
            protected.extend(std::iter::repeat(true).take(kept.chars().count()));
            cursor = end;
        }
        let tail = self.rewrite_segment(&text[cursor..], &mut conversions);
        chars.extend(tail.chars());
        protected.extend(std::iter::repeat(false).take(tail.chars().count()));

        // Stage 2: context-sensitive width conversion, one char at a time.
        for idx in 0..chars.len() {
            if protected[idx] {
                continue;
            }
            let c = chars[idx];
            let Some(full) = half_to_full(c) else { continue };
            // A period converts only when it directly ends a CJK clause.
            // Decimals ("3.5") and list markers ("1.") keep the dot.
            let convert = if c == '.' {
                idx > 0 && is_cjk(chars[idx - 1])
            } else {
                context_at(&chars, idx) == ScriptContext::Cjk
            };
            if convert {
                chars[idx] = full;
                conversions += 1;
            }
        }

        // Stage 3: quote alternation, CJK paragraphs only. Odd occurrences
        // open, even occurrences close, across every glyph variant.
        if has_cjk {
            for (variants, open, close) in [
                (DOUBLE_QUOTE_VARIANTS, '“', '”'),
                (SINGLE_QUOTE_VARIANTS, '‘', '’'),
            ] {
                let mut seen = 0usize;
                for idx in 0..chars.len() {
                    if protected[idx] || !variants.contains(&chars[idx]) {
                        continue;
                    }
                    let target = if seen % 2 == 0 { open } else { close };
                    seen += 1;
                    if chars[idx] != target {
                        chars[idx] = target;
                        conversions += 1;
                    }
                }
            }
        }

        // Stage 4: left-to-right pairing scan over the rewritten text.
        let mut stack: Vec<(Family, char)> = Vec::new();
        let mut unpaired: Vec<Unpaired> = Vec::new();
        for idx in 0..chars.len() {
            if protected[idx] {
                continue;
            }
            let Some((family, opening)) = family_of(chars[idx]) else {
                continue;
            };
            if opening {
                stack.push((family, chars[idx]));
            } else if stack.last().is_some_and(|&(f, _)| f == family) {
                stack.pop();
            } else {
                unpaired.push(Unpaired {
                    ch: chars[idx],
                    opening: false,
                });
            }
        }
        let mut closure_suffix = String::new();
        for &(_, opener) in stack.iter().rev() {
            unpaired.push(Unpaired {
                ch: opener,
                opening: true,
            });
            closure_suffix.push(closing_for(opener));
        }

        TextFix {
            text: chars.into_iter().collect(),
            closure_suffix,
            conversions,
            unpaired,
        }
    }

    fn rewrite_segment(&self, segment: &str, count: &mut usize) -> String {
        if segment.is_empty() {
            return String::new();
        }
        let mut out = Self::rewrite_counted(&self.re_dots, segment, "……", count);
        out = Self::rewrite_counted(&self.re_full_stops, &out, "……", count);
        out = Self::rewrite_counted(&self.re_hyphens, &out, "——", count);
        out = Self::rewrite_counted(&self.re_em_dashes, &out, "——", count);
        out
    }

    fn detect_paragraph(&self, paragraph: &Paragraph, location: Location, issues: &mut Vec<Issue>) {
        if paragraph.is_empty() {
            return;
        }
        let fix = self.rewrite(&paragraph.plain_text());
        if fix.is_clean() {
            return;
        }
        if fix.conversions > 0 {
            issues.push(Issue::fixable(
                location.clone(),
                IssueKind::MixedUsage,
                format!(
                    "{} punctuation mark(s) deviate from the canonical form for their context",
                    fix.conversions
                ),
            ));
        }
        for mark in &fix.unpaired {
            if mark.opening {
                issues.push(Issue::fixable(
                    location.clone(),
                    IssueKind::UnpairedPunctuation,
                    format!("opening '{}' is never closed", mark.ch),
                ));
            } else {
                issues.push(Issue::report(
                    location.clone(),
                    IssueKind::UnpairedPunctuation,
                    Severity::Warning,
                    format!("closing '{}' has no matching opener", mark.ch),
                ));
            }
        }
    }

    fn apply_paragraph(&self, paragraph: &mut Paragraph) {
        if paragraph.is_empty() || paragraph.runs.is_empty() {
            return;
        }
        let original = paragraph.plain_text();
        let fix = self.rewrite(&original);
        let mut new_text = fix.text;
        new_text.push_str(&fix.closure_suffix);
        if new_text != original {
            redistribute(paragraph, &new_text);
        }
    }
}

impl Default for PunctuationRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-distribute rewritten text across the original runs.
///
/// When the character count is unchanged (pure width/quote conversion) the
/// text is split along the original run boundaries so run styling survives.
/// Otherwise everything lands in the first run, matching the conservative
/// fallback of the upstream tooling.
fn redistribute(paragraph: &mut Paragraph, new_text: &str) {
    let lens: Vec<usize> = paragraph
        .runs
        .iter()
        .map(|r| r.text.chars().count())
        .collect();
    let total: usize = lens.iter().sum();
    let new_chars: Vec<char> = new_text.chars().collect();

    if new_chars.len() == total {
        let mut pos = 0;
        for (run, len) in paragraph.runs.iter_mut().zip(&lens) {
            run.text = new_chars[pos..pos + len].iter().collect();
            pos += len;
        }
    } else {
        log::debug!(
            "run boundaries lost ({} -> {} chars), collapsing into first run",
            total,
            new_chars.len()
        );
        paragraph.runs[0].text = new_text.to_string();
        for run in paragraph.runs.iter_mut().skip(1) {
            run.text.clear();
        }
    }
}

impl Rule for PunctuationRule {
    fn name(&self) -> &'static str {
        "punctuation"
    }

    fn detect(&self, document: &Document, _config: &EngineConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (si, section) in document.sections.iter().enumerate() {
            for (bi, block) in section.blocks.iter().enumerate() {
                match block {
                    Block::Paragraph(p) => {
                        self.detect_paragraph(p, Location::block(si, bi), &mut issues);
                    }
                    Block::Table(table) => {
                        for (ri, row) in table.rows.iter().enumerate() {
                            for (ci, cell) in row.cells.iter().enumerate() {
                                for p in &cell.paragraphs {
                                    self.detect_paragraph(
                                        p,
                                        Location::cell(si, bi, ri, ci),
                                        &mut issues,
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
        issues
    }

    fn apply(&self, document: &mut Document, _config: &EngineConfig) -> Vec<Issue> {
        for section in &mut document.sections {
            for block in &mut section.blocks {
                match block {
                    Block::Paragraph(p) => self.apply_paragraph(p),
                    Block::Table(table) => {
                        for row in &mut table.rows {
                            for cell in &mut row.cells {
                                for p in &mut cell.paragraphs {
                                    self.apply_paragraph(p);
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
